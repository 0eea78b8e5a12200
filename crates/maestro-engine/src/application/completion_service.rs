//! Completion Use Case
//!
//! Composes model selection, budget enforcement, the provider call, and
//! usage recording. All decisions complete before provider I/O begins,
//! and usage is recorded strictly after a successful response.

use std::sync::Arc;

use uuid::Uuid;

use maestro::{
    ChatMessage, CompletionOptions, DomainError, LlmProvider, Provider, TokenEstimator,
    TokenUsage, UsageRecord, UsageRepository,
};

use crate::services::{BudgetGuard, CostEstimator, ModelRouter, SelectedModel, SelectionCriteria};

/// Input for a completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub criteria: SelectionCriteria,
    pub options: CompletionOptions,
    pub user_id: Option<String>,
    pub conversation_id: Option<Uuid>,
}

impl CompletionRequest {
    /// Create a request with default options and no attribution
    pub fn new(messages: Vec<ChatMessage>, criteria: SelectionCriteria) -> Self {
        Self {
            messages,
            criteria,
            options: CompletionOptions::default(),
            user_id: None,
            conversation_id: None,
        }
    }

    /// Attribute the request to a user
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Link the request to a conversation
    pub fn with_conversation(mut self, conversation_id: Uuid) -> Self {
        self.conversation_id = Some(conversation_id);
        self
    }
}

/// Result of a completed request
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub content: String,
    pub provider: Provider,
    pub model: String,
    pub usage: TokenUsage,
    /// Actual cost in USD, from returned token counts
    pub cost: f64,
    pub finish_reason: Option<String>,
}

/// Application service for chat completions
pub struct CompletionService<P, U, T>
where
    P: LlmProvider,
    U: UsageRepository,
    T: TokenEstimator,
{
    router: Arc<ModelRouter>,
    budget: BudgetGuard<U>,
    estimator: CostEstimator<T>,
    provider: Arc<P>,
    usage_repo: Arc<U>,
}

impl<P, U, T> CompletionService<P, U, T>
where
    P: LlmProvider,
    U: UsageRepository,
    T: TokenEstimator,
{
    pub fn new(
        router: Arc<ModelRouter>,
        budget: BudgetGuard<U>,
        estimator: CostEstimator<T>,
        provider: Arc<P>,
        usage_repo: Arc<U>,
    ) -> Self {
        Self {
            router,
            budget,
            estimator,
            provider,
            usage_repo,
        }
    }

    /// Run a chat completion end to end
    pub async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionOutcome, DomainError> {
        let selected = self.router.select_optimal_model(&request.criteria)?;

        let prompt_text = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let estimate = self
            .estimator
            .estimate_cost(&prompt_text, Some(&selected.model))
            .await?;

        let snapshot = self
            .budget
            .check_budget(request.user_id.as_deref(), estimate.estimated_cost.max)
            .await?;
        if !snapshot.can_proceed {
            return Err(DomainError::BudgetExceeded(format!(
                "Estimated cost {:.6} exceeds the remaining budget (daily {:.6}, monthly {:.6})",
                estimate.estimated_cost.max,
                snapshot.remaining_budget.daily,
                snapshot.remaining_budget.monthly
            )));
        }

        let response = self
            .provider
            .generate_text(&selected.model, &request.messages, &request.options)
            .await?;

        let cost = actual_cost(&response.usage, &selected);
        let mut record = UsageRecord::new(
            selected.provider.clone(),
            &selected.model,
            response.usage.input_tokens,
            response.usage.output_tokens,
            cost,
        );
        if let Some(user_id) = &request.user_id {
            record = record.for_user(user_id);
        }
        if let Some(conversation_id) = request.conversation_id {
            record = record.with_conversation(conversation_id);
        }

        // A failed usage write must not fail an already-delivered completion
        if let Err(e) = self.usage_repo.create(&record).await {
            tracing::warn!("Failed to record usage for {}: {}", selected.model, e);
        }

        tracing::info!(
            "Completed with {} ({}): {} tokens, cost {:.6}",
            selected.model,
            selected.provider,
            response.usage.total_tokens,
            cost
        );

        Ok(CompletionOutcome {
            content: response.content,
            provider: selected.provider,
            model: selected.model,
            usage: response.usage,
            cost,
            finish_reason: response.finish_reason,
        })
    }
}

fn actual_cost(usage: &TokenUsage, selected: &SelectedModel) -> f64 {
    usage.input_tokens as f64 / 1000.0 * selected.estimated_cost_per_1k_tokens.input
        + usage.output_tokens as f64 / 1000.0 * selected.estimated_cost_per_1k_tokens.output
}
