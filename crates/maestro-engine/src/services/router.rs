//! Model Router - Capability and budget aware model selection
//!
//! Rule-based selection over the catalog. Holds the only mutable shared
//! state in the engine: a monotonically increasing round-robin cursor.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use maestro::{Capability, DomainError, ModelConfig, Provider, SelectionStrategy};

/// Criteria for a single model selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionCriteria {
    /// Requested capabilities; candidates must cover all of them
    pub capabilities: Vec<Capability>,
    pub strategy: SelectionStrategy,
    /// Ceiling on cost per 1k input tokens, USD
    pub max_budget: Option<f64>,
    /// Providers to prefer when any of them has a candidate
    pub preferred_providers: Vec<Provider>,
}

impl SelectionCriteria {
    /// Create criteria for the given strategy
    pub fn new(strategy: SelectionStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Set the requested capabilities
    pub fn with_capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the input-cost ceiling
    pub fn with_max_budget(mut self, max_budget: f64) -> Self {
        self.max_budget = Some(max_budget);
        self
    }

    /// Set the preferred providers
    pub fn with_preferred_providers(mut self, preferred_providers: Vec<Provider>) -> Self {
        self.preferred_providers = preferred_providers;
        self
    }
}

/// Estimated per-1k-token cost of a selected model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostPer1k {
    pub input: f64,
    pub output: f64,
}

/// Result of a model selection
#[derive(Debug, Clone, Serialize)]
pub struct SelectedModel {
    pub provider: Provider,
    pub model: String,
    pub estimated_cost_per_1k_tokens: CostPer1k,
}

/// Selects one model from the catalog per request
///
/// The catalog is taken at construction and never mutated; lookups and
/// listings return defensive clones.
pub struct ModelRouter {
    catalog: Vec<ModelConfig>,
    /// Round-robin cursor, shared across all calls on this instance
    /// regardless of which filter produced the candidate set. Sharing
    /// rotation across processes would need an external store; this is a
    /// single-process cursor.
    round_robin: AtomicU64,
}

impl ModelRouter {
    /// Create a router over the given catalog
    pub fn new(catalog: Vec<ModelConfig>) -> Self {
        Self {
            catalog,
            round_robin: AtomicU64::new(0),
        }
    }

    /// Select the optimal model for the given criteria
    ///
    /// Filters to enabled, capability-covering entries, applies the
    /// budget ceiling, narrows to preferred providers when possible
    /// (falling back to the full set otherwise), then applies the
    /// strategy. Ties break on catalog order.
    pub fn select_optimal_model(
        &self,
        criteria: &SelectionCriteria,
    ) -> Result<SelectedModel, DomainError> {
        let capable: Vec<&ModelConfig> = self
            .catalog
            .iter()
            .filter(|m| m.enabled && m.supports(&criteria.capabilities))
            .collect();

        let mut candidates = match criteria.max_budget {
            Some(max_budget) => {
                let within: Vec<&ModelConfig> = capable
                    .iter()
                    .copied()
                    .filter(|m| m.cost_per_1k_in <= max_budget)
                    .collect();
                if within.is_empty() && !capable.is_empty() {
                    return Err(DomainError::Selection(format!(
                        "No models available within budget of {} per 1k input tokens",
                        max_budget
                    )));
                }
                within
            }
            None => capable,
        };

        if !criteria.preferred_providers.is_empty() {
            let preferred: Vec<&ModelConfig> = candidates
                .iter()
                .copied()
                .filter(|m| criteria.preferred_providers.contains(&m.provider))
                .collect();
            // Preference narrows but never empties the candidate set
            if !preferred.is_empty() {
                candidates = preferred;
            }
        }

        if candidates.is_empty() {
            return Err(DomainError::Selection(
                "No models available for the requested capabilities".to_string(),
            ));
        }

        let chosen = match criteria.strategy {
            SelectionStrategy::Cheapest => pick_min(&candidates, |m| m.cost_per_1k_total()),
            SelectionStrategy::Fastest => pick_min(&candidates, |m| m.max_tokens as f64),
            SelectionStrategy::RoundRobin => {
                let cursor = self.round_robin.fetch_add(1, Ordering::SeqCst) + 1;
                candidates[cursor as usize % candidates.len()]
            }
        };

        tracing::debug!(
            "Selected {} ({}) via {}",
            chosen.model,
            chosen.provider,
            criteria.strategy
        );

        Ok(SelectedModel {
            provider: chosen.provider.clone(),
            model: chosen.model.clone(),
            estimated_cost_per_1k_tokens: CostPer1k {
                input: chosen.cost_per_1k_in,
                output: chosen.cost_per_1k_out,
            },
        })
    }

    /// Exact-match lookup; disabled entries are returned too
    pub fn get_model_config(&self, provider: &Provider, model: &str) -> Option<ModelConfig> {
        self.catalog
            .iter()
            .find(|m| &m.provider == provider && m.model == model)
            .cloned()
    }

    /// All catalog entries, as a defensive copy
    pub fn get_all_models(&self) -> Vec<ModelConfig> {
        self.catalog.clone()
    }
}

fn pick_min<'a, F>(candidates: &[&'a ModelConfig], key: F) -> &'a ModelConfig
where
    F: Fn(&ModelConfig) -> f64,
{
    let mut best = candidates[0];
    let mut best_key = key(best);
    for candidate in &candidates[1..] {
        let candidate_key = key(candidate);
        if candidate_key < best_key {
            best = candidate;
            best_key = candidate_key;
        }
    }
    best
}
