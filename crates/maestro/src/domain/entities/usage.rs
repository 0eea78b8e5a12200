//! UsageRecord - Record of LLM spend
//!
//! Pure domain entity without infrastructure dependencies. The core
//! creates these after a successful completion and queries aggregated
//! totals through the usage repository; storage is an adapter concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Provider;

/// UsageRecord - one billed LLM invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub id: Uuid,
    pub provider: Provider,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
    /// Cost in USD
    pub cost: f64,
    pub user_id: Option<String>,
    pub conversation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl UsageRecord {
    /// Create a new usage record
    pub fn new(
        provider: Provider,
        model: impl Into<String>,
        input_tokens: u32,
        output_tokens: u32,
        cost: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider,
            model: model.into(),
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            cost,
            user_id: None,
            conversation_id: None,
            created_at: Utc::now(),
        }
    }

    /// Attribute the record to a user
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Link the record to a conversation
    pub fn with_conversation(mut self, conversation_id: Uuid) -> Self {
        self.conversation_id = Some(conversation_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_tokens_derived() {
        let record = UsageRecord::new(Provider::Anthropic, "claude-3-5-haiku-20241022", 120, 80, 0.0012);
        assert_eq!(record.total_tokens, 200);
        assert!(record.user_id.is_none());
    }

    #[test]
    fn test_user_attribution() {
        let record = UsageRecord::new(Provider::OpenAI, "gpt-4o-mini", 10, 5, 0.00001)
            .for_user("user-42");
        assert_eq!(record.user_id.as_deref(), Some("user-42"));
    }
}
