//! Prompt Domain Events
//!
//! Events recorded by the ManagedPrompt aggregate during lifecycle
//! transitions. They accumulate on the aggregate's pending queue and are
//! drained by the event dispatcher after persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Environment;

/// Domain event emitted by a prompt lifecycle transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptEvent {
    /// A prompt was created (true creation, never rehydration from storage)
    PromptCreated {
        prompt_id: Uuid,
        key: String,
        environment: Environment,
        version: i32,
        occurred_at: DateTime<Utc>,
    },
    /// A prompt's content or metadata changed
    PromptUpdated {
        prompt_id: Uuid,
        previous_version: i32,
        new_version: i32,
        occurred_at: DateTime<Utc>,
    },
    /// A prompt was restored to a previously stored version
    PromptRolledBack {
        prompt_id: Uuid,
        rolled_back_from: i32,
        current_version: i32,
        occurred_at: DateTime<Utc>,
    },
}

impl PromptEvent {
    /// The prompt this event belongs to
    pub fn prompt_id(&self) -> Uuid {
        match self {
            PromptEvent::PromptCreated { prompt_id, .. } => *prompt_id,
            PromptEvent::PromptUpdated { prompt_id, .. } => *prompt_id,
            PromptEvent::PromptRolledBack { prompt_id, .. } => *prompt_id,
        }
    }
}

impl std::fmt::Display for PromptEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptEvent::PromptCreated { .. } => write!(f, "prompt_created"),
            PromptEvent::PromptUpdated { .. } => write!(f, "prompt_updated"),
            PromptEvent::PromptRolledBack { .. } => write!(f, "prompt_rolled_back"),
        }
    }
}
