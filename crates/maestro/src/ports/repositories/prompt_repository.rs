//! Prompt Repository Port
//!
//! Abstract interface for ManagedPrompt persistence operations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{errors::DomainError, Environment, ManagedPrompt, PromptVersionRecord};

/// Repository interface for ManagedPrompt aggregates
///
/// Version snapshots at rest are the adapter's concern: implementations
/// keep one snapshot per (prompt id, version) and `activate_version`
/// copies a stored snapshot into the current row (copy semantics, not a
/// pointer flip).
#[async_trait]
pub trait PromptRepository: Send + Sync {
    /// Find the prompt for a key within an environment
    async fn find_by_key(
        &self,
        key: &str,
        environment: Environment,
    ) -> Result<Option<ManagedPrompt>, DomainError>;

    /// Find a prompt by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ManagedPrompt>, DomainError>;

    /// Save a prompt (insert or update), storing a snapshot of its
    /// current version
    async fn save(&self, prompt: &ManagedPrompt) -> Result<ManagedPrompt, DomainError>;

    /// Make a previously stored version the current one
    async fn activate_version(&self, id: Uuid, version: i32) -> Result<(), DomainError>;

    /// Fetch all stored version snapshots for a prompt
    async fn get_version_history(&self, id: Uuid)
        -> Result<Vec<PromptVersionRecord>, DomainError>;
}
