//! Event Dispatcher Port
//!
//! Abstract interface for delivering prompt domain events to downstream
//! handlers (billing, observability, audit).

use async_trait::async_trait;

use crate::domain::errors::DomainError;
use crate::domain::events::PromptEvent;

/// Dispatcher interface for prompt domain events
///
/// Delivery is at-least-once with continue-on-handler-failure semantics:
/// a failing handler must not block or fail sibling handlers.
/// Implementations attempt every handler for every event and surface a
/// single aggregate error afterwards when any handler failed.
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    /// Dispatch all events, in order
    async fn dispatch_all(&self, events: &[PromptEvent]) -> Result<(), DomainError>;
}
