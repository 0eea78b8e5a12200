//! Token Estimator Port
//!
//! Abstract interface for token counting. Estimation quality is
//! provider-specific and may involve a tokenizer service, so the
//! interface is async and fallible.

use async_trait::async_trait;

use crate::domain::errors::DomainError;

/// Service interface for estimating token counts
#[async_trait]
pub trait TokenEstimator: Send + Sync {
    /// Estimate the token count for a piece of text
    async fn estimate(&self, text: &str) -> Result<u32, DomainError>;
}
