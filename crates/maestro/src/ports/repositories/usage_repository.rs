//! Usage Repository Port
//!
//! Abstract interface for spend aggregation and usage persistence.
//! The core never stores usage rows itself; it records them through this
//! port and reads back aggregated totals for budget checks.

use async_trait::async_trait;

use crate::domain::{errors::DomainError, UsagePeriod, UsageRecord};

/// Repository interface for usage records
#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Total recorded cost for one user over the period, USD
    async fn get_total_cost_by_user(
        &self,
        user_id: &str,
        period: UsagePeriod,
    ) -> Result<f64, DomainError>;

    /// Total recorded cost across all users over the period, USD
    async fn get_total_cost_global(&self, period: UsagePeriod) -> Result<f64, DomainError>;

    /// Persist a usage record
    async fn create(&self, record: &UsageRecord) -> Result<(), DomainError>;
}
