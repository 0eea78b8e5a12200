//! Budget Guard - Spend ceiling enforcement
//!
//! Computes spend-to-date from the usage repository and decides whether
//! a prospective cost may proceed. There is no caching layer: every
//! check re-queries the aggregates.

use std::sync::Arc;

use serde::Serialize;

use maestro::{DomainError, UsagePeriod, UsageRepository};

use crate::config::BudgetConfig;

/// Remaining budget per period; negative once spend exceeds the ceiling
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RemainingBudget {
    pub daily: f64,
    pub monthly: f64,
}

/// Snapshot of spend state at check time
#[derive(Debug, Clone, Serialize)]
pub struct BudgetSnapshot {
    pub daily_used: f64,
    pub monthly_used: f64,
    pub daily_limit: f64,
    pub monthly_limit: f64,
    pub remaining_budget: RemainingBudget,
    pub can_proceed: bool,
}

/// Decides whether a prospective spend is allowed
pub struct BudgetGuard<U: UsageRepository> {
    usage_repo: Arc<U>,
    config: BudgetConfig,
}

impl<U: UsageRepository> BudgetGuard<U> {
    pub fn new(usage_repo: Arc<U>, config: BudgetConfig) -> Self {
        Self { usage_repo, config }
    }

    /// Check whether `estimated_cost` may be spent
    ///
    /// Uses the per-user aggregation when `user_id` is given, the global
    /// aggregation otherwise. Sitting exactly at a limit still passes
    /// with a zero estimate and fails with any positive one.
    pub async fn check_budget(
        &self,
        user_id: Option<&str>,
        estimated_cost: f64,
    ) -> Result<BudgetSnapshot, DomainError> {
        if estimated_cost < 0.0 {
            return Err(DomainError::Validation(format!(
                "Estimated cost must be non-negative, got {}",
                estimated_cost
            )));
        }

        let (daily_used, monthly_used) = match user_id {
            Some(user_id) => (
                self.usage_repo
                    .get_total_cost_by_user(user_id, UsagePeriod::Day)
                    .await?,
                self.usage_repo
                    .get_total_cost_by_user(user_id, UsagePeriod::Month)
                    .await?,
            ),
            None => (
                self.usage_repo.get_total_cost_global(UsagePeriod::Day).await?,
                self.usage_repo.get_total_cost_global(UsagePeriod::Month).await?,
            ),
        };

        let can_proceed = daily_used + estimated_cost <= self.config.daily_limit
            && monthly_used + estimated_cost <= self.config.monthly_limit;

        Ok(BudgetSnapshot {
            daily_used,
            monthly_used,
            daily_limit: self.config.daily_limit,
            monthly_limit: self.config.monthly_limit,
            remaining_budget: RemainingBudget {
                daily: self.config.daily_limit - daily_used,
                monthly: self.config.monthly_limit - monthly_used,
            },
            can_proceed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use maestro::UsageRecord;

    struct FixedUsageRepo {
        user_daily: f64,
        user_monthly: f64,
        global_daily: f64,
        global_monthly: f64,
    }

    #[async_trait]
    impl UsageRepository for FixedUsageRepo {
        async fn get_total_cost_by_user(
            &self,
            _user_id: &str,
            period: UsagePeriod,
        ) -> Result<f64, DomainError> {
            Ok(match period {
                UsagePeriod::Day => self.user_daily,
                UsagePeriod::Month => self.user_monthly,
            })
        }

        async fn get_total_cost_global(&self, period: UsagePeriod) -> Result<f64, DomainError> {
            Ok(match period {
                UsagePeriod::Day => self.global_daily,
                UsagePeriod::Month => self.global_monthly,
            })
        }

        async fn create(&self, _record: &UsageRecord) -> Result<(), DomainError> {
            Ok(())
        }
    }

    struct FailingUsageRepo;

    #[async_trait]
    impl UsageRepository for FailingUsageRepo {
        async fn get_total_cost_by_user(
            &self,
            _user_id: &str,
            _period: UsagePeriod,
        ) -> Result<f64, DomainError> {
            Err(DomainError::Repository("connection reset".to_string()))
        }

        async fn get_total_cost_global(&self, _period: UsagePeriod) -> Result<f64, DomainError> {
            Err(DomainError::Repository("connection reset".to_string()))
        }

        async fn create(&self, _record: &UsageRecord) -> Result<(), DomainError> {
            Ok(())
        }
    }

    fn guard_with(daily_used: f64, monthly_used: f64) -> BudgetGuard<FixedUsageRepo> {
        BudgetGuard::new(
            Arc::new(FixedUsageRepo {
                user_daily: daily_used,
                user_monthly: monthly_used,
                global_daily: 0.0,
                global_monthly: 0.0,
            }),
            BudgetConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_negative_cost_is_rejected() {
        let guard = guard_with(0.0, 0.0);
        let err = guard.check_budget(Some("user-1"), -0.5).await.unwrap_err();
        assert!(err.to_string().contains("cost"));
    }

    #[tokio::test]
    async fn test_near_limit_estimate_is_refused() {
        let guard = guard_with(9.995, 9.995);
        let snapshot = guard.check_budget(Some("user-1"), 0.01).await.unwrap();
        assert!(!snapshot.can_proceed);
    }

    #[tokio::test]
    async fn test_exactly_at_limit_boundary() {
        let guard = guard_with(10.0, 50.0);

        let at_rest = guard.check_budget(Some("user-1"), 0.0).await.unwrap();
        assert!(at_rest.can_proceed);

        let any_spend = guard.check_budget(Some("user-1"), 0.0001).await.unwrap();
        assert!(!any_spend.can_proceed);
    }

    #[tokio::test]
    async fn test_increasing_estimate_never_unblocks() {
        let guard = guard_with(9.0, 9.0);
        let mut proceeded = true;

        for step in 0..20 {
            let estimated_cost = step as f64 * 0.1;
            let snapshot = guard.check_budget(Some("user-1"), estimated_cost).await.unwrap();
            if !proceeded {
                assert!(!snapshot.can_proceed, "estimate {} re-opened the budget", estimated_cost);
            }
            proceeded = snapshot.can_proceed;
        }
        assert!(!proceeded);
    }

    #[tokio::test]
    async fn test_monthly_limit_applies_independently() {
        let guard = guard_with(0.0, 99.999);
        let snapshot = guard.check_budget(Some("user-1"), 0.01).await.unwrap();

        assert!(!snapshot.can_proceed);
        assert!(snapshot.remaining_budget.daily > 0.0);
    }

    #[tokio::test]
    async fn test_global_aggregation_when_no_user() {
        let guard = BudgetGuard::new(
            Arc::new(FixedUsageRepo {
                user_daily: 9.9,
                user_monthly: 99.0,
                global_daily: 0.1,
                global_monthly: 1.0,
            }),
            BudgetConfig::default(),
        );

        let snapshot = guard.check_budget(None, 1.0).await.unwrap();
        assert_eq!(snapshot.daily_used, 0.1);
        assert!(snapshot.can_proceed);
    }

    #[tokio::test]
    async fn test_remaining_budget_may_go_negative() {
        let guard = guard_with(12.5, 30.0);
        let snapshot = guard.check_budget(Some("user-1"), 0.0).await.unwrap();

        assert_eq!(snapshot.remaining_budget.daily, -2.5);
        assert!(!snapshot.can_proceed);
    }

    #[tokio::test]
    async fn test_repository_failure_propagates_verbatim() {
        let guard = BudgetGuard::new(Arc::new(FailingUsageRepo), BudgetConfig::default());
        let err = guard.check_budget(Some("user-1"), 0.0).await.unwrap_err();

        assert!(err.to_string().contains("connection reset"));
    }
}
