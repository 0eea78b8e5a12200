//! Engine Configuration
//!
//! Spend ceilings and the built-in model catalog. Values are plain
//! configuration; loading .env files or merging config sources is the
//! host application's concern.

use serde::{Deserialize, Serialize};

use maestro::{Capability, ModelConfig, Provider};

/// Spend ceilings applied by the budget guard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Daily spend ceiling, USD
    pub daily_limit: f64,
    /// Monthly spend ceiling, USD
    pub monthly_limit: f64,
}

impl BudgetConfig {
    /// Create a budget configuration with explicit ceilings
    pub fn new(daily_limit: f64, monthly_limit: f64) -> Self {
        Self {
            daily_limit,
            monthly_limit,
        }
    }

    /// Set the daily ceiling
    pub fn with_daily_limit(mut self, daily_limit: f64) -> Self {
        self.daily_limit = daily_limit;
        self
    }

    /// Set the monthly ceiling
    pub fn with_monthly_limit(mut self, monthly_limit: f64) -> Self {
        self.monthly_limit = monthly_limit;
        self
    }

    /// Read ceilings from `MAESTRO_DAILY_BUDGET` / `MAESTRO_MONTHLY_BUDGET`
    ///
    /// Absent or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            daily_limit: read_limit("MAESTRO_DAILY_BUDGET").unwrap_or(defaults.daily_limit),
            monthly_limit: read_limit("MAESTRO_MONTHLY_BUDGET").unwrap_or(defaults.monthly_limit),
        }
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            daily_limit: 10.0,
            monthly_limit: 100.0,
        }
    }
}

fn read_limit(var: &str) -> Option<f64> {
    std::env::var(var).ok()?.parse().ok()
}

/// Default model catalog across the three supported providers
///
/// Callers with their own catalog pass it to the router directly; this
/// is the fallback used by wiring code and examples.
pub fn builtin_catalog() -> Vec<ModelConfig> {
    use Capability::*;

    vec![
        ModelConfig::new(Provider::OpenAI, "gpt-4o", 0.0025, 0.01)
            .with_capabilities(vec![Text, Json, Vision, FunctionCalling, Chat])
            .with_max_tokens(16384),
        ModelConfig::new(Provider::OpenAI, "gpt-4o-mini", 0.00015, 0.0006)
            .with_capabilities(vec![Text, Json, Vision, FunctionCalling, Chat])
            .with_max_tokens(16384),
        ModelConfig::new(Provider::Anthropic, "claude-sonnet-4-20250514", 0.003, 0.015)
            .with_capabilities(vec![Text, Json, Vision, FunctionCalling, Chat])
            .with_max_tokens(64000),
        ModelConfig::new(Provider::Anthropic, "claude-3-5-haiku-20241022", 0.0008, 0.004)
            .with_capabilities(vec![Text, Json, Chat])
            .with_max_tokens(8192),
        ModelConfig::new(Provider::Google, "gemini-2.0-flash", 0.0001, 0.0004)
            .with_capabilities(vec![Text, Json, Vision, FunctionCalling, Chat])
            .with_max_tokens(8192),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_config_defaults() {
        let config = BudgetConfig::default();
        assert_eq!(config.daily_limit, 10.0);
        assert_eq!(config.monthly_limit, 100.0);
    }

    #[test]
    fn test_budget_config_builder() {
        let config = BudgetConfig::default()
            .with_daily_limit(2.5)
            .with_monthly_limit(40.0);

        assert_eq!(config.daily_limit, 2.5);
        assert_eq!(config.monthly_limit, 40.0);
    }

    #[test]
    fn test_builtin_catalog_is_enabled_and_priced() {
        let catalog = builtin_catalog();
        assert!(!catalog.is_empty());
        for model in &catalog {
            assert!(model.enabled);
            assert!(model.cost_per_1k_in > 0.0);
            assert!(model.cost_per_1k_out > 0.0);
            assert!(model.max_tokens > 0);
        }
    }
}
