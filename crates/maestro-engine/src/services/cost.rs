//! Cost Estimator - Token-count based cost projection
//!
//! Projects what a piece of text would cost: exact for one named model,
//! a min/max range across the enabled catalog otherwise. Token counts
//! come from the external estimation port.

use std::sync::Arc;

use serde::Serialize;

use maestro::{DomainError, ModelConfig, TokenEstimator};

/// Cost range in USD
#[derive(Debug, Clone, Serialize)]
pub struct CostRange {
    pub min: f64,
    pub max: f64,
    pub currency: String,
}

/// Result of a cost estimation
#[derive(Debug, Clone, Serialize)]
pub struct CostEstimate {
    pub estimated_tokens: u32,
    pub estimated_cost: CostRange,
}

/// Projects costs across the catalog
pub struct CostEstimator<T: TokenEstimator> {
    token_estimator: Arc<T>,
    catalog: Vec<ModelConfig>,
}

impl<T: TokenEstimator> CostEstimator<T> {
    pub fn new(token_estimator: Arc<T>, catalog: Vec<ModelConfig>) -> Self {
        Self {
            token_estimator,
            catalog,
        }
    }

    /// Estimate the cost of processing `text`
    ///
    /// With a model name the estimate is exact (`min == max`); without
    /// one it spans every enabled catalog entry.
    pub async fn estimate_cost(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> Result<CostEstimate, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::Validation("Text must not be empty".to_string()));
        }

        let tokens = self.token_estimator.estimate(text).await?;

        let (min, max) = match model {
            Some(model) => {
                let config = self
                    .catalog
                    .iter()
                    .find(|m| m.model == model)
                    .ok_or_else(|| DomainError::not_found_str("ModelConfig", model))?;
                let cost = cost_for(tokens, config);
                (cost, cost)
            }
            None => {
                let costs: Vec<f64> = self
                    .catalog
                    .iter()
                    .filter(|m| m.enabled)
                    .map(|m| cost_for(tokens, m))
                    .collect();
                if costs.is_empty() {
                    return Err(DomainError::Selection("No models available".to_string()));
                }
                (
                    costs.iter().copied().fold(f64::INFINITY, f64::min),
                    costs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                )
            }
        };

        Ok(CostEstimate {
            estimated_tokens: tokens,
            estimated_cost: CostRange {
                min,
                max,
                currency: "USD".to_string(),
            },
        })
    }
}

fn cost_for(tokens: u32, config: &ModelConfig) -> f64 {
    let per_1k = tokens as f64 / 1000.0;
    per_1k * config.cost_per_1k_in + per_1k * config.cost_per_1k_out
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use maestro::{Capability, Provider};

    /// Four characters per token, the usual rough heuristic
    struct CharRatioEstimator;

    #[async_trait]
    impl TokenEstimator for CharRatioEstimator {
        async fn estimate(&self, text: &str) -> Result<u32, DomainError> {
            Ok((text.len() as u32).div_ceil(4))
        }
    }

    struct FailingEstimator;

    #[async_trait]
    impl TokenEstimator for FailingEstimator {
        async fn estimate(&self, _text: &str) -> Result<u32, DomainError> {
            Err(DomainError::ExternalService("tokenizer offline".to_string()))
        }
    }

    fn catalog() -> Vec<ModelConfig> {
        vec![
            ModelConfig::new(Provider::OpenAI, "small", 0.001, 0.002),
            ModelConfig::new(Provider::Anthropic, "large", 0.01, 0.03),
            ModelConfig::new(Provider::Google, "off", 0.0001, 0.0001)
                .with_capabilities(vec![Capability::Text])
                .disabled(),
        ]
    }

    #[tokio::test]
    async fn test_named_model_estimate_is_exact() {
        let estimator = CostEstimator::new(Arc::new(CharRatioEstimator), catalog());
        // 4000 characters -> 1000 tokens
        let text = "x".repeat(4000);

        let estimate = estimator.estimate_cost(&text, Some("small")).await.unwrap();

        assert_eq!(estimate.estimated_tokens, 1000);
        assert_eq!(estimate.estimated_cost.min, estimate.estimated_cost.max);
        assert!((estimate.estimated_cost.min - 0.003).abs() < 1e-12);
        assert_eq!(estimate.estimated_cost.currency, "USD");
    }

    #[tokio::test]
    async fn test_range_spans_enabled_catalog_only() {
        let estimator = CostEstimator::new(Arc::new(CharRatioEstimator), catalog());
        let text = "x".repeat(4000);

        let estimate = estimator.estimate_cost(&text, None).await.unwrap();

        // "off" is disabled, so the minimum comes from "small"
        assert!((estimate.estimated_cost.min - 0.003).abs() < 1e-12);
        assert!((estimate.estimated_cost.max - 0.04).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_unknown_model_fails_not_found() {
        let estimator = CostEstimator::new(Arc::new(CharRatioEstimator), catalog());

        let err = estimator.estimate_cost("hi", Some("nonexistent")).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let estimator = CostEstimator::new(Arc::new(CharRatioEstimator), catalog());

        let err = estimator.estimate_cost("   ", None).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_enabled_catalog_fails() {
        let catalog = vec![ModelConfig::new(Provider::OpenAI, "off", 0.001, 0.002).disabled()];
        let estimator = CostEstimator::new(Arc::new(CharRatioEstimator), catalog);

        let err = estimator.estimate_cost("hi", None).await.unwrap_err();
        assert!(err.to_string().contains("No models available"));
    }

    #[tokio::test]
    async fn test_estimator_failure_propagates() {
        let estimator = CostEstimator::new(Arc::new(FailingEstimator), catalog());

        let err = estimator.estimate_cost("hi", None).await.unwrap_err();
        assert!(err.to_string().contains("tokenizer offline"));
    }
}
