//! ModelConfig - Catalog entry for an available model
//!
//! Pure domain entity without infrastructure dependencies.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Capability, Provider};

/// A single entry in the model catalog
///
/// Catalog entries are owned by configuration and immutable per
/// snapshot; consumers receive clones, never shared references.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub provider: Provider,
    pub model: String,
    /// Cost per 1k input tokens, USD
    pub cost_per_1k_in: f64,
    /// Cost per 1k output tokens, USD
    pub cost_per_1k_out: f64,
    pub capabilities: Vec<Capability>,
    pub max_tokens: u32,
    pub enabled: bool,
}

impl ModelConfig {
    /// Create an enabled catalog entry with text/chat capabilities
    pub fn new(
        provider: Provider,
        model: impl Into<String>,
        cost_per_1k_in: f64,
        cost_per_1k_out: f64,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            cost_per_1k_in,
            cost_per_1k_out,
            capabilities: vec![Capability::Text, Capability::Chat],
            max_tokens: 4096,
            enabled: true,
        }
    }

    /// Set the capability set
    pub fn with_capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the maximum output token window
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Mark the entry as disabled
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Check whether this model covers every requested capability
    ///
    /// An empty request matches any model.
    pub fn supports(&self, requested: &[Capability]) -> bool {
        requested.iter().all(|c| self.capabilities.contains(c))
    }

    /// Combined input + output cost per 1k tokens
    pub fn cost_per_1k_total(&self) -> f64 {
        self.cost_per_1k_in + self.cost_per_1k_out
    }
}
