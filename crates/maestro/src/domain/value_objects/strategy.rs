//! SelectionStrategy - Selection policy over the filtered candidate set

use serde::{Deserialize, Serialize};

/// Model selection strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStrategy {
    /// Lowest combined input + output cost per 1k tokens
    #[default]
    Cheapest,
    /// Smallest max-token window, as a latency proxy
    Fastest,
    /// Rotate through candidates via a shared cursor
    RoundRobin,
}

impl std::fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionStrategy::Cheapest => write!(f, "cheapest"),
            SelectionStrategy::Fastest => write!(f, "fastest"),
            SelectionStrategy::RoundRobin => write!(f, "round-robin"),
        }
    }
}

impl std::str::FromStr for SelectionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cheapest" => Ok(SelectionStrategy::Cheapest),
            "fastest" => Ok(SelectionStrategy::Fastest),
            "round-robin" => Ok(SelectionStrategy::RoundRobin),
            _ => Err(format!("Unknown selection strategy: {}", s)),
        }
    }
}
