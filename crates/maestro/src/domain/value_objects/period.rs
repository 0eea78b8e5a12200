//! UsagePeriod - Aggregation window for spend queries

use serde::{Deserialize, Serialize};

/// Aggregation period for usage totals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UsagePeriod {
    Day,
    Month,
}

impl std::fmt::Display for UsagePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UsagePeriod::Day => write!(f, "day"),
            UsagePeriod::Month => write!(f, "month"),
        }
    }
}

impl std::str::FromStr for UsagePeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(UsagePeriod::Day),
            "month" => Ok(UsagePeriod::Month),
            _ => Err(format!("Unknown usage period: {}", s)),
        }
    }
}
