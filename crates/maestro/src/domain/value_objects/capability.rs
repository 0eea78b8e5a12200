//! Capability - What a model can do
//!
//! Selection requires a candidate's capability set to be a superset of
//! the requested set.

use serde::{Deserialize, Serialize};

/// Model capability tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Text,
    Json,
    Vision,
    FunctionCalling,
    Chat,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Text => write!(f, "text"),
            Capability::Json => write!(f, "json"),
            Capability::Vision => write!(f, "vision"),
            Capability::FunctionCalling => write!(f, "function-calling"),
            Capability::Chat => write!(f, "chat"),
        }
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Capability::Text),
            "json" => Ok(Capability::Json),
            "vision" => Ok(Capability::Vision),
            "function-calling" => Ok(Capability::FunctionCalling),
            "chat" => Ok(Capability::Chat),
            _ => Err(format!("Unknown capability: {}", s)),
        }
    }
}
