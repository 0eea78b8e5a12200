//! Service Ports
//!
//! Abstract interfaces for external services.

mod event_dispatcher;
mod llm_provider;
mod token_estimator;

pub use event_dispatcher::*;
pub use llm_provider::*;
pub use token_estimator::*;
