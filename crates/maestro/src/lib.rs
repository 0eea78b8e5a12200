//! Maestro Domain Library
//!
//! Core domain types and interfaces for the Maestro LLM orchestration
//! core: model catalog entries, versioned prompt templates, usage
//! records, and the ports the engine consumes.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture
//! principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (ModelConfig, ManagedPrompt, UsageRecord)
//!   - `value_objects/`: Immutable value types (Provider, Capability, Environment, ...)
//!   - `events`: Prompt lifecycle events and the pending-event queue
//!   - `errors`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Data access interfaces
//!   - `services/`: External service interfaces (LLM provider, token
//!     estimation, event dispatch)
//!
//! # Usage
//!
//! ```rust,ignore
//! use maestro::domain::{ManagedPrompt, ModelConfig};
//! use maestro::ports::{LlmProvider, PromptRepository};
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Capability, CreatePrompt, DomainError, Environment, ManagedPrompt, ModelConfig, PromptEvent,
    PromptVariable, PromptVersionRecord, Provider, SelectionStrategy, UpdatePrompt, UsagePeriod,
    UsageRecord, VariableType,
};
pub use ports::{
    // Service ports
    ChatMessage,
    CompletionOptions,
    CompletionResponse,
    EventDispatcher,
    LlmProvider,
    MessageRole,
    // Repositories
    PromptRepository,
    TokenEstimator,
    TokenUsage,
    UsageRepository,
};
