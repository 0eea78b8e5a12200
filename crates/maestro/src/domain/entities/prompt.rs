//! ManagedPrompt - Versioned prompt template aggregate
//!
//! Pure domain entity without infrastructure dependencies. The aggregate
//! owns validation, the version state machine, variable substitution, and
//! a pending-event queue; storing historical version snapshots is the
//! repository's responsibility.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::events::PromptEvent;
use crate::domain::value_objects::{Environment, VariableType};

/// A typed placeholder in a prompt template
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    pub required: bool,
    /// Rendering fallback; only meaningful when `required` is false
    pub default_value: Option<String>,
}

impl PromptVariable {
    /// Create a required variable of the given type
    pub fn required(name: impl Into<String>, var_type: VariableType) -> Self {
        Self {
            name: name.into(),
            var_type,
            required: true,
            default_value: None,
        }
    }

    /// Create an optional variable with a rendering default
    pub fn optional(
        name: impl Into<String>,
        var_type: VariableType,
        default_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            var_type,
            required: false,
            default_value: Some(default_value.into()),
        }
    }
}

/// Immutable snapshot of one stored prompt version
///
/// At-rest storage of snapshots is the persistence adapter's concern;
/// the aggregate only tracks the current version number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptVersionRecord {
    pub prompt_id: Uuid,
    pub version: i32,
    pub name: String,
    pub description: Option<String>,
    pub template: String,
    pub variables: Vec<PromptVariable>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new managed prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrompt {
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub template: String,
    /// When omitted, variables are extracted from `{{name}}` tokens in
    /// the template and synthesized as required string variables
    pub variables: Option<Vec<PromptVariable>>,
    pub environment: Environment,
}

/// Partial input for updating a managed prompt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePrompt {
    pub name: Option<String>,
    pub description: Option<String>,
    pub template: Option<String>,
    pub variables: Option<Vec<PromptVariable>>,
}

/// ManagedPrompt - a versioned, environment-scoped prompt template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedPrompt {
    pub id: Uuid,
    /// Slug-like key, unique within its environment
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub template: String,
    pub variables: Vec<PromptVariable>,
    pub version: i32,
    pub environment: Environment,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Events recorded since the last successful dispatch.
    /// Skipped by serde so rehydration from storage never re-emits them.
    #[serde(skip)]
    pending_events: Vec<PromptEvent>,
}

impl ManagedPrompt {
    /// Create a new prompt at version 1
    ///
    /// Records a `PromptCreated` event; reconstruction from storage goes
    /// through `Deserialize` and records nothing.
    pub fn create(input: CreatePrompt) -> Result<Self, DomainError> {
        if !is_valid_key(&input.key) {
            return Err(DomainError::Validation(format!(
                "Invalid key '{}': expected a lowercase, hyphen-delimited slug",
                input.key
            )));
        }
        if input.name.trim().is_empty() {
            return Err(DomainError::Validation("Name must not be empty".to_string()));
        }
        if input.template.trim().is_empty() {
            return Err(DomainError::Validation("Template must not be empty".to_string()));
        }

        let variables = match input.variables {
            Some(variables) => variables,
            None => extract_placeholders(&input.template)
                .into_iter()
                .map(|name| PromptVariable::required(name, VariableType::String))
                .collect(),
        };

        let mut prompt = Self {
            id: Uuid::new_v4(),
            key: input.key,
            name: input.name,
            description: input.description,
            template: input.template,
            variables,
            version: 1,
            environment: input.environment,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
            pending_events: Vec::new(),
        };

        prompt.pending_events.push(PromptEvent::PromptCreated {
            prompt_id: prompt.id,
            key: prompt.key.clone(),
            environment: prompt.environment,
            version: prompt.version,
            occurred_at: Utc::now(),
        });

        Ok(prompt)
    }

    /// Apply a partial update
    ///
    /// The version increments on every call, even when no field actually
    /// changes. When the template changes without an explicit variable
    /// list, definitions for newly introduced placeholders are
    /// synthesized; existing definitions are kept.
    pub fn update(&mut self, changes: UpdatePrompt) -> Result<(), DomainError> {
        if let Some(name) = &changes.name {
            if name.trim().is_empty() {
                return Err(DomainError::Validation("Name must not be empty".to_string()));
            }
        }
        if let Some(template) = &changes.template {
            if template.trim().is_empty() {
                return Err(DomainError::Validation("Template must not be empty".to_string()));
            }
        }

        let previous_version = self.version;

        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        let template_changed = changes.template.is_some();
        if let Some(template) = changes.template {
            self.template = template;
        }
        match changes.variables {
            Some(variables) => self.variables = variables,
            None if template_changed => {
                for name in extract_placeholders(&self.template) {
                    if !self.variables.iter().any(|v| v.name == name) {
                        self.variables
                            .push(PromptVariable::required(name, VariableType::String));
                    }
                }
            }
            None => {}
        }

        self.version += 1;
        self.updated_at = Some(Utc::now());

        self.pending_events.push(PromptEvent::PromptUpdated {
            prompt_id: self.id,
            previous_version,
            new_version: self.version,
            occurred_at: Utc::now(),
        });

        Ok(())
    }

    /// Check that a rollback target is acceptable for this prompt
    pub fn validate_rollback_target(&self, target_version: i32) -> Result<(), DomainError> {
        if target_version <= 0 {
            return Err(DomainError::Validation(format!(
                "Rollback target must be positive, got {}",
                target_version
            )));
        }
        if target_version == self.version {
            return Err(DomainError::Validation(format!(
                "Prompt is already at version {}",
                target_version
            )));
        }
        Ok(())
    }

    /// Restore a previously stored version as current
    ///
    /// Does not mint a new version number: the snapshot's version becomes
    /// current. Copying the snapshot into the stored current row is the
    /// repository's job; the aggregate validates, applies the content in
    /// memory, and records the event. Returns the version that was
    /// current before the call.
    pub fn rollback_to(&mut self, snapshot: &PromptVersionRecord) -> Result<i32, DomainError> {
        self.validate_rollback_target(snapshot.version)?;

        let rolled_back_from = self.version;
        self.name = snapshot.name.clone();
        self.description = snapshot.description.clone();
        self.template = snapshot.template.clone();
        self.variables = snapshot.variables.clone();
        self.version = snapshot.version;
        self.updated_at = Some(Utc::now());

        self.pending_events.push(PromptEvent::PromptRolledBack {
            prompt_id: self.id,
            rolled_back_from,
            current_version: snapshot.version,
            occurred_at: Utc::now(),
        });

        Ok(rolled_back_from)
    }

    /// Render the template with the supplied variable values
    ///
    /// For each `{{name}}` placeholder: the supplied value wins, then the
    /// variable's default when it is optional, otherwise the render fails
    /// naming the missing variable. Literal substitution only.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, DomainError> {
        let mut rendered = self.template.clone();

        for name in extract_placeholders(&self.template) {
            let value = match values.get(&name) {
                Some(value) => value.clone(),
                None => self
                    .variables
                    .iter()
                    .find(|v| v.name == name && !v.required)
                    .and_then(|v| v.default_value.clone())
                    .ok_or_else(|| {
                        DomainError::Validation(format!("Missing required variable: {}", name))
                    })?,
            };
            rendered = rendered.replace(&format!("{{{{{}}}}}", name), &value);
        }

        Ok(rendered)
    }

    /// Snapshot of the current version, as the repository would store it
    pub fn current_version_record(&self) -> PromptVersionRecord {
        PromptVersionRecord {
            prompt_id: self.id,
            version: self.version,
            name: self.name.clone(),
            description: self.description.clone(),
            template: self.template.clone(),
            variables: self.variables.clone(),
            created_at: self.updated_at.unwrap_or(self.created_at),
        }
    }

    /// Events recorded since the last successful dispatch
    pub fn pending_events(&self) -> &[PromptEvent] {
        &self.pending_events
    }

    /// Clear the pending queue after a successful dispatch
    pub fn clear_events(&mut self) {
        self.pending_events.clear();
    }
}

/// A key is a slug: lowercase alphanumeric segments joined by single hyphens
fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('-')
        && !key.ends_with('-')
        && !key.contains("--")
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Extract `{{name}}` placeholder names, in order of first appearance
fn extract_placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = &after[..end];
                if !name.is_empty() && !name.contains('{') && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
                rest = &after[end + 2..];
            }
            None => break,
        }
    }

    names
}
