//! Prompt Application Service (Use Cases)
//!
//! Orchestrates ManagedPrompt lifecycle operations: uniqueness checks,
//! persistence, and event dispatch. Dispatch is part of the
//! create/update/rollback transaction, so a dispatch failure fails the
//! operation; the aggregate's pending queue is cleared only after a
//! successful dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use maestro::{
    CreatePrompt, DomainError, Environment, EventDispatcher, ManagedPrompt, PromptRepository,
    UpdatePrompt,
};

/// Outcome of an update, carrying the pre-update version
#[derive(Debug, Clone)]
pub struct PromptUpdateOutcome {
    pub prompt: ManagedPrompt,
    pub previous_version: i32,
}

/// Outcome of a rollback
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RollbackOutcome {
    pub current_version: i32,
    pub rolled_back_from: i32,
}

/// Application service for managed prompts
pub struct PromptService<R: PromptRepository, D: EventDispatcher> {
    repo: Arc<R>,
    dispatcher: Arc<D>,
}

impl<R: PromptRepository, D: EventDispatcher> PromptService<R, D> {
    pub fn new(repo: Arc<R>, dispatcher: Arc<D>) -> Self {
        Self { repo, dispatcher }
    }

    /// Create a new prompt at version 1
    ///
    /// Fails when the key already has an active prompt in the
    /// environment. Keys are unique per environment, never across.
    pub async fn create(&self, input: CreatePrompt) -> Result<ManagedPrompt, DomainError> {
        if let Some(existing) = self.repo.find_by_key(&input.key, input.environment).await? {
            if existing.is_active {
                return Err(DomainError::Conflict(format!(
                    "Prompt with key '{}' already exists in {}",
                    input.key, input.environment
                )));
            }
        }

        let mut prompt = ManagedPrompt::create(input)?;
        let saved = self.repo.save(&prompt).await?;

        self.dispatcher.dispatch_all(prompt.pending_events()).await?;
        prompt.clear_events();

        tracing::info!(
            "Created prompt '{}' ({}) in {}",
            saved.key,
            saved.id,
            saved.environment
        );

        Ok(saved)
    }

    /// Apply a partial update
    ///
    /// The version increments even when the input changes nothing.
    pub async fn update(
        &self,
        id: Uuid,
        changes: UpdatePrompt,
    ) -> Result<PromptUpdateOutcome, DomainError> {
        let mut prompt = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Prompt", id))?;

        let previous_version = prompt.version;
        prompt.update(changes)?;
        let saved = self.repo.save(&prompt).await?;

        self.dispatcher.dispatch_all(prompt.pending_events()).await?;
        prompt.clear_events();

        tracing::info!(
            "Updated prompt '{}' ({}) from version {} to {}",
            saved.key,
            saved.id,
            previous_version,
            saved.version
        );

        Ok(PromptUpdateOutcome {
            prompt: saved,
            previous_version,
        })
    }

    /// Restore a previously stored version as current
    ///
    /// Does not mint a new version number. The repository performs the
    /// snapshot copy via `activate_version`; the aggregate validates the
    /// target and records the event.
    pub async fn rollback(
        &self,
        id: Uuid,
        target_version: i32,
    ) -> Result<RollbackOutcome, DomainError> {
        let mut prompt = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Prompt", id))?;

        prompt.validate_rollback_target(target_version)?;

        let history = self.repo.get_version_history(id).await?;
        let snapshot = history
            .into_iter()
            .find(|v| v.version == target_version)
            .ok_or_else(|| {
                DomainError::not_found_str("PromptVersion", &format!("{} v{}", id, target_version))
            })?;

        self.repo.activate_version(id, target_version).await?;
        let rolled_back_from = prompt.rollback_to(&snapshot)?;

        self.dispatcher.dispatch_all(prompt.pending_events()).await?;
        prompt.clear_events();

        tracing::info!(
            "Rolled back prompt '{}' ({}) from version {} to {}",
            prompt.key,
            id,
            rolled_back_from,
            target_version
        );

        Ok(RollbackOutcome {
            current_version: target_version,
            rolled_back_from,
        })
    }

    /// Render a prompt by id with the supplied variable values
    pub async fn render(
        &self,
        id: Uuid,
        values: &HashMap<String, String>,
    ) -> Result<String, DomainError> {
        let prompt = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Prompt", id))?;

        prompt.render(values)
    }

    /// Render the prompt for a key within an environment
    pub async fn render_by_key(
        &self,
        key: &str,
        environment: Environment,
        values: &HashMap<String, String>,
    ) -> Result<String, DomainError> {
        let prompt = self
            .repo
            .find_by_key(key, environment)
            .await?
            .ok_or_else(|| DomainError::not_found_str("Prompt", key))?;

        prompt.render(values)
    }

    /// Get a prompt by ID
    pub async fn get(&self, id: Uuid) -> Result<Option<ManagedPrompt>, DomainError> {
        self.repo.find_by_id(id).await
    }

    /// Get the prompt for a key within an environment
    pub async fn get_by_key(
        &self,
        key: &str,
        environment: Environment,
    ) -> Result<Option<ManagedPrompt>, DomainError> {
        self.repo.find_by_key(key, environment).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use maestro::{PromptEvent, PromptVersionRecord};

    /// Snapshot-per-version store with copy-semantics activation
    #[derive(Default)]
    struct InMemoryPromptRepo {
        prompts: Mutex<HashMap<Uuid, ManagedPrompt>>,
        versions: Mutex<HashMap<Uuid, Vec<PromptVersionRecord>>>,
    }

    #[async_trait]
    impl PromptRepository for InMemoryPromptRepo {
        async fn find_by_key(
            &self,
            key: &str,
            environment: Environment,
        ) -> Result<Option<ManagedPrompt>, DomainError> {
            Ok(self
                .prompts
                .lock()
                .unwrap()
                .values()
                .find(|p| p.key == key && p.environment == environment)
                .cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<ManagedPrompt>, DomainError> {
            Ok(self.prompts.lock().unwrap().get(&id).cloned())
        }

        async fn save(&self, prompt: &ManagedPrompt) -> Result<ManagedPrompt, DomainError> {
            // Stored rows never carry the pending-event queue
            let mut stored = prompt.clone();
            stored.clear_events();
            self.prompts
                .lock()
                .unwrap()
                .insert(stored.id, stored.clone());
            self.versions
                .lock()
                .unwrap()
                .entry(prompt.id)
                .or_default()
                .push(prompt.current_version_record());
            Ok(stored)
        }

        async fn activate_version(&self, id: Uuid, version: i32) -> Result<(), DomainError> {
            let snapshot = self
                .versions
                .lock()
                .unwrap()
                .get(&id)
                .and_then(|v| v.iter().find(|r| r.version == version).cloned())
                .ok_or_else(|| DomainError::not_found("PromptVersion", id))?;

            let mut prompts = self.prompts.lock().unwrap();
            let prompt = prompts
                .get_mut(&id)
                .ok_or_else(|| DomainError::not_found("Prompt", id))?;
            prompt.name = snapshot.name;
            prompt.description = snapshot.description;
            prompt.template = snapshot.template;
            prompt.variables = snapshot.variables;
            prompt.version = snapshot.version;
            Ok(())
        }

        async fn get_version_history(
            &self,
            id: Uuid,
        ) -> Result<Vec<PromptVersionRecord>, DomainError> {
            Ok(self.versions.lock().unwrap().get(&id).cloned().unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct RecordingDispatcher {
        dispatched: Mutex<Vec<PromptEvent>>,
    }

    #[async_trait]
    impl EventDispatcher for RecordingDispatcher {
        async fn dispatch_all(&self, events: &[PromptEvent]) -> Result<(), DomainError> {
            self.dispatched.lock().unwrap().extend_from_slice(events);
            Ok(())
        }
    }

    struct FailingDispatcher;

    #[async_trait]
    impl EventDispatcher for FailingDispatcher {
        async fn dispatch_all(&self, _events: &[PromptEvent]) -> Result<(), DomainError> {
            Err(DomainError::ExternalService("handler crashed".to_string()))
        }
    }

    fn service() -> (
        PromptService<InMemoryPromptRepo, RecordingDispatcher>,
        Arc<InMemoryPromptRepo>,
        Arc<RecordingDispatcher>,
    ) {
        let repo = Arc::new(InMemoryPromptRepo::default());
        let dispatcher = Arc::new(RecordingDispatcher::default());
        (
            PromptService::new(repo.clone(), dispatcher.clone()),
            repo,
            dispatcher,
        )
    }

    fn greeting(environment: Environment) -> CreatePrompt {
        CreatePrompt {
            key: "greeting".to_string(),
            name: "Greeting".to_string(),
            description: None,
            template: "Hello {{name}}!".to_string(),
            variables: None,
            environment,
        }
    }

    #[tokio::test]
    async fn test_create_dispatches_created_event() -> anyhow::Result<()> {
        let (service, _, dispatcher) = service();

        let prompt = service.create(greeting(Environment::Development)).await?;

        assert_eq!(prompt.version, 1);
        let dispatched = dispatcher.dispatched.lock().unwrap();
        assert_eq!(dispatched.len(), 1);
        assert!(matches!(dispatched[0], PromptEvent::PromptCreated { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_key_in_same_environment_conflicts() -> anyhow::Result<()> {
        let (service, _, _) = service();
        service.create(greeting(Environment::Development)).await?;

        let err = service
            .create(greeting(Environment::Development))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
        Ok(())
    }

    #[tokio::test]
    async fn test_same_key_in_other_environment_is_allowed() -> anyhow::Result<()> {
        let (service, _, _) = service();
        service.create(greeting(Environment::Development)).await?;
        let staged = service.create(greeting(Environment::Staging)).await?;

        assert_eq!(staged.key, "greeting");
        Ok(())
    }

    #[tokio::test]
    async fn test_dispatch_failure_fails_create() {
        let repo = Arc::new(InMemoryPromptRepo::default());
        let service = PromptService::new(repo, Arc::new(FailingDispatcher));

        let err = service
            .create(greeting(Environment::Development))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("handler crashed"));
    }

    #[tokio::test]
    async fn test_three_updates_reach_version_four() -> anyhow::Result<()> {
        let (service, _, _) = service();
        let prompt = service.create(greeting(Environment::Development)).await?;

        for i in 0..3 {
            let outcome = service
                .update(
                    prompt.id,
                    UpdatePrompt {
                        template: Some(format!("Hello {{{{name}}}}, rev {}!", i)),
                        ..Default::default()
                    },
                )
                .await?;
            assert_eq!(outcome.previous_version, i + 1);
        }

        let current = service.get(prompt.id).await?.unwrap();
        assert_eq!(current.version, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_prompt_is_not_found() {
        let (service, _, _) = service();

        let err = service
            .update(Uuid::new_v4(), UpdatePrompt::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_each_operation_dispatches_only_its_own_events() -> anyhow::Result<()> {
        let (service, _, dispatcher) = service();
        let prompt = service.create(greeting(Environment::Development)).await?;
        service.update(prompt.id, UpdatePrompt::default()).await?;
        service.update(prompt.id, UpdatePrompt::default()).await?;

        // One created + two updated, no re-dispatch of earlier events
        let dispatched = dispatcher.dispatched.lock().unwrap();
        assert_eq!(dispatched.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_rollback_restores_and_reports_versions() -> anyhow::Result<()> {
        let (service, _, dispatcher) = service();
        let prompt = service.create(greeting(Environment::Development)).await?;

        for i in 0..3 {
            service
                .update(
                    prompt.id,
                    UpdatePrompt {
                        template: Some(format!("Hello {{{{name}}}}, rev {}!", i)),
                        ..Default::default()
                    },
                )
                .await?;
        }

        let outcome = service.rollback(prompt.id, 2).await?;
        assert_eq!(outcome.current_version, 2);
        assert_eq!(outcome.rolled_back_from, 4);

        let current = service.get(prompt.id).await?.unwrap();
        assert_eq!(current.version, 2);
        assert_eq!(current.template, "Hello {{name}}, rev 0!");

        let last = dispatcher.dispatched.lock().unwrap().last().cloned().unwrap();
        assert!(matches!(
            last,
            PromptEvent::PromptRolledBack {
                rolled_back_from: 4,
                current_version: 2,
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_rollback_to_current_version_fails() -> anyhow::Result<()> {
        let (service, _, _) = service();
        let prompt = service.create(greeting(Environment::Development)).await?;
        service.update(prompt.id, UpdatePrompt::default()).await?;
        service.rollback(prompt.id, 1).await?;

        let err = service.rollback(prompt.id, 1).await.unwrap_err();
        assert!(err.to_string().contains("already"));
        Ok(())
    }

    #[tokio::test]
    async fn test_rollback_to_missing_version_is_not_found() -> anyhow::Result<()> {
        let (service, _, _) = service();
        let prompt = service.create(greeting(Environment::Development)).await?;

        let err = service.rollback(prompt.id, 7).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_render_by_key() -> anyhow::Result<()> {
        let (service, _, _) = service();
        service.create(greeting(Environment::Production)).await?;

        let mut values = HashMap::new();
        values.insert("name".to_string(), "Ada".to_string());

        let rendered = service
            .render_by_key("greeting", Environment::Production, &values)
            .await?;
        assert_eq!(rendered, "Hello Ada!");

        let missing = service
            .render_by_key("greeting", Environment::Staging, &values)
            .await
            .unwrap_err();
        assert!(matches!(missing, DomainError::NotFound { .. }));
        Ok(())
    }
}
