//! API state management for the REST server.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::Config;
use crate::intake::IntakeWizard;
use crate::progress::PatientProgressTracker;
use crate::rest::error::ApiError;
use crate::store::{InquirySink, JsonFileStore, MemoryStore, RetryingSink};
use crate::workflow::StepRegistry;

/// In-flight intake forms keyed by session id; each is owned by one client
pub type IntakeSessions = RwLock<HashMap<Uuid, Arc<Mutex<IntakeWizard>>>>;

/// Shared state for the REST API.
///
/// Lock order is registry, then tracker. Handlers that need both take them in
/// that order.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<Mutex<StepRegistry>>,
    pub tracker: Arc<Mutex<PatientProgressTracker>>,
    pub sessions: Arc<IntakeSessions>,
    pub sink: Arc<dyn InquirySink>,
    pub config: Arc<Config>,
}

impl ApiState {
    pub fn new(
        config: Config,
        registry: StepRegistry,
        tracker: PatientProgressTracker,
        sink: Arc<dyn InquirySink>,
    ) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
            tracker: Arc::new(Mutex::new(tracker)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            sink,
            config: Arc::new(config),
        }
    }

    /// State backed by the JSON store under `paths.state`
    pub async fn open(config: Config) -> Result<Self> {
        let state_path = config.state_path();
        tokio::fs::create_dir_all(&state_path)
            .await
            .with_context(|| format!("Failed to create state directory {}", state_path.display()))?;
        let store = Arc::new(JsonFileStore::new(state_path));

        let mut registry = StepRegistry::load(store.clone())
            .await
            .context("Failed to load workflow steps")?;
        if config.workflow.seed_default_steps {
            registry
                .seed_defaults()
                .await
                .context("Failed to seed default workflow")?;
        }
        let tracker = PatientProgressTracker::load(store.clone())
            .await
            .context("Failed to load patient progress")?;
        let sink = Arc::new(RetryingSink::from_config(store, &config.intake));

        Ok(Self::new(config, registry, tracker, sink))
    }

    /// Volatile state for tests and throwaway servers
    pub async fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let mut registry = StepRegistry::new(store.clone());
        if config.workflow.seed_default_steps {
            registry.seed_defaults().await?;
        }
        let tracker = PatientProgressTracker::new(store.clone());
        Ok(Self::new(config, registry, tracker, store))
    }

    /// Start a new intake session
    pub async fn start_session(&self) -> Arc<Mutex<IntakeWizard>> {
        let wizard = IntakeWizard::new();
        let id = wizard.id();
        let wizard = Arc::new(Mutex::new(wizard));
        self.sessions.write().await.insert(id, wizard.clone());
        wizard
    }

    pub async fn session(&self, id: Uuid) -> Result<Arc<Mutex<IntakeWizard>>, ApiError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Intake session '{}' not found", id)))
    }

    /// Drop a finished or abandoned session
    pub async fn end_session(&self, id: Uuid) {
        self.sessions.write().await.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_state_seeds_defaults() {
        let state = ApiState::in_memory(Config::default()).await.unwrap();
        assert_eq!(state.registry.lock().await.len(), 5);
    }

    #[tokio::test]
    async fn test_seeding_can_be_disabled() {
        let mut config = Config::default();
        config.workflow.seed_default_steps = false;
        let state = ApiState::in_memory(config).await.unwrap();
        assert!(state.registry.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_open_persists_seeded_steps() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.state = temp_dir.path().to_string_lossy().to_string();

        let first = ApiState::open(config.clone()).await.unwrap();
        let seeded = first.registry.lock().await.list_all();
        drop(first);

        let reopened = ApiState::open(config).await.unwrap();
        assert_eq!(reopened.registry.lock().await.list_all(), seeded);
        assert!(temp_dir.path().join("steps.json").exists());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let state = ApiState::in_memory(Config::default()).await.unwrap();
        let a = state.start_session().await;
        let b = state.start_session().await;
        let a_id = a.lock().await.id();
        assert_ne!(a_id, b.lock().await.id());

        assert!(state.session(a_id).await.is_ok());
        state.end_session(a_id).await;
        assert!(state.session(a_id).await.is_err());
    }
}
