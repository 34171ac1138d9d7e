// src/lib.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// --- Declare modules ---
mod config;
pub mod db;
pub mod models;
pub mod profile;
pub mod service;
pub mod state;
pub mod store;
pub mod theme;
pub mod trends;
pub mod validation;

// --- Expose public types ---
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, AppearanceConfig, Config, ConfigError, LatencyConfig,
    StandardColor, StorageBackend,
};
pub use db::{get_db_path as get_db_path_util, DbError};
pub use models::{WorkoutDraft, WorkoutRecord, WorkoutStats, WorkoutType};
pub use profile::{FitnessGoal, ProfileContainer, ProfileUpdate, UserProfile};
pub use service::{ServiceError, WorkoutService};
pub use state::{WorkoutContainer, WorkoutEvent, WorkoutState};
pub use store::{KeyValueBackend, MemoryBackend, RecordStore, SqliteBackend, StoreError};
pub use theme::ThemeContainer;
pub use trends::{chart_series, history_by_date, Timeframe, TrendPoint};
pub use validation::{FormField, ValidationErrors, WorkoutForm};

/// Composition root: owns the configuration and the storage handle, and wires
/// every container to that one handle.
pub struct AppService {
    pub config: Config,
    pub config_path: PathBuf,
    pub db_path: Option<PathBuf>, // None for the in-memory backend
    pub store: RecordStore,
    pub workouts: Arc<WorkoutService>,
    pub workout_state: Arc<WorkoutContainer>,
    pub profile: ProfileContainer,
    pub theme: ThemeContainer,
}

impl AppService {
    /// Opens the backend selected by `config.storage`.
    /// # Errors
    /// Returns `anyhow::Error` if the SQLite database cannot be located or opened.
    pub fn from_config(config: Config, config_path: PathBuf) -> Result<Self> {
        let (backend, db_path): (Arc<dyn KeyValueBackend>, Option<PathBuf>) = match config.storage
        {
            StorageBackend::Memory => (Arc::new(MemoryBackend::new()), None),
            StorageBackend::Sqlite => {
                let db_path = match &config.database_path {
                    Some(path) => path.clone(),
                    None => db::get_db_path().context("Failed to determine database path")?,
                };
                let backend = SqliteBackend::open(&db_path)
                    .with_context(|| format!("Failed to open database at {db_path:?}"))?;
                (Arc::new(backend), Some(db_path))
            }
        };
        tracing::debug!(storage = ?config.storage, db_path = ?db_path, "Storage backend ready");
        Ok(Self::with_backend(config, config_path, backend, db_path))
    }

    /// Builds the service graph on top of an already-open backend.
    pub fn with_backend(
        config: Config,
        config_path: PathBuf,
        backend: Arc<dyn KeyValueBackend>,
        db_path: Option<PathBuf>,
    ) -> Self {
        let store = RecordStore::new(backend);
        let workouts = Arc::new(WorkoutService::new(
            store.clone(),
            config.latency,
            config.serialize_writes,
        ));
        let workout_state = Arc::new(WorkoutContainer::new(Arc::clone(&workouts)));
        let profile = ProfileContainer::new(store.clone());
        let theme = ThemeContainer::new(store.clone(), config.appearance.system_prefers_dark);

        Self {
            config,
            config_path,
            db_path,
            store,
            workouts,
            workout_state,
            profile,
            theme,
        }
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Configured table header color for the current theme.
    /// # Errors
    /// Returns `ConfigError::InvalidColor` if the configured name is unknown.
    pub fn header_color(&self) -> Result<StandardColor, ConfigError> {
        let appearance = &self.config.appearance;
        if self.theme.dark_mode() {
            parse_color(&appearance.dark_header_color)
        } else {
            parse_color(&appearance.header_color)
        }
    }
}
