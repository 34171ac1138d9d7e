//src/state.rs
//! In-memory mirror of the stored workouts for the presentation layer.
//!
//! The snapshot only changes through [`WorkoutEvent`]s applied by
//! [`WorkoutState::apply`]; subscribers get every new snapshot through a
//! `tokio::sync::watch` channel.

use crate::models::{WorkoutDraft, WorkoutRecord};
use crate::service::{ServiceError, WorkoutService};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkoutState {
    pub workouts: Vec<WorkoutRecord>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkoutEvent {
    FetchStart,
    FetchSuccess(Vec<WorkoutRecord>),
    FetchError(String),
    AddSuccess(WorkoutRecord),
    DeleteSuccess(String), // Workout id
}

impl WorkoutState {
    /// Pure transition from the current snapshot to the next one.
    #[must_use]
    pub fn apply(mut self, event: WorkoutEvent) -> Self {
        match event {
            WorkoutEvent::FetchStart => {
                self.is_loading = true;
                self.error = None;
            }
            WorkoutEvent::FetchSuccess(workouts) => {
                self.workouts = workouts;
                self.is_loading = false;
            }
            WorkoutEvent::FetchError(message) => {
                self.error = Some(message);
                self.is_loading = false;
            }
            WorkoutEvent::AddSuccess(record) => self.workouts.push(record),
            WorkoutEvent::DeleteSuccess(id) => self.workouts.retain(|w| w.id != id),
        }
        self
    }
}

pub struct WorkoutContainer {
    service: Arc<WorkoutService>,
    state: watch::Sender<WorkoutState>,
}

impl WorkoutContainer {
    pub fn new(service: Arc<WorkoutService>) -> Self {
        let (state, _) = watch::channel(WorkoutState::default());
        Self { service, state }
    }

    /// Current snapshot (cloned).
    pub fn snapshot(&self) -> WorkoutState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkoutState> {
        self.state.subscribe()
    }

    pub fn service(&self) -> &Arc<WorkoutService> {
        &self.service
    }

    /// Applies `event` to the snapshot and notifies subscribers.
    pub fn dispatch(&self, event: WorkoutEvent) {
        self.state.send_modify(|state| {
            let current = std::mem::take(state);
            *state = current.apply(event);
        });
    }

    /// Initial (or repeated) load of the whole collection.
    pub async fn load(&self) {
        self.dispatch(WorkoutEvent::FetchStart);
        // Reads are fail-open in the service, so there is no error to surface here
        let workouts = self.service.fetch_all().await;
        self.dispatch(WorkoutEvent::FetchSuccess(workouts));
    }

    /// Adds a workout. On failure the message lands in the snapshot's `error`
    /// and the error is also returned to the caller.
    /// # Errors
    /// Whatever `WorkoutService::add` returns.
    pub async fn add_workout(&self, draft: WorkoutDraft) -> Result<WorkoutRecord, ServiceError> {
        match self.service.add(draft).await {
            Ok(record) => {
                self.dispatch(WorkoutEvent::AddSuccess(record.clone()));
                Ok(record)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error adding workout");
                self.dispatch(WorkoutEvent::FetchError(e.to_string()));
                Err(e)
            }
        }
    }

    /// Deletes a workout, reporting failures like [`Self::add_workout`].
    /// Returns whether a stored record was actually removed.
    /// # Errors
    /// Whatever `WorkoutService::remove` returns.
    pub async fn delete_workout(&self, id: &str) -> Result<bool, ServiceError> {
        match self.service.remove(id).await {
            Ok(removed) => {
                self.dispatch(WorkoutEvent::DeleteSuccess(id.to_string()));
                Ok(removed)
            }
            Err(e) => {
                tracing::error!(error = %e, id, "Error deleting workout");
                self.dispatch(WorkoutEvent::FetchError(e.to_string()));
                Err(e)
            }
        }
    }
}
