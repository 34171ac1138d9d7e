//src/service.rs
//! Workout CRUD and derived statistics over the record store.
//!
//! Every operation waits out a configurable delay before touching storage, so
//! callers always see an asynchronous, non-instant API.

use crate::config::LatencyConfig;
use crate::models::{WorkoutDraft, WorkoutRecord, WorkoutStats, WorkoutType};
use crate::store::{keys, RecordStore, StoreError};
use chrono::{NaiveDate, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::sleep;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Failed to save workout data")]
    SaveFailed(#[source] StoreError),
    #[error("Failed to delete workout data")]
    DeleteFailed(#[source] StoreError),
    #[error("Failed to clear workout data")]
    ClearFailed(#[source] StoreError),
}

/// Records written on the very first fetch against an empty store.
pub fn sample_workouts() -> Vec<WorkoutRecord> {
    let sample = |id: &str,
                  workout_type: WorkoutType,
                  duration: u32,
                  (y, m, d): (i32, u32, u32),
                  calories: u32,
                  notes: &str| {
        WorkoutRecord {
            id: id.to_string(),
            workout_type,
            duration,
            // Literal dates, always valid
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN),
            calories,
            notes: Some(notes.to_string()),
        }
    };
    vec![
        sample("1", WorkoutType::Running, 30, (2023, 4, 15), 320, "Morning run in the park"),
        sample("2", WorkoutType::WeightTraining, 45, (2023, 4, 14), 250, "Focused on upper body"),
        sample("3", WorkoutType::Yoga, 60, (2023, 4, 13), 180, "Relaxing evening session"),
    ]
}

// Millisecond timestamps, bumped so two calls in the same millisecond still differ.
#[derive(Debug, Default)]
struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    fn next(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            }) {
            Ok(prev) | Err(prev) => prev,
        };
        now.max(previous + 1)
    }
}

pub struct WorkoutService {
    store: RecordStore,
    latency: LatencyConfig,
    write_lock: Option<Mutex<()>>,
    ids: IdGenerator,
}

impl WorkoutService {
    /// `serialize_writes` puts add/remove/clear behind one lock so concurrent
    /// read-modify-write cycles cannot drop each other's changes.
    pub fn new(store: RecordStore, latency: LatencyConfig, serialize_writes: bool) -> Self {
        Self {
            store,
            latency,
            write_lock: serialize_writes.then(|| Mutex::new(())),
            ids: IdGenerator::default(),
        }
    }

    /// Returns the persisted collection in storage order, seeding the sample
    /// workouts when nothing has been stored yet. Never fails.
    pub async fn fetch_all(&self) -> Vec<WorkoutRecord> {
        sleep(self.latency.fetch()).await;
        let workouts = self.current_workouts().await;
        tracing::debug!(count = workouts.len(), "Fetched workouts");
        workouts
    }

    /// Stores a new workout built from `draft`. The draft is trusted as-is;
    /// validation happens before this call.
    /// # Errors
    /// `ServiceError::SaveFailed` if the updated collection cannot be written.
    pub async fn add(&self, draft: WorkoutDraft) -> Result<WorkoutRecord, ServiceError> {
        sleep(self.latency.add()).await;
        let _guard = self.lock_writes().await;

        let mut workouts = self.stored_workouts();
        let record = WorkoutRecord {
            id: self.fresh_id(&workouts),
            calories: draft.workout_type.calories_for(draft.duration),
            workout_type: draft.workout_type,
            duration: draft.duration,
            date: draft.date,
            notes: draft.notes,
        };
        workouts.push(record.clone());

        self.store
            .save_json(keys::WORKOUTS, &workouts)
            .map_err(|e| {
                tracing::error!(error = %e, "Error adding workout to storage");
                ServiceError::SaveFailed(e)
            })?;
        tracing::debug!(id = %record.id, workout_type = %record.workout_type, "Added workout");
        Ok(record)
    }

    /// Removes the workout with `id`. Returns whether anything was removed;
    /// an unknown id is a successful no-op.
    /// # Errors
    /// `ServiceError::DeleteFailed` if the updated collection cannot be written.
    pub async fn remove(&self, id: &str) -> Result<bool, ServiceError> {
        sleep(self.latency.delete()).await;
        let _guard = self.lock_writes().await;

        let mut workouts = self.stored_workouts();
        let before = workouts.len();
        workouts.retain(|w| w.id != id);
        let removed = workouts.len() != before;

        self.store
            .save_json(keys::WORKOUTS, &workouts)
            .map_err(|e| {
                tracing::error!(error = %e, "Error deleting workout from storage");
                ServiceError::DeleteFailed(e)
            })?;
        tracing::debug!(id, removed, "Deleted workout");
        Ok(removed)
    }

    /// Totals over the current collection, recomputed on every call.
    pub async fn stats(&self) -> WorkoutStats {
        sleep(self.latency.stats()).await;
        WorkoutStats::from_workouts(&self.current_workouts().await)
    }

    /// Drops the stored collection; the next fetch seeds the samples again.
    /// # Errors
    /// `ServiceError::ClearFailed` if the key cannot be removed.
    pub async fn clear(&self) -> Result<(), ServiceError> {
        let _guard = self.lock_writes().await;
        self.store
            .remove(keys::WORKOUTS)
            .map_err(ServiceError::ClearFailed)?;
        tracing::info!("Cleared stored workouts");
        Ok(())
    }

    async fn lock_writes(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.write_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }

    fn fresh_id(&self, existing: &[WorkoutRecord]) -> String {
        loop {
            let id = self.ids.next().to_string();
            if !existing.iter().any(|w| w.id == id) {
                return id;
            }
        }
    }

    // Seeding is a write, so it happens under the write lock and only if the
    // key is still absent once the lock is held.
    async fn current_workouts(&self) -> Vec<WorkoutRecord> {
        if let Some(workouts) = self.read_stored() {
            return workouts;
        }
        let _guard = self.lock_writes().await;
        self.stored_workouts()
    }

    // Callers must hold the write lock (when enabled).
    fn stored_workouts(&self) -> Vec<WorkoutRecord> {
        self.read_stored().unwrap_or_else(|| self.seed())
    }

    // Fail-open read. Absent key -> None; unreadable backend or payload -> empty.
    fn read_stored(&self) -> Option<Vec<WorkoutRecord>> {
        let payload = match self.store.read(keys::WORKOUTS) {
            Ok(payload) => payload?,
            Err(e) => {
                tracing::warn!(error = %e, "Error reading workouts from storage");
                return Some(Vec::new());
            }
        };

        Some(serde_json::from_str(&payload).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Stored workouts are unreadable, treating as empty");
            Vec::new()
        }))
    }

    fn seed(&self) -> Vec<WorkoutRecord> {
        let samples = sample_workouts();
        match self.store.save_json(keys::WORKOUTS, &samples) {
            Ok(()) => {
                tracing::info!(count = samples.len(), "Seeded sample workouts");
                samples
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error seeding sample workouts");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generator_is_strictly_increasing() {
        let ids = IdGenerator::default();
        let mut previous = ids.next();
        for _ in 0..1000 {
            let next = ids.next();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_sample_workouts_literals() {
        let samples = sample_workouts();
        let summary: Vec<_> = samples
            .iter()
            .map(|w| {
                (
                    w.id.as_str(),
                    w.workout_type.label(),
                    w.duration,
                    w.date.to_string(),
                    w.calories,
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("1", "Running", 30, "2023-04-15".to_string(), 320),
                ("2", "Weight Training", 45, "2023-04-14".to_string(), 250),
                ("3", "Yoga", 60, "2023-04-13".to_string(), 180),
            ]
        );
    }
}
