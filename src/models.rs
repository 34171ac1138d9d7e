//src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Calories per minute for any type without its own rate.
pub const DEFAULT_CALORIES_PER_MINUTE: u32 = 6;

/// Kind of workout. Stored as its display label ("Weight Training", "HIIT", ...).
/// Labels outside the known list are kept verbatim as `Unlisted`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkoutType {
    Running,
    Walking,
    Cycling,
    Swimming,
    WeightTraining,
    Yoga,
    Hiit,
    Pilates,
    Other,
    Unlisted(String),
}

impl WorkoutType {
    /// The selectable types, in display order (excludes `Unlisted`).
    pub fn known() -> impl Iterator<Item = WorkoutType> {
        Self::iter().filter(|t| !matches!(t, WorkoutType::Unlisted(_)))
    }

    /// Case-insensitive lookup among the known labels.
    pub fn find_known(label: &str) -> Option<WorkoutType> {
        let label = label.trim();
        Self::known().find(|t| t.label().eq_ignore_ascii_case(label))
    }

    pub fn label(&self) -> &str {
        match self {
            WorkoutType::Running => "Running",
            WorkoutType::Walking => "Walking",
            WorkoutType::Cycling => "Cycling",
            WorkoutType::Swimming => "Swimming",
            WorkoutType::WeightTraining => "Weight Training",
            WorkoutType::Yoga => "Yoga",
            WorkoutType::Hiit => "HIIT",
            WorkoutType::Pilates => "Pilates",
            WorkoutType::Other => "Other",
            WorkoutType::Unlisted(label) => label,
        }
    }

    pub fn calories_per_minute(&self) -> u32 {
        match self {
            WorkoutType::Running => 10,
            WorkoutType::Walking => 5,
            WorkoutType::Cycling => 8,
            WorkoutType::Swimming => 11,
            WorkoutType::WeightTraining => 7,
            WorkoutType::Yoga => 4,
            WorkoutType::Hiit => 12,
            WorkoutType::Pilates => 5,
            WorkoutType::Other | WorkoutType::Unlisted(_) => DEFAULT_CALORIES_PER_MINUTE,
        }
    }

    /// Calories burned over `duration_minutes`. Integer rates, so no rounding is involved.
    pub fn calories_for(&self, duration_minutes: u32) -> u32 {
        self.calories_per_minute().saturating_mul(duration_minutes)
    }
}

// Exact label match, as stored. Anything else is preserved as Unlisted.
impl From<&str> for WorkoutType {
    fn from(value: &str) -> Self {
        match value {
            "Running" => WorkoutType::Running,
            "Walking" => WorkoutType::Walking,
            "Cycling" => WorkoutType::Cycling,
            "Swimming" => WorkoutType::Swimming,
            "Weight Training" => WorkoutType::WeightTraining,
            "Yoga" => WorkoutType::Yoga,
            "HIIT" => WorkoutType::Hiit,
            "Pilates" => WorkoutType::Pilates,
            "Other" => WorkoutType::Other,
            other => WorkoutType::Unlisted(other.to_string()),
        }
    }
}

impl From<String> for WorkoutType {
    fn from(value: String) -> Self {
        WorkoutType::from(value.as_str())
    }
}

impl From<WorkoutType> for String {
    fn from(value: WorkoutType) -> Self {
        match value {
            WorkoutType::Unlisted(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A persisted workout. Created only by the workout service; never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    pub duration: u32, // Minutes
    pub date: NaiveDate, // Serialized as YYYY-MM-DD
    pub calories: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// User input for a new workout; `id` and `calories` are filled in by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutDraft {
    pub workout_type: WorkoutType,
    pub duration: u32,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl WorkoutDraft {
    pub fn new(workout_type: impl Into<WorkoutType>, duration: u32, date: NaiveDate) -> Self {
        Self {
            workout_type: workout_type.into(),
            duration,
            date,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Aggregates over the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStats {
    pub total_workouts: usize,
    pub total_duration: u64,
    pub total_calories: u64,
    /// Occurrences per type label
    pub workout_type_counts: BTreeMap<String, usize>,
}

impl WorkoutStats {
    pub fn from_workouts(workouts: &[WorkoutRecord]) -> Self {
        let mut stats = Self {
            total_workouts: workouts.len(),
            ..Self::default()
        };
        for workout in workouts {
            stats.total_duration += u64::from(workout.duration);
            stats.total_calories += u64::from(workout.calories);
            *stats
                .workout_type_counts
                .entry(workout.workout_type.label().to_string())
                .or_insert(0) += 1;
        }
        stats
    }
}
