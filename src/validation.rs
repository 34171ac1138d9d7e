//src/validation.rs
//! Field-level checks for the add-workout form.
//!
//! The workout service trusts its drafts, so anything user-typed goes through
//! [`WorkoutForm::validate`] first.

use crate::models::{WorkoutDraft, WorkoutType};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Type,
    Duration,
    Date,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormField::Type => write!(f, "type"),
            FormField::Duration => write!(f, "duration"),
            FormField::Date => write!(f, "date"),
        }
    }
}

/// One message per failing field.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", render(.0))]
pub struct ValidationErrors(BTreeMap<FormField, String>);

fn render(errors: &BTreeMap<FormField, String>) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, field: FormField, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkoutForm {
    pub workout_type: String,
    pub duration: String,
    pub date: String, // YYYY-MM-DD
    pub notes: String,
}

impl WorkoutForm {
    /// Checks every field and builds a draft, or returns all field errors at once.
    /// Known type names are matched case-insensitively; other names are kept as typed.
    /// # Errors
    /// `ValidationErrors` with one entry per invalid field.
    pub fn validate(&self) -> Result<WorkoutDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let type_input = self.workout_type.trim();
        let workout_type = if type_input.is_empty() {
            errors.insert(FormField::Type, "Please select a workout type");
            None
        } else {
            Some(
                WorkoutType::find_known(type_input)
                    .unwrap_or_else(|| WorkoutType::from(type_input)),
            )
        };

        let duration_input = self.duration.trim();
        let duration = if duration_input.is_empty() {
            errors.insert(FormField::Duration, "Duration is required");
            None
        } else {
            match duration_input.parse::<u32>() {
                Ok(minutes) if minutes > 0 => Some(minutes),
                _ => {
                    errors.insert(FormField::Duration, "Duration must be a positive number");
                    None
                }
            }
        };

        let date_input = self.date.trim();
        let date = if date_input.is_empty() {
            errors.insert(FormField::Date, "Date is required");
            None
        } else {
            match NaiveDate::parse_from_str(date_input, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.insert(FormField::Date, "Date must be in YYYY-MM-DD format");
                    None
                }
            }
        };

        match (workout_type, duration, date) {
            (Some(workout_type), Some(duration), Some(date)) => {
                let notes = self.notes.trim();
                Ok(WorkoutDraft {
                    workout_type,
                    duration,
                    date,
                    notes: (!notes.is_empty()).then(|| notes.to_string()),
                })
            }
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(workout_type: &str, duration: &str, date: &str) -> WorkoutForm {
        WorkoutForm {
            workout_type: workout_type.to_string(),
            duration: duration.to_string(),
            date: date.to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_valid_form_builds_draft() {
        let mut input = form("weight training", "45", "2024-03-02");
        input.notes = "  legs day ".to_string();
        let draft = input.validate().unwrap();
        assert_eq!(draft.workout_type, WorkoutType::WeightTraining);
        assert_eq!(draft.duration, 45);
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(draft.notes.as_deref(), Some("legs day"));
    }

    #[test]
    fn test_blank_notes_become_none() {
        let draft = form("Yoga", "20", "2024-03-02").validate().unwrap();
        assert_eq!(draft.notes, None);
    }

    #[test]
    fn test_custom_type_is_kept() {
        let draft = form("Zumba", "20", "2024-01-01").validate().unwrap();
        assert_eq!(draft.workout_type, WorkoutType::Unlisted("Zumba".to_string()));
    }

    #[test]
    fn test_all_missing_fields_are_reported() {
        let errors = form(" ", "", "").validate().unwrap_err();
        assert!(!errors.is_empty());
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(FormField::Type), Some("Please select a workout type"));
        assert_eq!(errors.get(FormField::Duration), Some("Duration is required"));
        assert_eq!(errors.get(FormField::Date), Some("Date is required"));
    }

    #[test]
    fn test_bad_duration_and_date() {
        for bad in ["0", "-5", "abc", "12.5"] {
            let errors = form("Running", bad, "2024-01-01").validate().unwrap_err();
            assert_eq!(
                errors.get(FormField::Duration),
                Some("Duration must be a positive number"),
                "duration input {bad:?}"
            );
        }

        let errors = form("Running", "30", "01/02/2024").validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(FormField::Date),
            Some("Date must be in YYYY-MM-DD format")
        );
        assert_eq!(
            errors.to_string(),
            "date: Date must be in YYYY-MM-DD format"
        );
    }
}
