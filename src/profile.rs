//src/profile.rs
use crate::store::{keys, RecordStore};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown fitness goal: '{0}'")]
pub struct UnknownGoal(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
pub enum FitnessGoal {
    #[serde(rename = "Lose weight")]
    LoseWeight,
    #[serde(rename = "Build muscle")]
    BuildMuscle,
    #[serde(rename = "Improve endurance")]
    ImproveEndurance,
    #[serde(rename = "Maintain fitness")]
    MaintainFitness,
    #[serde(rename = "Increase flexibility")]
    IncreaseFlexibility,
    #[serde(rename = "Train for event")]
    TrainForEvent,
}

impl FitnessGoal {
    pub const fn label(self) -> &'static str {
        match self {
            FitnessGoal::LoseWeight => "Lose weight",
            FitnessGoal::BuildMuscle => "Build muscle",
            FitnessGoal::ImproveEndurance => "Improve endurance",
            FitnessGoal::MaintainFitness => "Maintain fitness",
            FitnessGoal::IncreaseFlexibility => "Increase flexibility",
            FitnessGoal::TrainForEvent => "Train for event",
        }
    }
}

impl fmt::Display for FitnessGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Accepts the label ("Build muscle") or the kebab form ("build-muscle"), any case.
impl FromStr for FitnessGoal {
    type Err = UnknownGoal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', " ");
        Self::iter()
            .find(|goal| goal.label().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownGoal(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub height: f64, // cm
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub weight: f64, // kg
    pub goal: FitnessGoal,
}

// Form-edited profiles may carry "180" instead of 180.
fn number_or_numeric_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got '{text}'"))),
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            height: 175.0,
            weight: 70.0,
            goal: FitnessGoal::BuildMuscle,
        }
    }
}

/// Fields to overwrite; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub goal: Option<FitnessGoal>,
}

impl ProfileUpdate {
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.height.is_none()
            && self.weight.is_none()
            && self.goal.is_none()
    }
}

impl UserProfile {
    /// Supplied fields win over existing ones.
    #[must_use]
    pub fn merged(mut self, update: ProfileUpdate) -> Self {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(height) = update.height {
            self.height = height;
        }
        if let Some(weight) = update.weight {
            self.weight = weight;
        }
        if let Some(goal) = update.goal {
            self.goal = goal;
        }
        self
    }
}

/// Holds the singleton profile and writes it back on every change.
pub struct ProfileContainer {
    store: RecordStore,
    profile: watch::Sender<UserProfile>,
}

impl ProfileContainer {
    /// Reads the stored profile once, falling back to the default one.
    pub fn new(store: RecordStore) -> Self {
        let initial = store
            .load_json::<UserProfile>(keys::USER_PROFILE)
            .unwrap_or_default();
        let (profile, _) = watch::channel(initial);
        let container = Self { store, profile };
        container.persist();
        container
    }

    pub fn profile(&self) -> UserProfile {
        self.profile.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UserProfile> {
        self.profile.subscribe()
    }

    /// Merges `update` into the profile, persists it and returns the result.
    pub fn update_profile(&self, update: ProfileUpdate) -> UserProfile {
        self.profile.send_modify(|profile| {
            let current = std::mem::take(profile);
            *profile = current.merged(update);
        });
        self.persist();
        self.profile()
    }

    // Persist failures are logged only; the in-memory profile stays authoritative.
    fn persist(&self) {
        let profile = self.profile();
        if let Err(e) = self.store.save_json(keys::USER_PROFILE, &profile) {
            tracing::error!(error = %e, "Error saving user profile");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_parsing() {
        assert_eq!("Build muscle".parse::<FitnessGoal>(), Ok(FitnessGoal::BuildMuscle));
        assert_eq!("train-for-event".parse::<FitnessGoal>(), Ok(FitnessGoal::TrainForEvent));
        assert_eq!(" LOSE WEIGHT ".parse::<FitnessGoal>(), Ok(FitnessGoal::LoseWeight));
        assert_eq!(
            "fly".parse::<FitnessGoal>(),
            Err(UnknownGoal("fly".to_string()))
        );
    }

    #[test]
    fn test_profile_json_uses_goal_labels() {
        let json = serde_json::to_value(UserProfile::default()).unwrap();
        assert_eq!(json["goal"], "Build muscle");
        assert_eq!(json["height"], 175.0);
        assert_eq!(json["name"], "John Doe");
    }

    #[test]
    fn test_profile_accepts_numeric_strings() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"name":"Ana","email":"ana@example.com","height":"168","weight":" 61.5","goal":"Lose weight"}"#,
        )
        .unwrap();
        assert_eq!(profile.height, 168.0);
        assert_eq!(profile.weight, 61.5);

        let bad = serde_json::from_str::<UserProfile>(
            r#"{"name":"Ana","email":"a@b.c","height":"tall","weight":60,"goal":"Lose weight"}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_merge_keeps_unspecified_fields() {
        let merged = UserProfile::default().merged(ProfileUpdate {
            weight: Some(68.5),
            goal: Some(FitnessGoal::ImproveEndurance),
            ..ProfileUpdate::default()
        });
        assert_eq!(merged.name, "John Doe");
        assert_eq!(merged.height, 175.0);
        assert_eq!(merged.weight, 68.5);
        assert_eq!(merged.goal, FitnessGoal::ImproveEndurance);
        assert!(ProfileUpdate::default().is_empty());
    }
}
