//src/trends.rs
//! Chart-ready series and date-grouped history built from a workout slice.

use crate::models::WorkoutRecord;
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    #[default]
    Week, // Last 7 days, one bucket per day ("Mon")
    Month, // Last 30 days, one bucket per day ("Jan 15")
    Year,  // Last 12 months, one bucket per month ("Jan")
}

impl Timeframe {
    /// First date included in the window ending at `today`.
    pub fn window_start(self, today: NaiveDate) -> NaiveDate {
        match self {
            Timeframe::Week => today - Duration::days(6),
            Timeframe::Month => today - Duration::days(29),
            Timeframe::Year => today
                .checked_sub_months(Months::new(12))
                .map_or(today, |d| d + Duration::days(1)),
        }
    }

    // Bucket start date and its display label.
    fn bucket(self, date: NaiveDate) -> (NaiveDate, String) {
        match self {
            Timeframe::Week => (date, date.format("%a").to_string()),
            Timeframe::Month => (date, date.format("%b %-d").to_string()),
            Timeframe::Year => {
                let month_start = date.with_day(1).unwrap_or(date);
                (month_start, date.format("%b").to_string())
            }
        }
    }
}

/// One chart bar/point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub start: NaiveDate, // First day of the bucket
    pub duration: u64,
    pub calories: u64,
    pub count: usize,
}

/// Sums duration, calories and count per bucket for workouts dated from the
/// window start onwards, ordered chronologically. Empty buckets are omitted.
pub fn chart_series(
    workouts: &[WorkoutRecord],
    timeframe: Timeframe,
    today: NaiveDate,
) -> Vec<TrendPoint> {
    let start = timeframe.window_start(today);
    let mut buckets: BTreeMap<NaiveDate, TrendPoint> = BTreeMap::new();

    for workout in workouts.iter().filter(|w| w.date >= start) {
        let (bucket_start, label) = timeframe.bucket(workout.date);
        let point = buckets.entry(bucket_start).or_insert_with(|| TrendPoint {
            label,
            start: bucket_start,
            duration: 0,
            calories: 0,
            count: 0,
        });
        point.duration += u64::from(workout.duration);
        point.calories += u64::from(workout.calories);
        point.count += 1;
    }

    buckets.into_values().collect()
}

/// Workouts grouped by date, newest date first; each group keeps storage order.
pub fn history_by_date(workouts: &[WorkoutRecord]) -> Vec<(NaiveDate, Vec<WorkoutRecord>)> {
    let mut groups: BTreeMap<NaiveDate, Vec<WorkoutRecord>> = BTreeMap::new();
    for workout in workouts {
        groups.entry(workout.date).or_default().push(workout.clone());
    }
    groups.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkoutType;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn workout(id: &str, day: &str, duration: u32) -> WorkoutRecord {
        WorkoutRecord {
            id: id.to_string(),
            workout_type: WorkoutType::Running,
            duration,
            date: date(day),
            calories: duration * 10,
            notes: None,
        }
    }

    #[test]
    fn test_week_window_and_labels() {
        let today = date("2024-05-15"); // Wednesday
        let workouts = vec![
            workout("1", "2024-05-15", 30),
            workout("2", "2024-05-15", 15),
            workout("3", "2024-05-09", 20), // Exactly 6 days back, included
            workout("4", "2024-05-08", 40), // 7 days back, excluded
        ];
        let series = chart_series(&workouts, Timeframe::Week, today);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "Thu");
        assert_eq!(series[0].duration, 20);
        assert_eq!(series[1].label, "Wed");
        assert_eq!(series[1].duration, 45);
        assert_eq!(series[1].calories, 450);
        assert_eq!(series[1].count, 2);
    }

    #[test]
    fn test_month_labels() {
        let today = date("2024-05-15");
        let workouts = vec![workout("1", "2024-04-16", 10), workout("2", "2024-04-15", 10)];
        let series = chart_series(&workouts, Timeframe::Month, today);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label, "Apr 16");
    }

    #[test]
    fn test_year_groups_by_month() {
        let today = date("2024-05-15");
        let workouts = vec![
            workout("1", "2024-05-01", 10),
            workout("2", "2024-05-14", 20),
            workout("3", "2023-06-02", 30),
            workout("4", "2023-05-15", 40), // A year ago to the day, excluded
        ];
        let series = chart_series(&workouts, Timeframe::Year, today);
        let summary: Vec<_> = series
            .iter()
            .map(|p| (p.label.as_str(), p.start, p.duration))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Jun", date("2023-06-01"), 30),
                ("May", date("2024-05-01"), 30),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(chart_series(&[], Timeframe::Month, date("2024-01-01")).is_empty());
        assert!(history_by_date(&[]).is_empty());
    }

    #[test]
    fn test_history_newest_first() {
        let workouts = vec![
            workout("a", "2024-01-01", 10),
            workout("b", "2024-01-03", 10),
            workout("c", "2024-01-01", 10),
        ];
        let history = history_by_date(&workouts);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].0, date("2024-01-03"));
        let ids: Vec<_> = history[1].1.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
