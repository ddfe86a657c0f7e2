//! Daily and period summaries.
//!
//! Thin reducers over the day curve and the raw events of each day.

use crate::curve::{generate_day_curve, DEFAULT_INTERVAL_MINUTES};
use crate::{Event, InsulinKind, Profile};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Aggregates for a single day
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    /// Mean of the real readings
    pub avg_glucose: Option<f64>,
    pub time_in_range: Option<f64>,
    pub time_below_range: Option<f64>,
    pub time_above_range: Option<f64>,
    pub rapid_units: f64,
    pub long_units: f64,
    pub total_carbs: f64,
    pub exercise_minutes: f64,
    pub glucose_count: usize,
    pub has_curve: bool,
}

/// Aggregates over a run of days
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PeriodSummary {
    pub days: Vec<DaySummary>,
    pub avg_glucose: Option<f64>,
    pub time_in_range: Option<f64>,
    pub time_below_range: Option<f64>,
    pub time_above_range: Option<f64>,
    pub avg_readings_per_day: Option<f64>,
    pub avg_rapid_per_day: Option<f64>,
    pub avg_long_per_day: Option<f64>,
    pub avg_carbs_per_day: Option<f64>,
    pub total_exercise_minutes: f64,
    pub days_with_data: usize,
}

/// Summarize one day of events against the profile's target range
pub fn summarize_day(date: NaiveDate, events: &[Event], profile: &Profile) -> DaySummary {
    let readings: Vec<f64> = events.iter().filter_map(Event::reading_value).collect();
    let avg_glucose = mean(&readings);

    let curve = generate_day_curve(events, profile, DEFAULT_INTERVAL_MINUTES);
    let (mut below, mut within, mut above) = (0usize, 0usize, 0usize);
    for point in &curve {
        if point.value < profile.target_min {
            below += 1;
        } else if point.value > profile.target_max {
            above += 1;
        } else {
            within += 1;
        }
    }
    let fraction = |count: usize| (!curve.is_empty()).then(|| count as f64 / curve.len() as f64);

    let mut rapid_units = 0.0;
    let mut long_units = 0.0;
    let mut total_carbs = 0.0;
    let mut exercise_minutes = 0.0;
    for event in events {
        match event {
            Event::Insulin {
                units,
                insulin_type,
                ..
            } => match insulin_type {
                InsulinKind::Rapid => rapid_units += units.unwrap_or(0.0),
                InsulinKind::Long => long_units += units.unwrap_or(0.0),
            },
            Event::Meal { carbs_grams, .. } => total_carbs += carbs_grams.unwrap_or(0.0),
            Event::Exercise {
                duration_minutes, ..
            } => exercise_minutes += duration_minutes.unwrap_or(0.0),
            Event::Glucose { .. } | Event::Unknown => {}
        }
    }

    DaySummary {
        date,
        avg_glucose,
        time_in_range: fraction(within),
        time_below_range: fraction(below),
        time_above_range: fraction(above),
        rapid_units,
        long_units,
        total_carbs,
        exercise_minutes,
        glucose_count: readings.len(),
        has_curve: !curve.is_empty(),
    }
}

/// Summarize a run of days, each given as its date and its events
pub fn summarize_period(days: &[(NaiveDate, Vec<Event>)], profile: &Profile) -> PeriodSummary {
    let summaries: Vec<DaySummary> = days
        .iter()
        .map(|(date, events)| summarize_day(*date, events, profile))
        .collect();

    let with_glucose: Vec<&DaySummary> =
        summaries.iter().filter(|d| d.glucose_count > 0).collect();
    let with_curve: Vec<&DaySummary> = summaries.iter().filter(|d| d.has_curve).collect();
    let day_count = summaries.len();

    let all: Vec<&DaySummary> = summaries.iter().collect();

    let avg_readings_per_day = (!with_glucose.is_empty()).then(|| {
        with_glucose.iter().map(|d| d.glucose_count).sum::<usize>() as f64 / day_count as f64
    });
    let avg_carbs_per_day = (day_count > 0)
        .then(|| summaries.iter().map(|d| d.total_carbs).sum::<f64>() / day_count as f64);

    tracing::debug!(
        "Summarized {} days ({} with readings)",
        day_count,
        with_glucose.len()
    );

    PeriodSummary {
        avg_glucose: avg_of(&with_glucose, |d| d.avg_glucose),
        time_in_range: avg_of(&with_curve, |d| d.time_in_range),
        time_below_range: avg_of(&with_curve, |d| d.time_below_range),
        time_above_range: avg_of(&with_curve, |d| d.time_above_range),
        avg_readings_per_day,
        avg_rapid_per_day: avg_of(&all, |d| Some(d.rapid_units)),
        avg_long_per_day: avg_of(&all, |d| Some(d.long_units)),
        avg_carbs_per_day,
        total_exercise_minutes: summaries.iter().map(|d| d.exercise_minutes).sum(),
        days_with_data: with_glucose.len(),
        days: summaries,
    }
}

/// Dates `[end - days + 1, ..., end]`, oldest first
pub fn date_range(end: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days as i64)
        .rev()
        .map(|offset| end - Duration::days(offset))
        .collect()
}

fn avg_of(set: &[&DaySummary], key: impl Fn(&DaySummary) -> Option<f64>) -> Option<f64> {
    mean(&set.iter().filter_map(|d| key(*d)).collect::<Vec<_>>())
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Intensity;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn at(clock: &str) -> String {
        format!("2024-01-15T{}:00", clock)
    }

    #[test]
    fn test_summary_of_empty_day() {
        let summary = summarize_day(date(15), &[], &Profile::default());
        assert_eq!(summary.avg_glucose, None);
        assert_eq!(summary.time_in_range, None);
        assert_eq!(summary.glucose_count, 0);
        assert!(!summary.has_curve);
        assert_eq!(summary.total_carbs, 0.0);
    }

    #[test]
    fn test_flat_day_fully_in_range() {
        let events = vec![Event::glucose(at("07:00"), 104.0)];
        let summary = summarize_day(date(15), &events, &Profile::default());
        assert_eq!(summary.avg_glucose, Some(104.0));
        assert_eq!(summary.time_in_range, Some(1.0));
        assert_eq!(summary.time_below_range, Some(0.0));
        assert_eq!(summary.time_above_range, Some(0.0));
    }

    #[test]
    fn test_range_boundaries_count_as_in_range() {
        let profile = Profile {
            target_min: 104.0,
            target_max: 104.0,
            ..Profile::default()
        };
        let events = vec![Event::glucose(at("07:00"), 104.0)];
        let summary = summarize_day(date(15), &events, &profile);
        assert_eq!(summary.time_in_range, Some(1.0));
    }

    #[test]
    fn test_fractions_split() {
        let events = vec![
            Event::glucose(at("23:00"), 60.0),
            Event::glucose(at("23:30"), 200.0),
        ];
        let summary = summarize_day(date(15), &events, &Profile::default());
        // points: 23:00=60, 23:15=130, 23:30=200, 23:45=200, 24:00=200
        assert_eq!(summary.time_below_range, Some(0.2));
        assert_eq!(summary.time_in_range, Some(0.2));
        assert_eq!(summary.time_above_range, Some(0.6));
    }

    #[test]
    fn test_daily_totals() {
        let events = vec![
            Event::insulin(at("07:00"), 4.0, InsulinKind::Rapid),
            Event::insulin(at("12:00"), 6.0, InsulinKind::Rapid),
            Event::insulin(at("22:00"), 18.0, InsulinKind::Long),
            Event::meal(at("07:00"), 40.0),
            Event::Meal {
                timestamp: at("12:00"),
                carbs_grams: None,
            },
            Event::exercise(at("18:00"), 45.0, Intensity::Low),
        ];
        let summary = summarize_day(date(15), &events, &Profile::default());
        assert_eq!(summary.rapid_units, 10.0);
        assert_eq!(summary.long_units, 18.0);
        assert_eq!(summary.total_carbs, 40.0);
        assert_eq!(summary.exercise_minutes, 45.0);
        assert!(!summary.has_curve);
    }

    #[test]
    fn test_period_summary() {
        let days = vec![
            (
                date(1),
                vec![
                    Event::glucose(at("08:00"), 100.0),
                    Event::glucose(at("20:00"), 120.0),
                    Event::meal(at("12:00"), 60.0),
                ],
            ),
            (date(2), vec![]),
            (
                date(3),
                vec![
                    Event::glucose(at("09:00"), 140.0),
                    Event::insulin(at("09:00"), 3.0, InsulinKind::Rapid),
                    Event::exercise(at("18:00"), 30.0, Intensity::High),
                ],
            ),
        ];
        let period = summarize_period(&days, &Profile::default());

        assert_eq!(period.days.len(), 3);
        assert_eq!(period.days_with_data, 2);
        // daily means 110 and 140
        assert_eq!(period.avg_glucose, Some(125.0));
        assert_eq!(period.avg_readings_per_day, Some(1.0));
        assert_eq!(period.avg_rapid_per_day, Some(1.0));
        assert_eq!(period.avg_carbs_per_day, Some(20.0));
        assert_eq!(period.total_exercise_minutes, 30.0);
        assert!(period.time_in_range.is_some());
    }

    #[test]
    fn test_period_without_data() {
        let period = summarize_period(&[(date(1), vec![])], &Profile::default());
        assert_eq!(period.avg_glucose, None);
        assert_eq!(period.time_in_range, None);
        assert_eq!(period.avg_readings_per_day, None);
        assert_eq!(period.avg_carbs_per_day, Some(0.0));
        assert_eq!(period.days_with_data, 0);
    }

    #[test]
    fn test_date_range_oldest_first() {
        let range = date_range(date(3), 3);
        assert_eq!(range, vec![date(1), date(2), date(3)]);
        assert!(date_range(date(3), 0).is_empty());
    }
}
