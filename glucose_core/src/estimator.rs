//! Point estimator.
//!
//! Estimates glucose at a single minute of the day by simulating forward from
//! the most recent real reading (the anchor) and blending the remaining model
//! error toward the next real reading, so the estimate passes exactly through
//! every measurement.

use crate::dispatch::compute_event_effect;
use crate::{Event, Profile, MAX_GLUCOSE, MIN_GLUCOSE};

/// A real reading resolved to its minute of day
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Reading {
    pub minute: i32,
    pub value: f64,
}

/// Real readings of the day, sorted by minute (stable for equal minutes)
pub(crate) fn sorted_readings(events: &[Event]) -> Vec<Reading> {
    let mut readings: Vec<Reading> = events
        .iter()
        .filter_map(|e| {
            e.reading_value().map(|value| Reading {
                minute: e.minute(),
                value,
            })
        })
        .collect();
    readings.sort_by_key(|r| r.minute);
    readings
}

/// Sum of effect increments between the anchor minute and `target`
fn incremental_effect(events: &[Event], anchor: i32, target: i32, profile: &Profile) -> f64 {
    events
        .iter()
        .filter(|e| !e.is_reading())
        .map(|e| {
            let at = e.minute();
            compute_event_effect(e, (target - at) as f64, profile)
                - compute_event_effect(e, (anchor - at) as f64, profile)
        })
        .sum()
}

/// Estimate glucose (mg/dL) at `target_minute`.
///
/// Returns `None` when the day has no readings or when `target_minute`
/// precedes the first one; the model never extrapolates backward.
pub fn estimate_at(events: &[Event], target_minute: i32, profile: &Profile) -> Option<f64> {
    let readings = sorted_readings(events);
    estimate_with_readings(events, &readings, target_minute, profile)
}

pub(crate) fn estimate_with_readings(
    events: &[Event],
    readings: &[Reading],
    target_minute: i32,
    profile: &Profile,
) -> Option<f64> {
    let anchor = readings.iter().rev().find(|r| r.minute <= target_minute)?;

    let mut estimated =
        anchor.value + incremental_effect(events, anchor.minute, target_minute, profile);

    // Blend model error toward the next real reading
    if let Some(next) = readings.iter().find(|r| r.minute > target_minute) {
        let predicted_at_next =
            anchor.value + incremental_effect(events, anchor.minute, next.minute, profile);
        let t = (target_minute - anchor.minute) as f64 / (next.minute - anchor.minute) as f64;
        estimated += (next.value - predicted_at_next) * t;
    }

    tracing::trace!(
        target_minute,
        anchor_minute = anchor.minute,
        estimated,
        "Estimated glucose"
    );

    Some(estimated.clamp(MIN_GLUCOSE, MAX_GLUCOSE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InsulinKind, Intensity};

    fn at(clock: &str) -> String {
        format!("2024-01-15T{}:00", clock)
    }

    #[test]
    fn test_empty_events_is_none() {
        assert_eq!(estimate_at(&[], 600, &Profile::default()), None);
    }

    #[test]
    fn test_no_readings_is_none() {
        let events = vec![Event::meal(at("08:00"), 50.0)];
        assert_eq!(estimate_at(&events, 600, &Profile::default()), None);
    }

    #[test]
    fn test_before_first_reading_is_none() {
        let events = vec![Event::glucose(at("08:00"), 110.0)];
        assert_eq!(estimate_at(&events, 479, &Profile::default()), None);
        assert_eq!(estimate_at(&events, 480, &Profile::default()), Some(110.0));
    }

    #[test]
    fn test_pure_linear_interpolation() {
        let events = vec![
            Event::glucose(at("00:00"), 100.0),
            Event::glucose(at("02:00"), 140.0),
        ];
        assert_eq!(estimate_at(&events, 60, &Profile::default()), Some(120.0));
    }

    #[test]
    fn test_anchor_reproduced_exactly() {
        let events = vec![
            Event::meal(at("06:30"), 60.0),
            Event::insulin(at("06:30"), 4.0, InsulinKind::Rapid),
            Event::insulin(at("05:00"), 18.0, InsulinKind::Long),
            Event::glucose(at("07:00"), 143.0),
            Event::exercise(at("09:00"), 45.0, Intensity::High),
            Event::glucose(at("11:10"), 97.0),
            Event::glucose(at("15:45"), 188.0),
        ];
        let profile = Profile::default();

        for (minute, value) in [(420, 143.0), (670, 97.0), (945, 188.0)] {
            assert_eq!(estimate_at(&events, minute, &profile), Some(value));
        }
    }

    #[test]
    fn test_forward_simulation_after_last_reading() {
        // 30 g at 3 mg/dL per gram peaks at +90 one hour after the meal
        let events = vec![
            Event::glucose(at("08:00"), 100.0),
            Event::meal(at("08:00"), 30.0),
        ];
        let estimate = estimate_at(&events, 540, &Profile::default()).unwrap();
        assert!((estimate - 190.0).abs() < 1e-9);
    }

    #[test]
    fn test_effects_before_anchor_not_double_counted() {
        // Meal at 07:00 already peaked when the 08:00 reading was taken
        let events = vec![
            Event::meal(at("07:00"), 30.0),
            Event::glucose(at("08:00"), 190.0),
        ];
        let profile = Profile::default();
        assert_eq!(estimate_at(&events, 480, &profile), Some(190.0));

        // By 10:00 the meal has fully decayed: 190 - 90
        let estimate = estimate_at(&events, 600, &profile).unwrap();
        assert!((estimate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_autocorrection_toward_next_reading() {
        // Model predicts +90 by 09:00 but the next reading says only +40
        let events = vec![
            Event::glucose(at("08:00"), 100.0),
            Event::meal(at("08:00"), 30.0),
            Event::glucose(at("09:00"), 140.0),
        ];
        let profile = Profile::default();
        let raw_half = 100.0 + crate::effects::meal_effect(30.0, 90.0);
        let expected = raw_half + (140.0 - 190.0) * 0.5;
        let estimate = estimate_at(&events, 510, &profile).unwrap();
        assert!((estimate - expected).abs() < 1e-9);
        assert_eq!(estimate_at(&events, 540, &profile), Some(140.0));
    }

    #[test]
    fn test_clamped_to_physiological_range() {
        let profile = Profile::default();
        let low = vec![
            Event::glucose(at("08:00"), 60.0),
            Event::insulin(at("08:00"), 20.0, InsulinKind::Rapid),
        ];
        assert_eq!(estimate_at(&low, 570, &profile), Some(MIN_GLUCOSE));

        let high = vec![
            Event::glucose(at("08:00"), 400.0),
            Event::meal(at("08:00"), 200.0),
        ];
        assert_eq!(estimate_at(&high, 540, &profile), Some(MAX_GLUCOSE));
    }

    #[test]
    fn test_all_estimates_within_bounds() {
        let events = vec![
            Event::glucose(at("06:00"), 250.0),
            Event::insulin(at("06:10"), 12.0, InsulinKind::Rapid),
            Event::meal(at("12:00"), 150.0),
            Event::exercise(at("17:00"), 120.0, Intensity::High),
            Event::glucose(at("20:00"), 35.0),
        ];
        let profile = Profile::default();
        for minute in 360..=1440 {
            let v = estimate_at(&events, minute, &profile).unwrap();
            assert!((MIN_GLUCOSE..=MAX_GLUCOSE).contains(&v), "{} at {}", v, minute);
        }
    }

    #[test]
    fn test_unsorted_input() {
        let events = vec![
            Event::glucose(at("12:00"), 200.0),
            Event::glucose(at("10:00"), 100.0),
        ];
        assert_eq!(estimate_at(&events, 660, &Profile::default()), Some(150.0));
    }
}
