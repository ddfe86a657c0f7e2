//! Day curve generation.
//!
//! Samples the point estimator over a regular grid starting at the first real
//! reading, merged with the exact minute of every reading.

use crate::estimator::{estimate_with_readings, sorted_readings};
use crate::{Event, Point, Profile, MINUTES_PER_DAY};
use std::collections::BTreeSet;

/// Default sampling interval in minutes
pub const DEFAULT_INTERVAL_MINUTES: u32 = 15;

/// Build the full-day curve for `events`.
///
/// Real readings are emitted verbatim; every other sample is the rounded
/// estimate. Returns an empty curve when the day has no readings. An
/// interval of 0 is treated as 1.
pub fn generate_day_curve(events: &[Event], profile: &Profile, interval_minutes: u32) -> Vec<Point> {
    let readings = sorted_readings(events);
    let Some(first) = readings.first() else {
        tracing::debug!("No glucose readings, day curve is empty");
        return Vec::new();
    };

    let step = interval_minutes.max(1) as usize;
    let mut minutes: BTreeSet<i32> = (first.minute..=MINUTES_PER_DAY).step_by(step).collect();
    minutes.extend(readings.iter().map(|r| r.minute));

    let points: Vec<Point> = minutes
        .into_iter()
        .filter_map(|minute| {
            if let Some(real) = readings.iter().find(|r| r.minute == minute) {
                return Some(Point {
                    minute,
                    value: real.value,
                    is_real: true,
                    real_value: Some(real.value),
                });
            }

            estimate_with_readings(events, &readings, minute, profile).map(|value| Point {
                minute,
                value: value.round(),
                is_real: false,
                real_value: None,
            })
        })
        .collect();

    tracing::debug!(
        "Generated day curve with {} points ({} readings, {} min interval)",
        points.len(),
        readings.len(),
        step
    );

    points
}
