//! Event effect dispatcher.
//!
//! Maps a logged event onto the matching effect model, converting its raw
//! fields into model magnitudes with the active [`Profile`].

use crate::effects::{exercise_effect, long_insulin_effect, meal_effect, rapid_insulin_effect};
use crate::{Event, InsulinKind, Profile};

/// Signed glucose effect (mg/dL) of `event`, `dt` minutes after it happened.
///
/// Missing numeric fields count as zero. Readings and unknown entries have no
/// effect of their own.
pub fn compute_event_effect(event: &Event, dt: f64, profile: &Profile) -> f64 {
    match event {
        Event::Meal { carbs_grams, .. } => {
            meal_effect(dt, carbs_grams.unwrap_or(0.0) * profile.carb_ratio)
        }
        Event::Insulin {
            units,
            insulin_type: InsulinKind::Rapid,
            ..
        } => rapid_insulin_effect(dt, units.unwrap_or(0.0) * profile.rapid_sensitivity),
        Event::Insulin {
            units,
            insulin_type: InsulinKind::Long,
            ..
        } => long_insulin_effect(dt, units.unwrap_or(0.0), profile.long_sensitivity_per_hour),
        Event::Exercise {
            duration_minutes,
            intensity,
            ..
        } => exercise_effect(dt, duration_minutes.unwrap_or(0.0), *intensity),
        Event::Glucose { .. } | Event::Unknown => 0.0,
    }
}
