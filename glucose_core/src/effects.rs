//! Physiological effect models.
//!
//! Each model maps minutes elapsed since an event to a signed glucose effect
//! in mg/dL. All models are zero for `dt <= 0`.

use crate::Intensity;

/// Meal: absorption lag before onset
const MEAL_ONSET: f64 = 15.0;
const MEAL_PEAK: f64 = 60.0;
const MEAL_END: f64 = 180.0;

/// Rapid insulin: onset, peak and total duration (5 h)
const RAPID_ONSET: f64 = 15.0;
const RAPID_PEAK: f64 = 90.0;
const RAPID_END: f64 = 300.0;

/// Long insulin stops accumulating after this many hours
const LONG_CAP_HOURS: f64 = 24.0;

/// Post-exercise window and the extra drop reached at its end
const POST_EXERCISE_WINDOW: f64 = 60.0;
const POST_EXERCISE_EXTRA: f64 = 0.2;

/// Cubic ease `3t² − 2t³` with `t` clamped to `[0, 1]`
pub fn smoothstep(x: f64) -> f64 {
    let t = x.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Carb absorption curve.
///
/// Onset at 15 min, peak `total_rise` at 60 min, back to baseline at 180 min.
pub fn meal_effect(dt: f64, total_rise: f64) -> f64 {
    if dt < MEAL_ONSET {
        0.0
    } else if dt < MEAL_PEAK {
        total_rise * smoothstep((dt - MEAL_ONSET) / (MEAL_PEAK - MEAL_ONSET))
    } else if dt < MEAL_END {
        total_rise * (1.0 - smoothstep((dt - MEAL_PEAK) / (MEAL_END - MEAL_PEAK)))
    } else {
        0.0
    }
}

/// Rapid-acting insulin curve (negative).
///
/// Onset at 15 min, peak `-total_drop` at 90 min, back to baseline at 300 min.
pub fn rapid_insulin_effect(dt: f64, total_drop: f64) -> f64 {
    if dt < RAPID_ONSET {
        0.0
    } else if dt < RAPID_PEAK {
        -total_drop * smoothstep((dt - RAPID_ONSET) / (RAPID_PEAK - RAPID_ONSET))
    } else if dt < RAPID_END {
        -total_drop * (1.0 - smoothstep((dt - RAPID_PEAK) / (RAPID_END - RAPID_PEAK)))
    } else {
        0.0
    }
}

/// Long-acting insulin: linear accumulation, capped at 24 hours
pub fn long_insulin_effect(dt: f64, units: f64, sensitivity_per_hour: f64) -> f64 {
    if dt <= 0.0 {
        return 0.0;
    }
    let hours = (dt / 60.0).min(LONG_CAP_HOURS);
    -(units * sensitivity_per_hour * hours)
}

/// Exercise effect (negative).
///
/// Linear drop while active, then up to 20% extra over the following hour,
/// then held at `1.2 × peak` for the rest of the model horizon.
pub fn exercise_effect(dt: f64, duration_minutes: f64, intensity: Intensity) -> f64 {
    if dt <= 0.0 {
        return 0.0;
    }

    let rate = intensity.drop_rate();
    if dt < duration_minutes {
        return -(rate * dt);
    }

    let peak_drop = rate * duration_minutes;
    let post_dt = dt - duration_minutes;
    if post_dt < POST_EXERCISE_WINDOW {
        -(peak_drop + peak_drop * POST_EXERCISE_EXTRA * smoothstep(post_dt / POST_EXERCISE_WINDOW))
    } else {
        -(peak_drop * (1.0 + POST_EXERCISE_EXTRA))
    }
}
