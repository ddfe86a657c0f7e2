//! Core domain types for the glucose estimation engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Logged events (readings, meals, insulin doses, exercise)
//! - The physiological configuration profile
//! - Points of an estimated day curve

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Lower bound for any glucose value produced by the engine (mg/dL)
pub const MIN_GLUCOSE: f64 = 20.0;

/// Upper bound for any glucose value produced by the engine (mg/dL)
pub const MAX_GLUCOSE: f64 = 600.0;

/// Minutes in one simulated day
pub const MINUTES_PER_DAY: i32 = 1440;

// ============================================================================
// Event Types
// ============================================================================

/// Kind of insulin in a dose
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum InsulinKind {
    Rapid,
    /// Anything not recognised as rapid-acting is treated as long-acting
    #[default]
    Long,
}

impl From<String> for InsulinKind {
    fn from(label: String) -> Self {
        match label.trim().to_lowercase().as_str() {
            "rapid" | "rapida" | "rápida" => InsulinKind::Rapid,
            _ => InsulinKind::Long,
        }
    }
}

impl From<InsulinKind> for String {
    fn from(kind: InsulinKind) -> Self {
        match kind {
            InsulinKind::Rapid => "rapid".into(),
            InsulinKind::Long => "long".into(),
        }
    }
}

/// Exercise intensity level
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum Intensity {
    Low,
    #[default]
    Moderate,
    High,
}

impl Intensity {
    /// Glucose drop rate during activity (mg/dL per minute)
    pub fn drop_rate(self) -> f64 {
        match self {
            Intensity::Low => 1.0,
            Intensity::Moderate => 1.5,
            Intensity::High => 2.0,
        }
    }
}

impl From<String> for Intensity {
    fn from(label: String) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" | "baja" => Intensity::Low,
            "high" | "alta" => Intensity::High,
            _ => Intensity::Moderate,
        }
    }
}

impl From<Intensity> for String {
    fn from(intensity: Intensity) -> Self {
        match intensity {
            Intensity::Low => "low".into(),
            Intensity::Moderate => "moderate".into(),
            Intensity::High => "high".into(),
        }
    }
}

/// A logged event for one day.
///
/// Only `Glucose` carries a real measurement; the other variants feed the
/// effect models. Numeric payloads are optional because rows coming from the
/// store may be incomplete; a missing value contributes nothing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "entry_type", rename_all = "snake_case")]
pub enum Event {
    /// A real glucose measurement (mg/dL)
    Glucose { timestamp: String, value: f64 },
    Meal {
        timestamp: String,
        #[serde(default, deserialize_with = "lenient_number")]
        carbs_grams: Option<f64>,
    },
    Insulin {
        timestamp: String,
        #[serde(default, deserialize_with = "lenient_number")]
        units: Option<f64>,
        #[serde(default)]
        insulin_type: InsulinKind,
    },
    Exercise {
        timestamp: String,
        #[serde(default, deserialize_with = "lenient_number")]
        duration_minutes: Option<f64>,
        #[serde(default)]
        intensity: Intensity,
    },
    /// Any entry type this engine does not model
    #[serde(other)]
    Unknown,
}

impl Event {
    pub fn glucose(timestamp: impl Into<String>, value: f64) -> Self {
        Event::Glucose {
            timestamp: timestamp.into(),
            value,
        }
    }

    pub fn meal(timestamp: impl Into<String>, carbs_grams: f64) -> Self {
        Event::Meal {
            timestamp: timestamp.into(),
            carbs_grams: Some(carbs_grams),
        }
    }

    pub fn insulin(timestamp: impl Into<String>, units: f64, kind: InsulinKind) -> Self {
        Event::Insulin {
            timestamp: timestamp.into(),
            units: Some(units),
            insulin_type: kind,
        }
    }

    pub fn exercise(
        timestamp: impl Into<String>,
        duration_minutes: f64,
        intensity: Intensity,
    ) -> Self {
        Event::Exercise {
            timestamp: timestamp.into(),
            duration_minutes: Some(duration_minutes),
            intensity,
        }
    }

    /// Raw timestamp string, if the event carries one
    pub fn timestamp(&self) -> Option<&str> {
        match self {
            Event::Glucose { timestamp, .. }
            | Event::Meal { timestamp, .. }
            | Event::Insulin { timestamp, .. }
            | Event::Exercise { timestamp, .. } => Some(timestamp),
            Event::Unknown => None,
        }
    }

    /// Minutes since local midnight, read from the HH:MM digits
    pub fn minute(&self) -> i32 {
        self.timestamp()
            .map(crate::time::minutes_of_day)
            .unwrap_or(0)
    }

    /// The measured value if this is a real reading
    pub fn reading_value(&self) -> Option<f64> {
        match self {
            Event::Glucose { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn is_reading(&self) -> bool {
        matches!(self, Event::Glucose { .. })
    }
}

/// Accept numbers, numeric strings, null or garbage; keep only finite numbers.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| numeric_value(&value)))
}

fn numeric_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

// ============================================================================
// Configuration Profile
// ============================================================================

/// A raw setting as read from settings storage
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SettingValue {
    Number(f64),
    Text(String),
}

impl SettingValue {
    fn as_f64(&self) -> Option<f64> {
        let number = match self {
            SettingValue::Number(n) => Some(*n),
            SettingValue::Text(s) => s.trim().parse::<f64>().ok(),
        };
        number.filter(|n| n.is_finite())
    }
}

/// Flat key → value settings mapping
pub type Settings = HashMap<String, SettingValue>;

/// Physiological parameters used by the effect models.
///
/// `target_min`/`target_max` are only consumed by the statistics reducers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// mg/dL rise per gram of carbohydrate
    #[serde(default = "default_carb_ratio")]
    pub carb_ratio: f64,

    /// mg/dL drop per unit of rapid insulin
    #[serde(default = "default_rapid_sensitivity")]
    pub rapid_sensitivity: f64,

    /// mg/dL drop per unit per hour of long insulin
    #[serde(default = "default_long_sensitivity_per_hour")]
    pub long_sensitivity_per_hour: f64,

    #[serde(default = "default_target_min")]
    pub target_min: f64,

    #[serde(default = "default_target_max")]
    pub target_max: f64,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            carb_ratio: default_carb_ratio(),
            rapid_sensitivity: default_rapid_sensitivity(),
            long_sensitivity_per_hour: default_long_sensitivity_per_hour(),
            target_min: default_target_min(),
            target_max: default_target_max(),
        }
    }
}

fn default_carb_ratio() -> f64 {
    3.0
}

fn default_rapid_sensitivity() -> f64 {
    30.0
}

fn default_long_sensitivity_per_hour() -> f64 {
    0.5
}

fn default_target_min() -> f64 {
    80.0
}

fn default_target_max() -> f64 {
    130.0
}

impl Profile {
    /// Build a profile from a flat settings mapping.
    ///
    /// Absent or unparseable keys fall back to defaults. A zero factor is
    /// also treated as unset; the target bounds accept any number.
    pub fn from_settings(settings: &Settings) -> Self {
        let factor = |key: &str, default: fn() -> f64| {
            settings
                .get(key)
                .and_then(SettingValue::as_f64)
                .filter(|v| *v != 0.0)
                .unwrap_or_else(default)
        };
        let bound = |key: &str, default: fn() -> f64| {
            settings
                .get(key)
                .and_then(SettingValue::as_f64)
                .unwrap_or_else(default)
        };

        Self {
            carb_ratio: factor("carb_ratio", default_carb_ratio),
            rapid_sensitivity: factor("rapid_sensitivity", default_rapid_sensitivity),
            long_sensitivity_per_hour: factor(
                "long_sensitivity_per_hour",
                default_long_sensitivity_per_hour,
            ),
            target_min: bound("target_min", default_target_min),
            target_max: bound("target_max", default_target_max),
        }
    }
}

// ============================================================================
// Curve Types
// ============================================================================

/// One sample of a day curve
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Point {
    /// Minutes since local midnight
    pub minute: i32,
    /// Glucose in mg/dL (the logged value for real points)
    pub value: f64,
    pub is_real: bool,
    pub real_value: Option<f64>,
}

impl Point {
    /// `HH:MM` label for the sample minute
    pub fn time_label(&self) -> String {
        crate::time::format_minutes(self.minute)
    }
}
