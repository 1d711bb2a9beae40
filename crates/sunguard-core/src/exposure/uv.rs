use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One environmental reading pushed by the weather collaborator.
///
/// Values are stored as received; the accessors clamp them into their valid
/// domain so downstream math never sees a negative UV or a cloud fraction
/// above 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvSample {
    pub timestamp: DateTime<Utc>,
    pub uv_index: f64,
    /// Fraction of sky covered, 0.0 (clear) to 1.0 (overcast).
    #[serde(default)]
    pub cloud_cover: f64,
    #[serde(default)]
    pub temperature_c: Option<f64>,
}

impl UvSample {
    pub fn new(timestamp: DateTime<Utc>, uv_index: f64, cloud_cover: f64) -> Self {
        Self {
            timestamp,
            uv_index,
            cloud_cover,
            temperature_c: None,
        }
    }

    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature_c = Some(celsius);
        self
    }

    /// A sample whose UV reading is not a number cannot be used for estimates.
    pub fn is_malformed(&self) -> bool {
        !self.uv_index.is_finite()
    }

    /// UV index clamped to `[0, ∞)`. Non-finite readings clamp to 0.
    pub fn clamped_uv(&self) -> f64 {
        if self.uv_index.is_finite() {
            self.uv_index.max(0.0)
        } else {
            0.0
        }
    }

    /// Cloud cover clamped to `[0, 1]`. A missing (NaN) reading counts as clear sky.
    pub fn clamped_cloud_cover(&self) -> f64 {
        if self.cloud_cover.is_nan() {
            0.0
        } else {
            self.cloud_cover.clamp(0.0, 1.0)
        }
    }

    pub fn category(&self) -> UvCategory {
        UvCategory::from_index(self.clamped_uv())
    }

    /// Whether this reading meets a protection threshold such as "UV 3 or above".
    pub fn meets_threshold(&self, threshold: f64) -> bool {
        !self.is_malformed() && self.clamped_uv() >= threshold
    }
}

/// WHO UV index exposure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UvCategory {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvCategory {
    pub fn from_index(uv_index: f64) -> Self {
        let uv = uv_index.max(0.0);
        if uv >= 11.0 {
            UvCategory::Extreme
        } else if uv >= 8.0 {
            UvCategory::VeryHigh
        } else if uv >= 6.0 {
            UvCategory::High
        } else if uv >= 3.0 {
            UvCategory::Moderate
        } else {
            UvCategory::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UvCategory::Low => "low",
            UvCategory::Moderate => "moderate",
            UvCategory::High => "high",
            UvCategory::VeryHigh => "very high",
            UvCategory::Extreme => "extreme",
        }
    }
}
