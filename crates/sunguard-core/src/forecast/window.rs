//! Protection-needed window derived from hourly UV forecasts.
//!
//! The planner takes one ordered sequence of samples and does not care which
//! calendar day each belongs to, so "rest of today + early tomorrow" is just a
//! longer sequence.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::exposure::{BurnTimeResult, FitzpatrickType, SkinExposureModel, SkinProfile, UvSample};

/// UV index at which protection is recommended. Shared with the leave-home trigger.
pub const PROTECTION_UV_THRESHOLD: f64 = 3.0;

/// Span during which protection is needed. Both bounds are absent when no
/// sample reaches the threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ForecastWindow {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() || self.end.is_none()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => at >= start && at < end,
            _ => false,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        Some(self.end? - self.start?)
    }
}

/// Planner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_threshold")]
    pub uv_threshold: f64,
    /// Spacing of forecast samples; the last qualifying sample covers this long.
    #[serde(default = "default_interval")]
    pub sample_interval_min: u32,
    /// Skin type used for the generic hourly risk column.
    #[serde(default = "default_reference_type")]
    pub reference_skin_type: FitzpatrickType,
}

fn default_threshold() -> f64 {
    PROTECTION_UV_THRESHOLD
}
fn default_interval() -> u32 {
    60
}
fn default_reference_type() -> FitzpatrickType {
    FitzpatrickType::II
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            uv_threshold: default_threshold(),
            sample_interval_min: default_interval(),
            reference_skin_type: default_reference_type(),
        }
    }
}

/// Per-sample risk row for the hourly forecast view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRisk {
    pub sample: UvSample,
    pub qualifies: bool,
    pub burn: BurnTimeResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub window: ForecastWindow,
    /// Highest-UV sample; the earliest one wins ties.
    pub peak: Option<UvSample>,
    pub hourly: Vec<HourlyRisk>,
}

/// Derives [`ForecastWindow`]s. Stateless apart from its settings.
#[derive(Debug, Clone, Default)]
pub struct ForecastWindowPlanner {
    model: SkinExposureModel,
    config: ForecastConfig,
}

impl ForecastWindowPlanner {
    pub fn new(model: SkinExposureModel, config: ForecastConfig) -> Self {
        Self { model, config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Fixed profile the window is planned against, independent of the user.
    pub fn reference_profile(&self) -> SkinProfile {
        SkinProfile {
            id: uuid::Uuid::nil(),
            skin_type: self.config.reference_skin_type,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn interval(&self) -> Duration {
        Duration::minutes(i64::from(self.config.sample_interval_min.max(1)))
    }

    fn qualifies(&self, sample: &UvSample) -> bool {
        sample.meets_threshold(self.config.uv_threshold)
    }

    /// First qualifying timestamp to last qualifying timestamp plus one interval.
    ///
    /// Qualification depends on the UV index alone, so the window is the same
    /// for every reference profile; the profile only shapes [`Self::summarize`].
    pub fn compute_window(&self, samples: &[UvSample], reference: &SkinProfile) -> ForecastWindow {
        let mut qualifying = samples.iter().filter(|s| self.qualifies(s)).map(|s| s.timestamp);
        let Some(first) = qualifying.next() else {
            debug!(samples = samples.len(), "no sample reaches the protection threshold");
            return ForecastWindow::none();
        };
        let (start, last) = qualifying.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        let window = ForecastWindow {
            start: Some(start),
            end: Some(last + self.interval()),
        };
        debug!(
            skin_type = %reference.skin_type,
            start = %start,
            end = ?window.end,
            "protection window computed"
        );
        window
    }

    /// Window plus per-sample risk evaluated without sunscreen.
    pub fn summarize(&self, samples: &[UvSample], reference: &SkinProfile) -> ForecastSummary {
        let hourly = samples
            .iter()
            .map(|s| HourlyRisk {
                sample: s.clone(),
                qualifies: self.qualifies(s),
                burn: self.model.estimate_burn_time(Some(reference), Some(s), None),
            })
            .collect();

        let peak = samples
            .iter()
            .filter(|s| !s.is_malformed())
            .fold(None::<&UvSample>, |best, s| match best {
                Some(b) if b.clamped_uv() >= s.clamped_uv() => Some(b),
                _ => Some(s),
            })
            .cloned();

        ForecastSummary {
            window: self.compute_window(samples, reference),
            peak,
            hourly,
        }
    }
}
