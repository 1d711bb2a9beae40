//! Burn-time model.
//!
//! ```text
//! effective_uv  = uv_index × (1 − max_cloud_attenuation × cloud_cover^cloud_exponent)
//! effective_spf = nominal_spf ^ dose_fraction(quantity)
//! minutes       = base_minutes_at_uv1(skin_type) / effective_uv × effective_spf
//! ```
//!
//! Every constant lives in [`ExposureCalibration`] so that it can be tuned
//! from the configuration file and pinned in tests.

use serde::{Deserialize, Serialize};

use super::skin::{FitzpatrickType, SkinProfile};
use super::uv::UvSample;
use crate::sunscreen::{ActiveProtection, Quantity};

/// Severity tier for a burn-time estimate, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    Safe,
    Caution,
    Warning,
    Danger,
}

impl WarningLevel {
    /// Bucket a finite burn time. The ranges are half-open and cover `[0, ∞)`.
    pub fn from_minutes(minutes: f64, thresholds: &WarningThresholds) -> Self {
        if minutes < thresholds.danger_below_min {
            WarningLevel::Danger
        } else if minutes < thresholds.warning_below_min {
            WarningLevel::Warning
        } else if minutes < thresholds.caution_below_min {
            WarningLevel::Caution
        } else {
            WarningLevel::Safe
        }
    }

    /// High-risk tiers: the user should act now.
    pub fn is_high_risk(self) -> bool {
        matches!(self, WarningLevel::Warning | WarningLevel::Danger)
    }
}

/// Estimated time until visible reddening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnEstimate {
    Minutes(f64),
    /// No estimate: no UV exposure, or no usable sample.
    Unknown,
}

impl BurnEstimate {
    pub fn minutes(self) -> Option<f64> {
        match self {
            BurnEstimate::Minutes(m) => Some(m),
            BurnEstimate::Unknown => None,
        }
    }
}

/// Output of [`SkinExposureModel::estimate_burn_time`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnTimeResult {
    pub minutes_to_burn: BurnEstimate,
    /// `None` when the input sample was missing or malformed; callers hide
    /// the severity badge instead of guessing one.
    pub warning_level: Option<WarningLevel>,
    /// Skin type the estimate was computed for.
    pub skin_type: FitzpatrickType,
    /// Set when no profile was supplied and the mid-range type was assumed.
    pub defaulted_profile: bool,
    /// UV index after cloud attenuation.
    pub effective_uv: Option<f64>,
    /// Protection factor actually applied, when sunscreen was active.
    pub effective_spf: Option<f64>,
}

impl BurnTimeResult {
    /// Whole minutes for display, rounded down so the estimate never overstates safe time.
    pub fn rounded_minutes(&self) -> Option<u64> {
        self.minutes_to_burn.minutes().map(|m| m.floor().max(0.0) as u64)
    }
}

/// Minutes to first reddening at UV index 1, per skin type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseBurnMinutes {
    pub type_i: f64,
    pub type_ii: f64,
    pub type_iii: f64,
    pub type_iv: f64,
    pub type_v: f64,
    pub type_vi: f64,
}

impl BaseBurnMinutes {
    pub fn for_type(&self, skin_type: FitzpatrickType) -> f64 {
        match skin_type {
            FitzpatrickType::I => self.type_i,
            FitzpatrickType::II => self.type_ii,
            FitzpatrickType::III => self.type_iii,
            FitzpatrickType::IV => self.type_iv,
            FitzpatrickType::V => self.type_v,
            FitzpatrickType::VI => self.type_vi,
        }
    }
}

impl Default for BaseBurnMinutes {
    fn default() -> Self {
        // MED of 200/250/300/450/600/1000 J/m² at 1.5 J/m² per minute (UV index 1).
        Self {
            type_i: 133.0,
            type_ii: 167.0,
            type_iii: 200.0,
            type_iv: 300.0,
            type_v: 400.0,
            type_vi: 667.0,
        }
    }
}

/// Applied amount relative to the 2 mg/cm² reference thickness used in SPF testing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseFractions {
    pub light: f64,
    pub normal: f64,
    pub heavy: f64,
}

impl DoseFractions {
    pub fn for_quantity(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Light => self.light,
            Quantity::Normal => self.normal,
            Quantity::Heavy => self.heavy,
        }
    }
}

impl Default for DoseFractions {
    fn default() -> Self {
        Self {
            light: 0.5,
            normal: 0.75,
            heavy: 1.0,
        }
    }
}

/// Upper bounds (exclusive, minutes) of the three at-risk tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningThresholds {
    pub danger_below_min: f64,
    pub warning_below_min: f64,
    pub caution_below_min: f64,
}

impl Default for WarningThresholds {
    fn default() -> Self {
        Self {
            danger_below_min: 20.0,
            warning_below_min: 60.0,
            caution_below_min: 120.0,
        }
    }
}

/// Tunable constants for the burn-time model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureCalibration {
    #[serde(default)]
    pub base_burn_minutes: BaseBurnMinutes,
    /// Share of UV removed by a fully overcast sky.
    #[serde(default = "default_max_cloud_attenuation")]
    pub max_cloud_attenuation: f64,
    /// Exponent < 1 makes attenuation grow sub-linearly with cloud cover.
    #[serde(default = "default_cloud_exponent")]
    pub cloud_exponent: f64,
    #[serde(default)]
    pub dose_fractions: DoseFractions,
    #[serde(default)]
    pub warning_thresholds: WarningThresholds,
}

fn default_max_cloud_attenuation() -> f64 {
    0.7
}
fn default_cloud_exponent() -> f64 {
    0.7
}

impl Default for ExposureCalibration {
    fn default() -> Self {
        Self {
            base_burn_minutes: BaseBurnMinutes::default(),
            max_cloud_attenuation: default_max_cloud_attenuation(),
            cloud_exponent: default_cloud_exponent(),
            dose_fractions: DoseFractions::default(),
            warning_thresholds: WarningThresholds::default(),
        }
    }
}

impl ExposureCalibration {
    /// Fraction of clear-sky UV that passes through the given cloud cover.
    pub fn cloud_transmission(&self, cloud_cover: f64) -> f64 {
        let cover = if cloud_cover.is_nan() {
            0.0
        } else {
            cloud_cover.clamp(0.0, 1.0)
        };
        let attenuation = self.max_cloud_attenuation.clamp(0.0, 0.95);
        1.0 - attenuation * cover.powf(self.cloud_exponent.max(f64::EPSILON))
    }

    /// Protection actually delivered by `nominal_spf` applied at `quantity`.
    ///
    /// Never exceeds the nominal value. Above SPF 1 the result strictly grows
    /// with quantity tier; SPF 1 and below is no protection at any quantity.
    pub fn effective_spf(&self, nominal_spf: f64, quantity: Quantity) -> f64 {
        let nominal = if nominal_spf.is_finite() {
            nominal_spf.max(1.0)
        } else {
            1.0
        };
        let fraction = self.dose_fractions.for_quantity(quantity).clamp(0.0, 1.0);
        nominal.powf(fraction).min(nominal)
    }
}

/// Pure burn-time calculator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkinExposureModel {
    calibration: ExposureCalibration,
}

impl SkinExposureModel {
    pub fn new(calibration: ExposureCalibration) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> &ExposureCalibration {
        &self.calibration
    }

    /// Estimate how long the user can stay out before burning.
    ///
    /// Protection is only honoured while it covers the sample's timestamp.
    pub fn estimate_burn_time(
        &self,
        profile: Option<&SkinProfile>,
        sample: Option<&UvSample>,
        protection: Option<&ActiveProtection>,
    ) -> BurnTimeResult {
        let defaulted_profile = profile.is_none();
        let skin_type = profile.map(|p| p.skin_type).unwrap_or_default();

        let unknown = BurnTimeResult {
            minutes_to_burn: BurnEstimate::Unknown,
            warning_level: None,
            skin_type,
            defaulted_profile,
            effective_uv: None,
            effective_spf: None,
        };

        let Some(sample) = sample.filter(|s| !s.is_malformed()) else {
            return unknown;
        };

        let effective_uv =
            sample.clamped_uv() * self.calibration.cloud_transmission(sample.clamped_cloud_cover());
        if effective_uv <= 0.0 {
            return BurnTimeResult {
                warning_level: Some(WarningLevel::Safe),
                effective_uv: Some(0.0),
                ..unknown
            };
        }

        let effective_spf = protection
            .filter(|p| p.covers(sample.timestamp))
            .map(|p| self.calibration.effective_spf(p.nominal_spf(), p.quantity()));

        let base = self.calibration.base_burn_minutes.for_type(skin_type);
        let minutes = base / effective_uv * effective_spf.unwrap_or(1.0);

        BurnTimeResult {
            minutes_to_burn: BurnEstimate::Minutes(minutes),
            warning_level: Some(WarningLevel::from_minutes(
                minutes,
                &self.calibration.warning_thresholds,
            )),
            skin_type,
            defaulted_profile,
            effective_uv: Some(effective_uv),
            effective_spf,
        }
    }
}
