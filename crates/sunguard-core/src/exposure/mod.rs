//! Burn-time estimation.
//!
//! [`SkinExposureModel`] is a pure function of skin profile, UV sample and
//! active sunscreen protection. It holds only its calibration table and is
//! safe to share between threads.

mod model;
mod skin;
mod uv;

pub use model::{
    BaseBurnMinutes, BurnEstimate, BurnTimeResult, DoseFractions, ExposureCalibration,
    SkinExposureModel, WarningLevel, WarningThresholds,
};
pub use skin::{FitzpatrickType, SkinProfile};
pub use uv::{UvCategory, UvSample};
