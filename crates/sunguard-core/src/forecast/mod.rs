//! Forecast window planning.

mod window;

pub use window::{
    ForecastConfig, ForecastSummary, ForecastWindow, ForecastWindowPlanner, HourlyRisk,
    PROTECTION_UV_THRESHOLD,
};
