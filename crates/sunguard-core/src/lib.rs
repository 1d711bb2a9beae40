//! # SunGuard Core Library
//!
//! Core logic for sun exposure protection: how long until a given skin type
//! burns, how long a sunscreen application keeps working, when today's UV
//! calls for protection, and whether to alert the user on leaving home or when
//! a layer wears off.
//!
//! ## Architecture
//!
//! - **Exposure**: Pure burn-time model over skin type, UV, cloud cover and
//!   effective SPF
//! - **Sunscreen**: Application records and protection decay
//! - **Forecast**: Protection-needed window from hourly UV samples
//! - **Notify**: Event-driven decision engine that emits schedule, deliver and
//!   cancel commands for a delivery collaborator
//! - **Storage**: TOML configuration and a SQLite store used by the CLI
//!
//! ## Key Components
//!
//! - [`SkinExposureModel`]: Burn-time calculator
//! - [`ProtectionTracker`]: Reapplication due times
//! - [`ForecastWindowPlanner`]: Protection window derivation
//! - [`NotificationDecisionEngine`]: Notification state machine

pub mod error;
pub mod events;
pub mod exposure;
pub mod forecast;
pub mod notify;
pub mod storage;
pub mod sunscreen;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::EngineEvent;
pub use exposure::{
    BurnEstimate, BurnTimeResult, ExposureCalibration, FitzpatrickType, SkinExposureModel,
    SkinProfile, UvCategory, UvSample, WarningLevel,
};
pub use forecast::{ForecastConfig, ForecastSummary, ForecastWindow, ForecastWindowPlanner};
pub use notify::{
    Decision, DecisionConfig, NotificationCommand, NotificationDecisionEngine, NotificationKind,
    NotificationRequest, NotificationSink, SharedDecisionEngine, SuppressionReason,
};
pub use storage::{Config, Database};
pub use sunscreen::{
    ActiveProtection, ActivityLevel, ProtectionDurations, ProtectionStatus, ProtectionTracker,
    Quantity, SunscreenApplication,
};
