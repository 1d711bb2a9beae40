//! Sunscreen applications and protection decay.

mod application;
mod tracker;

pub use application::{ActivityLevel, Quantity, SunscreenApplication};
pub use tracker::{ActiveProtection, ProtectionDurations, ProtectionStatus, ProtectionTracker};
