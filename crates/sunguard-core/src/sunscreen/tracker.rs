//! Protection decay tracking.
//!
//! A logged application protects for a fixed ceiling (two hours by default)
//! shortened by an activity multiplier. Expiry is a pure comparison against
//! the due time; the tracker keeps no state between calls.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::application::{ActivityLevel, Quantity, SunscreenApplication};

/// Duration settings for protection decay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectionDurations {
    /// Longest any application protects, in minutes.
    #[serde(default = "default_base_duration_min")]
    pub base_duration_min: u32,
    #[serde(default = "default_sedentary")]
    pub sedentary_multiplier: f64,
    #[serde(default = "default_normal")]
    pub normal_multiplier: f64,
    #[serde(default = "default_active")]
    pub active_multiplier: f64,
}

fn default_base_duration_min() -> u32 {
    120
}
fn default_sedentary() -> f64 {
    1.0
}
fn default_normal() -> f64 {
    1.0
}
fn default_active() -> f64 {
    0.5
}

impl Default for ProtectionDurations {
    fn default() -> Self {
        Self {
            base_duration_min: default_base_duration_min(),
            sedentary_multiplier: default_sedentary(),
            normal_multiplier: default_normal(),
            active_multiplier: default_active(),
        }
    }
}

impl ProtectionDurations {
    /// Multiplier for an activity, clamped so the ceiling is never exceeded.
    pub fn multiplier(&self, activity: ActivityLevel) -> f64 {
        let raw = match activity {
            ActivityLevel::Sedentary => self.sedentary_multiplier,
            ActivityLevel::Normal => self.normal_multiplier,
            ActivityLevel::Active => self.active_multiplier,
        };
        if raw.is_finite() {
            raw.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// Sunscreen that is still protecting at the moment it was resolved.
///
/// Only [`ProtectionTracker::active_protection`] builds one, so holding a
/// value means the application was current when it was looked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveProtection {
    application_id: Uuid,
    nominal_spf: f64,
    quantity: Quantity,
    due_at: DateTime<Utc>,
}

impl ActiveProtection {
    pub fn application_id(&self) -> Uuid {
        self.application_id
    }

    pub fn nominal_spf(&self) -> f64 {
        self.nominal_spf
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn due_at(&self) -> DateTime<Utc> {
        self.due_at
    }

    /// Whether the protection still holds at `at`.
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        at <= self.due_at
    }
}

/// Snapshot of the user's protection for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectionStatus {
    pub current: Option<SunscreenApplication>,
    pub due_at: Option<DateTime<Utc>>,
    pub remaining_minutes: Option<i64>,
    /// 1.0 right after applying, 0.0 at the due time.
    pub remaining_fraction: Option<f64>,
    pub needs_reapplication: bool,
}

/// Decay calculator for sunscreen applications.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtectionTracker {
    durations: ProtectionDurations,
}

impl ProtectionTracker {
    pub fn new(durations: ProtectionDurations) -> Self {
        Self { durations }
    }

    pub fn durations(&self) -> &ProtectionDurations {
        &self.durations
    }

    /// How long this application protects.
    pub fn protection_duration(&self, application: &SunscreenApplication) -> Duration {
        let minutes = f64::from(self.durations.base_duration_min)
            * self.durations.multiplier(application.activity);
        Duration::milliseconds((minutes * 60_000.0).round() as i64)
    }

    /// When the user should reapply.
    pub fn due_at(&self, application: &SunscreenApplication) -> DateTime<Utc> {
        application.applied_at + self.protection_duration(application)
    }

    /// `true` strictly after the due time; at the due time itself protection still holds.
    pub fn is_expired(&self, application: &SunscreenApplication, now: DateTime<Utc>) -> bool {
        now > self.due_at(application)
    }

    /// The application currently protecting the user, if any.
    ///
    /// Only the most recent record applied at or before `now` is considered.
    /// When it has expired there is no current protection: an older record
    /// is never returned in its place.
    pub fn current_application<'a>(
        &self,
        history: &'a [SunscreenApplication],
        now: DateTime<Utc>,
    ) -> Option<&'a SunscreenApplication> {
        let latest = history
            .iter()
            .filter(|a| a.applied_at <= now)
            .max_by(|a, b| a.applied_at.cmp(&b.applied_at).then(a.id.cmp(&b.id)))?;
        if self.is_expired(latest, now) {
            None
        } else {
            Some(latest)
        }
    }

    /// Resolve protection for the burn-time model. `None` once expired.
    pub fn active_protection(
        &self,
        application: &SunscreenApplication,
        now: DateTime<Utc>,
    ) -> Option<ActiveProtection> {
        if application.applied_at > now || self.is_expired(application, now) {
            return None;
        }
        Some(ActiveProtection {
            application_id: application.id,
            nominal_spf: application.spf,
            quantity: application.quantity,
            due_at: self.due_at(application),
        })
    }

    pub fn status(&self, history: &[SunscreenApplication], now: DateTime<Utc>) -> ProtectionStatus {
        let Some(current) = self.current_application(history, now) else {
            return ProtectionStatus {
                current: None,
                due_at: None,
                remaining_minutes: None,
                remaining_fraction: None,
                needs_reapplication: !history.is_empty(),
            };
        };

        let due_at = self.due_at(current);
        let total_ms = self.protection_duration(current).num_milliseconds();
        let remaining = due_at - now;
        let fraction = if total_ms > 0 {
            (remaining.num_milliseconds() as f64 / total_ms as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };

        ProtectionStatus {
            current: Some(current.clone()),
            due_at: Some(due_at),
            remaining_minutes: Some(remaining.num_minutes()),
            remaining_fraction: Some(fraction),
            needs_reapplication: false,
        }
    }
}
