use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::exposure::UvSample;
use crate::forecast::ForecastWindow;
use crate::sunscreen::SunscreenApplication;

/// Every input the decision engine reacts to.
///
/// Collaborators translate their callbacks (geofence, OS timers, permission
/// prompts, weather refreshes) into these values. Each carries its own
/// timestamp so an event log can be replayed after a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    UvUpdated {
        sample: UvSample,
    },
    /// Left the home geofence.
    GeofenceExited {
        at: DateTime<Utc>,
    },
    /// Came back inside the home geofence.
    GeofenceEntered {
        at: DateTime<Utc>,
    },
    SunscreenApplied {
        application: SunscreenApplication,
    },
    SunscreenRemoved {
        application_id: Uuid,
        at: DateTime<Utc>,
    },
    /// A timer armed by a `Schedule` command fired.
    ReminderDue {
        dedupe_key: String,
        at: DateTime<Utc>,
    },
    PermissionChanged {
        granted: bool,
        at: DateTime<Utc>,
    },
    ForecastUpdated {
        window: ForecastWindow,
    },
    /// The collaborator confirmed a presented notification reached the user.
    NotificationDelivered {
        dedupe_key: String,
        at: DateTime<Utc>,
    },
}

impl EngineEvent {
    /// When the event happened, if it carries a time.
    pub fn at(&self) -> Option<DateTime<Utc>> {
        match self {
            EngineEvent::UvUpdated { sample } => Some(sample.timestamp),
            EngineEvent::GeofenceExited { at }
            | EngineEvent::GeofenceEntered { at }
            | EngineEvent::SunscreenRemoved { at, .. }
            | EngineEvent::ReminderDue { at, .. }
            | EngineEvent::PermissionChanged { at, .. }
            | EngineEvent::NotificationDelivered { at, .. } => Some(*at),
            EngineEvent::SunscreenApplied { application } => Some(application.applied_at),
            EngineEvent::ForecastUpdated { .. } => None,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::UvUpdated { .. } => "uv_updated",
            EngineEvent::GeofenceExited { .. } => "geofence_exited",
            EngineEvent::GeofenceEntered { .. } => "geofence_entered",
            EngineEvent::SunscreenApplied { .. } => "sunscreen_applied",
            EngineEvent::SunscreenRemoved { .. } => "sunscreen_removed",
            EngineEvent::ReminderDue { .. } => "reminder_due",
            EngineEvent::PermissionChanged { .. } => "permission_changed",
            EngineEvent::ForecastUpdated { .. } => "forecast_updated",
            EngineEvent::NotificationDelivered { .. } => "notification_delivered",
        }
    }
}
