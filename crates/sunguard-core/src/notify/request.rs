use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::exposure::UvSample;
use crate::forecast::ForecastWindow;

/// The two alert families the engine arbitrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    LeaveHome,
    Reapply,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::LeaveHome => "leave_home",
            NotificationKind::Reapply => "reapply",
        }
    }
}

/// Buttons offered on a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationAction {
    /// Open the sunscreen log.
    LogSunscreen,
    /// Quick reapply with the previous product.
    Reapplied,
    Dismiss,
}

/// What the delivery collaborator should present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub trigger_at: DateTime<Utc>,
    pub dedupe_key: String,
    pub actions: Vec<NotificationAction>,
}

/// Dedupe key for one away episode.
pub fn leave_home_key(episode: u64) -> String {
    format!("leave-home:{episode}")
}

/// Dedupe key for the reminder belonging to one application.
pub fn reapply_key(application_id: Uuid) -> String {
    format!("reapply:{application_id}")
}

impl NotificationRequest {
    pub fn leave_home(episode: u64, uv: &UvSample, at: DateTime<Utc>) -> Self {
        Self {
            kind: NotificationKind::LeaveHome,
            title: "Sunscreen before you go".into(),
            body: format!(
                "UV index is {:.0} ({}) right now. Apply sunscreen before heading out.",
                uv.clamped_uv(),
                uv.category().label()
            ),
            trigger_at: at,
            dedupe_key: leave_home_key(episode),
            actions: vec![NotificationAction::LogSunscreen, NotificationAction::Dismiss],
        }
    }

    pub fn reapply(
        application_id: Uuid,
        applied_at: DateTime<Utc>,
        trigger_at: DateTime<Utc>,
        forecast: Option<&ForecastWindow>,
    ) -> Self {
        let mut body = format!(
            "The sunscreen you applied at {} has worn off.",
            applied_at.format("%H:%M")
        );
        if let Some(end) = forecast.and_then(|w| w.end).filter(|end| *end > trigger_at) {
            body.push_str(&format!(" UV stays elevated until {}.", end.format("%H:%M")));
        }
        Self {
            kind: NotificationKind::Reapply,
            title: "Time to reapply sunscreen".into(),
            body,
            trigger_at,
            dedupe_key: reapply_key(application_id),
            actions: vec![NotificationAction::Reapplied, NotificationAction::Dismiss],
        }
    }
}

/// Instruction for the delivery collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum NotificationCommand {
    /// Arm a timer for `trigger_at`. When it fires, send `ReminderDue` back to
    /// the engine; present only if the engine answers with `Deliver`.
    Schedule { request: NotificationRequest },
    /// Present now.
    Deliver { request: NotificationRequest },
    /// Drop any timer or visible notification for this key.
    Cancel {
        kind: NotificationKind,
        dedupe_key: String,
    },
}

impl NotificationCommand {
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationCommand::Schedule { request } | NotificationCommand::Deliver { request } => {
                request.kind
            }
            NotificationCommand::Cancel { kind, .. } => *kind,
        }
    }

    pub fn dedupe_key(&self) -> &str {
        match self {
            NotificationCommand::Schedule { request } | NotificationCommand::Deliver { request } => {
                &request.dedupe_key
            }
            NotificationCommand::Cancel { dedupe_key, .. } => dedupe_key,
        }
    }
}

/// Why a notification that the state machine wanted was not emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionReason {
    /// The user has not granted notification permission.
    PermissionDenied,
    /// This notification kind is switched off in settings.
    KindDisabled,
    UvBelowThreshold,
    /// No usable UV sample has been received.
    UvUnknown,
    /// A reminder fired for an application that is no longer current.
    NotCurrent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suppression {
    pub kind: NotificationKind,
    pub dedupe_key: String,
    pub reason: SuppressionReason,
}

/// Everything the engine decided in response to one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub commands: Vec<NotificationCommand>,
    pub suppressed: Vec<Suppression>,
}

impl Decision {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.suppressed.is_empty()
    }

    pub fn scheduled(&self) -> impl Iterator<Item = &NotificationRequest> {
        self.commands.iter().filter_map(|c| match c {
            NotificationCommand::Schedule { request } => Some(request),
            _ => None,
        })
    }

    pub fn delivered(&self) -> impl Iterator<Item = &NotificationRequest> {
        self.commands.iter().filter_map(|c| match c {
            NotificationCommand::Deliver { request } => Some(request),
            _ => None,
        })
    }

    pub fn cancelled(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            NotificationCommand::Cancel { dedupe_key, .. } => Some(dedupe_key.as_str()),
            _ => None,
        })
    }

    pub(crate) fn suppress(
        &mut self,
        kind: NotificationKind,
        dedupe_key: &str,
        reason: SuppressionReason,
    ) {
        self.suppressed.push(Suppression {
            kind,
            dedupe_key: dedupe_key.to_string(),
            reason,
        });
    }
}
