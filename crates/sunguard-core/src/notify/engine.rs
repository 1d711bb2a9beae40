//! Notification decision state machine.
//!
//! Two independent machines share one engine:
//!
//! ```text
//! leave-home:  Idle -> (exit) -> Away | Notified -> (enter) -> Idle
//!              Away -> (UV update >= threshold) -> Notified
//!
//! reapply:     Idle -> (applied) -> Scheduled -> (reminder due) -> Notified | Suppressed
//!              any  -> (applied) -> Scheduled      (previous reminder cancelled)
//!              any  -> (same application again) -> unchanged
//!              Scheduled | Notified -> (removed) -> Idle
//! ```
//!
//! The engine is a plain value: `handle` takes `&mut self`, performs no I/O and
//! reads time only from the events. It serializes with serde so the host can
//! persist it between wake-ups, and [`replay`] rebuilds it from an event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::ledger::NotificationLedger;
use super::request::{
    leave_home_key, reapply_key, Decision, NotificationCommand, NotificationKind,
    NotificationRequest, SuppressionReason,
};
use crate::events::EngineEvent;
use crate::exposure::UvSample;
use crate::forecast::{ForecastWindow, PROTECTION_UV_THRESHOLD};
use crate::sunscreen::{ProtectionTracker, SunscreenApplication};

/// Notification preferences and trigger threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    #[serde(default = "default_threshold")]
    pub uv_threshold: f64,
    #[serde(default = "default_true")]
    pub leave_home_enabled: bool,
    #[serde(default = "default_true")]
    pub reapply_enabled: bool,
    /// Finished notification records kept for deduplication and display.
    #[serde(default = "default_ledger_capacity")]
    pub ledger_capacity: usize,
}

fn default_threshold() -> f64 {
    PROTECTION_UV_THRESHOLD
}
fn default_true() -> bool {
    true
}
fn default_ledger_capacity() -> usize {
    64
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            uv_threshold: default_threshold(),
            leave_home_enabled: true,
            reapply_enabled: true,
            ledger_capacity: default_ledger_capacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LeaveHomeState {
    /// At home.
    Idle,
    /// Away, but UV has not reached the threshold yet this episode.
    Away { episode: u64, since: DateTime<Utc> },
    /// Away and this episode's alert already went out (or was suppressed).
    Notified { episode: u64, since: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReapplyState {
    Idle,
    Scheduled {
        application_id: Uuid,
        applied_at: DateTime<Utc>,
        due_at: DateTime<Utc>,
        /// Whether a `Schedule` command actually reached the collaborator.
        registered: bool,
    },
    Notified {
        application_id: Uuid,
        applied_at: DateTime<Utc>,
    },
    /// Reminder fired under safe or unknown UV. Terminal until the next application.
    Suppressed {
        application_id: Uuid,
        applied_at: DateTime<Utc>,
        reason: SuppressionReason,
    },
}

impl ReapplyState {
    fn application(&self) -> Option<(Uuid, DateTime<Utc>)> {
        match self {
            ReapplyState::Idle => None,
            ReapplyState::Scheduled {
                application_id,
                applied_at,
                ..
            }
            | ReapplyState::Notified {
                application_id,
                applied_at,
            }
            | ReapplyState::Suppressed {
                application_id,
                applied_at,
                ..
            } => Some((*application_id, *applied_at)),
        }
    }
}

/// Event-driven arbiter for leave-home and reapply notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDecisionEngine {
    config: DecisionConfig,
    tracker: ProtectionTracker,
    permission_granted: bool,
    latest_uv: Option<UvSample>,
    forecast: Option<ForecastWindow>,
    leave_home: LeaveHomeState,
    reapply: ReapplyState,
    next_episode: u64,
    ledger: NotificationLedger,
}

impl NotificationDecisionEngine {
    pub fn new(config: DecisionConfig, tracker: ProtectionTracker, permission_granted: bool) -> Self {
        let ledger = NotificationLedger::with_capacity(config.ledger_capacity);
        Self {
            config,
            tracker,
            permission_granted,
            latest_uv: None,
            forecast: None,
            leave_home: LeaveHomeState::Idle,
            reapply: ReapplyState::Idle,
            next_episode: 1,
            ledger,
        }
    }

    /// Swap in new preferences and durations, keeping all machine state.
    ///
    /// Reminders already armed keep their trigger time; the new durations
    /// apply from the next application.
    pub fn reconfigure(&mut self, config: DecisionConfig, tracker: ProtectionTracker) {
        self.ledger.set_capacity(config.ledger_capacity);
        self.config = config;
        self.tracker = tracker;
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    pub fn permission_granted(&self) -> bool {
        self.permission_granted
    }

    pub fn leave_home_state(&self) -> &LeaveHomeState {
        &self.leave_home
    }

    pub fn reapply_state(&self) -> &ReapplyState {
        &self.reapply
    }

    pub fn latest_uv(&self) -> Option<&UvSample> {
        self.latest_uv.as_ref()
    }

    pub fn forecast(&self) -> Option<&ForecastWindow> {
        self.forecast.as_ref()
    }

    pub fn ledger(&self) -> &NotificationLedger {
        &self.ledger
    }

    /// Dedupe key of the reminder currently armed, if any.
    pub fn pending_reminder_key(&self) -> Option<String> {
        match &self.reapply {
            ReapplyState::Scheduled { application_id, .. } => Some(reapply_key(*application_id)),
            _ => None,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply one event. Transitions are atomic: the returned decision fully
    /// reflects the new state.
    pub fn handle(&mut self, event: &EngineEvent) -> Decision {
        let mut decision = Decision::default();
        match event {
            EngineEvent::UvUpdated { sample } => self.on_uv(sample, &mut decision),
            EngineEvent::GeofenceExited { at } => self.on_exit(*at, &mut decision),
            EngineEvent::GeofenceEntered { at } => self.on_enter(*at, &mut decision),
            EngineEvent::SunscreenApplied { application } => {
                self.on_applied(application, &mut decision)
            }
            EngineEvent::SunscreenRemoved { application_id, at } => {
                self.on_removed(*application_id, *at, &mut decision)
            }
            EngineEvent::ReminderDue { dedupe_key, at } => {
                self.on_reminder_due(dedupe_key, *at, &mut decision)
            }
            EngineEvent::PermissionChanged { granted, at } => {
                self.on_permission(*granted, *at, &mut decision)
            }
            EngineEvent::ForecastUpdated { window } => {
                self.forecast = Some(window.clone());
            }
            EngineEvent::NotificationDelivered { dedupe_key, .. } => {
                if !self.ledger.mark_delivered(dedupe_key) {
                    debug!(dedupe_key = %dedupe_key, "delivery receipt for unknown or finished notification");
                }
            }
        }
        debug!(
            event = event.name(),
            commands = decision.commands.len(),
            suppressed = decision.suppressed.len(),
            "event handled"
        );
        decision
    }

    // ── Leave-home ───────────────────────────────────────────────────

    fn on_exit(&mut self, at: DateTime<Utc>, decision: &mut Decision) {
        if !matches!(self.leave_home, LeaveHomeState::Idle) {
            debug!(state = ?self.leave_home, "exit while already away; ignored");
            return;
        }
        let episode = self.next_episode;
        self.next_episode += 1;
        self.leave_home = LeaveHomeState::Away { episode, since: at };
        info!(episode, "left home");
        self.try_leave_home_alert(at, decision);
    }

    fn on_enter(&mut self, _at: DateTime<Utc>, decision: &mut Decision) {
        let episode = match self.leave_home {
            LeaveHomeState::Idle => {
                debug!("enter while already home; ignored");
                return;
            }
            LeaveHomeState::Away { episode, .. } | LeaveHomeState::Notified { episode, .. } => {
                episode
            }
        };
        let key = leave_home_key(episode);
        if self.ledger.cancel(&key) {
            decision.commands.push(NotificationCommand::Cancel {
                kind: NotificationKind::LeaveHome,
                dedupe_key: key,
            });
        }
        self.leave_home = LeaveHomeState::Idle;
        info!(episode, "returned home");
    }

    /// Fire the leave-home alert if away, not yet notified, and UV is high.
    fn try_leave_home_alert(&mut self, at: DateTime<Utc>, decision: &mut Decision) {
        let LeaveHomeState::Away { episode, since } = self.leave_home else {
            return;
        };
        let Some(uv) = self.latest_uv.clone() else {
            debug!(episode, "no UV reading yet; waiting");
            return;
        };
        if !uv.meets_threshold(self.config.uv_threshold) {
            debug!(episode, uv_index = uv.clamped_uv(), "UV below threshold; waiting");
            return;
        }

        self.leave_home = LeaveHomeState::Notified { episode, since };
        let request = NotificationRequest::leave_home(episode, &uv, at);
        self.emit(NotificationCommand::Deliver { request }, decision);
    }

    // ── UV ───────────────────────────────────────────────────────────

    fn on_uv(&mut self, sample: &UvSample, decision: &mut Decision) {
        if sample.is_malformed() {
            debug!("malformed UV sample ignored");
            return;
        }
        if let Some(latest) = &self.latest_uv {
            if sample.timestamp < latest.timestamp {
                debug!(at = %sample.timestamp, "stale UV sample ignored");
                return;
            }
        }
        self.latest_uv = Some(sample.clone());
        self.try_leave_home_alert(sample.timestamp, decision);
    }

    // ── Reapply ──────────────────────────────────────────────────────

    fn on_applied(&mut self, application: &SunscreenApplication, decision: &mut Decision) {
        if let Some((current_id, current_applied_at)) = self.reapply.application() {
            if application.id == current_id {
                debug!(application_id = %application.id, "application already tracked; ignored");
                return;
            }
            if application.applied_at < current_applied_at {
                debug!(
                    application_id = %application.id,
                    "application older than the current one; ignored"
                );
                return;
            }
        }

        self.cancel_pending_reminder(decision);

        let due_at = self.tracker.due_at(application);
        let request = NotificationRequest::reapply(
            application.id,
            application.applied_at,
            due_at,
            self.forecast.as_ref(),
        );
        let registered = self.emit(NotificationCommand::Schedule { request }, decision);
        self.reapply = ReapplyState::Scheduled {
            application_id: application.id,
            applied_at: application.applied_at,
            due_at,
            registered,
        };
        info!(application_id = %application.id, due_at = %due_at, "reapply reminder armed");
    }

    fn on_removed(&mut self, application_id: Uuid, _at: DateTime<Utc>, decision: &mut Decision) {
        match self.reapply.application() {
            Some((current, _)) if current == application_id => {
                self.cancel_pending_reminder(decision);
                self.reapply = ReapplyState::Idle;
                info!(application_id = %application_id, "current application removed");
            }
            _ => debug!(application_id = %application_id, "removed application was not current"),
        }
    }

    /// Cancel the tracked reminder if it is still live, armed or presented.
    fn cancel_pending_reminder(&mut self, decision: &mut Decision) {
        if let Some((application_id, _)) = self.reapply.application() {
            let key = reapply_key(application_id);
            if self.ledger.cancel(&key) {
                decision.commands.push(NotificationCommand::Cancel {
                    kind: NotificationKind::Reapply,
                    dedupe_key: key,
                });
            }
        }
    }

    fn on_reminder_due(&mut self, dedupe_key: &str, at: DateTime<Utc>, decision: &mut Decision) {
        let ReapplyState::Scheduled {
            application_id,
            applied_at,
            ..
        } = self.reapply
        else {
            decision.suppress(NotificationKind::Reapply, dedupe_key, SuppressionReason::NotCurrent);
            return;
        };
        if reapply_key(application_id) != dedupe_key {
            debug!(dedupe_key = %dedupe_key, "reminder for a superseded application");
            decision.suppress(NotificationKind::Reapply, dedupe_key, SuppressionReason::NotCurrent);
            return;
        }

        let uv_reason = match &self.latest_uv {
            None => Some(SuppressionReason::UvUnknown),
            Some(uv) if !uv.meets_threshold(self.config.uv_threshold) => {
                Some(SuppressionReason::UvBelowThreshold)
            }
            Some(_) => None,
        };
        if let Some(reason) = uv_reason {
            self.ledger.suppress(dedupe_key);
            decision.suppress(NotificationKind::Reapply, dedupe_key, reason);
            self.reapply = ReapplyState::Suppressed {
                application_id,
                applied_at,
                reason,
            };
            info!(dedupe_key = %dedupe_key, ?reason, "reapply reminder suppressed");
            return;
        }

        self.reapply = ReapplyState::Notified {
            application_id,
            applied_at,
        };
        let request =
            NotificationRequest::reapply(application_id, applied_at, at, self.forecast.as_ref());
        if !self.emit(NotificationCommand::Deliver { request }, decision) {
            // The armed timer fired but nothing was shown.
            self.ledger.suppress(dedupe_key);
        }
    }

    // ── Permission ───────────────────────────────────────────────────

    fn on_permission(&mut self, granted: bool, _at: DateTime<Utc>, decision: &mut Decision) {
        let was = self.permission_granted;
        self.permission_granted = granted;
        info!(granted, "notification permission changed");
        if was || !granted {
            return;
        }

        // Arm the reminder that could not be scheduled while permission was missing.
        if let ReapplyState::Scheduled {
            application_id,
            applied_at,
            due_at,
            registered: false,
        } = self.reapply
        {
            let request =
                NotificationRequest::reapply(application_id, applied_at, due_at, self.forecast.as_ref());
            let registered = self.emit(NotificationCommand::Schedule { request }, decision);
            self.reapply = ReapplyState::Scheduled {
                application_id,
                applied_at,
                due_at,
                registered,
            };
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Emit a schedule or deliver command unless gated. Returns whether it went out.
    fn emit(&mut self, command: NotificationCommand, decision: &mut Decision) -> bool {
        let kind = command.kind();
        let key = command.dedupe_key().to_string();

        let enabled = match kind {
            NotificationKind::LeaveHome => self.config.leave_home_enabled,
            NotificationKind::Reapply => self.config.reapply_enabled,
        };
        if !enabled {
            decision.suppress(kind, &key, SuppressionReason::KindDisabled);
            return false;
        }
        if !self.permission_granted {
            info!(kind = kind.as_str(), dedupe_key = %key, "permission missing; notification suppressed");
            decision.suppress(kind, &key, SuppressionReason::PermissionDenied);
            return false;
        }

        let accepted = match &command {
            NotificationCommand::Schedule { request } => {
                self.ledger.try_schedule(kind, &key, request.trigger_at)
            }
            NotificationCommand::Deliver { request } => {
                self.ledger.try_present(kind, &key, request.trigger_at)
            }
            NotificationCommand::Cancel { .. } => true,
        };
        if !accepted {
            debug!(dedupe_key = %key, "duplicate notification dropped");
            return false;
        }

        info!(kind = kind.as_str(), dedupe_key = %key, "notification emitted");
        decision.commands.push(command);
        true
    }
}

/// Rebuild an engine by folding a recorded event log.
pub fn replay<'a>(
    config: DecisionConfig,
    tracker: ProtectionTracker,
    permission_granted: bool,
    events: impl IntoIterator<Item = &'a EngineEvent>,
) -> NotificationDecisionEngine {
    let mut engine = NotificationDecisionEngine::new(config, tracker, permission_granted);
    for event in events {
        engine.handle(event);
    }
    engine
}
