//! Leave-home and reapply notification decisions.
//!
//! The engine consumes [`EngineEvent`](crate::events::EngineEvent)s and answers
//! with a [`Decision`]: commands for the delivery collaborator plus the
//! notifications it deliberately withheld.

pub mod engine;
pub mod ledger;
pub mod request;
pub mod shared;
pub mod sink;

pub use engine::{replay, DecisionConfig, LeaveHomeState, NotificationDecisionEngine, ReapplyState};
pub use ledger::{NotificationLedger, NotificationRecord, NotificationStatus};
pub use request::{
    leave_home_key, reapply_key, Decision, NotificationAction, NotificationCommand,
    NotificationKind, NotificationRequest, Suppression, SuppressionReason,
};
pub use shared::SharedDecisionEngine;
pub use sink::{NotificationSink, RecordingSink, SinkError};
