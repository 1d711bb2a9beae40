use std::sync::{Mutex, PoisonError};

use tracing::warn;

use super::request::{Decision, NotificationCommand, NotificationKind, NotificationRequest};

pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Delivery collaborator. Implementations talk to the platform notification
/// service; the engine never calls one directly.
pub trait NotificationSink: Send + Sync {
    /// Arm a timer. When it fires the host must feed `ReminderDue` back to the engine.
    fn schedule(&self, request: &NotificationRequest) -> Result<(), SinkError>;

    /// Present immediately.
    fn deliver(&self, request: &NotificationRequest) -> Result<(), SinkError>;

    /// Drop a pending timer or visible notification.
    fn cancel(&self, kind: NotificationKind, dedupe_key: &str) -> Result<(), SinkError>;
}

impl Decision {
    /// Hand every command to `sink` in order. Failures are logged, not retried;
    /// returns how many commands failed.
    pub fn dispatch(&self, sink: &dyn NotificationSink) -> usize {
        let mut failures = 0;
        for command in &self.commands {
            let result = match command {
                NotificationCommand::Schedule { request } => sink.schedule(request),
                NotificationCommand::Deliver { request } => sink.deliver(request),
                NotificationCommand::Cancel { kind, dedupe_key } => sink.cancel(*kind, dedupe_key),
            };
            if let Err(e) = result {
                warn!(dedupe_key = command.dedupe_key(), error = %e, "notification sink failed");
                failures += 1;
            }
        }
        failures
    }
}

/// Sink that only remembers what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands: Mutex<Vec<NotificationCommand>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<NotificationCommand> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<NotificationCommand>> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, command: NotificationCommand) -> Result<(), SinkError> {
        self.lock().push(command);
        Ok(())
    }
}

impl NotificationSink for RecordingSink {
    fn schedule(&self, request: &NotificationRequest) -> Result<(), SinkError> {
        self.record(NotificationCommand::Schedule {
            request: request.clone(),
        })
    }

    fn deliver(&self, request: &NotificationRequest) -> Result<(), SinkError> {
        self.record(NotificationCommand::Deliver {
            request: request.clone(),
        })
    }

    fn cancel(&self, kind: NotificationKind, dedupe_key: &str) -> Result<(), SinkError> {
        self.record(NotificationCommand::Cancel {
            kind,
            dedupe_key: dedupe_key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    impl NotificationSink for FailingSink {
        fn schedule(&self, _request: &NotificationRequest) -> Result<(), SinkError> {
            Err("timer service unavailable".into())
        }
        fn deliver(&self, _request: &NotificationRequest) -> Result<(), SinkError> {
            Ok(())
        }
        fn cancel(&self, _kind: NotificationKind, _dedupe_key: &str) -> Result<(), SinkError> {
            Err("gone".into())
        }
    }

    fn decision() -> Decision {
        let now = chrono::Utc::now();
        let sample = crate::exposure::UvSample::new(now, 7.0, 0.0);
        Decision {
            commands: vec![
                NotificationCommand::Cancel {
                    kind: NotificationKind::Reapply,
                    dedupe_key: "reapply:old".into(),
                },
                NotificationCommand::Deliver {
                    request: NotificationRequest::leave_home(1, &sample, now),
                },
            ],
            suppressed: Vec::new(),
        }
    }

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        assert_eq!(decision().dispatch(&sink), 0);
        let seen = sink.commands();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].dedupe_key(), "reapply:old");
        assert_eq!(seen[1].dedupe_key(), "leave-home:1");
    }

    #[test]
    fn failures_are_counted_and_do_not_stop_dispatch() {
        assert_eq!(decision().dispatch(&FailingSink), 1);
    }
}
