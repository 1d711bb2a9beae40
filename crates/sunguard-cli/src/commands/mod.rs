pub mod burn;
pub mod config;
pub mod engine;
pub mod forecast;
pub mod profile;
pub mod sunscreen;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sunguard_core::notify::{NotificationKind, NotificationRequest, NotificationSink, SinkError};
use sunguard_core::storage::Database;
use sunguard_core::{Config, CoreError, Decision, EngineEvent, NotificationDecisionEngine};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

const ENGINE_KEY: &str = "decision_engine";

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `--at` if given, otherwise the wall clock.
pub fn resolve_time(at: Option<DateTime<Utc>>) -> DateTime<Utc> {
    at.unwrap_or_else(Utc::now)
}

pub fn fresh_engine(config: &Config) -> NotificationDecisionEngine {
    NotificationDecisionEngine::new(
        config.decision_config(),
        config.tracker(),
        config.notifications.permission_granted,
    )
}

/// Restore the persisted engine under the current configuration.
///
/// Unreadable state is replaced with a fresh engine; a failing store is an error.
pub fn load_engine(db: &Database, config: &Config) -> Result<NotificationDecisionEngine, CoreError> {
    let Some(json) = db.kv_get(ENGINE_KEY)? else {
        return Ok(fresh_engine(config));
    };
    match serde_json::from_str::<NotificationDecisionEngine>(&json) {
        Ok(mut engine) => {
            engine.reconfigure(config.decision_config(), config.tracker());
            Ok(engine)
        }
        Err(e) => {
            tracing::warn!(error = %e, "stored engine state unreadable; starting fresh");
            Ok(fresh_engine(config))
        }
    }
}

pub fn save_engine(db: &Database, engine: &NotificationDecisionEngine) -> Result<(), CoreError> {
    let json = serde_json::to_string(engine)?;
    db.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

pub fn reset_engine(db: &Database) -> CliResult {
    db.kv_delete(ENGINE_KEY)?;
    Ok(())
}

/// Load the engine, apply one event, hand the decision to the log sink and persist.
pub fn feed_engine(db: &Database, config: &Config, event: &EngineEvent) -> Result<Decision, Box<dyn std::error::Error>> {
    let mut engine = load_engine(db, config)?;
    let decision = engine.handle(event);
    decision.dispatch(&LogSink);
    save_engine(db, &engine)?;
    Ok(decision)
}

/// Stand-in delivery collaborator: the CLI has no notification service, so
/// commands are only logged. The JSON output carries them to the caller.
struct LogSink;

impl NotificationSink for LogSink {
    fn schedule(&self, request: &NotificationRequest) -> Result<(), SinkError> {
        tracing::info!(dedupe_key = %request.dedupe_key, trigger_at = %request.trigger_at, "schedule");
        Ok(())
    }

    fn deliver(&self, request: &NotificationRequest) -> Result<(), SinkError> {
        tracing::info!(dedupe_key = %request.dedupe_key, title = %request.title, "deliver");
        Ok(())
    }

    fn cancel(&self, kind: NotificationKind, dedupe_key: &str) -> Result<(), SinkError> {
        tracing::info!(kind = kind.as_str(), dedupe_key, "cancel");
        Ok(())
    }
}
