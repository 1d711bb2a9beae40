use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde_json::json;
use sunguard_core::storage::Database;
use sunguard_core::{Config, EngineEvent, UvSample};

use super::{feed_engine, fresh_engine, load_engine, print_json, reset_engine, resolve_time, CliResult};

#[derive(Subcommand)]
pub enum EngineAction {
    /// Left the home geofence
    Exit {
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Returned inside the home geofence
    Enter {
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// New UV reading
    Uv {
        uv_index: f64,
        #[arg(long, default_value = "0")]
        cloud: f64,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// A scheduled reminder fired
    Due {
        dedupe_key: String,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// A presented notification reached the user
    Delivered {
        dedupe_key: String,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Notification permission granted or revoked
    Permission {
        #[arg(action = clap::ArgAction::Set)]
        granted: bool,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Print engine state as JSON
    Status,
    /// Discard engine state
    Reset,
}

pub fn run(action: EngineAction) -> CliResult {
    let mut config = Config::load()?;
    let db = Database::open()?;

    let event = match action {
        EngineAction::Exit { at } => EngineEvent::GeofenceExited {
            at: resolve_time(at),
        },
        EngineAction::Enter { at } => EngineEvent::GeofenceEntered {
            at: resolve_time(at),
        },
        EngineAction::Uv {
            uv_index,
            cloud,
            at,
        } => EngineEvent::UvUpdated {
            sample: UvSample::new(resolve_time(at), uv_index, cloud),
        },
        EngineAction::Due { dedupe_key, at } => EngineEvent::ReminderDue {
            dedupe_key,
            at: resolve_time(at),
        },
        EngineAction::Delivered { dedupe_key, at } => EngineEvent::NotificationDelivered {
            dedupe_key,
            at: resolve_time(at),
        },
        EngineAction::Permission { granted, at } => {
            config.notifications.permission_granted = granted;
            config.save()?;
            EngineEvent::PermissionChanged {
                granted,
                at: resolve_time(at),
            }
        }
        EngineAction::Status => {
            let engine = load_engine(&db, &config)?;
            return print_json(&engine);
        }
        EngineAction::Reset => {
            reset_engine(&db)?;
            return print_json(&fresh_engine(&config));
        }
    };

    let decision = feed_engine(&db, &config, &event)?;
    print_json(&json!({ "event": event, "decision": decision }))
}
