use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde_json::json;
use sunguard_core::storage::Database;
use sunguard_core::{ActivityLevel, Config, EngineEvent, Quantity, SunscreenApplication, ValidationError};
use uuid::Uuid;

use super::{feed_engine, print_json, resolve_time, CliResult};

#[derive(Subcommand)]
pub enum SunscreenAction {
    /// Log an application and arm its reapply reminder
    Apply {
        /// Nominal SPF on the bottle
        #[arg(long)]
        spf: f64,
        /// light, normal or heavy
        #[arg(long, default_value = "normal")]
        quantity: Quantity,
        /// sedentary, normal or active
        #[arg(long, default_value = "normal")]
        activity: ActivityLevel,
        /// Application time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Reapply the most recent product
    Reapply {
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Delete a logged application
    Remove {
        id: Uuid,
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Current protection and time until reapplication
    Status {
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Logged applications, newest first
    History {
        #[arg(long)]
        limit: Option<u32>,
    },
}

fn log_and_arm(db: &Database, config: &Config, application: SunscreenApplication) -> CliResult {
    db.log_application(&application)?;
    let due_at = config.tracker().due_at(&application);
    let decision = feed_engine(
        db,
        config,
        &EngineEvent::SunscreenApplied {
            application: application.clone(),
        },
    )?;
    print_json(&json!({
        "application": application,
        "due_at": due_at,
        "decision": decision,
    }))
}

pub fn run(action: SunscreenAction) -> CliResult {
    let config = Config::load()?;
    let db = Database::open()?;

    match action {
        SunscreenAction::Apply {
            spf,
            quantity,
            activity,
            at,
        } => {
            if !spf.is_finite() || spf <= 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: "spf".into(),
                    message: format!("expected a positive number, got {spf}"),
                }
                .into());
            }
            let application = SunscreenApplication::new(spf, quantity, activity, resolve_time(at));
            log_and_arm(&db, &config, application)?;
        }
        SunscreenAction::Reapply { at } => {
            let previous = db
                .applications(Some(1))?
                .into_iter()
                .next()
                .ok_or_else(|| ValidationError::NotFound {
                    entity: "sunscreen application".into(),
                    id: "latest".into(),
                })?;
            log_and_arm(&db, &config, previous.quick_reapply(resolve_time(at)))?;
        }
        SunscreenAction::Remove { id, at } => {
            if !db.delete_application(id)? {
                return Err(ValidationError::NotFound {
                    entity: "sunscreen application".into(),
                    id: id.to_string(),
                }
                .into());
            }
            let decision = feed_engine(
                &db,
                &config,
                &EngineEvent::SunscreenRemoved {
                    application_id: id,
                    at: resolve_time(at),
                },
            )?;
            print_json(&json!({ "removed": id, "decision": decision }))?;
        }
        SunscreenAction::Status { at } => {
            let status = config.tracker().status(&db.applications(None)?, resolve_time(at));
            print_json(&status)?;
        }
        SunscreenAction::History { limit } => {
            print_json(&db.applications(limit)?)?;
        }
    }
    Ok(())
}
