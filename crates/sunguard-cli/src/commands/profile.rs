use chrono::{DateTime, Utc};
use clap::Subcommand;
use sunguard_core::storage::Database;
use sunguard_core::{FitzpatrickType, SkinProfile};

use super::{print_json, resolve_time, CliResult};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Record a new skin profile (it becomes the current one)
    Set {
        /// Fitzpatrick type: 1-6 or I-VI
        skin_type: FitzpatrickType,
        /// Creation time (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Print the current profile as JSON
    Show,
}

pub fn run(action: ProfileAction) -> CliResult {
    let db = Database::open()?;
    match action {
        ProfileAction::Set { skin_type, at } => {
            let profile = SkinProfile::new(skin_type, resolve_time(at));
            db.create_profile(&profile)?;
            print_json(&profile)?;
        }
        ProfileAction::Show => {
            let profile = db.current_profile()?;
            print_json(&serde_json::json!({
                "profile": profile,
                "description": profile.as_ref().map(|p| p.skin_type.description()),
            }))?;
        }
    }
    Ok(())
}
