use chrono::{DateTime, Utc};
use clap::Args;
use sunguard_core::storage::Database;
use sunguard_core::{Config, FitzpatrickType, SkinProfile, UvSample};

use super::{print_json, resolve_time, CliResult};

#[derive(Args)]
pub struct BurnArgs {
    /// Current UV index; omit when unknown
    #[arg(long)]
    uv: Option<f64>,
    /// Cloud cover fraction 0.0-1.0
    #[arg(long, default_value = "0")]
    cloud: f64,
    /// Override the stored profile's skin type
    #[arg(long)]
    skin_type: Option<FitzpatrickType>,
    /// Ignore logged sunscreen
    #[arg(long)]
    bare: bool,
    /// Evaluation time (RFC 3339), defaults to now
    #[arg(long)]
    at: Option<DateTime<Utc>>,
}

pub fn run(args: BurnArgs) -> CliResult {
    let config = Config::load()?;
    let db = Database::open()?;
    let now = resolve_time(args.at);

    let profile = match args.skin_type {
        Some(skin_type) => Some(SkinProfile::new(skin_type, now)),
        None => db.current_profile()?,
    };
    let sample = args.uv.map(|uv| UvSample::new(now, uv, args.cloud));
    let tracker = config.tracker();
    let history = if args.bare { Vec::new() } else { db.applications(None)? };
    let protection = tracker
        .current_application(&history, now)
        .and_then(|current| tracker.active_protection(current, now));

    let result = config
        .model()
        .estimate_burn_time(profile.as_ref(), sample.as_ref(), protection.as_ref());
    print_json(&result)
}
