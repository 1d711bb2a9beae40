use chrono::{DateTime, Duration, Utc};
use clap::Args;
use serde_json::json;
use sunguard_core::storage::Database;
use sunguard_core::{Config, EngineEvent, FitzpatrickType, UvSample};

use super::{feed_engine, print_json, CliResult};

#[derive(Args)]
pub struct ForecastArgs {
    /// Time of the first sample (RFC 3339)
    #[arg(long)]
    start: DateTime<Utc>,
    /// Comma-separated UV values, one per sample interval
    #[arg(long, value_delimiter = ',', required = true)]
    uv: Vec<f64>,
    /// Skin type for the hourly risk column; defaults to the configured reference
    #[arg(long)]
    skin_type: Option<FitzpatrickType>,
    /// Don't pass the window to the notification engine
    #[arg(long)]
    no_engine: bool,
}

pub fn run(args: ForecastArgs) -> CliResult {
    let mut config = Config::load()?;
    if let Some(skin_type) = args.skin_type {
        config.forecast.reference_skin_type = skin_type;
    }
    let planner = config.planner();
    let interval = Duration::minutes(i64::from(planner.config().sample_interval_min.max(1)));

    let samples: Vec<UvSample> = args
        .uv
        .iter()
        .enumerate()
        .map(|(i, uv)| UvSample::new(args.start + interval * i as i32, *uv, 0.0))
        .collect();
    let summary = planner.summarize(&samples, &planner.reference_profile());

    let decision = if args.no_engine {
        None
    } else {
        let db = Database::open()?;
        Some(feed_engine(
            &db,
            &config,
            &EngineEvent::ForecastUpdated {
                window: summary.window.clone(),
            },
        )?)
    };

    print_json(&json!({ "summary": summary, "decision": decision }))
}
