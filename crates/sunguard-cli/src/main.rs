use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sunguard", version, about = "SunGuard sun exposure CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Skin profile management
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Estimate minutes until sunburn
    Burn(commands::burn::BurnArgs),
    /// Sunscreen log and protection status
    Sunscreen {
        #[command(subcommand)]
        action: commands::sunscreen::SunscreenAction,
    },
    /// Protection window from hourly UV values
    Forecast(commands::forecast::ForecastArgs),
    /// Feed events to the notification engine
    Engine {
        #[command(subcommand)]
        action: commands::engine::EngineAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SUNGUARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Profile { action } => commands::profile::run(action),
        Commands::Burn(args) => commands::burn::run(args),
        Commands::Sunscreen { action } => commands::sunscreen::run(action),
        Commands::Forecast(args) => commands::forecast::run(args),
        Commands::Engine { action } => commands::engine::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
