use clap::{Parser, Subcommand};
use ecomonitor_core::Config;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "ecomonitor-cli", version, about = "EcoMonitor session core CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily engagement streak
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Guest identity and free-use quota
    Guest {
        #[command(subcommand)]
        action: commands::guest::GuestAction,
    },
    /// Compute the engagement score
    Score(commands::score::ScoreArgs),
    /// Biometric app lock
    Lock {
        #[command(subcommand)]
        action: commands::lock::LockAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// RUST_LOG wins over `logging.filter`. Events go to stderr so stdout
/// stays machine-readable.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_tracing(&config);

    let result = match cli.command {
        Commands::Streak { action } => commands::streak::run(action, &config).await,
        Commands::Guest { action } => commands::guest::run(action, &config).await,
        Commands::Score(args) => commands::score::run(args, &config).await,
        Commands::Lock { action } => commands::lock::run(action, &config).await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
