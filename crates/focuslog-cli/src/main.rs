use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "focuslog", version, about = "Focus timer and activity log")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Focus timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Activity log
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Aggregate statistics over the log
    Stats {
        #[command(subcommand)]
        action: Option<commands::stats::StatsAction>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Ask the mentor about your sessions
    Mentor {
        #[command(subcommand)]
        action: commands::mentor::MentorAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FOCUSLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action).await,
        Commands::Log { action } => commands::log::run(action).await,
        Commands::Stats { action } => commands::stats::run(action.unwrap_or_default()),
        Commands::Config { action } => commands::config::run(action),
        Commands::Mentor { action } => commands::mentor::run(action).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
