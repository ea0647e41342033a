use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;

#[derive(Parser)]
#[command(name = "dojotrack", version, about = "Dojotrack CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a training check-in for a member
    Checkin {
        /// Member id
        member: Uuid,
    },
    /// Member management
    Member {
        #[command(subcommand)]
        action: commands::member::MemberAction,
    },
    /// Attendance log
    Attendance {
        #[command(subcommand)]
        action: commands::attendance::AttendanceAction,
    },
    /// Attendance statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Checkin { member } => commands::checkin::run(member),
        Commands::Member { action } => commands::member::run(action),
        Commands::Attendance { action } => commands::attendance::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
