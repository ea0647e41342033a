use chrono::Utc;
use clap::Subcommand;
use dojotrack_core::member::month_key;
use dojotrack_core::storage::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// One month's totals (defaults to the current month)
    Month {
        /// "YYYY-MM"
        month: Option<String>,
    },
    /// All-time totals
    All,
    /// Per-month breakdown, oldest first
    Months,
    /// Member head-count per belt
    Belts,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Month { month } => {
            let key = month.unwrap_or_else(|| month_key(Utc::now()));
            let stats = db.stats_month(&key)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::All => {
            let stats = db.stats_all()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Months => {
            let stats = db.monthly_breakdown()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Belts => {
            let stats = db.belt_distribution()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
