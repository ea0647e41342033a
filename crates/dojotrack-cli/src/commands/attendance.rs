use clap::Subcommand;
use dojotrack_core::storage::{Config, Database};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum AttendanceAction {
    /// Recent attendance records, newest first
    List {
        /// Restrict to one member
        #[arg(long)]
        member: Option<Uuid>,
        /// Maximum records (defaults to attendance.list_limit)
        #[arg(long)]
        limit: Option<u32>,
    },
}

pub fn run(action: AttendanceAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();

    match action {
        AttendanceAction::List { member, limit } => {
            let limit = limit.unwrap_or(config.attendance.list_limit);
            let records = match member {
                Some(id) => db.attendance_for_member(id, limit)?,
                None => db.recent_attendance(limit)?,
            };
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}
