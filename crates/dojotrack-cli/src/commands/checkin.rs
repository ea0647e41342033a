use chrono::Utc;
use dojotrack_core::checkin::CheckInService;
use dojotrack_core::storage::{Config, Database};
use uuid::Uuid;

pub fn run(member: Uuid) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let service = CheckInService::new(&db, config.check_in_policy());

    let receipt = service.check_in(member, Utc::now())?;
    println!("{}", serde_json::to_string_pretty(&receipt)?);
    Ok(())
}
