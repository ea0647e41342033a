use clap::Subcommand;
use dojotrack_core::member::Member;
use dojotrack_core::storage::Database;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum MemberAction {
    /// Register a new member
    Add { name: String },
    /// Show one member
    Show { id: Uuid },
    /// List all members
    List,
    /// Belt progression snapshot
    Progress { id: Uuid },
}

pub fn run(action: MemberAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        MemberAction::Add { name } => {
            let member = Member::new(name);
            db.insert_member(&member)?;
            println!("{}", serde_json::to_string_pretty(&member)?);
        }
        MemberAction::Show { id } => {
            let member = db
                .member(id)?
                .ok_or_else(|| format!("member {id} not found"))?;
            println!("{}", serde_json::to_string_pretty(&member)?);
        }
        MemberAction::List => {
            let members = db.members()?;
            println!("{}", serde_json::to_string_pretty(&members)?);
        }
        MemberAction::Progress { id } => {
            let member = db
                .member(id)?
                .ok_or_else(|| format!("member {id} not found"))?;
            println!("{}", serde_json::to_string_pretty(&member.progress())?);
        }
    }
    Ok(())
}
