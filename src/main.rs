use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::sync::Arc;

use participant_matching::models::records::{NewParticipant, ParticipantCandidate};
use participant_matching::registration::{RegistrationService, ReviewDecision, StaticReviewer};
use participant_matching::store::postgres::PgDocumentStore;
use participant_matching::utils::db_connect::{connect, get_pool_status};
use participant_matching::utils::env::load_env;
use participant_matching::{DuplicateMatcher, MatcherConfig, RegistrationError};

/// Check a prospective participant against existing participant and household records.
#[derive(Parser, Debug)]
#[command(name = "check_participant", version, about)]
struct Args {
    /// Full name of the prospective participant
    #[arg(long)]
    full_name: String,

    /// Free-text address (street, barangay, municipality, province)
    #[arg(long)]
    address: Option<String>,

    /// Birthday, e.g. 1990-05-01 or 05/01/1990
    #[arg(long)]
    birthday: Option<String>,

    /// Create the participant after the check
    #[arg(long)]
    register: bool,

    /// With --register, proceed even when possible duplicates were found
    #[arg(long, requires = "register")]
    confirm_duplicates: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    load_env();
    let args = Args::parse();

    let config = MatcherConfig::from_env();
    config.log_config();

    let candidate = ParticipantCandidate::from_form(
        &args.full_name,
        args.address.as_deref(),
        args.birthday.as_deref(),
    )?;

    let pool = connect().await.context("Failed to connect to database")?;
    let store = Arc::new(PgDocumentStore::new(pool.clone()));
    store
        .ensure_schema()
        .await
        .context("Failed to prepare document tables")?;

    let matcher = DuplicateMatcher::new(store.clone(), store.clone(), config);

    if args.register {
        let decision = if args.confirm_duplicates {
            ReviewDecision::Confirm
        } else {
            ReviewDecision::Cancel
        };
        let service = RegistrationService::new(matcher, store);
        match service
            .register(&NewParticipant::from_candidate(candidate), &StaticReviewer(decision))
            .await
        {
            Ok(outcome) => {
                println!("{}", serde_json::to_string_pretty(&outcome.report)?);
                info!("Registered participant {}", outcome.participant_id);
            }
            Err(RegistrationError::Cancelled) => {
                anyhow::bail!("Possible duplicates found; re-run with --confirm-duplicates to register anyway")
            }
            Err(e) => return Err(e).context("Registration failed"),
        }
    } else {
        let report = matcher
            .check_duplicates(&candidate)
            .await
            .context("Unable to verify duplicates")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    let (size, idle) = get_pool_status(&pool);
    info!("Final DB Connection Pool Status: Total: {}, Idle: {}", size, idle);
    Ok(())
}
