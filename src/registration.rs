//! Registration flow: duplicate check, reviewer confirmation, then create.
//!
//! Nothing is written unless the check succeeds and, when duplicates were
//! surfaced, the reviewer explicitly confirms.

use async_trait::async_trait;
use log::{info, warn};
use rand::Rng;
use std::sync::Arc;

use crate::error::{RegistrationError, StoreError};
use crate::matching::matcher::DuplicateMatcher;
use crate::models::records::{NewParticipant, ParticipantId};
use crate::models::report::DuplicateReport;
use crate::store::ParticipantStore;

const ID_PREFIX: &str = "SLP ID-";
const MAX_ID_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Confirm,
    Cancel,
}

/// Whoever decides what happens when a check surfaces possible duplicates.
#[async_trait]
pub trait DuplicateReviewer: Send + Sync {
    async fn review(&self, report: &DuplicateReport) -> ReviewDecision;
}

/// Reviewer that always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticReviewer(pub ReviewDecision);

#[async_trait]
impl DuplicateReviewer for StaticReviewer {
    async fn review(&self, _report: &DuplicateReport) -> ReviewDecision {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationOutcome {
    pub participant_id: ParticipantId,
    pub report: DuplicateReport,
}

pub struct RegistrationService {
    matcher: DuplicateMatcher,
    participants: Arc<dyn ParticipantStore>,
}

impl RegistrationService {
    pub fn new(matcher: DuplicateMatcher, participants: Arc<dyn ParticipantStore>) -> Self {
        Self {
            matcher,
            participants,
        }
    }

    pub async fn register(
        &self,
        participant: &NewParticipant,
        reviewer: &dyn DuplicateReviewer,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let report = self.matcher.check_duplicates(&participant.candidate).await?;

        if report.has_duplicates {
            info!(
                "{} possible duplicates for '{}' (best {}%), awaiting review",
                report.total_matches(),
                participant.candidate.full_name,
                report.best_score().unwrap_or(0)
            );
            if reviewer.review(&report).await == ReviewDecision::Cancel {
                info!("Registration of '{}' cancelled by reviewer", participant.candidate.full_name);
                return Err(RegistrationError::Cancelled);
            }
        }

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = generate_participant_id();
            match self.participants.create_participant(&id, participant).await {
                Ok(participant_id) => {
                    info!("Registered '{}' as {}", participant.candidate.full_name, participant_id);
                    return Ok(RegistrationOutcome {
                        participant_id,
                        report,
                    });
                }
                Err(StoreError::Conflict(taken)) => {
                    warn!("Generated id {} already taken (attempt {})", taken, attempt);
                }
                Err(e) => return Err(RegistrationError::StoreWrite(e)),
            }
        }
        Err(RegistrationError::StoreWrite(StoreError::Conflict(format!(
            "no free participant id after {} attempts",
            MAX_ID_ATTEMPTS
        ))))
    }
}

/// Random identifier of the form `SLP ID-NNNNNN`.
pub fn generate_participant_id() -> ParticipantId {
    let number: u32 = rand::thread_rng().gen_range(0..1_000_000);
    ParticipantId(format!("{}{:06}", ID_PREFIX, number))
}
