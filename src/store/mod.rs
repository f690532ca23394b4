// src/store/mod.rs
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::records::{HouseholdDocument, NewParticipant, ParticipantDocument, ParticipantId};

/// Read and append access to participant documents.
#[async_trait]
pub trait ParticipantStore: Send + Sync {
    async fn list_participants(&self) -> Result<Vec<ParticipantDocument>, StoreError>;

    async fn create_participant(
        &self,
        id: &ParticipantId,
        participant: &NewParticipant,
    ) -> Result<ParticipantId, StoreError>;
}

#[async_trait]
pub trait HouseholdStore: Send + Sync {
    async fn list_households(&self) -> Result<Vec<HouseholdDocument>, StoreError>;
}

/// Participant and household documents fetched for a single check.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub participants: Vec<ParticipantDocument>,
    pub households: Vec<HouseholdDocument>,
}
