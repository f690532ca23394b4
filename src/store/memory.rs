// src/store/memory.rs
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::records::{HouseholdDocument, NewParticipant, ParticipantDocument, ParticipantId};
use crate::store::{HouseholdStore, ParticipantStore, StoreSnapshot};

/// Document store held in process memory. Outages and slow reads can be simulated.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    participants: RwLock<Vec<ParticipantDocument>>,
    households: RwLock<Vec<HouseholdDocument>>,
    fail_reads: AtomicBool,
    read_delay: Mutex<Option<Duration>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            participants: RwLock::new(snapshot.participants),
            households: RwLock::new(snapshot.households),
            ..Self::default()
        }
    }

    pub async fn insert_participant(&self, doc: ParticipantDocument) {
        self.participants.write().await.push(doc);
    }

    pub async fn insert_household(&self, doc: HouseholdDocument) {
        self.households.write().await.push(doc);
    }

    pub async fn participant_count(&self) -> usize {
        self.participants.read().await.len()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_read_delay(&self, delay: Option<Duration>) {
        if let Ok(mut guard) = self.read_delay.lock() {
            *guard = delay;
        }
    }

    async fn before_read(&self) -> Result<(), StoreError> {
        let delay = self.read_delay.lock().ok().and_then(|guard| *guard);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("in-memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ParticipantStore for InMemoryStore {
    async fn list_participants(&self) -> Result<Vec<ParticipantDocument>, StoreError> {
        self.before_read().await?;
        Ok(self.participants.read().await.clone())
    }

    async fn create_participant(
        &self,
        id: &ParticipantId,
        participant: &NewParticipant,
    ) -> Result<ParticipantId, StoreError> {
        let mut participants = self.participants.write().await;
        if participants.iter().any(|doc| doc.id == id.0) {
            return Err(StoreError::Conflict(id.to_string()));
        }
        participants.push(participant.to_document(id));
        Ok(id.clone())
    }
}

#[async_trait]
impl HouseholdStore for InMemoryStore {
    async fn list_households(&self) -> Result<Vec<HouseholdDocument>, StoreError> {
        self.before_read().await?;
        Ok(self.households.read().await.clone())
    }
}
