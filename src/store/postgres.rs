// src/store/postgres.rs - participant and household documents kept as JSONB rows
use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;
use tokio_postgres::error::SqlState;

use crate::error::StoreError;
use crate::models::records::{HouseholdDocument, NewParticipant, ParticipantDocument, ParticipantId};
use crate::store::{HouseholdStore, ParticipantStore};
use crate::utils::db_connect::PgPool;

const CREATE_PARTICIPANT_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS public.participant_document (
        id TEXT PRIMARY KEY,
        data JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )";

const CREATE_HOUSEHOLD_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS public.household_document (
        id TEXT PRIMARY KEY,
        data JSONB NOT NULL
    )";

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        conn.batch_execute(&format!("{};{};", CREATE_PARTICIPANT_TABLE, CREATE_HOUSEHOLD_TABLE))
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        info!("Document tables are in place");
        Ok(())
    }

    async fn list_documents(&self, table: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let conn = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let query = format!("SELECT id, data FROM public.{} ORDER BY id", table);
        let rows = conn
            .query(query.as_str(), &[])
            .await
            .map_err(|e| StoreError::Query(format!("{}: {}", table, e)))?;
        debug!("Fetched {} rows from public.{}", rows.len(), table);
        rows.iter()
            .map(|row| {
                let id: String = row
                    .try_get("id")
                    .map_err(|e| StoreError::Query(e.to_string()))?;
                let data: Value = row
                    .try_get("data")
                    .map_err(|e| StoreError::Query(e.to_string()))?;
                Ok((id, data))
            })
            .collect()
    }
}

#[async_trait]
impl ParticipantStore for PgDocumentStore {
    async fn list_participants(&self) -> Result<Vec<ParticipantDocument>, StoreError> {
        Ok(self
            .list_documents("participant_document")
            .await?
            .into_iter()
            .map(|(id, data)| ParticipantDocument { id, data })
            .collect())
    }

    async fn create_participant(
        &self,
        id: &ParticipantId,
        participant: &NewParticipant,
    ) -> Result<ParticipantId, StoreError> {
        let doc = participant.to_document(id);
        let conn = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        conn.execute(
            "INSERT INTO public.participant_document (id, data) VALUES ($1, $2)",
            &[&doc.id, &doc.data],
        )
        .await
        .map_err(|e| {
            if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                StoreError::Conflict(id.to_string())
            } else {
                StoreError::Write(e.to_string())
            }
        })?;
        info!("Created participant {}", id);
        Ok(id.clone())
    }
}

#[async_trait]
impl HouseholdStore for PgDocumentStore {
    async fn list_households(&self) -> Result<Vec<HouseholdDocument>, StoreError> {
        Ok(self
            .list_documents("household_document")
            .await?
            .into_iter()
            .map(|(id, data)| HouseholdDocument { id, data })
            .collect())
    }
}
