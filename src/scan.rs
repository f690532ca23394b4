// src/scan.rs - pairwise duplicate scan over every stored participant
use serde::Serialize;
use std::cmp::Ordering;
use std::time::Instant;
use uuid::Uuid;

use crate::config::MatcherConfig;
use crate::error::DuplicateCheckError;
use crate::matching::scorers::{ComparableProfile, FieldScorer};
use crate::models::records::{ParticipantDocument, ParticipantRecord};
use crate::models::report::ComponentScores;
use crate::store::ParticipantStore;
use crate::utils::logging::{CheckKind, CheckLogger};
use crate::utils::progress_config::ProgressConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicatePair {
    pub participant_id_a: String,
    pub full_name_a: String,
    pub participant_id_b: String,
    pub full_name_b: String,
    #[serde(flatten)]
    pub scores: ComponentScores,
    pub average_score: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub scan_id: Uuid,
    pub records_scanned: usize,
    pub records_skipped: usize,
    pub pairs_compared: usize,
    pub duplicates: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub summary: ScanSummary,
    pub pairs: Vec<DuplicatePair>,
}

/// Fetches every participant and reports all pairs at or above the relevance floor.
pub async fn scan_store(
    store: &dyn ParticipantStore,
    config: &MatcherConfig,
    progress: &ProgressConfig,
) -> Result<ScanResult, DuplicateCheckError> {
    let docs = match tokio::time::timeout(config.fetch_timeout, store.list_participants()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(DuplicateCheckError::DataUnavailable(format!(
                "participant fetch timed out after {:?}",
                config.fetch_timeout
            )))
        }
    };
    Ok(scan_records(&docs, config, progress))
}

pub fn scan_records(
    docs: &[ParticipantDocument],
    config: &MatcherConfig,
    progress: &ProgressConfig,
) -> ScanResult {
    let start = Instant::now();
    let scan_id = Uuid::new_v4();
    let logger = CheckLogger::new(CheckKind::Scan);
    logger.log_start(&format!("scan {}", scan_id));
    logger.log_data_loaded(docs.len(), "participant");

    let scorer = FieldScorer::from_config(config);
    let mut records_skipped = 0usize;
    let mut profiles: Vec<(ParticipantRecord, ComparableProfile)> = Vec::with_capacity(docs.len());
    for doc in docs {
        match ParticipantRecord::from_document(doc) {
            Ok(record) => {
                let Some(name) = record.full_name.as_deref() else {
                    continue;
                };
                let profile = ComparableProfile::new(name, record.address.as_deref(), record.birthday);
                if !profile.name.is_empty() {
                    profiles.push((record, profile));
                }
            }
            Err(e) => {
                logger.log_skipped_record(&e);
                records_skipped += 1;
            }
        }
    }

    logger.log_phase("Comparing pairs", Some(&format!("{} comparable records", profiles.len())));
    let pb = progress.create_bar(profiles.len() as u64, "Scanning participants");
    let mut pairs = Vec::new();
    let mut pairs_compared = 0usize;
    for (i, (record_a, profile_a)) in profiles.iter().enumerate() {
        for (record_b, profile_b) in profiles.iter().skip(i + 1) {
            pairs_compared += 1;
            let scores = scorer.score(profile_a, profile_b);
            let average_score = scores.average();
            if average_score < config.relevance_floor {
                continue;
            }
            pairs.push(DuplicatePair {
                participant_id_a: record_a.id.clone(),
                full_name_a: record_a.full_name.clone().unwrap_or_default(),
                participant_id_b: record_b.id.clone(),
                full_name_b: record_b.full_name.clone().unwrap_or_default(),
                scores,
                average_score,
            });
        }
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }
    if let Some(pb) = pb {
        pb.finish_with_message(format!("{} possible duplicates", pairs.len()));
    }

    pairs.sort_by(compare_pairs);
    logger.log_scan_completion(pairs.len(), pairs_compared, records_skipped);

    ScanResult {
        summary: ScanSummary {
            scan_id,
            records_scanned: profiles.len(),
            records_skipped,
            pairs_compared,
            duplicates: pairs.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        },
        pairs,
    }
}

fn compare_pairs(a: &DuplicatePair, b: &DuplicatePair) -> Ordering {
    b.average_score
        .cmp(&a.average_score)
        .then_with(|| a.participant_id_a.cmp(&b.participant_id_a))
        .then_with(|| a.participant_id_b.cmp(&b.participant_id_b))
}
