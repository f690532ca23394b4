// src/matching/matcher.rs
use futures::future::try_join;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::config::MatcherConfig;
use crate::error::DuplicateCheckError;
use crate::matching::scorers::{ComparableProfile, FieldScorer};
use crate::models::records::{HouseholdRecord, ParticipantCandidate, ParticipantRecord};
use crate::models::report::{DuplicateReport, HouseholdMatchCandidate, MatchCandidate};
use crate::store::{HouseholdStore, ParticipantStore, StoreSnapshot};
use crate::utils::logging::{CheckKind, CheckLogger};

/// Pre-registration duplicate check against the participant and household stores.
#[derive(Clone)]
pub struct DuplicateMatcher {
    participants: Arc<dyn ParticipantStore>,
    households: Arc<dyn HouseholdStore>,
    config: MatcherConfig,
}

impl DuplicateMatcher {
    pub fn new(
        participants: Arc<dyn ParticipantStore>,
        households: Arc<dyn HouseholdStore>,
        config: MatcherConfig,
    ) -> Self {
        Self {
            participants,
            households,
            config,
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Scores the candidate against every stored participant and household member.
    ///
    /// Fails with `InvalidCandidate` before touching the stores when the name is blank,
    /// and with `DataUnavailable` when either store cannot be read within the fetch timeout.
    pub async fn check_duplicates(
        &self,
        candidate: &ParticipantCandidate,
    ) -> Result<DuplicateReport, DuplicateCheckError> {
        let logger = CheckLogger::new(CheckKind::Registration);
        validate_candidate(candidate)?;
        logger.log_start(&candidate.full_name);

        logger.log_phase("Loading data", Some("participants and households"));
        let snapshot = match self.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                logger.log_failure(&e.to_string());
                return Err(e);
            }
        };
        logger.log_data_loaded(snapshot.participants.len(), "participant");
        logger.log_data_loaded(snapshot.households.len(), "household");

        logger.log_phase("Scoring", None);
        build_report(candidate, &snapshot, &self.config, &logger)
    }

    /// Reads both stores concurrently under the configured timeout.
    pub async fn fetch_snapshot(&self) -> Result<StoreSnapshot, DuplicateCheckError> {
        let fetch = try_join(
            self.participants.list_participants(),
            self.households.list_households(),
        );
        match tokio::time::timeout(self.config.fetch_timeout, fetch).await {
            Ok(Ok((participants, households))) => Ok(StoreSnapshot {
                participants,
                households,
            }),
            Ok(Err(e)) => Err(DuplicateCheckError::from(e)),
            Err(_) => Err(DuplicateCheckError::DataUnavailable(format!(
                "store fetch timed out after {:?}",
                self.config.fetch_timeout
            ))),
        }
    }
}

/// Pure scoring pass over an already fetched snapshot.
pub fn check_against_snapshot(
    candidate: &ParticipantCandidate,
    snapshot: &StoreSnapshot,
    config: &MatcherConfig,
) -> Result<DuplicateReport, DuplicateCheckError> {
    validate_candidate(candidate)?;
    let logger = CheckLogger::new(CheckKind::Registration);
    build_report(candidate, snapshot, config, &logger)
}

fn validate_candidate(candidate: &ParticipantCandidate) -> Result<(), DuplicateCheckError> {
    if ComparableProfile::new(&candidate.full_name, None, None).name.is_empty() {
        return Err(DuplicateCheckError::InvalidCandidate(
            "full name is required".to_string(),
        ));
    }
    Ok(())
}

fn build_report(
    candidate: &ParticipantCandidate,
    snapshot: &StoreSnapshot,
    config: &MatcherConfig,
    logger: &CheckLogger,
) -> Result<DuplicateReport, DuplicateCheckError> {
    let scorer = FieldScorer::from_config(config);
    let profile = ComparableProfile::new(
        &candidate.full_name,
        candidate.address.as_deref(),
        candidate.birthday,
    );
    let mut skipped_records = 0usize;

    let mut personal_matches = Vec::new();
    for doc in &snapshot.participants {
        let record = match ParticipantRecord::from_document(doc) {
            Ok(record) => record,
            Err(e) => {
                logger.log_skipped_record(&e);
                skipped_records += 1;
                continue;
            }
        };
        if let Some(found) = score_participant(&scorer, &profile, &record, config.relevance_floor) {
            personal_matches.push(found);
        }
    }

    let mut household_matches = Vec::new();
    for doc in &snapshot.households {
        let household = match HouseholdRecord::from_document(doc) {
            Ok(household) => household,
            Err(e) => {
                logger.log_skipped_record(&e);
                skipped_records += 1;
                continue;
            }
        };
        for e in &household.malformed_members {
            logger.log_skipped_record(e);
            skipped_records += 1;
        }
        household_matches.extend(score_household(
            &scorer,
            &profile,
            &household,
            config.relevance_floor,
        ));
    }

    logger.log_debug(&format!(
        "{} participant and {} household member matches above {}%",
        personal_matches.len(),
        household_matches.len(),
        config.relevance_floor
    ));
    personal_matches.sort_by(compare_personal);
    household_matches.sort_by(compare_household);

    logger.log_completion(personal_matches.len(), household_matches.len(), skipped_records);
    Ok(DuplicateReport {
        has_duplicates: !personal_matches.is_empty() || !household_matches.is_empty(),
        personal_matches,
        household_matches,
        skipped_records,
    })
}

/// Scores one stored participant; `None` when it has no name or falls under the floor.
pub fn score_participant(
    scorer: &FieldScorer,
    profile: &ComparableProfile,
    record: &ParticipantRecord,
    relevance_floor: u8,
) -> Option<MatchCandidate> {
    let full_name = record.full_name.as_ref()?;
    let other = ComparableProfile::new(full_name, record.address.as_deref(), record.birthday);
    if other.name.is_empty() {
        return None;
    }
    let scores = scorer.score(profile, &other);
    let average_score = scores.average();
    if average_score < relevance_floor {
        return None;
    }
    Some(MatchCandidate {
        participant_id: record.id.clone(),
        full_name: full_name.clone(),
        location: record.address.clone(),
        birthday: record.birthday,
        scores,
        average_score,
    })
}

fn score_household(
    scorer: &FieldScorer,
    profile: &ComparableProfile,
    household: &HouseholdRecord,
    relevance_floor: u8,
) -> Vec<HouseholdMatchCandidate> {
    household
        .members
        .iter()
        .filter_map(|member| {
            let name = member.name.as_ref()?;
            let other = ComparableProfile::new(name, household.address.as_deref(), member.birthday);
            if other.name.is_empty() {
                return None;
            }
            let scores = scorer.score(profile, &other);
            let average_score = scores.average();
            if average_score < relevance_floor {
                return None;
            }
            Some(HouseholdMatchCandidate {
                household_id: household.household_id.clone(),
                household_name: household.household_name.clone(),
                participant_name: name.clone(),
                relationship: member.relationship.clone(),
                location: household.address.clone(),
                birthday: member.birthday,
                scores,
                average_score,
            })
        })
        .collect()
}

fn compare_personal(a: &MatchCandidate, b: &MatchCandidate) -> Ordering {
    b.average_score
        .cmp(&a.average_score)
        .then_with(|| a.full_name.cmp(&b.full_name))
        .then_with(|| a.participant_id.cmp(&b.participant_id))
}

fn compare_household(a: &HouseholdMatchCandidate, b: &HouseholdMatchCandidate) -> Ordering {
    b.average_score
        .cmp(&a.average_score)
        .then_with(|| a.participant_name.cmp(&b.participant_name))
        .then_with(|| a.household_id.cmp(&b.household_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::records::{HouseholdDocument, ParticipantDocument};
    use crate::store::memory::InMemoryStore;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn participant(id: &str, data: serde_json::Value) -> ParticipantDocument {
        ParticipantDocument {
            id: id.to_string(),
            data,
        }
    }

    fn juan() -> ParticipantCandidate {
        ParticipantCandidate::new("Juan Dela Cruz")
            .with_address("123 Rizal St, Baler, Aurora")
            .with_birthday(date(1990, 5, 1))
    }

    fn matcher_for(store: InMemoryStore) -> DuplicateMatcher {
        let store = Arc::new(store);
        DuplicateMatcher::new(store.clone(), store, MatcherConfig::default())
    }

    #[tokio::test]
    async fn test_identical_record_scores_100() {
        let store = InMemoryStore::new();
        store
            .insert_participant(participant(
                "SLP ID-100001",
                json!({
                    "fullName": "JUAN DELA CRUZ",
                    "address": "123 RIZAL ST, BALER, AURORA",
                    "birthday": "1990-05-01"
                }),
            ))
            .await;

        let report = matcher_for(store).check_duplicates(&juan()).await.unwrap();
        assert!(report.has_duplicates);
        assert_eq!(report.personal_matches.len(), 1);
        let found = &report.personal_matches[0];
        assert_eq!(found.participant_id, "SLP ID-100001");
        assert_eq!(found.scores.name_score, 100);
        assert_eq!(found.scores.soundex_score, 100);
        assert_eq!(found.scores.location_score, 100);
        assert_eq!(found.scores.birthday_score, 100);
        assert_eq!(found.average_score, 100);
    }

    #[tokio::test]
    async fn test_empty_store_has_no_duplicates() {
        let report = matcher_for(InMemoryStore::new())
            .check_duplicates(&juan())
            .await
            .unwrap();
        assert_eq!(report, DuplicateReport::empty());
    }

    #[tokio::test]
    async fn test_unrelated_record_is_excluded() {
        let store = InMemoryStore::new();
        store
            .insert_participant(participant(
                "SLP ID-100002",
                json!({ "fullName": "Pedro Reyes", "birthday": "1970-01-01" }),
            ))
            .await;
        let candidate = ParticipantCandidate::new("Maria Santos").with_birthday(date(1985, 3, 10));

        let report = matcher_for(store).check_duplicates(&candidate).await.unwrap();
        assert!(!report.has_duplicates);
        assert!(report.personal_matches.is_empty());
        assert!(report.household_matches.is_empty());
    }

    #[tokio::test]
    async fn test_household_member_match_only() {
        let store = InMemoryStore::new();
        store
            .insert_household(HouseholdDocument {
                id: "hh-doc-1".to_string(),
                data: json!({
                    "householdId": "HH-0042",
                    "householdName": "Dela Cruz Household",
                    "address": "123 Rizal Street, Baler, Aurora",
                    "members": [
                        { "name": "Juan Dela Cruz", "relationship": "Head", "birthday": "1990-05-01" },
                        { "name": "Rosa Dela Cruz", "relationship": "Spouse", "birthday": "1992-08-15" },
                        { "name": "Pedro Reyes", "relationship": "Boarder" }
                    ]
                }),
            })
            .await;

        let report = matcher_for(store).check_duplicates(&juan()).await.unwrap();
        assert!(report.has_duplicates);
        assert!(report.personal_matches.is_empty());
        assert_eq!(report.household_matches.len(), 2);
        let top = &report.household_matches[0];
        assert_eq!(top.household_id, "HH-0042");
        assert_eq!(top.participant_name, "Juan Dela Cruz");
        assert_eq!(top.relationship.as_deref(), Some("Head"));
        assert_eq!(top.average_score, 100);
        assert!(report.household_matches[1].average_score < 100);
    }

    #[tokio::test]
    async fn test_matches_sorted_and_above_floor() {
        let store = InMemoryStore::new();
        for (id, name, address, birthday) in [
            ("SLP ID-1", "Juan Dela Cruz", "123 Rizal St, Baler, Aurora", "1990-05-01"),
            ("SLP ID-2", "Juan Dela Cruz", "Purok 2, Casiguran, Aurora", "1990-05-01"),
            ("SLP ID-3", "Juan Cruz", "123 Rizal St, Baler, Aurora", "1991-01-01"),
            ("SLP ID-4", "Ana Villanueva", "Dingalan, Aurora", "1979-12-24"),
            ("SLP ID-5", "Jhuan Dela Cruz", "123 Rizal St, Baler, Aurora", "1990-05-01"),
        ] {
            store
                .insert_participant(participant(
                    id,
                    json!({ "fullName": name, "address": address, "birthday": birthday }),
                ))
                .await;
        }

        let report = matcher_for(store).check_duplicates(&juan()).await.unwrap();
        let scores: Vec<u8> = report.personal_matches.iter().map(|m| m.average_score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert!(scores.iter().all(|s| *s >= 50));
        assert_eq!(report.personal_matches[0].participant_id, "SLP ID-1");
        assert!(report
            .personal_matches
            .iter()
            .all(|m| m.participant_id != "SLP ID-4"));
        for m in &report.personal_matches {
            assert_eq!(m.average_score, m.scores.average());
        }
    }

    #[tokio::test]
    async fn test_equal_scores_break_ties_by_name() {
        let store = InMemoryStore::new();
        for (id, name) in [("SLP ID-9", "Juan Dela Cruz"), ("SLP ID-8", "Juan Dela Cruz")] {
            store
                .insert_participant(participant(id, json!({ "fullName": name })))
                .await;
        }
        let report = matcher_for(store)
            .check_duplicates(&ParticipantCandidate::new("Juan Dela Cruz"))
            .await
            .unwrap();
        let ids: Vec<&str> = report
            .personal_matches
            .iter()
            .map(|m| m.participant_id.as_str())
            .collect();
        assert_eq!(ids, vec!["SLP ID-8", "SLP ID-9"]);
    }

    #[tokio::test]
    async fn test_malformed_and_nameless_records_are_skipped() {
        let store = InMemoryStore::new();
        store
            .insert_participant(participant("SLP ID-10", json!({ "fullName": ["Juan"] })))
            .await;
        store
            .insert_participant(participant("SLP ID-11", json!({ "address": "Baler" })))
            .await;
        store
            .insert_participant(participant(
                "SLP ID-12",
                json!({ "fullName": "Juan Dela Cruz", "address": "123 Rizal St, Baler, Aurora", "birthday": "1990-05-01" }),
            ))
            .await;

        let report = matcher_for(store).check_duplicates(&juan()).await.unwrap();
        assert_eq!(report.skipped_records, 1);
        assert_eq!(report.personal_matches.len(), 1);
        assert_eq!(report.personal_matches[0].participant_id, "SLP ID-12");
    }

    #[tokio::test]
    async fn test_malformed_member_does_not_hide_household_match() {
        let store = InMemoryStore::new();
        store
            .insert_household(HouseholdDocument {
                id: "hh-doc-2".to_string(),
                data: json!({
                    "householdId": "HH-0043",
                    "members": [
                        { "name": "Juan Dela Cruz", "birthday": "1990-05-01" },
                        { "name": 42 }
                    ]
                }),
            })
            .await;

        let report = matcher_for(store).check_duplicates(&juan()).await.unwrap();
        assert!(report.has_duplicates);
        assert_eq!(report.skipped_records, 1);
        assert_eq!(report.household_matches.len(), 1);
        assert_eq!(report.household_matches[0].participant_name, "Juan Dela Cruz");
        assert_eq!(report.household_matches[0].scores.birthday_score, 100);
    }

    #[tokio::test]
    async fn test_names_outside_ascii_are_scored() {
        let store = InMemoryStore::new();
        for (id, name) in [
            ("SLP ID-40", "Łukasz Nowak"),
            ("SLP ID-41", "Иван Петров"),
            ("SLP ID-42", "Søren Ærø"),
        ] {
            store
                .insert_participant(participant(id, json!({ "fullName": name })))
                .await;
        }
        store
            .insert_household(HouseholdDocument {
                id: "hh-doc-3".to_string(),
                data: json!({ "members": [{ "name": "Đorđe Petrović" }] }),
            })
            .await;
        let matcher = matcher_for(store);

        let report = matcher
            .check_duplicates(&ParticipantCandidate::new("Łukasz Nowak"))
            .await
            .unwrap();
        assert_eq!(report.personal_matches[0].participant_id, "SLP ID-40");
        assert_eq!(report.personal_matches[0].scores.name_score, 100);
        assert_eq!(report.personal_matches[0].scores.soundex_score, 100);

        for name in ["Иван Петров", "Søren Ærø", "Đorđe Petrović", "Juan Dela Cruz"] {
            let report = matcher.check_duplicates(&ParticipantCandidate::new(name)).await;
            assert!(report.is_ok(), "check for {} failed", name);
        }
    }

    #[tokio::test]
    async fn test_timestamp_birthday_matches_date_string() {
        let store = InMemoryStore::new();
        store
            .insert_participant(participant(
                "SLP ID-50",
                json!({ "fullName": "Juan Dela Cruz", "birthday": { "seconds": 641_491_200 } }),
            ))
            .await;
        let report = matcher_for(store).check_duplicates(&juan()).await.unwrap();
        assert_eq!(report.personal_matches[0].scores.birthday_score, 100);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected_before_store_access() {
        let store = InMemoryStore::new();
        store.set_fail_reads(true);
        let err = matcher_for(store)
            .check_duplicates(&ParticipantCandidate::new("  ,  "))
            .await
            .unwrap_err();
        assert!(matches!(err, DuplicateCheckError::InvalidCandidate(_)));
    }

    #[tokio::test]
    async fn test_store_outage_is_data_unavailable() {
        let store = InMemoryStore::new();
        store.set_fail_reads(true);
        let err = matcher_for(store).check_duplicates(&juan()).await.unwrap_err();
        assert!(matches!(err, DuplicateCheckError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_slow_store_times_out() {
        let store = InMemoryStore::new();
        store.set_read_delay(Some(Duration::from_millis(200)));
        let store = Arc::new(store);
        let config = MatcherConfig {
            fetch_timeout: Duration::from_millis(20),
            ..MatcherConfig::default()
        };
        let matcher = DuplicateMatcher::new(store.clone(), store, config);
        let err = matcher.check_duplicates(&juan()).await.unwrap_err();
        assert!(matches!(err, DuplicateCheckError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_check_is_idempotent() {
        let store = InMemoryStore::new();
        store
            .insert_participant(participant(
                "SLP ID-20",
                json!({ "fullName": "Juan de la Cruz", "address": "Baler, Aurora" }),
            ))
            .await;
        let matcher = matcher_for(store);
        let first = matcher.check_duplicates(&juan()).await.unwrap();
        let second = matcher.check_duplicates(&juan()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_check_against_snapshot() {
        let snapshot = StoreSnapshot {
            participants: vec![participant(
                "SLP ID-30",
                json!({ "fullName": "DELA  CRUZ, JUAN", "birthday": "1990-05-01" }),
            )],
            households: Vec::new(),
        };
        let config = MatcherConfig {
            similarity: crate::matching::similarity::SimilarityStrategy::TokenSort,
            ..MatcherConfig::default()
        };
        let report = check_against_snapshot(&juan(), &snapshot, &config).unwrap();
        let found = &report.personal_matches[0];
        assert_eq!(found.scores.name_score, 100);
        assert_eq!(found.scores.soundex_score, 100);
        assert_eq!(found.scores.location_score, 0);
        assert_eq!(found.average_score, 75);
    }
}
