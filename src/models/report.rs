// src/models/report.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-field similarity percentages for one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScores {
    pub name_score: u8,
    pub soundex_score: u8,
    pub location_score: u8,
    pub birthday_score: u8,
}

impl ComponentScores {
    /// Rounded mean of the four components, halves rounding up.
    pub fn average(&self) -> u8 {
        let sum = self.name_score as u32
            + self.soundex_score as u32
            + self.location_score as u32
            + self.birthday_score as u32;
        ((sum + 2) / 4) as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub participant_id: String,
    pub full_name: String,
    pub location: Option<String>,
    pub birthday: Option<NaiveDate>,
    #[serde(flatten)]
    pub scores: ComponentScores,
    pub average_score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdMatchCandidate {
    pub household_id: String,
    pub household_name: String,
    pub participant_name: String,
    pub relationship: Option<String>,
    pub location: Option<String>,
    pub birthday: Option<NaiveDate>,
    #[serde(flatten)]
    pub scores: ComponentScores,
    pub average_score: u8,
}

/// Outcome of one pre-registration duplicate check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateReport {
    pub has_duplicates: bool,
    pub personal_matches: Vec<MatchCandidate>,
    pub household_matches: Vec<HouseholdMatchCandidate>,
    /// Stored records that could not be decoded and were left out of the scan.
    pub skipped_records: usize,
}

impl DuplicateReport {
    pub fn empty() -> Self {
        Self {
            has_duplicates: false,
            personal_matches: Vec::new(),
            household_matches: Vec::new(),
            skipped_records: 0,
        }
    }

    /// Highest average score across both lists, if any match was surfaced.
    pub fn best_score(&self) -> Option<u8> {
        let personal = self.personal_matches.iter().map(|m| m.average_score);
        let household = self.household_matches.iter().map(|m| m.average_score);
        personal.chain(household).max()
    }

    pub fn total_matches(&self) -> usize {
        self.personal_matches.len() + self.household_matches.len()
    }
}
