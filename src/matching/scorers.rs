// src/matching/scorers.rs
use chrono::NaiveDate;

use crate::config::{BirthdayPolicy, MatcherConfig};
use crate::matching::normalize::{normalize_address, normalize_name};
use crate::matching::phonetic::{soundex_codes, soundex_score};
use crate::matching::similarity::{to_percent, SimilarityStrategy};
use crate::models::report::ComponentScores;

/// Name, location and birthday of one person, normalized once and reused across comparisons.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparableProfile {
    pub name: String,
    pub soundex: Vec<String>,
    pub address: String,
    pub birthday: Option<NaiveDate>,
}

impl ComparableProfile {
    pub fn new(full_name: &str, address: Option<&str>, birthday: Option<NaiveDate>) -> Self {
        let name = normalize_name(full_name);
        let soundex = soundex_codes(&name);
        Self {
            name,
            soundex,
            address: address.map(normalize_address).unwrap_or_default(),
            birthday,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldScorer {
    similarity: SimilarityStrategy,
    birthday_policy: BirthdayPolicy,
}

impl FieldScorer {
    pub fn new(similarity: SimilarityStrategy, birthday_policy: BirthdayPolicy) -> Self {
        Self {
            similarity,
            birthday_policy,
        }
    }

    pub fn from_config(config: &MatcherConfig) -> Self {
        Self::new(config.similarity, config.birthday_policy)
    }

    pub fn name_score(&self, a: &ComparableProfile, b: &ComparableProfile) -> u8 {
        self.similarity.percent(&a.name, &b.name)
    }

    pub fn soundex_score(&self, a: &ComparableProfile, b: &ComparableProfile) -> u8 {
        soundex_score(&a.soundex, &b.soundex)
    }

    pub fn location_score(&self, a: &ComparableProfile, b: &ComparableProfile) -> u8 {
        self.similarity.percent(&a.address, &b.address)
    }

    pub fn birthday_score(&self, a: Option<NaiveDate>, b: Option<NaiveDate>) -> u8 {
        let (a, b) = match (a, b) {
            (Some(a), Some(b)) => (a, b),
            _ => return 0,
        };
        if a == b {
            return 100;
        }
        match self.birthday_policy {
            BirthdayPolicy::Exact => 0,
            BirthdayPolicy::LinearDecay { horizon_days } => {
                let days = (a - b).num_days().unsigned_abs();
                if horizon_days == 0 || days >= horizon_days as u64 {
                    0
                } else {
                    to_percent(1.0 - days as f64 / horizon_days as f64).min(99)
                }
            }
        }
    }

    pub fn score(&self, a: &ComparableProfile, b: &ComparableProfile) -> ComponentScores {
        ComponentScores {
            name_score: self.name_score(a, b),
            soundex_score: self.soundex_score(a, b),
            location_score: self.location_score(a, b),
            birthday_score: self.birthday_score(a.birthday, b.birthday),
        }
    }
}
