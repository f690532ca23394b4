//! Matcher configuration loaded from environment variables.

use log::{debug, info, warn};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::matching::similarity::SimilarityStrategy;

pub const DEFAULT_RELEVANCE_FLOOR: u8 = 50;
pub const DEFAULT_BIRTHDAY_DECAY_DAYS: u32 = 1826; // five years
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// How a non-identical pair of birthdays is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirthdayPolicy {
    /// Identical dates score 100, anything else 0.
    Exact,
    /// Linear decay from 100 at zero days apart down to 0 at `horizon_days`.
    LinearDecay { horizon_days: u32 },
}

impl Default for BirthdayPolicy {
    fn default() -> Self {
        BirthdayPolicy::Exact
    }
}

#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Minimum average score for a match to be surfaced.
    pub relevance_floor: u8,
    pub similarity: SimilarityStrategy,
    pub birthday_policy: BirthdayPolicy,
    /// Upper bound on the store fetch; exceeding it is treated as the store being unavailable.
    pub fetch_timeout: Duration,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            relevance_floor: DEFAULT_RELEVANCE_FLOOR,
            similarity: SimilarityStrategy::default(),
            birthday_policy: BirthdayPolicy::default(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl MatcherConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let relevance_floor = env::var("MATCH_RELEVANCE_FLOOR")
            .ok()
            .and_then(|v| v.parse::<u8>().ok())
            .map(|v| v.min(100))
            .unwrap_or(DEFAULT_RELEVANCE_FLOOR);

        let similarity = match env::var("MATCH_SIMILARITY_STRATEGY") {
            Ok(raw) => SimilarityStrategy::from_str(&raw).unwrap_or_else(|e| {
                warn!("{}; falling back to {:?}", e, SimilarityStrategy::default());
                SimilarityStrategy::default()
            }),
            Err(_) => SimilarityStrategy::default(),
        };

        let decay_days = env::var("MATCH_BIRTHDAY_DECAY_DAYS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_BIRTHDAY_DECAY_DAYS);

        let birthday_policy = match env::var("MATCH_BIRTHDAY_POLICY")
            .unwrap_or_else(|_| "exact".to_string())
            .trim()
            .to_lowercase()
            .as_str()
        {
            "decay" => BirthdayPolicy::LinearDecay {
                horizon_days: decay_days,
            },
            "exact" => BirthdayPolicy::Exact,
            other => {
                warn!("Unknown MATCH_BIRTHDAY_POLICY '{}'; using exact", other);
                BirthdayPolicy::Exact
            }
        };

        let fetch_timeout = Duration::from_secs(
            env::var("MATCH_FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
        );

        let config = Self {
            relevance_floor,
            similarity,
            birthday_policy,
            fetch_timeout,
        };
        debug!("Matcher config: {:?}", config);
        config
    }

    /// Log the current configuration
    pub fn log_config(&self) {
        info!("🔍 Duplicate matcher configuration");
        info!("   Relevance floor: {}%", self.relevance_floor);
        info!("   Similarity strategy: {:?}", self.similarity);
        match self.birthday_policy {
            BirthdayPolicy::Exact => info!("   Birthday policy: exact date only"),
            BirthdayPolicy::LinearDecay { horizon_days } => {
                info!("   Birthday policy: linear decay over {} days", horizon_days)
            }
        }
        info!("   Store fetch timeout: {:?}", self.fetch_timeout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, keep every env case in this one test.
    #[test]
    fn test_config_from_env() {
        for key in [
            "MATCH_RELEVANCE_FLOOR",
            "MATCH_SIMILARITY_STRATEGY",
            "MATCH_BIRTHDAY_POLICY",
            "MATCH_BIRTHDAY_DECAY_DAYS",
            "MATCH_FETCH_TIMEOUT_SECS",
        ] {
            env::remove_var(key);
        }

        let config = MatcherConfig::from_env();
        assert_eq!(config.relevance_floor, 50);
        assert_eq!(config.similarity, SimilarityStrategy::Levenshtein);
        assert_eq!(config.birthday_policy, BirthdayPolicy::Exact);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));

        env::set_var("MATCH_RELEVANCE_FLOOR", "70");
        env::set_var("MATCH_SIMILARITY_STRATEGY", "jaro_winkler");
        env::set_var("MATCH_BIRTHDAY_POLICY", "decay");
        env::set_var("MATCH_BIRTHDAY_DECAY_DAYS", "365");
        env::set_var("MATCH_FETCH_TIMEOUT_SECS", "3");

        let config = MatcherConfig::from_env();
        assert_eq!(config.relevance_floor, 70);
        assert_eq!(config.similarity, SimilarityStrategy::JaroWinkler);
        assert_eq!(
            config.birthday_policy,
            BirthdayPolicy::LinearDecay { horizon_days: 365 }
        );
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));

        for key in [
            "MATCH_RELEVANCE_FLOOR",
            "MATCH_SIMILARITY_STRATEGY",
            "MATCH_BIRTHDAY_POLICY",
            "MATCH_BIRTHDAY_DECAY_DAYS",
            "MATCH_FETCH_TIMEOUT_SECS",
        ] {
            env::remove_var(key);
        }
    }
}
