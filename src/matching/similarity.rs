// src/matching/similarity.rs
use std::str::FromStr;
use strsim::{jaro_winkler, normalized_levenshtein};
use thiserror::Error;

/// String similarity measure used for the name and location scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimilarityStrategy {
    /// 1 - edit distance / longer length.
    #[default]
    Levenshtein,
    JaroWinkler,
    /// Levenshtein over the alphabetically sorted tokens, so word order is ignored.
    TokenSort,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown similarity strategy '{0}'")]
pub struct UnknownStrategy(pub String);

impl FromStr for SimilarityStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "levenshtein" => Ok(SimilarityStrategy::Levenshtein),
            "jaro_winkler" | "jarowinkler" => Ok(SimilarityStrategy::JaroWinkler),
            "token_sort" | "tokensort" => Ok(SimilarityStrategy::TokenSort),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

impl SimilarityStrategy {
    /// Similarity in [0, 1] between two already-normalized strings.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        let score = match self {
            SimilarityStrategy::Levenshtein => normalized_levenshtein(a, b),
            SimilarityStrategy::JaroWinkler => jaro_winkler(a, b),
            SimilarityStrategy::TokenSort => normalized_levenshtein(&sort_tokens(a), &sort_tokens(b)),
        };
        score.clamp(0.0, 1.0)
    }

    /// Similarity as an integer percentage. Rounding never lifts an imperfect score to 100.
    pub fn percent(&self, a: &str, b: &str) -> u8 {
        if a.is_empty() || b.is_empty() {
            return 0;
        }
        let score = self.similarity(a, b);
        if score >= 1.0 {
            100
        } else {
            to_percent(score).min(99)
        }
    }
}

pub fn to_percent(score: f64) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
