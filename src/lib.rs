// src/lib.rs
pub mod config;
pub mod error;
pub mod matching;
pub mod models;
pub mod registration;
pub mod scan;
pub mod store;
pub mod utils;

pub use config::MatcherConfig;
pub use error::{DuplicateCheckError, RegistrationError, ScoringError, StoreError};
pub use matching::matcher::DuplicateMatcher;
pub use models::records::{ParticipantCandidate, ParticipantId};
pub use models::report::{DuplicateReport, HouseholdMatchCandidate, MatchCandidate};
