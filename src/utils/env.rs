// src/utils/env.rs
use log::{info, warn};

/// Loads variables from a `.env` file in the working directory, if one exists.
/// Variables already present in the environment take precedence.
pub fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(dotenv::Error::Io(_)) => info!("No .env file found, using process environment"),
        Err(e) => warn!("Failed to parse .env file: {}", e),
    }
}
