// src/utils/logging.rs - logging helpers shared by the duplicate check and the batch scan
use log::{debug, info, warn};
use std::time::Instant;

use crate::error::ScoringError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    Registration,
    Scan,
}

#[derive(Clone)]
pub struct CheckLogger {
    label: &'static str,
    emoji: &'static str,
    start_time: Instant,
}

impl CheckLogger {
    pub fn new(kind: CheckKind) -> Self {
        let (label, emoji) = match kind {
            CheckKind::Registration => ("DUPLICATE CHECK", "👤"),
            CheckKind::Scan => ("DUPLICATE SCAN", "🗂️"),
        };
        Self {
            label,
            emoji,
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, subject: &str) {
        info!("[{}] {} 🚀 Starting for {}", self.label, self.emoji, subject);
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed();
        match details {
            Some(details) => info!(
                "[{}] {} 🔄 Phase: {} - {} [+{:.1}s]",
                self.label,
                self.emoji,
                phase,
                details,
                elapsed.as_secs_f32()
            ),
            None => info!(
                "[{}] {} 🔄 Phase: {} [+{:.1}s]",
                self.label,
                self.emoji,
                phase,
                elapsed.as_secs_f32()
            ),
        }
    }

    pub fn log_data_loaded(&self, count: usize, data_type: &str) {
        info!(
            "[{}] {} 📊 Loaded {} {} records from store",
            self.label, self.emoji, count, data_type
        );
    }

    pub fn log_skipped_record(&self, err: &ScoringError) {
        warn!("[{}] {} ⚠️  Skipping record: {}", self.label, self.emoji, err);
    }

    pub fn log_debug(&self, message: &str) {
        debug!("[{}] {} {}", self.label, self.emoji, message);
    }

    pub fn log_completion(&self, personal: usize, household: usize, skipped: usize) {
        let elapsed = self.start_time.elapsed();
        if personal + household > 0 {
            info!(
                "[{}] {} 🎯 Found {} personal and {} household matches in {:.2?}",
                self.label, self.emoji, personal, household, elapsed
            );
        } else {
            info!(
                "[{}] {} ✅ No duplicates found in {:.2?}",
                self.label, self.emoji, elapsed
            );
        }
        if skipped > 0 {
            warn!(
                "[{}] {} 🚫 {} malformed records were left out of the comparison",
                self.label, self.emoji, skipped
            );
        }
    }

    pub fn log_scan_completion(&self, duplicates: usize, pairs_compared: usize, skipped: usize) {
        info!(
            "[{}] {} 🎯 {} possible duplicate pairs out of {} compared in {:.2?}",
            self.label,
            self.emoji,
            duplicates,
            pairs_compared,
            self.start_time.elapsed()
        );
        if skipped > 0 {
            warn!(
                "[{}] {} 🚫 {} malformed records were left out of the scan",
                self.label, self.emoji, skipped
            );
        }
    }

    pub fn log_failure(&self, reason: &str) {
        warn!(
            "[{}] {} ❌ Check aborted after {:.2?}: {}",
            self.label,
            self.emoji,
            self.start_time.elapsed(),
            reason
        );
    }
}
