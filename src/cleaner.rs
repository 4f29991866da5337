// ✅ Post-Processing Cleaner - Second pass over structured records
// Widow annotations become spouses; business listings and broken addresses are rejected

use crate::config::DEFAULT_JUNK_NAME_TERMS;
use crate::patterns::CLEANUP;
use crate::record::{HomeAddress, ResidentRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

// ============================================================================
// REJECTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Name contains a business term (hotel, flats, co, ...)
    JunkName { field: String, term: String },

    /// Address is only a number, or a single token
    IncompleteAddress { address: String },
}

impl RejectReason {
    pub fn code(&self) -> &'static str {
        match self {
            RejectReason::JunkName { .. } => "junk_name",
            RejectReason::IncompleteAddress { .. } => "incomplete_address",
        }
    }

    pub fn message(&self) -> String {
        match self {
            RejectReason::JunkName { field, term } => {
                format!("{} contains business term '{}'", field, term)
            }
            RejectReason::IncompleteAddress { address } => {
                format!("Incomplete home address: '{}'", address)
            }
        }
    }
}

/// Rejected record as it was before cleaning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub record: ResidentRecord,
    pub reason: RejectReason,
}

// ============================================================================
// CLEAN OUTCOME
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct CleanOutcome {
    /// Accepted records, cleaned, in input order
    pub accepted: Vec<ResidentRecord>,

    /// Rejected originals, in input order
    pub rejected: Vec<RejectedRecord>,

    /// Records whose occupation held a widow annotation
    pub widow_extractions: usize,
}

impl CleanOutcome {
    pub fn rejected_records(&self) -> Vec<ResidentRecord> {
        self.rejected.iter().map(|r| r.record.clone()).collect()
    }

    pub fn summary(&self) -> CleanSummary {
        let mut rejected_by_reason = BTreeMap::new();
        for rejected in &self.rejected {
            *rejected_by_reason
                .entry(rejected.reason.code().to_string())
                .or_insert(0) += 1;
        }

        CleanSummary {
            total: self.accepted.len() + self.rejected.len(),
            accepted_count: self.accepted.len(),
            rejected_count: self.rejected.len(),
            widow_extractions: self.widow_extractions,
            rejected_by_reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanSummary {
    pub total: usize,
    pub accepted_count: usize,
    pub rejected_count: usize,
    pub widow_extractions: usize,
    pub rejected_by_reason: BTreeMap<String, usize>,
}

impl CleanSummary {
    pub fn summary(&self) -> String {
        format!(
            "{} records: {} accepted, {} rejected, {} widow annotations moved to spouse",
            self.total, self.accepted_count, self.rejected_count, self.widow_extractions
        )
    }

    /// Lines printed by `city-directory clean`
    pub fn console_report(&self, rejected: &Path, output: &Path) -> String {
        format!(
            "Cleaned {} entries\nRejected {} entries (see {})\nOutput written to {}",
            self.accepted_count,
            self.rejected_count,
            rejected.display(),
            output.display()
        )
    }
}

// ============================================================================
// CLEANER
// ============================================================================

pub struct PostProcessingCleaner {
    /// Stored lowercase
    junk_terms: Vec<String>,
}

impl PostProcessingCleaner {
    pub fn new<S: AsRef<str>>(junk_terms: &[S]) -> Self {
        PostProcessingCleaner {
            junk_terms: junk_terms
                .iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// `(wid NAME)` occupation → spouse NAME, occupation cleared.
    /// Returns whether the record changed.
    pub fn apply_widow_rule(&self, record: &mut ResidentRecord) -> bool {
        let Some(occupation) = record.occupation.as_deref() else {
            return false;
        };
        let Some(spouse) = CLEANUP
            .widow
            .regex
            .captures(occupation)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
        else {
            return false;
        };

        record.spouse = Some(spouse);
        record.occupation = None;
        true
    }

    pub fn check_names(&self, record: &ResidentRecord) -> Option<RejectReason> {
        for (field, value) in [
            ("FirstName", &record.first_name),
            ("LastName", &record.last_name),
        ] {
            let lower = value.to_lowercase();
            if let Some(term) = self.junk_terms.iter().find(|t| lower.contains(t.as_str())) {
                return Some(RejectReason::JunkName {
                    field: field.to_string(),
                    term: term.clone(),
                });
            }
        }
        None
    }

    /// A missing address renders as empty text and is rejected too
    pub fn check_address(&self, record: &ResidentRecord) -> Option<RejectReason> {
        let address = record
            .home_address
            .as_ref()
            .map(HomeAddress::to_text)
            .unwrap_or_default();

        is_incomplete_address(&address).then(|| RejectReason::IncompleteAddress { address })
    }

    pub fn validate(&self, record: &ResidentRecord) -> Result<(), RejectReason> {
        if let Some(reason) = self.check_names(record) {
            return Err(reason);
        }
        if let Some(reason) = self.check_address(record) {
            return Err(reason);
        }
        Ok(())
    }

    /// Clean a batch, keeping input order in both output sets
    pub fn clean(&self, records: Vec<ResidentRecord>) -> CleanOutcome {
        let mut outcome = CleanOutcome::default();

        for original in records {
            let mut cleaned = original.clone();
            if self.apply_widow_rule(&mut cleaned) {
                outcome.widow_extractions += 1;
            }

            match self.validate(&cleaned) {
                Ok(()) => outcome.accepted.push(cleaned),
                Err(reason) => {
                    debug!(
                        "Rejected {} {}: {}",
                        original.first_name,
                        original.last_name,
                        reason.message()
                    );
                    outcome.rejected.push(RejectedRecord {
                        record: original,
                        reason,
                    });
                }
            }
        }

        outcome
    }
}

impl Default for PostProcessingCleaner {
    fn default() -> Self {
        Self::new(DEFAULT_JUNK_NAME_TERMS)
    }
}

/// Purely numeric, or fewer than two whitespace-separated tokens
pub fn is_incomplete_address(address: &str) -> bool {
    let address = address.trim();
    let numeric = !address.is_empty() && address.chars().all(|c| c.is_ascii_digit());

    numeric || address.split_whitespace().count() < 2
}

// ============================================================================
// TESTS
// ============================================================================
