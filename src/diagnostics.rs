// 🩺 Diagnostics - What was dropped, and why
// Skipped entries are not errors, but they are counted and kept for manual QA

use crate::junk::JunkReason;
use crate::parser::SourceFormat;
use crate::record::Provenance;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

// ============================================================================
// SKIP REASONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Rejected by the junk filter before parsing
    Junk(JunkReason),

    /// Entry does not start with a capitalized name run
    NoNamePattern,

    /// Line does not fit the one-record-per-line layout
    NoRecordPattern,

    /// Ditto mark with no earlier surname in this run
    DittoWithoutSurname,
}

impl SkipReason {
    pub fn code(&self) -> &'static str {
        match self {
            SkipReason::Junk(reason) => reason.code(),
            SkipReason::NoNamePattern => "no_name_pattern",
            SkipReason::NoRecordPattern => "no_record_pattern",
            SkipReason::DittoWithoutSurname => "ditto_without_surname",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedEntry {
    /// Entry index (line-entry layout) or line index (whole-text layout)
    pub index: usize,
    pub reason: SkipReason,
    pub text: String,
}

// ============================================================================
// EXTRACTION REPORT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub entries_seen: usize,
    pub records_emitted: usize,
    pub skipped: Vec<SkippedEntry>,
}

impl ExtractionReport {
    pub fn skip(&mut self, index: usize, reason: SkipReason, text: &str) {
        debug!("Skipped entry {} ({}): {}", index, reason.code(), text);
        self.skipped.push(SkippedEntry {
            index,
            reason,
            text: text.to_string(),
        });
    }

    pub fn skip_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.skipped {
            *counts.entry(entry.reason.code()).or_insert(0) += 1;
        }
        counts
    }

    pub fn summary(&self) -> String {
        let reasons = self
            .skip_counts()
            .iter()
            .map(|(code, count)| format!("{} {}", count, code))
            .collect::<Vec<_>>()
            .join(", ");

        if reasons.is_empty() {
            format!(
                "{} entries: {} records, 0 skipped",
                self.entries_seen, self.records_emitted
            )
        } else {
            format!(
                "{} entries: {} records, {} skipped ({})",
                self.entries_seen,
                self.records_emitted,
                self.skipped.len(),
                reasons
            )
        }
    }
}

// ============================================================================
// RUN REPORT
// ============================================================================

/// One input file of an extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub source: String,
    pub input_sha256: String,
    pub format: SourceFormat,
    pub provenance: Provenance,
    pub extraction: ExtractionReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub parser_version: String,
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn new(parser_version: &str) -> Self {
        RunReport {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            parser_version: parser_version.to_string(),
            files: Vec::new(),
        }
    }

    pub fn total_records(&self) -> usize {
        self.files.iter().map(|f| f.extraction.records_emitted).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.files.iter().map(|f| f.extraction.skipped.len()).sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} file(s): {} records extracted, {} entries skipped",
            self.files.len(),
            self.total_records(),
            self.total_skipped()
        )
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;

        fs::write(path, json)
            .with_context(|| format!("Failed to write run report to {}", path.display()))
    }
}

/// Hex SHA-256 of the raw input, so a report can be matched to the exact OCR text
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_counts_by_reason() {
        let mut report = ExtractionReport::default();
        report.entries_seen = 5;
        report.records_emitted = 2;
        report.skip(0, SkipReason::NoNamePattern, "page 105");
        report.skip(1, SkipReason::Junk(JunkReason::Header), "MINNEAPOLIS");
        report.skip(4, SkipReason::Junk(JunkReason::Header), "DIRECTORY");

        let counts = report.skip_counts();
        assert_eq!(counts.get("header"), Some(&2));
        assert_eq!(counts.get("no_name_pattern"), Some(&1));

        assert_eq!(
            report.summary(),
            "5 entries: 2 records, 3 skipped (2 header, 1 no_name_pattern)"
        );
    }

    #[test]
    fn test_summary_without_skips() {
        let report = ExtractionReport {
            entries_seen: 3,
            records_emitted: 3,
            skipped: Vec::new(),
        };

        assert_eq!(report.summary(), "3 entries: 3 records, 0 skipped");
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_run_report_totals_and_write() {
        let mut run = RunReport::new("1.0.0");
        run.files.push(FileReport {
            source: "page_105.txt".to_string(),
            input_sha256: sha256_hex(b""),
            format: SourceFormat::LineEntries,
            provenance: Provenance::new("Minneapolis 1900").with_page(105),
            extraction: ExtractionReport {
                entries_seen: 4,
                records_emitted: 3,
                skipped: vec![SkippedEntry {
                    index: 0,
                    reason: SkipReason::DittoWithoutSurname,
                    text: "\" Mary".to_string(),
                }],
            },
        });

        assert_eq!(run.total_records(), 3);
        assert_eq!(run.total_skipped(), 1);
        assert_eq!(run.summary(), "1 file(s): 3 records extracted, 1 entries skipped");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        run.write(&path).unwrap();

        let loaded: RunReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.run_id, run.run_id);
        assert_eq!(loaded.files[0].format, SourceFormat::LineEntries);
    }
}
