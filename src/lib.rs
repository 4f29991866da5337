// City Directory Extraction - Core Library
// OCR text of historical city directories → structured resident records

pub mod patterns;       // Heuristics as data: every regex, named
pub mod record;         // Canonical ResidentRecord + legacy adapter + file I/O
pub mod config;         // TOML pipeline configuration
pub mod joiner;         // Wrapped OCR lines → logical entries
pub mod junk;           // Ads, headers, cross-references
pub mod diagnostics;    // Skip reasons and run reports
pub mod parser;         // Line-entry and whole-text parsers
pub mod cleaner;        // Widow rule, junk names, incomplete addresses
pub mod occupation;     // Single-letter occupation filter
pub mod pipeline;       // File-to-file steps behind the CLI

// Re-export commonly used types
pub use patterns::{pattern_tables, PatternRule};
pub use record::{
    HomeAddress, LegacyEntry, Provenance, ResidentRecord,
    export_csv, load_records, parse_records, write_records, write_rejected_log,
};
pub use config::PipelineConfig;
pub use joiner::join_entries;
pub use junk::{JunkFilter, JunkReason};
pub use diagnostics::{ExtractionReport, FileReport, RunReport, SkipReason, SkippedEntry};
pub use parser::{
    DirectoryParser, Extraction, ParserSession, SourceFormat,
    get_parser, LineEntryParser, WholeTextParser,
};
pub use cleaner::{CleanOutcome, CleanSummary, PostProcessingCleaner, RejectReason, RejectedRecord};
pub use occupation::filter_occupations;
pub use pipeline::{
    ExtractRun,
    extract_files, run_clean, run_export_csv, run_extract, run_filter_occupations,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
