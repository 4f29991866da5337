// 🚚 Pipeline - File-to-file batch steps behind each CLI subcommand
// extract → clean → filter occupations, plus CSV export for manual review

use crate::cleaner::{CleanSummary, PostProcessingCleaner};
use crate::config::PipelineConfig;
use crate::diagnostics::{sha256_hex, FileReport, RunReport};
use crate::junk::JunkFilter;
use crate::occupation::filter_occupations;
use crate::parser::{get_parser, ParserSession, SourceFormat};
use crate::record::{export_csv, load_records, write_records, write_rejected_log, ResidentRecord};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ============================================================================
// EXTRACT
// ============================================================================

#[derive(Debug, Clone)]
pub struct ExtractRun {
    /// Records from every input, in input order
    pub records: Vec<ResidentRecord>,
    pub report: RunReport,
}

/// Parse OCR text files. Each file is an independent run: the ditto surname
/// does not carry over from one file to the next.
pub fn extract_files(
    inputs: &[PathBuf],
    format: SourceFormat,
    config: &PipelineConfig,
    page_override: Option<u32>,
) -> Result<ExtractRun> {
    let parser = get_parser(format, JunkFilter::new(&config.ad_keywords));
    let mut session = ParserSession::new();
    let mut report = RunReport::new(parser.version());
    let mut records = Vec::new();

    for input in inputs {
        let bytes = fs::read(input)
            .with_context(|| format!("Failed to read OCR text: {}", input.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        let provenance = config.provenance_for(input, page_override);

        session.reset();
        let extraction = parser.parse(&text, &provenance, &mut session);

        info!(
            "{} [{}]: {}",
            input.display(),
            format.code(),
            extraction.report.summary()
        );
        if extraction.records.is_empty() {
            warn!(
                "No records extracted from {}; is it really {} layout?",
                input.display(),
                format.name()
            );
        }

        report.files.push(FileReport {
            source: input.display().to_string(),
            input_sha256: sha256_hex(&bytes),
            format,
            provenance,
            extraction: extraction.report,
        });
        records.extend(extraction.records);
    }

    Ok(ExtractRun { records, report })
}

/// Extract and write the records file (and the run report when asked)
pub fn run_extract(
    inputs: &[PathBuf],
    format: SourceFormat,
    config: &PipelineConfig,
    page_override: Option<u32>,
    output: &Path,
    report_path: Option<&Path>,
) -> Result<ExtractRun> {
    let run = extract_files(inputs, format, config, page_override)?;

    write_records(output, &run.records)?;
    if let Some(path) = report_path {
        run.report.write(path)?;
        info!("Run report written to {}", path.display());
    }

    Ok(run)
}

// ============================================================================
// CLEAN / FILTER / EXPORT
// ============================================================================

/// Widow rule, junk-name and address checks; accepted and rejected go to separate files
pub fn run_clean(
    input: &Path,
    output: &Path,
    rejected: &Path,
    config: &PipelineConfig,
) -> Result<CleanSummary> {
    let records = load_records(input, &config.provenance())?;
    let cleaner = PostProcessingCleaner::new(&config.junk_name_terms);
    let outcome = cleaner.clean(records);

    write_records(output, &outcome.accepted)?;
    write_rejected_log(rejected, &outcome.rejected_records())?;

    let summary = outcome.summary();
    info!("{}: {}", input.display(), summary.summary());
    for (reason, count) in &summary.rejected_by_reason {
        info!("  rejected {} ({})", count, reason);
    }

    Ok(summary)
}

/// Returns how many occupations were cleared
pub fn run_filter_occupations(input: &Path, output: &Path, config: &PipelineConfig) -> Result<usize> {
    let mut records = load_records(input, &config.provenance())?;
    let cleared = filter_occupations(&mut records);

    write_records(output, &records)?;
    info!(
        "{}: cleared {} single-letter occupations of {} records",
        input.display(),
        cleared,
        records.len()
    );

    Ok(cleared)
}

/// Returns rows written
pub fn run_export_csv(input: &Path, output: &Path, config: &PipelineConfig) -> Result<usize> {
    let records = load_records(input, &config.provenance())?;
    export_csv(output, &records)
}

// ============================================================================
// TESTS
// ============================================================================
