// 🏗️ Parser Framework - OCR text → ResidentRecord
// Two directory layouts: wrapped line entries with ditto marks, and clean one-per-line listings

use crate::diagnostics::{ExtractionReport, SkipReason};
use crate::joiner::{join_entries, starts_with_ditto};
use crate::junk::JunkFilter;
use crate::patterns::{LINE_ENTRY, WHOLE_TEXT};
use crate::record::{HomeAddress, Provenance, ResidentRecord};
use regex::Captures;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// CORE TYPES
// ============================================================================

/// SourceFormat - Which page layout the OCR text follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    /// Wrapped entries, ditto marks, ads mixed in (1900 pages)
    LineEntries,
    /// One clean record per line with a residence indicator (1912 directory)
    WholeText,
}

impl SourceFormat {
    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            SourceFormat::LineEntries => "Line entries",
            SourceFormat::WholeText => "Whole text",
        }
    }

    /// Short code, same as the CLI value
    pub fn code(&self) -> &str {
        match self {
            SourceFormat::LineEntries => "line-entries",
            SourceFormat::WholeText => "whole-text",
        }
    }
}

/// Parse output: records in input order plus diagnostics for everything dropped
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<ResidentRecord>,
    pub report: ExtractionReport,
}

impl Extraction {
    fn push(&mut self, record: ResidentRecord) {
        self.report.records_emitted += 1;
        self.records.push(record);
    }
}

/// Fields pulled from one logical entry, before provenance is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub first_name: String,
    pub last_name: String,
    pub spouse: Option<String>,
    pub occupation: Option<String>,
    pub company: Option<String>,
    pub home_address: Option<HomeAddress>,
}

impl ParsedEntry {
    pub fn into_record(self, provenance: &Provenance) -> ResidentRecord {
        ResidentRecord::new(self.first_name, self.last_name, provenance)
            .with_spouse(self.spouse)
            .with_occupation(self.occupation, self.company)
            .with_home_address(self.home_address)
    }
}

// ============================================================================
// PARSER TRAIT
// ============================================================================

/// DirectoryParser - one implementation per page layout
pub trait DirectoryParser {
    /// Parse one page (or one whole directory) of OCR text.
    ///
    /// Entries that cannot be parsed are skipped and reported, never errors.
    /// `session` carries the ditto surname; callers reset it between
    /// independent inputs.
    fn parse(
        &self,
        text: &str,
        provenance: &Provenance,
        session: &mut ParserSession,
    ) -> Extraction;

    /// Layout this parser handles
    fn source_format(&self) -> SourceFormat;

    /// Parser version (for run reports)
    fn version(&self) -> &str {
        "1.0.0"
    }
}

/// Get the parser for a layout
pub fn get_parser(format: SourceFormat, junk_filter: JunkFilter) -> Box<dyn DirectoryParser> {
    match format {
        SourceFormat::LineEntries => Box::new(LineEntryParser::new(junk_filter)),
        SourceFormat::WholeText => Box::new(WholeTextParser::new()),
    }
}

// ============================================================================
// DITTO RESOLVER + ENTRY PARSER
// ============================================================================

/// Surname accumulator for one run of entries
#[derive(Debug, Clone, Default)]
pub struct ParserSession {
    last_surname: Option<String>,
}

impl ParserSession {
    pub fn new() -> Self {
        ParserSession { last_surname: None }
    }

    pub fn last_surname(&self) -> Option<&str> {
        self.last_surname.as_deref()
    }

    /// Forget the carried surname before an unrelated input
    pub fn reset(&mut self) {
        self.last_surname = None;
    }

    /// Replace a leading ditto mark with the last resolved surname
    pub fn resolve_ditto(&self, line: &str) -> Result<String, SkipReason> {
        if !starts_with_ditto(line) {
            return Ok(line.to_string());
        }

        let surname = self
            .last_surname
            .as_deref()
            .ok_or(SkipReason::DittoWithoutSurname)?;

        let mut chars = line.chars();
        chars.next();
        Ok(format!("{} {}", surname, chars.as_str().trim_start()))
    }

    /// Parse one merged entry. On success the carried surname is updated.
    pub fn parse_entry(&mut self, line: &str) -> Result<ParsedEntry, SkipReason> {
        let line = self.resolve_ditto(line.trim())?;

        let caps = LINE_ENTRY
            .entry
            .regex
            .captures(&line)
            .ok_or(SkipReason::NoNamePattern)?;
        let full_name = caps.get(1).map_or("", |m| m.as_str());
        let rest = caps.get(2).map_or("", |m| m.as_str());

        let (surname, given) = split_name(full_name);
        let last_name = if surname.is_empty() {
            self.last_surname.clone().ok_or(SkipReason::NoNamePattern)?
        } else {
            surname
        };
        self.last_surname = Some(last_name.clone());

        let (occupation, company) = split_occupation(rest);

        Ok(ParsedEntry {
            first_name: given,
            last_name,
            spouse: extract_spouse(rest),
            occupation,
            company,
            home_address: extract_home_address(rest),
        })
    }
}

/// Split a directory name into (surname, given names).
///
/// `Last, First` when there is a comma. Otherwise the first token is the
/// surname and the remaining tokens are the given names.
pub fn split_name(name: &str) -> (String, String) {
    if let Some((last, first)) = name.split_once(',') {
        return (last.trim().to_string(), first.trim().to_string());
    }

    let mut tokens = name.split_whitespace();
    let surname = tokens.next().unwrap_or("").to_string();
    let given = tokens.collect::<Vec<_>>().join(" ");
    (surname, given)
}

pub fn extract_spouse(rest: &str) -> Option<String> {
    let caps = LINE_ENTRY.spouse.regex.captures(rest)?;
    non_empty(caps.get(1)?.as_str())
}

/// First 3-5 digit street number with its street, plus the indicator right before it
pub fn extract_home_address(rest: &str) -> Option<HomeAddress> {
    let caps = LINE_ENTRY.address.regex.captures(rest)?;
    let number = caps.get(1)?;
    let street = caps.get(2)?.as_str().trim().trim_end_matches('.');

    let residence_indicator = LINE_ENTRY
        .residence
        .regex
        .captures(&rest[..number.start()])
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    Some(HomeAddress {
        street_number: Some(number.as_str().to_string()),
        street_name: non_empty(street),
        apartment_or_unit: None,
        residence_indicator,
    })
}

/// Text before the first comma, split around the first " at "
pub fn split_occupation(rest: &str) -> (Option<String>, Option<String>) {
    let chunk = rest.split(',').next().unwrap_or("").trim();

    match chunk.split_once(" at ") {
        Some((occupation, company)) => (non_empty(occupation), non_empty(company)),
        None => (non_empty(chunk), None),
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

// ============================================================================
// LINE-ENTRY PARSER
// ============================================================================

/// Line joiner → junk filter → ditto resolver → entry parser
pub struct LineEntryParser {
    junk_filter: JunkFilter,
}

impl LineEntryParser {
    pub fn new(junk_filter: JunkFilter) -> Self {
        LineEntryParser { junk_filter }
    }
}

impl Default for LineEntryParser {
    fn default() -> Self {
        Self::new(JunkFilter::default())
    }
}

impl DirectoryParser for LineEntryParser {
    fn parse(
        &self,
        text: &str,
        provenance: &Provenance,
        session: &mut ParserSession,
    ) -> Extraction {
        let mut extraction = Extraction::default();

        for (index, entry) in join_entries(text).iter().enumerate() {
            extraction.report.entries_seen += 1;

            if let Some(reason) = self.junk_filter.classify(entry) {
                extraction.report.skip(index, SkipReason::Junk(reason), entry);
                continue;
            }

            match session.parse_entry(entry) {
                Ok(parsed) => extraction.push(parsed.into_record(provenance)),
                Err(reason) => extraction.report.skip(index, reason, entry),
            }
        }

        extraction
    }

    fn source_format(&self) -> SourceFormat {
        SourceFormat::LineEntries
    }
}

// ============================================================================
// WHOLE-TEXT PARSER
// ============================================================================

/// One pattern over the whole text; every match is one record
pub struct WholeTextParser;

impl WholeTextParser {
    pub fn new() -> Self {
        WholeTextParser
    }
}

impl Default for WholeTextParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryParser for WholeTextParser {
    fn parse(
        &self,
        text: &str,
        provenance: &Provenance,
        _session: &mut ParserSession,
    ) -> Extraction {
        let text = text.replace('\r', "");
        let mut extraction = Extraction::default();
        let mut matched_lines = HashSet::new();

        for caps in WHOLE_TEXT.record.regex.captures_iter(&text) {
            let Some(whole) = caps.get(0) else { continue };
            matched_lines.insert(whole.start());
            extraction.push(record_from_captures(&caps, provenance));
        }

        let mut offset = 0;
        for (index, line) in text.split('\n').enumerate() {
            if !line.trim().is_empty() {
                extraction.report.entries_seen += 1;
                if !matched_lines.contains(&offset) {
                    extraction
                        .report
                        .skip(index, SkipReason::NoRecordPattern, line.trim());
                }
            }
            offset += line.len() + 1;
        }

        extraction
    }

    fn source_format(&self) -> SourceFormat {
        SourceFormat::WholeText
    }
}

fn group<'t>(caps: &Captures<'t>, name: &str) -> Option<&'t str> {
    caps.name(name)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

fn record_from_captures(caps: &Captures<'_>, provenance: &Provenance) -> ResidentRecord {
    let mut first_name = group(caps, "first").unwrap_or_default().to_string();
    if let Some(middle) = group(caps, "middle") {
        first_name.push(' ');
        first_name.push_str(middle);
    }
    let last_name = group(caps, "last").unwrap_or_default().to_string();

    let indicator = group(caps, "indicator").map(str::to_string);
    let home_address = group(caps, "address").map(|a| HomeAddress::from_text(a, indicator));

    ResidentRecord::new(first_name, last_name, provenance)
        .with_spouse(group(caps, "spouse").map(str::to_string))
        .with_occupation(group(caps, "occupation").map(str::to_string), None)
        .with_home_address(home_address)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn provenance() -> Provenance {
        Provenance::new("Minneapolis 1900").with_page(105)
    }

    fn parse_line_entries(text: &str) -> Extraction {
        let parser = LineEntryParser::default();
        let mut session = ParserSession::new();
        parser.parse(text, &provenance(), &mut session)
    }

    // ============================================================================
    // Entry Parser Tests
    // ============================================================================

    #[test]
    fn test_parse_full_entry() {
        let mut session = ParserSession::new();
        let entry = session
            .parse_entry("Smith John H, carpenter, h 1234 Main St")
            .unwrap();

        assert_eq!(entry.last_name, "Smith");
        assert_eq!(entry.first_name, "John H");
        assert_eq!(entry.occupation.as_deref(), Some("carpenter"));
        assert_eq!(entry.company, None);
        assert_eq!(entry.spouse, None);

        let address = entry.home_address.unwrap();
        assert_eq!(address.street_number.as_deref(), Some("1234"));
        assert_eq!(address.street_name.as_deref(), Some("Main St"));
        assert_eq!(address.residence_indicator.as_deref(), Some("h"));
        assert_eq!(address.apartment_or_unit, None);

        assert_eq!(session.last_surname(), Some("Smith"));
    }

    #[test]
    fn test_ditto_resolves_previous_surname() {
        let mut session = ParserSession::new();
        session
            .parse_entry("Smith John H, carpenter, h 1234 Main St")
            .unwrap();

        let entry = session.parse_entry("\" wife of Henry, h 500 Elm").unwrap();

        assert_eq!(entry.last_name, "Smith");
        assert_eq!(entry.spouse.as_deref(), Some("Henry"));

        let address = entry.home_address.unwrap();
        assert_eq!(address.street_number.as_deref(), Some("500"));
        assert_eq!(address.street_name.as_deref(), Some("Elm"));
        assert_eq!(address.residence_indicator.as_deref(), Some("h"));
    }

    #[test]
    fn test_ditto_follows_latest_surname() {
        let mut session = ParserSession::new();
        session.parse_entry("Smith John, carpenter").unwrap();
        session.parse_entry("Olson Peter, clk").unwrap();

        let entry = session.parse_entry("\u{201C} Mary, tchr").unwrap();
        assert_eq!(entry.last_name, "Olson");
        assert_eq!(entry.first_name, "Mary");
    }

    #[test]
    fn test_ditto_without_surname_is_skipped() {
        let mut session = ParserSession::new();

        assert_eq!(
            session.parse_entry("\" wife of Henry, h 500 Elm"),
            Err(SkipReason::DittoWithoutSurname)
        );
        assert_eq!(session.last_surname(), None);
    }

    #[test]
    fn test_unmatched_entry_keeps_surname() {
        let mut session = ParserSession::new();
        session.parse_entry("Smith John, carpenter").unwrap();

        assert_eq!(
            session.parse_entry("carpenter, h 1234 Main St"),
            Err(SkipReason::NoNamePattern)
        );
        assert_eq!(session.last_surname(), Some("Smith"));
    }

    #[test]
    fn test_reset_clears_surname() {
        let mut session = ParserSession::new();
        session.parse_entry("Smith John, carpenter").unwrap();
        session.reset();

        assert_eq!(session.last_surname(), None);
        assert!(session.parse_entry("\" Mary, tchr").is_err());
    }

    #[test]
    fn test_comma_name_is_last_first() {
        let mut session = ParserSession::new();
        let entry = session.parse_entry("Smith, John H, carpenter").unwrap();

        assert_eq!(entry.last_name, "Smith");
        assert_eq!(entry.first_name, "John H");
        assert_eq!(entry.occupation.as_deref(), Some("carpenter"));
    }

    #[test]
    fn test_split_name_first_token_is_surname() {
        assert_eq!(
            split_name("Smith John H"),
            ("Smith".to_string(), "John H".to_string())
        );
        assert_eq!(split_name("Smith"), ("Smith".to_string(), String::new()));
        assert_eq!(
            split_name("Smith , John"),
            ("Smith".to_string(), "John".to_string())
        );
    }

    #[test]
    fn test_split_occupation_company() {
        assert_eq!(
            split_occupation("lab at Pillsbury Flour mills, r 2210 Washington Av"),
            (Some("lab".to_string()), Some("Pillsbury Flour mills".to_string()))
        );
        assert_eq!(
            split_occupation("carpenter, h 1234 Main St"),
            (Some("carpenter".to_string()), None)
        );
        assert_eq!(split_occupation(", h 1234 Main St"), (None, None));
    }

    #[test]
    fn test_address_without_indicator() {
        let address = extract_home_address("clk, 812 Pine.").unwrap();

        assert_eq!(address.street_number.as_deref(), Some("812"));
        assert_eq!(address.street_name.as_deref(), Some("Pine"));
        assert_eq!(address.residence_indicator, None);
    }

    #[test]
    fn test_every_residence_indicator_token() {
        for token in ["r", "rm", "rms", "b", "h", "res", "res."] {
            let rest = format!("lab, {} 2210 Washington Av", token);
            let address = extract_home_address(&rest).unwrap();

            assert_eq!(address.residence_indicator.as_deref(), Some(token), "{}", rest);
            assert_eq!(address.street_number.as_deref(), Some("2210"));
            assert_eq!(address.street_name.as_deref(), Some("Washington Av"));
        }
    }

    #[test]
    fn test_no_address_for_short_numbers() {
        assert_eq!(extract_home_address("lab, r 45 Oak"), None);
    }

    #[test]
    fn test_spouse_variants() {
        assert_eq!(extract_spouse("wid John, h 12 Oak").as_deref(), Some("John"));
        assert_eq!(extract_spouse("widow of Carl A., h 12 Oak").as_deref(), Some("Carl A."));
        assert_eq!(extract_spouse("carpenter, h 1234 Main St"), None);
    }

    // ============================================================================
    // Line-Entry Parser Tests
    // ============================================================================

    #[test]
    fn test_line_entry_parser_end_to_end() {
        let text = "MINNEAPOLIS DIRECTORY CO.\n\
                    Smith John H, carpenter, h 1234 Main St\n\
                    \" wife of Henry, h 500 Elm\n\
                    Jones Wm, see also Johns\n";

        let extraction = parse_line_entries(text);

        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.report.entries_seen, 4);
        assert_eq!(extraction.report.records_emitted, 2);
        assert_eq!(extraction.report.skipped.len(), 2);
        assert_eq!(extraction.report.skipped[0].reason.code(), "header");
        assert_eq!(extraction.report.skipped[1].reason.code(), "cross_reference");

        let smith = &extraction.records[0];
        assert_eq!(smith.last_name, "Smith");
        assert_eq!(smith.first_name, "John H");
        assert_eq!(smith.directory_name, "Minneapolis 1900");
        assert_eq!(smith.page_number, Some(105));
        assert_eq!(smith.work_address, None);
        assert_eq!(smith.telephone, None);

        let wife = &extraction.records[1];
        assert_eq!(wife.last_name, "Smith");
        assert_eq!(wife.spouse.as_deref(), Some("Henry"));
    }

    #[test]
    fn test_surname_survives_junk_lines() {
        let text = "Smith John, carpenter\nHOTEL ADVERTISEMENT\n\" Mary, tchr";

        let extraction = parse_line_entries(text);

        assert_eq!(extraction.records.len(), 2);
        assert_eq!(extraction.records[1].last_name, "Smith");
        assert_eq!(extraction.records[1].first_name, "Mary");
    }

    #[test]
    fn test_last_name_never_empty() {
        let text = "page 105\n\" orphan ditto\nSmith John, carpenter\n\" Mary\nOlson Peter, clk";

        let extraction = parse_line_entries(text);

        assert!(extraction.records.iter().all(|r| !r.last_name.is_empty()));
        assert_eq!(
            extraction.report.skip_counts().get("ditto_without_surname"),
            Some(&1)
        );
    }

    #[test]
    fn test_factory_returns_matching_parser() {
        let line = get_parser(SourceFormat::LineEntries, JunkFilter::default());
        let whole = get_parser(SourceFormat::WholeText, JunkFilter::default());

        assert_eq!(line.source_format(), SourceFormat::LineEntries);
        assert_eq!(whole.source_format(), SourceFormat::WholeText);
        assert_eq!(line.version(), "1.0.0");
    }

    // ============================================================================
    // Whole-Text Parser Tests
    // ============================================================================

    #[test]
    fn test_whole_text_parser() {
        let text = "MINNEAPOLIS CITY DIRECTORY 1912\r\n\
                    Anderson John (Mary) carpenter h 1234 Main St\r\n\
                    Berg Carl A lab r 45 Oak\r\n\
                    \r\n\
                    Carlson Anna (wid Peter) h 2210 Elm\r\n\
                    Gustafson Ole painter 1200 Elm\r\n";
        let provenance = Provenance::new("Minneapolis 1912").with_year(1912);

        let parser = WholeTextParser::new();
        let extraction = parser.parse(text, &provenance, &mut ParserSession::new());

        assert_eq!(extraction.records.len(), 3);
        assert_eq!(extraction.report.entries_seen, 5);
        assert_eq!(extraction.report.skipped.len(), 2);
        assert!(extraction
            .report
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::NoRecordPattern));
        assert_eq!(extraction.report.skipped[1].text, "Gustafson Ole painter 1200 Elm");

        let anderson = &extraction.records[0];
        assert_eq!(anderson.last_name, "Anderson");
        assert_eq!(anderson.first_name, "John");
        assert_eq!(anderson.spouse.as_deref(), Some("Mary"));
        assert_eq!(anderson.occupation.as_deref(), Some("carpenter"));
        assert_eq!(anderson.year, Some(1912));
        let address = anderson.home_address.as_ref().unwrap();
        assert_eq!(address.street_number.as_deref(), Some("1234"));
        assert_eq!(address.street_name.as_deref(), Some("Main St"));
        assert_eq!(address.residence_indicator.as_deref(), Some("h"));

        let berg = &extraction.records[1];
        assert_eq!(berg.first_name, "Carl A");
        assert_eq!(berg.occupation.as_deref(), Some("lab"));
        assert_eq!(
            berg.home_address.as_ref().unwrap().residence_indicator.as_deref(),
            Some("r")
        );

        let carlson = &extraction.records[2];
        assert_eq!(carlson.spouse, None);
        assert_eq!(carlson.occupation.as_deref(), Some("(wid Peter)"));
    }

    #[test]
    fn test_whole_text_ignores_session() {
        let mut session = ParserSession::new();
        session.parse_entry("Smith John, carpenter").unwrap();

        let text = "Berg Carl lab rms 45 Oak";
        let extraction = WholeTextParser::new().parse(text, &provenance(), &mut session);

        assert_eq!(extraction.records.len(), 1);
        assert_eq!(session.last_surname(), Some("Smith"));
    }
}
