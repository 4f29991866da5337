// 🔎 Pattern Tables - Heuristics as Data
// Every regex behind extraction and cleanup, named and kept in one auditable place

use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug)]
pub struct PatternRule {
    /// Rule name, as listed by `city-directory patterns`
    pub name: &'static str,

    /// What the rule captures
    pub description: &'static str,

    /// Compiled pattern
    pub regex: Regex,
}

impl PatternRule {
    fn new(name: &'static str, description: &'static str, pattern: &str) -> Self {
        PatternRule {
            name,
            description,
            regex: Regex::new(pattern).expect("built-in pattern must compile"),
        }
    }

    /// Source text of the pattern
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

// ============================================================================
// TABLES
// ============================================================================

/// Line-entry extractor, in application order
#[derive(Debug)]
pub struct LineEntryPatterns {
    pub entry: PatternRule,
    pub spouse: PatternRule,
    pub address: PatternRule,
    pub residence: PatternRule,
}

impl LineEntryPatterns {
    pub fn rules(&self) -> Vec<&PatternRule> {
        vec![&self.entry, &self.spouse, &self.address, &self.residence]
    }
}

/// Whole-text extractor: one pattern, one record per match
#[derive(Debug)]
pub struct WholeTextPatterns {
    pub record: PatternRule,
}

impl WholeTextPatterns {
    pub fn rules(&self) -> Vec<&PatternRule> {
        vec![&self.record]
    }
}

/// Post-processing rules applied to already structured records
#[derive(Debug)]
pub struct CleanupPatterns {
    pub widow: PatternRule,
}

impl CleanupPatterns {
    pub fn rules(&self) -> Vec<&PatternRule> {
        vec![&self.widow]
    }
}

/// Metadata read from OCR file names (`page_105_pg113.txt`)
#[derive(Debug)]
pub struct SourceFilePatterns {
    pub page: PatternRule,
}

impl SourceFilePatterns {
    pub fn rules(&self) -> Vec<&PatternRule> {
        vec![&self.page]
    }
}

pub static LINE_ENTRY: Lazy<LineEntryPatterns> = Lazy::new(|| LineEntryPatterns {
    // Capitalized name words (initials allowed), a comma only after the surname
    entry: PatternRule::new(
        "entry",
        "Leading capitalized name run, then the remainder of the entry",
        r#"^([A-Z][A-Za-z'"“”.&-]*(?:,?\s+[A-Z][A-Za-z'"“”.&-]*)?(?:\s+[A-Z][A-Za-z'"“”.&-]*)*),?\s+(.*)$"#,
    ),
    // Only the phrase is case-insensitive; the name must start uppercase
    spouse: PatternRule::new(
        "spouse",
        "wife / wife of / wid / widow / widow of, followed by a capitalized name",
        r"\b(?i:wife(?:\s+of)?|wid(?:ow)?(?:\s+of)?)\s+([A-Z][a-zA-Z. ]*)",
    ),
    address: PatternRule::new(
        "address",
        "First 3-5 digit street number and the street name up to a comma or period",
        r"\b(\d{3,5})\s+([A-Za-z0-9 .]+?)(?:[,.]|$)",
    ),
    // Matched against the text just before the street number
    residence: PatternRule::new(
        "residence",
        "Residence indicator token immediately preceding the street number",
        r"\b(res\.?|r(?:ms?)?|b|h)\s+$",
    ),
});

pub static WHOLE_TEXT: Lazy<WholeTextPatterns> = Lazy::new(|| WholeTextPatterns {
    record: PatternRule::new(
        "record",
        "Surname, given name, optional middle, optional (spouse), occupation, residence indicator, address",
        r"(?m)^(?P<last>[A-Z][a-z]+)[ \t]+(?P<first>[A-Z][a-zA-Z.]*)(?:[ \t]+(?P<middle>[A-Z][a-zA-Z.]*))?(?:[ \t]+\((?P<spouse>[^)\n]+)\))?[ \t]+(?P<occupation>.*?)[ \t]+(?P<indicator>res\.?|r(?:ms?)?|b|h)[ \t]+(?P<address>\d+.*?)$",
    ),
});

pub static CLEANUP: Lazy<CleanupPatterns> = Lazy::new(|| CleanupPatterns {
    widow: PatternRule::new(
        "widow",
        "Occupation opening with a (wid NAME) annotation",
        r"^\(wid\s+(.+?)\)",
    ),
});

pub static SOURCE_FILE: Lazy<SourceFilePatterns> = Lazy::new(|| SourceFilePatterns {
    page: PatternRule::new(
        "page",
        "Page number embedded in an OCR file name",
        r"page_(\d+)",
    ),
});

/// Every table by name, in pipeline order
pub fn pattern_tables() -> Vec<(&'static str, Vec<&'static PatternRule>)> {
    vec![
        ("line-entry", Lazy::force(&LINE_ENTRY).rules()),
        ("whole-text", Lazy::force(&WHOLE_TEXT).rules()),
        ("cleanup", Lazy::force(&CLEANUP).rules()),
        ("source-file", Lazy::force(&SOURCE_FILE).rules()),
    ]
}

// ============================================================================
// TESTS
// ============================================================================
