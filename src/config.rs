// ⚙️ Pipeline Configuration
// Directory name, page, year and keyword lists, loaded from TOML and overridable from the CLI

use crate::patterns::SOURCE_FILE;
use crate::record::Provenance;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_DIRECTORY_NAME: &str = "Minneapolis 1900";
pub const DEFAULT_PAGE_NUMBER: u32 = 105;

/// Advertisement keywords (case-insensitive substring match)
pub const DEFAULT_AD_KEYWORDS: &[&str] = &[
    "directory",
    "tackle",
    "furnished",
    "trunks",
    "messengers",
    "butter",
    "store",
    "laundry",
    "tel",
];

/// Name terms marking a business listing rather than a person
pub const DEFAULT_JUNK_NAME_TERMS: &[&str] = &[
    "hotel",
    "building",
    "flats",
    "apartments",
    "realty",
    "company",
    "co",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory edition stamped on every record
    pub directory_name: String,

    /// Fallback page number when neither the CLI nor the file name gives one
    pub page_number: Option<u32>,

    pub year: Option<u16>,

    pub ad_keywords: Vec<String>,

    pub junk_name_terms: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            directory_name: DEFAULT_DIRECTORY_NAME.to_string(),
            page_number: Some(DEFAULT_PAGE_NUMBER),
            year: None,
            ad_keywords: DEFAULT_AD_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            junk_name_terms: DEFAULT_JUNK_NAME_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl PipelineConfig {
    /// Load from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML: {}", path.display()))
    }

    /// Config file when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Provenance for records that carry no page of their own
    pub fn provenance(&self) -> Provenance {
        Provenance {
            directory_name: self.directory_name.clone(),
            page_number: self.page_number,
            year: self.year,
        }
    }

    /// Provenance for one OCR file.
    ///
    /// Page precedence: explicit override, then `page_<N>` in the file name,
    /// then the configured page.
    pub fn provenance_for(&self, source: &Path, page_override: Option<u32>) -> Provenance {
        let page_number = page_override
            .or_else(|| page_number_from_path(source))
            .or(self.page_number);

        Provenance {
            page_number,
            ..self.provenance()
        }
    }
}

/// `ocr/page_105_pg113.txt` → 105
pub fn page_number_from_path(path: &Path) -> Option<u32> {
    let filename = path.file_name()?.to_str()?;
    let caps = SOURCE_FILE.page.regex.captures(filename)?;
    caps.get(1)?.as_str().parse().ok()
}

// ============================================================================
// TESTS
// ============================================================================
