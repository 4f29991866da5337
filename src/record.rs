// 🗂️ Resident Records - One canonical schema for every directory year
// Flat legacy files (the whole-text project's output) are adapted on load

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

// ============================================================================
// PROVENANCE
// ============================================================================

/// Where a record came from: directory edition, page and year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub directory_name: String,
    pub page_number: Option<u32>,
    pub year: Option<u16>,
}

impl Provenance {
    pub fn new(directory_name: &str) -> Self {
        Provenance {
            directory_name: directory_name.to_string(),
            page_number: None,
            year: None,
        }
    }

    pub fn with_page(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }
}

// ============================================================================
// HOME ADDRESS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeAddress {
    #[serde(rename = "StreetNumber", default)]
    pub street_number: Option<String>,

    #[serde(rename = "StreetName", default)]
    pub street_name: Option<String>,

    #[serde(rename = "ApartmentOrUnit", default)]
    pub apartment_or_unit: Option<String>,

    /// h, r, rm, rms, b, res
    #[serde(rename = "ResidenceIndicator", default)]
    pub residence_indicator: Option<String>,
}

impl HomeAddress {
    /// Split a flat address ("1234 Main St") into street number and street name
    pub fn from_text(text: &str, residence_indicator: Option<String>) -> Self {
        let text = text.trim();
        let digits_end = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        let (number, name) = text.split_at(digits_end);
        let name = name.trim();

        HomeAddress {
            street_number: (!number.is_empty()).then(|| number.to_string()),
            street_name: (!name.is_empty()).then(|| name.to_string()),
            apartment_or_unit: None,
            residence_indicator,
        }
    }

    /// Plain-text rendering, without the residence indicator
    pub fn to_text(&self) -> String {
        [&self.street_number, &self.street_name, &self.apartment_or_unit]
            .iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ============================================================================
// RESIDENT RECORD
// ============================================================================

/// Canonical resident record. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentRecord {
    #[serde(rename = "FirstName")]
    pub first_name: String,

    #[serde(rename = "LastName")]
    pub last_name: String,

    #[serde(rename = "Spouse", default)]
    pub spouse: Option<String>,

    #[serde(rename = "Occupation", default)]
    pub occupation: Option<String>,

    #[serde(rename = "CompanyName", default)]
    pub company_name: Option<String>,

    #[serde(rename = "HomeAddress", default)]
    pub home_address: Option<HomeAddress>,

    /// Not extracted yet
    #[serde(rename = "WorkAddress", default)]
    pub work_address: Option<String>,

    /// Not extracted yet
    #[serde(rename = "Telephone", default)]
    pub telephone: Option<String>,

    #[serde(rename = "DirectoryName", default)]
    pub directory_name: String,

    #[serde(rename = "PageNumber", default)]
    pub page_number: Option<u32>,

    #[serde(rename = "Year", default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
}

impl ResidentRecord {
    pub fn new(first_name: String, last_name: String, provenance: &Provenance) -> Self {
        ResidentRecord {
            first_name,
            last_name,
            spouse: None,
            occupation: None,
            company_name: None,
            home_address: None,
            work_address: None,
            telephone: None,
            directory_name: provenance.directory_name.clone(),
            page_number: provenance.page_number,
            year: provenance.year,
        }
    }

    pub fn with_spouse(mut self, spouse: Option<String>) -> Self {
        self.spouse = spouse;
        self
    }

    pub fn with_occupation(mut self, occupation: Option<String>, company: Option<String>) -> Self {
        self.occupation = occupation;
        self.company_name = company;
        self
    }

    pub fn with_home_address(mut self, home_address: Option<HomeAddress>) -> Self {
        self.home_address = home_address;
        self
    }
}

// ============================================================================
// LEGACY FLAT SCHEMA
// ============================================================================

/// Flat record written by the 1912 whole-text project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyEntry {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub spouse_name: Option<String>,
    #[serde(default)]
    pub residence_indicator: Option<String>,
    #[serde(default)]
    pub home_address: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub employer: Option<String>,
    #[serde(default)]
    pub business_address: Option<String>,
    #[serde(default)]
    pub year: Option<u16>,
}

impl LegacyEntry {
    /// Adapt to the canonical schema. Directory name and page come from the caller.
    pub fn into_record(self, provenance: &Provenance) -> ResidentRecord {
        let home_address = self
            .home_address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(|address| HomeAddress::from_text(address, self.residence_indicator.clone()));

        ResidentRecord {
            first_name: self.first_name,
            last_name: self.last_name,
            spouse: self.spouse_name,
            occupation: self.occupation,
            company_name: self.employer,
            home_address,
            work_address: self.business_address,
            telephone: None,
            directory_name: provenance.directory_name.clone(),
            page_number: provenance.page_number,
            year: self.year.or(provenance.year),
        }
    }
}

/// Either schema, canonical tried first
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Canonical(ResidentRecord),
    Legacy(LegacyEntry),
}

// ============================================================================
// LOAD / SAVE
// ============================================================================

/// Parse a JSON array of records in either schema
pub fn parse_records(json: &str, provenance: &Provenance) -> Result<Vec<ResidentRecord>> {
    let values: Vec<Value> =
        serde_json::from_str(json).context("Expected a JSON array of records")?;

    values
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            let stored: StoredRecord = serde_json::from_value(value).with_context(|| {
                format!("Record {} matches neither the canonical nor the legacy schema", idx)
            })?;

            Ok(match stored {
                StoredRecord::Canonical(record) => record,
                StoredRecord::Legacy(entry) => entry.into_record(provenance),
            })
        })
        .collect()
}

/// Load a records file. Legacy records take directory/page from `provenance`.
pub fn load_records(path: &Path, provenance: &Provenance) -> Result<Vec<ResidentRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file: {}", path.display()))?;

    parse_records(&content, provenance)
        .with_context(|| format!("Failed to parse records JSON from {}", path.display()))
}

/// Write records as a 2-space indented JSON array
pub fn write_records(path: &Path, records: &[ResidentRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("Failed to serialize records")?;

    fs::write(path, json)
        .with_context(|| format!("Failed to write records to {}", path.display()))
}

/// Audit log: one pretty JSON block per record, blank line after each
pub fn write_rejected_log(path: &Path, records: &[ResidentRecord]) -> Result<()> {
    let mut log = String::new();
    for record in records {
        log.push_str(
            &serde_json::to_string_pretty(record).context("Failed to serialize rejected record")?,
        );
        log.push_str("\n\n");
    }

    fs::write(path, log)
        .with_context(|| format!("Failed to write rejected entries to {}", path.display()))
}

// ============================================================================
// CSV EXPORT
// ============================================================================

/// Flattened row for spreadsheet review
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "LastName")]
    last_name: &'a str,
    #[serde(rename = "FirstName")]
    first_name: &'a str,
    #[serde(rename = "Spouse")]
    spouse: Option<&'a str>,
    #[serde(rename = "Occupation")]
    occupation: Option<&'a str>,
    #[serde(rename = "CompanyName")]
    company_name: Option<&'a str>,
    #[serde(rename = "StreetNumber")]
    street_number: Option<&'a str>,
    #[serde(rename = "StreetName")]
    street_name: Option<&'a str>,
    #[serde(rename = "ApartmentOrUnit")]
    apartment_or_unit: Option<&'a str>,
    #[serde(rename = "ResidenceIndicator")]
    residence_indicator: Option<&'a str>,
    #[serde(rename = "DirectoryName")]
    directory_name: &'a str,
    #[serde(rename = "PageNumber")]
    page_number: Option<u32>,
    #[serde(rename = "Year")]
    year: Option<u16>,
}

impl<'a> From<&'a ResidentRecord> for CsvRow<'a> {
    fn from(record: &'a ResidentRecord) -> Self {
        let address = record.home_address.as_ref();

        CsvRow {
            last_name: &record.last_name,
            first_name: &record.first_name,
            spouse: record.spouse.as_deref(),
            occupation: record.occupation.as_deref(),
            company_name: record.company_name.as_deref(),
            street_number: address.and_then(|a| a.street_number.as_deref()),
            street_name: address.and_then(|a| a.street_name.as_deref()),
            apartment_or_unit: address.and_then(|a| a.apartment_or_unit.as_deref()),
            residence_indicator: address.and_then(|a| a.residence_indicator.as_deref()),
            directory_name: &record.directory_name,
            page_number: record.page_number,
            year: record.year,
        }
    }
}

/// Export records to CSV, returns rows written
pub fn export_csv(path: &Path, records: &[ResidentRecord]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    for record in records {
        writer
            .serialize(CsvRow::from(record))
            .context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV file")?;

    Ok(records.len())
}

// ============================================================================
// TESTS
// ============================================================================
