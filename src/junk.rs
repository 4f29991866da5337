// 🗑️ Junk Filter - Lines that are not resident entries
// Ads, running headers and cross-references, decided per line with no state

use crate::config::DEFAULT_AD_KEYWORDS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JunkReason {
    /// Empty or whitespace-only
    Blank,

    /// Entirely uppercase (section or page header)
    Header,

    /// Contains an advertisement keyword
    Advertisement { keyword: String },

    /// "see also" cross-reference notice
    CrossReference,
}

impl JunkReason {
    pub fn code(&self) -> &'static str {
        match self {
            JunkReason::Blank => "blank",
            JunkReason::Header => "header",
            JunkReason::Advertisement { .. } => "advertisement",
            JunkReason::CrossReference => "cross_reference",
        }
    }
}

#[derive(Debug, Clone)]
pub struct JunkFilter {
    /// Stored lowercase
    ad_keywords: Vec<String>,
}

impl JunkFilter {
    pub fn new<S: AsRef<str>>(ad_keywords: &[S]) -> Self {
        JunkFilter {
            ad_keywords: ad_keywords
                .iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Why a line is junk, or None for a candidate resident entry
    pub fn classify(&self, line: &str) -> Option<JunkReason> {
        let line = line.trim();
        if line.is_empty() {
            return Some(JunkReason::Blank);
        }

        if is_all_caps(line) {
            return Some(JunkReason::Header);
        }

        let lower = line.to_lowercase();
        if let Some(keyword) = self.ad_keywords.iter().find(|k| lower.contains(k.as_str())) {
            return Some(JunkReason::Advertisement {
                keyword: keyword.clone(),
            });
        }

        if lower.contains("see also") {
            return Some(JunkReason::CrossReference);
        }

        None
    }

    pub fn is_junk(&self, line: &str) -> bool {
        self.classify(line).is_some()
    }
}

impl Default for JunkFilter {
    fn default() -> Self {
        Self::new(DEFAULT_AD_KEYWORDS)
    }
}

/// At least one cased character and no lowercase ones
pub fn is_all_caps(text: &str) -> bool {
    let mut has_cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_line_is_junk() {
        let filter = JunkFilter::default();

        assert_eq!(
            filter.classify("MINNEAPOLIS DIRECTORY CO."),
            Some(JunkReason::Header)
        );
    }

    #[test]
    fn test_cross_reference_is_junk() {
        let filter = JunkFilter::default();

        assert_eq!(
            filter.classify("Smith John, see also Smyth"),
            Some(JunkReason::CrossReference)
        );
        assert!(filter.is_junk("Johnson  See Also Johnston"));
    }

    #[test]
    fn test_advertisement_keyword() {
        let filter = JunkFilter::default();

        assert_eq!(
            filter.classify("Hotel trunks and messengers"),
            Some(JunkReason::Advertisement {
                keyword: "trunks".to_string()
            })
        );
        assert!(filter.is_junk("Fine Creamery Butter"));
    }

    #[test]
    fn test_blank_is_junk() {
        let filter = JunkFilter::default();

        assert_eq!(filter.classify(""), Some(JunkReason::Blank));
        assert_eq!(filter.classify("  \t "), Some(JunkReason::Blank));
    }

    #[test]
    fn test_resident_entry_passes() {
        let filter = JunkFilter::default();

        assert!(!filter.is_junk("Smith John H, carpenter, h 1234 Main St"));
        assert!(!filter.is_junk("\" wife of Henry, h 500 Elm"));
    }

    #[test]
    fn test_custom_keywords_ignore_empty() {
        let filter = JunkFilter::new(&["", "  ", "Coal"]);

        assert!(filter.is_junk("Anderson Coal and Wood"));
        assert!(!filter.is_junk("Smith John, carpenter"));
    }

    #[test]
    fn test_is_all_caps() {
        assert!(is_all_caps("A-B CO. 1900"));
        assert!(!is_all_caps("Smith"));
        assert!(!is_all_caps("\" 1234"));
    }

    #[test]
    fn test_classification_is_idempotent() {
        let filter = JunkFilter::default();
        let lines = ["MINNEAPOLIS", "Smith John, carpenter", "see also Brown", ""];

        for line in lines {
            assert_eq!(filter.classify(line), filter.classify(line));
        }
    }
}
