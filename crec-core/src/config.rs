//! # Refiner Configuration
//!
//! Every corpus-specific knob of the refiner lives here instead of in
//! module-level constants, so callers can tune them per corpus (ex: a JSON file
//! passed to the CLI). All fields have defaults tuned for the Congressional
//! Record; a config file only needs the fields it overrides.
//!
//! ```rust
//! use crec_core::config::RefinerConfig;
//!
//! let config = RefinerConfig::from_json(r#"{"casing": {"force": false}}"#).unwrap();
//! assert!(!config.casing.force);
//! assert!(config.trim.verb);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Entity types produced by numeric/date recognizers. Excluded by default.
pub const NUMERIC_ENTITY_TYPES: &[&str] = &[
    "DATE", "TIME", "PERCENT", "MONEY", "QUANTITY", "ORDINAL", "CARDINAL",
];

/// Honorifics and ceremonial words the tagger keeps mistaking for names.
pub const ENTITY_BLACKLIST: &[&str] = &[
    "Hon", "Jr", "Memory", "Speaker", "Thereupon", "Sr", "Tribute To Dr", "REP",
    "HON", "JR", "SR", "Madam", "Dear Madam", "Sincerely", "Speaker Pro Tempore",
    "Adjournment",
];

/// Words glued onto names by ALL-CAPS headlines ("IN HONOR OF JEIRAN ON HIS
/// 100TH BIRTHDAY" yields "JEIRAN ON").
pub const FALSE_POSITIVE_SUFFIXES: &[&str] = &["On", "Sine Die Adjournment"];

/// Lemma the annotation engine assigns to pronouns
pub const PRONOUN_LEMMA: &str = "-PRON-";

/// Which trailing tokens [`crate::trim::trim_trailing`] removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimOptions {
    pub verb: bool,
    pub adposition: bool,
    pub conjunction: bool,
    pub determiner: bool,
    pub possessive_ending: bool,
}

impl Default for TrimOptions {
    fn default() -> Self {
        Self {
            verb: true,
            adposition: true,
            conjunction: true,
            determiner: true,
            possessive_ending: true,
        }
    }
}

/// Punctuation removed from entity text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PunctuationMarks {
    /// Removed wherever they occur
    pub marks: String,
    /// Removed only as a run at the start
    pub beginning_marks: Option<String>,
    /// Removed only as a run at the end
    pub trailing_marks: Option<String>,
}

impl Default for PunctuationMarks {
    fn default() -> Self {
        Self {
            // Periods survive inside names ("U.S. Senate")...
            marks: r##"!"#$%&'()*+,-/:;<=>?@[\]^_`{|}~"##.to_string(),
            // ...but not at the front, and neither does leading space.
            beginning_marks: Some(r##"!"#$%&'()*+,-/.:;<=>?@[\]^_`{|}~ "##.to_string()),
            trailing_marks: None,
        }
    }
}

/// Display casing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Casing {
    /// Title-case multi-word phrases even when they are all caps
    pub force: bool,
    /// Longest single all-caps word kept as an acronym in forced mode
    pub acronym_max_len: usize,
}

impl Default for Casing {
    fn default() -> Self {
        Self {
            force: true,
            acronym_max_len: 4,
        }
    }
}

/// Full configuration of the entity refiner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinerConfig {
    pub exclude_types: Vec<String>,
    /// Drop a leading determiner from entity and noun-chunk spans
    pub drop_determiners: bool,
    pub trim: TrimOptions,
    pub punctuation: PunctuationMarks,
    pub casing: Casing,
    pub blacklist: Vec<String>,
    pub false_positive_suffixes: Vec<String>,
    /// Noun chunks containing any of these substrings are ignored
    pub noun_chunk_blocklist: Vec<String>,
    pub pronoun_lemma: String,
}

impl Default for RefinerConfig {
    fn default() -> Self {
        Self {
            exclude_types: to_strings(NUMERIC_ENTITY_TYPES),
            drop_determiners: true,
            trim: TrimOptions::default(),
            punctuation: PunctuationMarks::default(),
            casing: Casing::default(),
            blacklist: to_strings(ENTITY_BLACKLIST),
            false_positive_suffixes: to_strings(FALSE_POSITIVE_SUFFIXES),
            noun_chunk_blocklist: vec![" HON ".to_string()],
            pronoun_lemma: PRONOUN_LEMMA.to_string(),
        }
    }
}

impl RefinerConfig {
    /// Parses a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
