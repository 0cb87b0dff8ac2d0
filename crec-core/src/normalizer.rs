//! # Text Normalizer
//!
//! Converts the full text of a Congressional Record document into a single
//! line of prose that an annotation engine can digest.
//!
//! Raw CREC files carry a binary or HTML preamble, `EXTENSION OF REMARKS`
//! banners, underscore rulers between sections and hard-wrapped lines. The
//! normalizer strips all of it with a fixed sequence of rewrites:
//!
//! | # | Rewrite                                        | Result            |
//! |---|------------------------------------------------|-------------------|
//! | 1 | cut everything before the first CAPS run (≥10) | body only         |
//! | 2 | `EXTENSION OF REMARKS` banner + newlines       | removed           |
//! | 3 | `HON.`                                         | `HON`             |
//! | 4 | `___` rulers                                   | newline           |
//! | 5 | `<tag>` fragments                              | removed           |
//! | 6 | 3+ newlines                                    | `. `              |
//! | 7 | single newline                                 | space             |
//! | 8 | whitespace runs                                | one space         |
//! | 9 | `..` runs                                      | `.`               |
//! | 10| `. . ` noise                                   | `. `              |
//! | 11| `. of` / `. in`                                | ` of` / ` in`     |
//!
//! The order matters: `HON.` must lose its period before paragraph breaks are
//! turned into sentence breaks, and markup has to go before whitespace is
//! collapsed.
//!
//! ## Example
//!
//! ```rust
//! use crec_core::normalizer::normalize;
//!
//! let raw = "<pre>\nEXTENSION OF REMARKS\nHON. JANE DOE\nof california\n</pre>";
//! let cleaned = normalize(raw).unwrap();
//! assert_eq!(cleaned, "HON JANE DOE of california");
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};

/// One regex substitution of the normalization sequence.
struct Rewrite {
    pattern: Regex,
    replacement: &'static str,
    /// Trim surrounding whitespace after substituting
    trim: bool,
}

impl Rewrite {
    fn new(pattern: &str, replacement: &'static str, trim: bool) -> Self {
        Self {
            pattern: Regex::new(pattern).unwrap(),
            replacement,
            trim,
        }
    }

    fn apply(&self, text: &str) -> String {
        let rewritten = self.pattern.replace_all(text, self.replacement);
        if self.trim {
            rewritten.trim().to_string()
        } else {
            rewritten.into_owned()
        }
    }
}

lazy_static! {
    /// Start of the record body: ten or more uppercase letters, ASCII
    /// punctuation marks or spaces in a row.
    static ref CONTENT_START: Regex =
        Regex::new(r##"[A-Z!"#$%&'()*+,\-./:;<=>?@\[\\\]^_`{|}~ ]{10,}"##).unwrap();

    static ref REWRITES: Vec<Rewrite> = vec![
        // Banner, tolerant of letter-spaced OCR output
        Rewrite::new(
            r"E\s?X\s?T\s?E\s?N\s?S\s?I\s?O\s?N\s+O\s?F\s+R\s?E\s?M\s?A\s?R\s?K\s?S\n+",
            "",
            false,
        ),
        Rewrite::new(r"HON\.", "HON", false),
        Rewrite::new(r"_{3,}", "\n", false),
        Rewrite::new(r"<[^<]+?>", "", false),
        Rewrite::new(r"\n{3,}", ". ", true),
        Rewrite::new(r"\n", " ", true),
        // Second pass needed: the first can leave fresh whitespace pairs behind
        Rewrite::new(r" {3,}", " ", true),
        Rewrite::new(r"\s{2,}", " ", true),
        Rewrite::new(r"\.{2,}", ".", true),
        // Spaced ellipses left over from the previous step
        Rewrite::new(r"[. ]{2,}", ". ", true),
        Rewrite::new(r"\. of", " of", false),
        Rewrite::new(r"\. in", " in", false),
    ];
}

/// Byte offset where the record body starts, if the text has one.
pub fn content_start(raw: &str) -> Option<usize> {
    CONTENT_START.find(raw).map(|m| m.start())
}

/// Normalizes raw CREC text into cleaned prose.
///
/// Fails with [`Error::NoContentFound`] when no body start can be located;
/// the document cannot be processed further in that case.
pub fn normalize(raw: &str) -> Result<String> {
    let start = content_start(raw).ok_or(Error::NoContentFound)?;
    if start > 0 {
        debug!(discarded_bytes = start, "dropped document preamble");
    }

    let cleaned = REWRITES
        .iter()
        .fold(raw[start..].to_string(), |text, rewrite| rewrite.apply(&text));
    Ok(cleaned)
}
