//! # Entity Refiner
//!
//! Turns the raw entity spans of an annotation into clean display strings.
//!
//! ## Stages
//!
//! 1. **Candidates**: entity spans minus excluded types (dates, amounts...),
//!    with a leading determiner dropped ("the Senate" → "Senate").
//! 2. **Trimming** ([`crate::trim`]): trailing verbs, adpositions,
//!    conjunctions, determiners and possessive endings go away.
//! 3. **Length filter**: spans of a single character are noise.
//! 4. **Cleaning**: punctuation removal, display casing, false-positive
//!    suffix correction, then the blacklist.
//!
//! | Raw span                          | Display string   |
//! |-----------------------------------|------------------|
//! | `the Senate`                      | `Senate`         |
//! | `JOHN SMITH said`                 | `John Smith`     |
//! | `NPR`                             | `NPR`            |
//! | `JEIRAN ON`                       | `Jeiran`         |
//! | `Mr. Speaker`                     | (dropped)        |
//!
//! Noun chunks go through the same candidate stage and are then ranked by
//! [`EntityRefiner::noun_chunk_frequency`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::aggregate::{rank_by_frequency, NounChunkFrequency};
use crate::annotation::{AnnotatedDoc, Span, Token};
use crate::config::{Casing, PunctuationMarks, RefinerConfig};
use crate::trim::trim_trailing;

/// An entity that survived refinement: the (possibly trimmed) span and the
/// string shown to users.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedEntity<'a> {
    pub span: Span<'a>,
    pub display: String,
}

/// Owned form of [`ProcessedEntity`], detached from the annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Span text as annotated (after trimming)
    pub text: String,
    pub display: String,
    pub label: String,
}

impl From<&ProcessedEntity<'_>> for EntityRecord {
    fn from(entity: &ProcessedEntity<'_>) -> Self {
        Self {
            text: entity.span.text(),
            display: entity.display.clone(),
            label: entity.span.label().to_string(),
        }
    }
}

/// Title-cases `text`: a cased character is uppercased when it follows an
/// uncased one and lowercased otherwise ("O'NEILL" → "O'Neill").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_cased = false;
    for c in text.chars() {
        if prev_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_cased = c.is_uppercase() || c.is_lowercase();
    }
    out
}

/// True when `word` has cased characters and none of them is lowercase.
pub fn is_all_caps(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

/// Removes punctuation from an entity text.
///
/// Leading `beginning_marks` and trailing `trailing_marks` runs are stripped
/// first, then every character of `marks` is dropped. An empty `marks` drops
/// all ASCII punctuation.
pub fn remove_punct(text: &str, marks: &PunctuationMarks) -> String {
    let mut text = text;
    if let Some(leading) = marks.beginning_marks.as_deref() {
        text = text.trim_start_matches(|c: char| leading.contains(c));
    }
    if let Some(trailing) = marks.trailing_marks.as_deref() {
        text = text.trim_end_matches(|c: char| trailing.contains(c));
    }

    if marks.marks.is_empty() {
        text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
    } else {
        text.chars().filter(|c| !marks.marks.contains(*c)).collect()
    }
}

/// Applies the display casing policy.
///
/// Forced mode: phrases are title-cased word by word; a single word is kept
/// only when it is all caps and no longer than `acronym_max_len` ("NPR",
/// "WBUR"). Otherwise each word is title-cased unless it is all caps.
pub fn display_case(text: &str, casing: &Casing) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();

    if !casing.force {
        return words
            .iter()
            .map(|w| if is_all_caps(w) { w.to_string() } else { title_case(w) })
            .collect::<Vec<_>>()
            .join(" ");
    }

    match words.as_slice() {
        [] => String::new(),
        [word] if is_all_caps(word) && word.chars().count() <= casing.acronym_max_len => {
            word.to_string()
        }
        [word] => title_case(word),
        _ => words.iter().map(|w| title_case(w)).collect::<Vec<_>>().join(" "),
    }
}

/// Case-insensitive comparison key for blacklist lookups.
fn case_key(text: &str) -> String {
    text.split_whitespace()
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Refines entity spans and noun chunks of annotated documents.
///
/// Holds no per-document state: one refiner can serve any number of
/// documents, from any number of threads.
#[derive(Debug, Clone)]
pub struct EntityRefiner {
    config: RefinerConfig,
    /// Blacklist entries, case-normalized
    blacklist: HashSet<String>,
}

impl EntityRefiner {
    pub fn new(config: RefinerConfig) -> Self {
        let blacklist = config.blacklist.iter().map(|b| case_key(b)).collect();
        Self { config, blacklist }
    }

    pub fn config(&self) -> &RefinerConfig {
        &self.config
    }

    /// Entity spans that are not of an excluded type, leading determiner
    /// dropped when configured.
    pub fn candidate_entities<'a, D: AnnotatedDoc + ?Sized>(&self, doc: &'a D) -> Vec<Span<'a>> {
        doc.entities()
            .into_iter()
            .filter(|span| !self.config.exclude_types.iter().any(|t| t == span.label()))
            .map(|span| self.drop_leading_determiner(span))
            .collect()
    }

    /// Noun-chunk spans, leading determiner dropped when configured.
    pub fn candidate_noun_chunks<'a, D: AnnotatedDoc + ?Sized>(&self, doc: &'a D) -> Vec<Span<'a>> {
        doc.noun_chunks()
            .into_iter()
            .map(|span| self.drop_leading_determiner(span))
            .collect()
    }

    fn drop_leading_determiner<'a>(&self, span: Span<'a>) -> Span<'a> {
        if self.config.drop_determiners && span.first().is_some_and(Token::is_determiner) {
            span.drop_first()
        } else {
            span
        }
    }

    /// Extracts, trims and cleans the named entities of `doc`.
    pub fn extract_entities<'a, D: AnnotatedDoc + ?Sized>(&self, doc: &'a D) -> Vec<ProcessedEntity<'a>> {
        let candidates = self.candidate_entities(doc);
        let total = candidates.len();

        let entities: Vec<ProcessedEntity<'a>> = candidates
            .into_iter()
            .filter_map(|span| trim_trailing(span, &self.config.trim))
            .filter(|span| span.text().graphemes(true).count() > 1)
            .filter_map(|span| self.clean_entity(span))
            .collect();

        debug!(candidates = total, kept = entities.len(), "refined named entities");
        entities
    }

    /// Cleans one span into a [`ProcessedEntity`], or drops it.
    ///
    /// Suffixes are stripped before the blacklist lookup, so "SPEAKER ON"
    /// is dropped like "Speaker".
    pub fn clean_entity<'a>(&self, span: Span<'a>) -> Option<ProcessedEntity<'a>> {
        let text = remove_punct(&span.text(), &self.config.punctuation);
        let shown = self.strip_false_positive_suffixes(display_case(&text, &self.config.casing));

        if shown.is_empty() {
            debug!(span = %span.text(), "dropping entity with no text left");
            return None;
        }
        if self.is_blacklisted(&shown) {
            debug!(entity = %shown, "dropping blacklisted entity");
            return None;
        }

        Some(ProcessedEntity { span, display: shown })
    }

    pub fn is_blacklisted(&self, shown: &str) -> bool {
        self.blacklist.contains(&case_key(shown))
    }

    /// "Jeiran On" → "Jeiran", "Smith On On" → "Smith". Only whole trailing
    /// words match; suffixes are removed until none is left at the end.
    fn strip_false_positive_suffixes(&self, shown: String) -> String {
        let mut shown = shown;
        loop {
            let head = self.config.false_positive_suffixes.iter().find_map(|suffix| {
                shown
                    .strip_suffix(suffix.as_str())
                    .and_then(|head| head.strip_suffix(' '))
            });
            match head {
                Some(head) => shown = head.trim_end().to_string(),
                None => return shown,
            }
        }
    }

    /// Ranks the noun chunks of `doc` by frequency.
    ///
    /// Chunks whose lemma contains the pronoun marker, or whose text contains
    /// a blocklisted substring, are not counted.
    pub fn noun_chunk_frequency<D: AnnotatedDoc + ?Sized>(&self, doc: &D) -> NounChunkFrequency {
        let pronoun = self.config.pronoun_lemma.as_str();
        let blocklist = &self.config.noun_chunk_blocklist;

        let texts = self
            .candidate_noun_chunks(doc)
            .into_iter()
            .filter(|nc| pronoun.is_empty() || !nc.lemma().contains(pronoun))
            .map(|nc| nc.text())
            .filter(|text| !text.is_empty())
            .filter(|text| !blocklist.iter().any(|b| text.contains(b.as_str())))
            .map(|text| title_case(&text));

        rank_by_frequency(texts)
    }
}

impl Default for EntityRefiner {
    fn default() -> Self {
        Self::new(RefinerConfig::default())
    }
}
