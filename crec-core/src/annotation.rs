//! # Annotation Boundary
//!
//! The refiner does not tokenize, tag or recognize anything itself. It consumes
//! the output of an external annotation engine through a small capability set:
//!
//! - the **token sequence**, each token with its literal text;
//! - a **per-token tag** (fine-grained Penn Treebank tag plus coarse POS);
//! - a **per-span label** for entity spans (`PERSON`, `ORG`, `GPE`, ...);
//! - a **per-span lemma string** for noun chunks (pronoun detection).
//!
//! [`AnnotatedDoc`] is that boundary. [`AnnotatedText`] is the serializable
//! implementation used to exchange annotations as JSON; any other backend can
//! implement the trait directly.
//!
//! Spans are borrowed views ([`Span`]) over the document's tokens. Shrinking a
//! span yields a new, shorter view; the annotation itself is never touched.
//!
//! ## Tag roles
//!
//! | Role               | Penn tags                                   |
//! |--------------------|---------------------------------------------|
//! | `Verb`             | BES, HVS, VB, VBD, VBN, VBP, VBZ, MD        |
//! | `Adverb`           | RB                                          |
//! | `Adposition`       | IN                                          |
//! | `Conjunction`      | CC                                          |
//! | `Determiner`       | DT                                          |
//! | `PossessiveEnding` | POS                                         |
//! | `Other`            | everything else, including gerunds (VBG)    |

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Penn Treebank tags treated as verb forms. Gerunds (VBG) are left out on
/// purpose: "Veterans Serving" is still a name.
pub const VERB_TAGS: &[&str] = &["BES", "HVS", "VB", "VBD", "VBN", "VBP", "VBZ", "MD"];

/// Coarse part of speech of determiners (Universal Dependencies)
pub const DETERMINER_POS: &str = "DET";

/// Grammatical role of a token, as far as entity trimming is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenRole {
    Verb,
    Adverb,
    Adposition,
    Conjunction,
    Determiner,
    PossessiveEnding,
    Other,
}

impl TokenRole {
    /// Classifies a fine-grained Penn Treebank tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            t if VERB_TAGS.contains(&t) => TokenRole::Verb,
            "RB" => TokenRole::Adverb,
            "IN" => TokenRole::Adposition,
            "CC" => TokenRole::Conjunction,
            "DT" => TokenRole::Determiner,
            "POS" => TokenRole::PossessiveEnding,
            _ => TokenRole::Other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenRole::Verb => "verb",
            TokenRole::Adverb => "adverb",
            TokenRole::Adposition => "adposition",
            TokenRole::Conjunction => "conjunction",
            TokenRole::Determiner => "determiner",
            TokenRole::PossessiveEnding => "possessive_ending",
            TokenRole::Other => "other",
        }
    }
}

fn default_space_after() -> bool {
    true
}

/// A token as produced by the annotation engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// Literal text (ex: "Smith", "'s", "didn't" split as "did" + "n't").
    pub text: String,
    /// Fine-grained tag (ex: "NNP", "VBD", "POS").
    pub tag: String,
    /// Coarse part of speech (ex: "PROPN", "DET").
    #[serde(default)]
    pub pos: String,
    /// Lemma. Pronouns carry the engine's pronoun marker (ex: "-PRON-").
    #[serde(default)]
    pub lemma: String,
    /// Whether whitespace follows the token in the annotated text.
    #[serde(default = "default_space_after")]
    pub space_after: bool,
}

impl Token {
    /// Builds a token whose lemma is its lowercased text.
    pub fn new(text: &str, tag: &str, pos: &str) -> Self {
        Self {
            text: text.to_string(),
            tag: tag.to_string(),
            pos: pos.to_string(),
            lemma: text.to_lowercase(),
            space_after: true,
        }
    }

    pub fn with_lemma(mut self, lemma: &str) -> Self {
        self.lemma = lemma.to_string();
        self
    }

    /// Marks the token as glued to the next one (ex: "Smith" before "'s").
    pub fn glued(mut self) -> Self {
        self.space_after = false;
        self
    }

    pub fn role(&self) -> TokenRole {
        TokenRole::from_tag(&self.tag)
    }

    pub fn is_determiner(&self) -> bool {
        self.pos == DETERMINER_POS
    }
}

/// An entity recognized by the engine: half-open token range plus label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAnnotation {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

/// A noun chunk found by the engine: half-open token range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkAnnotation {
    pub start: usize,
    pub end: usize,
}

/// Borrowed view over a contiguous run of annotated tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span<'a> {
    tokens: &'a [Token],
    /// Index of the first token in the document
    start: usize,
    label: &'a str,
}

impl<'a> Span<'a> {
    pub fn new(tokens: &'a [Token], start: usize, label: &'a str) -> Self {
        Self { tokens, start, label }
    }

    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Document index of the first token.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Document index one past the last token.
    pub fn end(&self) -> usize {
        self.start + self.tokens.len()
    }

    /// Entity label; empty for noun chunks.
    pub fn label(&self) -> &'a str {
        self.label
    }

    pub fn first(&self) -> Option<&'a Token> {
        self.tokens.first()
    }

    pub fn last(&self) -> Option<&'a Token> {
        self.tokens.last()
    }

    /// Role of the token `offset` positions before the end (0 = last).
    pub fn role_from_end(&self, offset: usize) -> Option<TokenRole> {
        self.tokens
            .len()
            .checked_sub(offset + 1)
            .map(|i| self.tokens[i].role())
    }

    /// Same span without its last `n` tokens.
    pub fn drop_last(self, n: usize) -> Self {
        let keep = self.tokens.len().saturating_sub(n);
        Self {
            tokens: &self.tokens[..keep],
            ..self
        }
    }

    /// Same span without its first token.
    pub fn drop_first(self) -> Self {
        if self.tokens.is_empty() {
            return self;
        }
        Self {
            tokens: &self.tokens[1..],
            start: self.start + 1,
            label: self.label,
        }
    }

    /// Text as it reads in the document, honoring token spacing.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            text.push_str(&token.text);
            if token.space_after && i + 1 < self.tokens.len() {
                text.push(' ');
            }
        }
        text
    }

    /// Space-joined lemmas.
    pub fn lemma(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.lemma.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Capability set the refiner needs from an annotated document.
pub trait AnnotatedDoc {
    fn tokens(&self) -> &[Token];
    fn entity_annotations(&self) -> &[EntityAnnotation];
    fn noun_chunk_annotations(&self) -> &[ChunkAnnotation];

    /// Entity spans in annotation order. Ranges outside the token sequence are
    /// skipped.
    fn entities(&self) -> Vec<Span<'_>> {
        let tokens = self.tokens();
        self.entity_annotations()
            .iter()
            .filter_map(|ent| span_at(tokens, ent.start, ent.end, &ent.label))
            .collect()
    }

    /// Noun-chunk spans in annotation order, unlabeled.
    fn noun_chunks(&self) -> Vec<Span<'_>> {
        let tokens = self.tokens();
        self.noun_chunk_annotations()
            .iter()
            .filter_map(|nc| span_at(tokens, nc.start, nc.end, ""))
            .collect()
    }
}

fn span_at<'a>(tokens: &'a [Token], start: usize, end: usize, label: &'a str) -> Option<Span<'a>> {
    match tokens.get(start..end) {
        Some(slice) => Some(Span::new(slice, start, label)),
        None => {
            warn!(start, end, token_count = tokens.len(), "skipping out-of-range annotation");
            None
        }
    }
}

/// Serializable annotation of one cleaned document.
///
/// # Example (JSON)
///
/// ```json
/// {
///   "text": "Mr. Smith spoke.",
///   "tokens": [
///     {"text": "Mr.", "tag": "NNP", "pos": "PROPN"},
///     {"text": "Smith", "tag": "NNP", "pos": "PROPN"},
///     {"text": "spoke", "tag": "VBD", "pos": "VERB", "space_after": false},
///     {"text": ".", "tag": ".", "pos": "PUNCT"}
///   ],
///   "entities": [{"start": 1, "end": 2, "label": "PERSON"}],
///   "noun_chunks": [{"start": 0, "end": 2}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedText {
    /// The text the annotation was produced from, when the engine reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub entities: Vec<EntityAnnotation>,
    #[serde(default)]
    pub noun_chunks: Vec<ChunkAnnotation>,
}

impl AnnotatedText {
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(json).map_err(|e| Error::Annotation(e.to_string()))?;
        doc.validate()?;
        Ok(doc)
    }

    /// Checks that every range is well formed and inside the token sequence.
    pub fn validate(&self) -> Result<()> {
        let n = self.tokens.len();
        let ranges = self
            .entities
            .iter()
            .map(|e| ("entity", e.start, e.end))
            .chain(self.noun_chunks.iter().map(|c| ("noun chunk", c.start, c.end)));

        for (kind, start, end) in ranges {
            if start > end || end > n {
                return Err(Error::Annotation(format!(
                    "{kind} range {start}..{end} outside {n} tokens"
                )));
            }
        }
        Ok(())
    }
}

impl AnnotatedDoc for AnnotatedText {
    fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn entity_annotations(&self) -> &[EntityAnnotation] {
        &self.entities
    }

    fn noun_chunk_annotations(&self) -> &[ChunkAnnotation] {
        &self.noun_chunks
    }
}

/// The external annotation engine, seen from the pipeline.
pub trait Annotator {
    type Doc: AnnotatedDoc;

    fn annotate(&self, cleaned_text: &str) -> Result<Self::Doc>;
}

/// Serves an annotation computed ahead of time (ex: by a tagger run in a
/// separate process over the normalizer's output).
#[derive(Debug, Clone)]
pub struct PrecomputedAnnotator {
    annotation: AnnotatedText,
}

impl PrecomputedAnnotator {
    pub fn new(annotation: AnnotatedText) -> Self {
        Self { annotation }
    }
}

impl Annotator for PrecomputedAnnotator {
    type Doc = AnnotatedText;

    /// Rejects the annotation when it records a source text different from
    /// `cleaned_text`.
    fn annotate(&self, cleaned_text: &str) -> Result<AnnotatedText> {
        if let Some(source) = &self.annotation.text {
            if source != cleaned_text {
                return Err(Error::Annotation(
                    "annotation was produced for a different text".to_string(),
                ));
            }
        }
        self.annotation.validate()?;
        Ok(self.annotation.clone())
    }
}
