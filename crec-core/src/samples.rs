//! # Sample Record
//!
//! A short Extension of Remarks in its raw CREC form, together with the
//! annotation a spaCy-style engine produces for its cleaned text. Used by the
//! CLI `demo` command and by tests across the crate.
//!
//! The annotation follows the engine conventions the refiner expects:
//! Penn Treebank fine tags, Universal Dependencies coarse tags, and `-PRON-`
//! as the lemma of every pronoun.

use crate::annotation::{AnnotatedText, ChunkAnnotation, EntityAnnotation, Token};
use crate::config::PRONOUN_LEMMA;

/// Raw record as downloaded: bracketed header, `<pre>` markup, banner,
/// headline, underscore ruler and hard-wrapped lines.
pub const SAMPLE_RECORD: &str = "[Congressional Record Volume 163, Number 1]\n\
<pre>\n\
EXTENSION OF REMARKS\n\
IN HONOR OF JEIRAN ON HIS 100TH BIRTHDAY\n\
_______________\n\
\n\
HON. JANE DOE\n\
of california\n\
in the house of representatives\n\
Tuesday, January 3, 2017\n\
\n\
\n\
Ms. DOE. Mr. Speaker, I rise to honor Jeiran Smith. The Senate\n\
Committee on Veterans' Affairs and NPR reported on the farm bill.\n\
Jane Doe supports the farm bill.\n\
</pre>\n";

/// What the normalizer makes of [`SAMPLE_RECORD`].
pub const SAMPLE_CLEANED: &str = "IN HONOR OF JEIRAN ON HIS 100TH BIRTHDAY. \
HON JANE DOE of california in the house of representatives Tuesday, January 3, 2017. \
Ms. DOE. Mr. Speaker, I rise to honor Jeiran Smith. \
The Senate Committee on Veterans' Affairs and NPR reported on the farm bill. \
Jane Doe supports the farm bill.";

/// Builds tokens from `(text, tag, pos)` triples.
///
/// Lemmas are lowercased text, `-PRON-` for pronouns. A token is glued to the
/// next one when that one is punctuation or a possessive ending.
pub fn tokens(triples: &[(&str, &str, &str)]) -> Vec<Token> {
    let mut tokens: Vec<Token> = triples
        .iter()
        .map(|(text, tag, pos)| {
            let token = Token::new(text, tag, pos);
            if *pos == "PRON" {
                token.with_lemma(PRONOUN_LEMMA)
            } else {
                token
            }
        })
        .collect();

    for i in 1..tokens.len() {
        if tokens[i].pos == "PUNCT" || tokens[i].tag == "POS" {
            tokens[i - 1].space_after = false;
        }
    }
    tokens
}

fn entity(start: usize, end: usize, label: &str) -> EntityAnnotation {
    EntityAnnotation {
        start,
        end,
        label: label.to_string(),
    }
}

fn chunk(start: usize, end: usize) -> ChunkAnnotation {
    ChunkAnnotation { start, end }
}

/// Annotation of [`SAMPLE_CLEANED`].
pub fn sample_annotation() -> AnnotatedText {
    let tokens = tokens(&[
        ("IN", "IN", "ADP"),                // 0
        ("HONOR", "NNP", "PROPN"),          // 1
        ("OF", "IN", "ADP"),                // 2
        ("JEIRAN", "NNP", "PROPN"),         // 3
        ("ON", "NNP", "PROPN"),             // 4  headline caps fool the tagger
        ("HIS", "PRP$", "PRON"),            // 5
        ("100TH", "JJ", "ADJ"),             // 6
        ("BIRTHDAY", "NN", "NOUN"),         // 7
        (".", ".", "PUNCT"),                // 8
        ("HON", "NNP", "PROPN"),            // 9
        ("JANE", "NNP", "PROPN"),           // 10
        ("DOE", "NNP", "PROPN"),            // 11
        ("of", "IN", "ADP"),                // 12
        ("california", "NNP", "PROPN"),     // 13
        ("in", "IN", "ADP"),                // 14
        ("the", "DT", "DET"),               // 15
        ("house", "NN", "NOUN"),            // 16
        ("of", "IN", "ADP"),                // 17
        ("representatives", "NNS", "NOUN"), // 18
        ("Tuesday", "NNP", "PROPN"),        // 19
        (",", ",", "PUNCT"),                // 20
        ("January", "NNP", "PROPN"),        // 21
        ("3", "CD", "NUM"),                 // 22
        (",", ",", "PUNCT"),                // 23
        ("2017", "CD", "NUM"),              // 24
        (".", ".", "PUNCT"),                // 25
        ("Ms.", "NNP", "PROPN"),            // 26
        ("DOE", "NNP", "PROPN"),            // 27
        (".", ".", "PUNCT"),                // 28
        ("Mr.", "NNP", "PROPN"),            // 29
        ("Speaker", "NNP", "PROPN"),        // 30
        (",", ",", "PUNCT"),                // 31
        ("I", "PRP", "PRON"),               // 32
        ("rise", "VBP", "VERB"),            // 33
        ("to", "TO", "PART"),               // 34
        ("honor", "VB", "VERB"),            // 35
        ("Jeiran", "NNP", "PROPN"),         // 36
        ("Smith", "NNP", "PROPN"),          // 37
        (".", ".", "PUNCT"),                // 38
        ("The", "DT", "DET"),               // 39
        ("Senate", "NNP", "PROPN"),         // 40
        ("Committee", "NNP", "PROPN"),      // 41
        ("on", "IN", "ADP"),                // 42
        ("Veterans", "NNPS", "PROPN"),      // 43
        ("'", "POS", "PART"),               // 44
        ("Affairs", "NNPS", "PROPN"),       // 45
        ("and", "CC", "CCONJ"),             // 46
        ("NPR", "NNP", "PROPN"),            // 47
        ("reported", "VBD", "VERB"),        // 48
        ("on", "IN", "ADP"),                // 49
        ("the", "DT", "DET"),               // 50
        ("farm", "NN", "NOUN"),             // 51
        ("bill", "NN", "NOUN"),             // 52
        (".", ".", "PUNCT"),                // 53
        ("Jane", "NNP", "PROPN"),           // 54
        ("Doe", "NNP", "PROPN"),            // 55
        ("supports", "VBZ", "VERB"),        // 56
        ("the", "DT", "DET"),               // 57
        ("farm", "NN", "NOUN"),             // 58
        ("bill", "NN", "NOUN"),             // 59
        (".", ".", "PUNCT"),                // 60
    ]);

    AnnotatedText {
        text: Some(SAMPLE_CLEANED.to_string()),
        tokens,
        entities: vec![
            entity(3, 5, "PERSON"),
            entity(10, 12, "PERSON"),
            entity(13, 14, "GPE"),
            entity(19, 25, "DATE"),
            entity(30, 31, "PERSON"),
            entity(36, 38, "PERSON"),
            entity(39, 46, "ORG"),
            entity(47, 49, "ORG"),
            entity(54, 56, "PERSON"),
        ],
        noun_chunks: vec![
            chunk(1, 2),
            chunk(3, 5),
            chunk(5, 8),
            chunk(13, 14),
            chunk(15, 17),
            chunk(18, 19),
            chunk(32, 33),
            chunk(36, 38),
            chunk(39, 42),
            chunk(43, 46),
            chunk(47, 48),
            chunk(50, 53),
            chunk(54, 56),
            chunk(57, 60),
        ],
    }
}
