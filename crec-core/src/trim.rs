//! # Trailing-Token Trimming
//!
//! Entity recognizers tend to swallow the word after a name: "Smith said",
//! "Committee on", "Johnson and", "Smith's". Trimming removes such trailing
//! tokens by grammatical role, in a fixed order:
//!
//! 1. verb form, then a contracted negation (`did` + `n't`);
//! 2. adposition;
//! 3. conjunction;
//! 4. determiner;
//! 5. possessive ending.
//!
//! Each rule looks at the last token once, at its turn. Rules are not
//! re-run after a later one fires, so "Smith of the" loses only "the".

use crate::annotation::{Span, TokenRole};
use crate::config::TrimOptions;

/// Removes unwanted trailing tokens from `span`.
///
/// Returns `None` when nothing is left.
pub fn trim_trailing<'a>(span: Span<'a>, opts: &TrimOptions) -> Option<Span<'a>> {
    let mut span = span;

    if opts.verb && !span.is_empty() {
        if span.role_from_end(0) == Some(TokenRole::Verb) {
            span = span.drop_last(1);
        }
        // "won't", "didn't": verb + RB
        if span.len() > 1
            && span.role_from_end(0) == Some(TokenRole::Adverb)
            && span.role_from_end(1) == Some(TokenRole::Verb)
        {
            span = span.drop_last(2);
        }
    }

    let rules = [
        (opts.adposition, TokenRole::Adposition),
        (opts.conjunction, TokenRole::Conjunction),
        (opts.determiner, TokenRole::Determiner),
        (opts.possessive_ending, TokenRole::PossessiveEnding),
    ];
    for (enabled, role) in rules {
        if enabled && span.role_from_end(0) == Some(role) {
            span = span.drop_last(1);
        }
    }

    (!span.is_empty()).then_some(span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Token;

    fn toks(pairs: &[(&str, &str)]) -> Vec<Token> {
        pairs.iter().map(|(text, tag)| Token::new(text, tag, "")).collect()
    }

    fn trimmed(tokens: &[Token], opts: &TrimOptions) -> Option<String> {
        trim_trailing(Span::new(tokens, 0, "PERSON"), opts).map(|s| s.text())
    }

    #[test]
    fn test_trailing_verb() {
        let tokens = toks(&[("John", "NNP"), ("Smith", "NNP"), ("said", "VBD")]);
        assert_eq!(trimmed(&tokens, &TrimOptions::default()).as_deref(), Some("John Smith"));
    }

    #[test]
    fn test_gerund_kept() {
        let tokens = toks(&[("Veterans", "NNPS"), ("Serving", "VBG")]);
        assert_eq!(
            trimmed(&tokens, &TrimOptions::default()).as_deref(),
            Some("Veterans Serving")
        );
    }

    #[test]
    fn test_contracted_negation() {
        let tokens = toks(&[("Smith", "NNP"), ("did", "VBD"), ("n't", "RB"), ("work", "VB")]);
        assert_eq!(trimmed(&tokens, &TrimOptions::default()).as_deref(), Some("Smith"));

        // negation without a verb after it
        let tokens = toks(&[("Jones", "NNP"), ("wo", "MD"), ("n't", "RB")]);
        assert_eq!(trimmed(&tokens, &TrimOptions::default()).as_deref(), Some("Jones"));
    }

    #[test]
    fn test_rules_in_order() {
        let tokens = toks(&[("Committee", "NNP"), ("on", "IN")]);
        assert_eq!(trimmed(&tokens, &TrimOptions::default()).as_deref(), Some("Committee"));

        let tokens = toks(&[("Johnson", "NNP"), ("and", "CC")]);
        assert_eq!(trimmed(&tokens, &TrimOptions::default()).as_deref(), Some("Johnson"));

        // adposition rule has already run when the determiner goes
        let tokens = toks(&[("Smith", "NNP"), ("of", "IN"), ("the", "DT")]);
        assert_eq!(trimmed(&tokens, &TrimOptions::default()).as_deref(), Some("Smith of"));

        let mut tokens = toks(&[("Smith", "NNP"), ("'s", "POS")]);
        tokens[0].space_after = false;
        assert_eq!(trimmed(&tokens, &TrimOptions::default()).as_deref(), Some("Smith"));
    }

    #[test]
    fn test_disabled_rules() {
        let tokens = toks(&[("Johnson", "NNP"), ("and", "CC")]);
        let opts = TrimOptions {
            conjunction: false,
            ..TrimOptions::default()
        };
        assert_eq!(trimmed(&tokens, &opts).as_deref(), Some("Johnson and"));
    }

    #[test]
    fn test_becomes_empty() {
        let tokens = toks(&[("the", "DT")]);
        assert_eq!(trimmed(&tokens, &TrimOptions::default()), None);
        assert_eq!(trimmed(&[], &TrimOptions::default()), None);
    }

    #[test]
    fn test_monotonic_and_stable() {
        let cases = [
            toks(&[("Jane", "NNP"), ("Doe", "NNP"), ("spoke", "VBD")]),
            toks(&[("House", "NNP"), ("of", "IN")]),
            toks(&[("Smith", "NNP"), ("'s", "POS")]),
            toks(&[("NPR", "NNP")]),
        ];
        let opts = TrimOptions::default();
        for tokens in &cases {
            let span = Span::new(tokens, 0, "ORG");
            let once = trim_trailing(span, &opts).unwrap();
            assert!(once.len() <= span.len());
            let twice = trim_trailing(once, &opts).unwrap();
            assert_eq!(once, twice, "{}", span.text());
        }
    }
}
