//! # Document Pipeline
//!
//! Orchestrates the processing of one Congressional Record document:
//!
//! 1. **Normalization** ([`crate::normalizer`]): raw text to one cleaned line.
//! 2. **Annotation** ([`Annotator`]): the external engine tags the cleaned text.
//! 3. **Refinement** ([`EntityRefiner`]): entity spans to display strings,
//!    noun chunks to a frequency ranking.
//! 4. **Aggregation** ([`crate::aggregate`]): type index and frequency table.
//!
//! Progress can be observed through [`PipelineEvent`]s sent over a `mpsc`
//! channel ([`DocumentPipeline::analyze_streaming`]). Documents are
//! independent, so batches are spread over a rayon thread pool.

use std::sync::mpsc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregate::{frequency, most_common, resolve_types, EntityTypeIndex, FrequencyTable, NounChunkFrequency};
use crate::annotation::{AnnotatedDoc, Annotator};
use crate::error::Result;
use crate::normalizer::normalize;
use crate::refiner::{EntityRecord, EntityRefiner};

/// Everything extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    /// Normalized text, when the pipeline started from raw text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaned_text: Option<String>,
    /// Refined entities in document order
    pub entities: Vec<EntityRecord>,
    pub entity_types: EntityTypeIndex,
    pub entity_frequencies: FrequencyTable,
    pub noun_chunk_frequencies: NounChunkFrequency,
}

impl DocumentAnalysis {
    /// The `n` most frequent entity display strings.
    pub fn top_entities(&self, n: usize) -> Vec<(String, usize)> {
        most_common(&self.entity_frequencies, n)
    }
}

/// Events emitted while a document is processed.
///
/// One event per stage, in pipeline order, so a caller (ex: the CLI's log
/// output) can follow a document through the pipeline without waiting for the
/// final result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Step 1**: raw text normalized.
    /// Character counts before and after; the difference is preamble, banners,
    /// markup and collapsed whitespace.
    Normalized {
        raw_chars: usize,
        cleaned_chars: usize,
    },
    /// **Step 2**: the annotation engine returned.
    /// Sizes of what it produced, before any filtering.
    Annotated {
        tokens: usize,
        entities: usize,
        noun_chunks: usize,
    },
    /// **Step 3**: entity spans refined and noun chunks ranked.
    /// `kept` counts entity occurrences that survived trimming, cleaning and
    /// the blacklist; `distinct` counts their display strings; `noun_chunks`
    /// counts ranked chunk strings.
    EntitiesRefined {
        kept: usize,
        distinct: usize,
        noun_chunks: usize,
    },
    /// **Done**: the full [`DocumentAnalysis`] and wall-clock time spent.
    Done {
        analysis: DocumentAnalysis,
        processing_ms: u64,
    },
    /// **Failure**: the document could not be processed (no content found,
    /// unusable annotation). Always the last event of the flow.
    Error { message: String },
}

fn emit(tx: Option<&mpsc::Sender<PipelineEvent>>, event: PipelineEvent) {
    if let Some(tx) = tx {
        // nobody listening is fine
        let _ = tx.send(event);
    }
}

/// The document pipeline.
///
/// - **Sync**: [`analyze`](Self::analyze) and [`refine`](Self::refine).
/// - **Streaming**: [`analyze_streaming`](Self::analyze_streaming).
/// - **Batch**: [`analyze_batch`](Self::analyze_batch) and
///   [`refine_batch`](Self::refine_batch), parallel, results in input order.
#[derive(Debug, Clone, Default)]
pub struct DocumentPipeline {
    pub refiner: EntityRefiner,
}

impl DocumentPipeline {
    pub fn new(refiner: EntityRefiner) -> Self {
        Self { refiner }
    }

    /// Normalizes, annotates and refines one raw document.
    pub fn analyze<A: Annotator + ?Sized>(&self, raw: &str, annotator: &A) -> Result<DocumentAnalysis> {
        self.run(raw, annotator, None)
    }

    /// Same as [`analyze`](Self::analyze), reporting progress on `tx`.
    ///
    /// # Event flow
    /// 1. `Normalized`
    /// 2. `Annotated`
    /// 3. `EntitiesRefined`
    /// 4. `Done`
    ///
    /// A failure at any stage ends the flow with a single `Error` event.
    pub fn analyze_streaming<A: Annotator + ?Sized>(
        &self,
        raw: &str,
        annotator: &A,
        tx: mpsc::Sender<PipelineEvent>,
    ) {
        if let Err(e) = self.run(raw, annotator, Some(&tx)) {
            let _ = tx.send(PipelineEvent::Error {
                message: e.to_string(),
            });
        }
    }

    fn run<A: Annotator + ?Sized>(
        &self,
        raw: &str,
        annotator: &A,
        tx: Option<&mpsc::Sender<PipelineEvent>>,
    ) -> Result<DocumentAnalysis> {
        let start = Instant::now();

        let cleaned = normalize(raw)?;
        emit(
            tx,
            PipelineEvent::Normalized {
                raw_chars: raw.chars().count(),
                cleaned_chars: cleaned.chars().count(),
            },
        );

        let doc = annotator.annotate(&cleaned)?;
        emit(
            tx,
            PipelineEvent::Annotated {
                tokens: doc.tokens().len(),
                entities: doc.entity_annotations().len(),
                noun_chunks: doc.noun_chunk_annotations().len(),
            },
        );

        let mut analysis = self.refine_with_events(&doc, tx);
        analysis.cleaned_text = Some(cleaned);

        let processing_ms = start.elapsed().as_millis() as u64;
        info!(
            entities = analysis.entities.len(),
            noun_chunks = analysis.noun_chunk_frequencies.len(),
            processing_ms,
            "document analyzed"
        );
        emit(
            tx,
            PipelineEvent::Done {
                analysis: analysis.clone(),
                processing_ms,
            },
        );
        Ok(analysis)
    }

    /// Refines an already-annotated document. Never fails: unusable spans are
    /// dropped.
    pub fn refine<D: AnnotatedDoc + ?Sized>(&self, doc: &D) -> DocumentAnalysis {
        self.refine_with_events(doc, None)
    }

    fn refine_with_events<D: AnnotatedDoc + ?Sized>(
        &self,
        doc: &D,
        tx: Option<&mpsc::Sender<PipelineEvent>>,
    ) -> DocumentAnalysis {
        let entities = self.refiner.extract_entities(doc);
        let entity_types = resolve_types(&entities);
        let entity_frequencies = frequency(&entities);
        let noun_chunk_frequencies = self.refiner.noun_chunk_frequency(doc);

        emit(
            tx,
            PipelineEvent::EntitiesRefined {
                kept: entities.len(),
                distinct: entity_frequencies.len(),
                noun_chunks: noun_chunk_frequencies.len(),
            },
        );

        DocumentAnalysis {
            cleaned_text: None,
            entities: entities.iter().map(EntityRecord::from).collect(),
            entity_types,
            entity_frequencies,
            noun_chunk_frequencies,
        }
    }

    /// Runs [`analyze`](Self::analyze) on every document in parallel.
    pub fn analyze_batch<S, A>(&self, raws: &[S], annotator: &A) -> Vec<Result<DocumentAnalysis>>
    where
        S: AsRef<str> + Sync,
        A: Annotator + Sync + ?Sized,
    {
        let results: Vec<Result<DocumentAnalysis>> = raws
            .par_iter()
            .map(|raw| self.analyze(raw.as_ref(), annotator))
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!(failed, documents = results.len(), "some documents could not be analyzed");
        }
        info!(documents = results.len(), failed, "batch analyzed");
        results
    }

    /// Runs [`refine`](Self::refine) on every document in parallel.
    pub fn refine_batch<D: AnnotatedDoc + Sync>(&self, docs: &[D]) -> Vec<DocumentAnalysis> {
        let results: Vec<DocumentAnalysis> = docs.par_iter().map(|doc| self.refine(doc)).collect();
        info!(documents = results.len(), "batch refined");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{AnnotatedText, EntityAnnotation, PrecomputedAnnotator, Token};
    use crate::error::Error;
    use crate::samples::{sample_annotation, SAMPLE_CLEANED, SAMPLE_RECORD};

    /// Tags capitalized words as proper nouns and every run of them as a
    /// PERSON.
    struct CapitalizedRuns;

    impl Annotator for CapitalizedRuns {
        type Doc = AnnotatedText;

        fn annotate(&self, cleaned_text: &str) -> Result<AnnotatedText> {
            let tokens: Vec<Token> = cleaned_text
                .split_whitespace()
                .map(|w| {
                    if w.starts_with(char::is_uppercase) {
                        Token::new(w, "NNP", "PROPN")
                    } else {
                        Token::new(w, "NN", "NOUN")
                    }
                })
                .collect();

            let mut entities = Vec::new();
            let mut run_start = None;
            for i in 0..=tokens.len() {
                let proper = tokens.get(i).is_some_and(|t| t.tag == "NNP");
                match (proper, run_start) {
                    (true, None) => run_start = Some(i),
                    (false, Some(start)) => {
                        entities.push(EntityAnnotation {
                            start,
                            end: i,
                            label: "PERSON".to_string(),
                        });
                        run_start = None;
                    }
                    _ => {}
                }
            }

            Ok(AnnotatedText {
                text: Some(cleaned_text.to_string()),
                tokens,
                entities,
                noun_chunks: vec![],
            })
        }
    }

    fn displays(analysis: &DocumentAnalysis) -> Vec<&str> {
        analysis.entities.iter().map(|e| e.display.as_str()).collect()
    }

    #[test]
    fn test_pipeline_sample_record() {
        let pipeline = DocumentPipeline::default();
        let annotator = PrecomputedAnnotator::new(sample_annotation());
        let analysis = pipeline.analyze(SAMPLE_RECORD, &annotator).unwrap();

        assert_eq!(analysis.cleaned_text.as_deref(), Some(SAMPLE_CLEANED));
        assert_eq!(
            displays(&analysis),
            vec![
                "Jeiran",
                "Jane Doe",
                "California",
                "Jeiran Smith",
                "Senate Committee On Veterans Affairs",
                "NPR",
                "Jane Doe",
            ]
        );
        assert_eq!(analysis.entities[5].text, "NPR");
        assert_eq!(analysis.entity_types["NPR"], "ORG");
        assert_eq!(analysis.entity_types["California"], "GPE");
        assert_eq!(analysis.entity_types.len(), 6);
        assert_eq!(analysis.entity_frequencies["Jane Doe"], 2);
        assert_eq!(analysis.top_entities(1), vec![("Jane Doe".to_string(), 2)]);

        let chunks = &analysis.noun_chunk_frequencies;
        assert_eq!(chunks[0], ("Farm Bill".to_string(), 2));
        assert_eq!(chunks.len(), 11);
        assert_eq!(chunks[1], ("Honor".to_string(), 1));
        assert!(chunks.iter().any(|(c, _)| c == "Veterans' Affairs"));
        assert!(!chunks.iter().any(|(c, _)| c.contains("His") || c == "I"));
    }

    #[test]
    fn test_blacklisted_names_never_surface() {
        let pipeline = DocumentPipeline::default();
        let analysis = pipeline.refine(&sample_annotation());

        assert!(!displays(&analysis).contains(&"Speaker"));
        assert!(!analysis.entity_types.contains_key("Speaker"));
        assert!(!analysis.entity_frequencies.contains_key("Speaker"));
        assert!(!analysis.entities.iter().any(|e| e.label == "DATE"));
        assert_eq!(analysis.cleaned_text, None);
    }

    #[test]
    fn test_pipeline_events_streaming() {
        let pipeline = DocumentPipeline::default();
        let annotator = PrecomputedAnnotator::new(sample_annotation());
        let (tx, rx) = mpsc::channel();
        pipeline.analyze_streaming(SAMPLE_RECORD, &annotator, tx);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], PipelineEvent::Normalized { .. }));
        assert!(matches!(
            events[1],
            PipelineEvent::Annotated { tokens: 61, entities: 9, noun_chunks: 14 }
        ));
        assert!(matches!(
            events[2],
            PipelineEvent::EntitiesRefined { kept: 7, distinct: 6, noun_chunks: 11 }
        ));
        match &events[3] {
            PipelineEvent::Done { analysis, .. } => assert_eq!(analysis.entities.len(), 7),
            other => panic!("expected Done, got {:?}", other),
        }
    }

    #[test]
    fn test_no_content_is_reported() {
        let pipeline = DocumentPipeline::default();
        let err = pipeline.analyze("just a short note", &CapitalizedRuns).unwrap_err();
        assert!(matches!(err, Error::NoContentFound));

        let (tx, rx) = mpsc::channel();
        pipeline.analyze_streaming("just a short note", &CapitalizedRuns, tx);
        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], PipelineEvent::Error { message } if message.contains("no content")));
    }

    #[test]
    fn test_annotation_for_other_text_is_rejected() {
        let pipeline = DocumentPipeline::default();
        let annotator = PrecomputedAnnotator::new(sample_annotation());
        let err = pipeline
            .analyze("EXTENSION OF REMARKS\nsomething else entirely", &annotator)
            .unwrap_err();
        assert!(matches!(err, Error::Annotation(_)));
    }

    #[test]
    fn test_analyze_batch_keeps_input_order() {
        let pipeline = DocumentPipeline::default();
        let raws = vec![
            "EXTENSION OF REMARKS\nwe thank Bob Jones today".to_string(),
            "no banner here".to_string(),
            "EXTENSION OF REMARKS\nmeet Ann Lee and Bob Jones".to_string(),
        ];
        let results = pipeline.analyze_batch(&raws, &CapitalizedRuns);

        assert_eq!(results.len(), 3);
        assert_eq!(displays(results[0].as_ref().unwrap()), vec!["Bob Jones"]);
        assert!(matches!(results[1], Err(Error::NoContentFound)));
        assert_eq!(displays(results[2].as_ref().unwrap()), vec!["Ann Lee", "Bob Jones"]);
    }

    #[test]
    fn test_refine_batch_matches_sequential() {
        let pipeline = DocumentPipeline::default();
        let docs = vec![sample_annotation(), AnnotatedText::default(), sample_annotation()];
        let batch = pipeline.refine_batch(&docs);

        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0], pipeline.refine(&docs[0]));
        assert!(batch[1].entities.is_empty());
        assert!(batch[1].noun_chunk_frequencies.is_empty());
        assert_eq!(batch[0], batch[2]);
    }
}
