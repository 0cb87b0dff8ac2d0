//! # crec-core: entity refinement for the Congressional Record
//!
//! Turns raw Congressional Record (CREC) documents into clean lists of named
//! entities and noun-phrase frequencies. Part-of-speech tagging, entity
//! recognition and noun-chunking are left to an external annotation engine;
//! this crate prepares its input and repairs its output.
//!
//! ## Architecture
//!
//! 1.  **Input**: raw document text (String).
//! 2.  **Normalization** ([`normalizer`]): preamble, banners, markup and hard
//!     wraps removed; one line of prose comes out.
//! 3.  **Annotation** ([`annotation`]): the engine's tokens, entity spans and
//!     noun chunks, behind the [`AnnotatedDoc`] and [`Annotator`] traits.
//! 4.  **Refinement** ([`refiner`], [`trim`]): trailing-token trimming,
//!     punctuation removal, display casing, suffix correction, blacklist.
//! 5.  **Aggregation** ([`aggregate`]): majority entity type, frequency
//!     tables, noun-chunk ranking.
//! 6.  **Output**: a [`DocumentAnalysis`] per document.
//!
//! ## Example
//!
//! ```rust
//! use crec_core::samples::{sample_annotation, SAMPLE_RECORD};
//! use crec_core::{DocumentPipeline, PrecomputedAnnotator};
//!
//! let pipeline = DocumentPipeline::default();
//! let annotator = PrecomputedAnnotator::new(sample_annotation());
//! let analysis = pipeline.analyze(SAMPLE_RECORD, &annotator).unwrap();
//!
//! for entity in &analysis.entities {
//!     println!("{} ({})", entity.display, entity.label);
//! }
//! assert_eq!(analysis.entity_frequencies["Jane Doe"], 2);
//! ```
//!
//! ## Modules
//!
//! - [`pipeline`]: orchestration, progress events, parallel batches.
//! - [`config`]: every tunable of the refiner, loadable from JSON.
//! - [`samples`]: a sample record and its annotation.

pub mod aggregate;
pub mod annotation;
pub mod config;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod refiner;
pub mod samples;
pub mod trim;

pub use annotation::{AnnotatedDoc, AnnotatedText, Annotator, PrecomputedAnnotator, Span, Token};
pub use config::RefinerConfig;
pub use error::{Error, Result};
pub use pipeline::{DocumentAnalysis, DocumentPipeline, PipelineEvent};
pub use refiner::{EntityRecord, EntityRefiner, ProcessedEntity};
