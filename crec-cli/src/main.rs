//! Command-line driver for Congressional Record entity extraction.
//!
//! The annotation engine runs outside this tool; its output is exchanged as
//! `AnnotatedText` JSON files.

mod report;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use crec_core::normalizer::normalize;
use crec_core::samples::{sample_annotation, SAMPLE_RECORD};
use crec_core::{
    AnnotatedText, Annotator, DocumentAnalysis, DocumentPipeline, EntityRefiner, PipelineEvent,
    PrecomputedAnnotator, RefinerConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::report::RunReport;

#[derive(Parser)]
#[command(name = "crec")]
#[command(about = "Congressional Record entity refinement", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level, overridden by RUST_LOG
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a raw CREC document
    Normalize {
        /// Raw document
        input: PathBuf,

        /// Write the cleaned text here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Refine an annotation file into entities and noun-chunk frequencies
    Refine {
        /// AnnotatedText JSON
        annotation: PathBuf,

        /// Refiner configuration (JSON, partial)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also log the n most frequent entities
        #[arg(long)]
        top: Option<usize>,
    },

    /// Normalize a raw document and refine its precomputed annotation
    Analyze {
        /// Raw document
        input: PathBuf,

        /// AnnotatedText JSON produced for the normalized text
        #[arg(short, long)]
        annotation: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Refine every annotation file of a directory
    Batch {
        /// Directory holding `*.json` annotations
        dir: PathBuf,

        /// Where `<stem>.entities.json` files are written
        #[arg(short, long)]
        output: PathBuf,

        /// Issue date of the records (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Run the pipeline on the bundled sample record
    Demo,
}

fn load_pipeline(config: Option<&Path>) -> Result<DocumentPipeline> {
    let config = match config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            RefinerConfig::from_json(&json)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => RefinerConfig::default(),
    };
    Ok(DocumentPipeline::new(EntityRefiner::new(config)))
}

fn read_annotation(path: &Path) -> Result<AnnotatedText> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read annotation {}", path.display()))?;
    AnnotatedText::from_json(&json).with_context(|| format!("Failed to load annotation {}", path.display()))
}

fn print_json(analysis: &DocumentAnalysis) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(analysis)?);
    Ok(())
}

/// Runs the streaming pipeline, logging each event, and returns the result.
fn analyze_logged<A: Annotator>(pipeline: &DocumentPipeline, raw: &str, annotator: &A) -> Result<DocumentAnalysis> {
    let (tx, rx) = mpsc::channel();
    pipeline.analyze_streaming(raw, annotator, tx);

    let mut result = None;
    for event in rx.try_iter() {
        match event {
            PipelineEvent::Normalized {
                raw_chars,
                cleaned_chars,
            } => info!(raw_chars, cleaned_chars, "normalized"),
            PipelineEvent::Annotated {
                tokens,
                entities,
                noun_chunks,
            } => info!(tokens, entities, noun_chunks, "annotation loaded"),
            PipelineEvent::EntitiesRefined {
                kept,
                distinct,
                noun_chunks,
            } => info!(kept, distinct, noun_chunks, "entities refined"),
            PipelineEvent::Done {
                analysis,
                processing_ms,
            } => {
                info!(processing_ms, "done");
                result = Some(analysis);
            }
            PipelineEvent::Error { message } => bail!("Processing failed: {}", message),
        }
    }
    result.context("Pipeline ended without a result")
}

fn annotation_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn run_batch(pipeline: &DocumentPipeline, dir: &Path, output: &Path, issued_date: NaiveDate) -> Result<RunReport> {
    let files = annotation_files(dir)?;
    if files.is_empty() {
        return Ok(RunReport::failed(issued_date, 0, format!("no annotation files in {}", dir.display())));
    }

    let mut docs = Vec::with_capacity(files.len());
    let mut stems = Vec::with_capacity(files.len());
    let mut skipped = 0;
    for path in &files {
        match read_annotation(path) {
            Ok(doc) => {
                let stem = path.file_stem().unwrap_or_default().to_string_lossy().into_owned();
                docs.push(doc);
                stems.push(stem);
            }
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                skipped += 1;
            }
        }
    }

    let analyses = pipeline.refine_batch(&docs);

    fs::create_dir_all(output).with_context(|| format!("Failed to create {}", output.display()))?;
    let mut written = 0;
    for (stem, analysis) in stems.iter().zip(&analyses) {
        let path = output.join(format!("{}.entities.json", stem));
        let json = serde_json::to_string_pretty(analysis)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        written += 1;
    }

    let message = format!("{} documents refined, {} skipped", written, skipped);
    Ok(if skipped == 0 {
        RunReport::succeeded(issued_date, written, message)
    } else {
        RunReport::failed(issued_date, written, message)
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Normalize { input, output } => {
            let raw = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let cleaned = normalize(&raw).with_context(|| format!("Failed to normalize {}", input.display()))?;
            match output {
                Some(path) => {
                    fs::write(&path, &cleaned).with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Cleaned text written to {}", path.display());
                }
                None => println!("{}", cleaned),
            }
        }

        Commands::Refine {
            annotation,
            config,
            top,
        } => {
            let pipeline = load_pipeline(config.as_deref())?;
            let doc = read_annotation(&annotation)?;
            let analysis = pipeline.refine(&doc);
            if let Some(n) = top {
                for (name, count) in analysis.top_entities(n) {
                    info!("{:>4}  {}", count, name);
                }
            }
            print_json(&analysis)?;
        }

        Commands::Analyze {
            input,
            annotation,
            config,
        } => {
            let pipeline = load_pipeline(config.as_deref())?;
            let raw = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let annotator = PrecomputedAnnotator::new(read_annotation(&annotation)?);
            let analysis = analyze_logged(&pipeline, &raw, &annotator)?;
            print_json(&analysis)?;
        }

        Commands::Batch {
            dir,
            output,
            date,
            config,
        } => {
            let pipeline = load_pipeline(config.as_deref())?;
            let issued_date = date.unwrap_or_else(|| Local::now().date_naive());
            let report = run_batch(&pipeline, &dir, &output, issued_date)?;
            println!("{}", report);
            if !report.success {
                bail!("Batch over {} did not complete cleanly", dir.display());
            }
        }

        Commands::Demo => {
            info!("Running the bundled sample record");
            let pipeline = DocumentPipeline::default();
            let annotator = PrecomputedAnnotator::new(sample_annotation());
            let analysis = analyze_logged(&pipeline, SAMPLE_RECORD, &annotator)?;
            print_json(&analysis)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 1, 3).unwrap()
    }

    #[test]
    fn test_cli_parses_batch() {
        let cli = Cli::parse_from(["crec", "batch", "in", "--output", "out", "--date", "2017-01-03"]);
        match cli.command {
            Commands::Batch { dir, output, date: d, config } => {
                assert_eq!(dir, PathBuf::from("in"));
                assert_eq!(output, PathBuf::from("out"));
                assert_eq!(d, Some(date()));
                assert!(config.is_none());
            }
            _ => panic!("expected batch"),
        }
    }

    #[test]
    fn test_analyze_logged_sample() {
        let pipeline = DocumentPipeline::default();
        let annotator = PrecomputedAnnotator::new(sample_annotation());
        let analysis = analyze_logged(&pipeline, SAMPLE_RECORD, &annotator).unwrap();
        assert_eq!(analysis.entity_frequencies["Jane Doe"], 2);

        let err = analyze_logged(&pipeline, "lowercase only", &annotator).unwrap_err();
        assert!(err.to_string().contains("no content"));
    }

    #[test]
    fn test_batch_writes_one_file_per_annotation() {
        let dir = TempDir::new().unwrap();
        let input = dir.path();
        let output = input.join("out");
        let json = serde_json::to_string(&sample_annotation()).unwrap();
        fs::write(input.join("a.json"), &json).unwrap();
        fs::write(input.join("b.json"), &json).unwrap();
        fs::write(input.join("notes.txt"), "ignored").unwrap();

        let report = run_batch(&DocumentPipeline::default(), input, &output, date()).unwrap();
        assert!(report.success);
        assert_eq!(report.files_written, 2);

        let written = fs::read_to_string(output.join("a.entities.json")).unwrap();
        let analysis: DocumentAnalysis = serde_json::from_str(&written).unwrap();
        assert_eq!(analysis.entity_types["NPR"], "ORG");
        assert!(output.join("b.entities.json").exists());
    }

    #[test]
    fn test_batch_reports_bad_annotations() {
        let dir = TempDir::new().unwrap();
        let input = dir.path();
        let output = input.join("out");
        fs::write(input.join("bad.json"), r#"{"tokens": [], "entities": [{"start": 0, "end": 2, "label": "ORG"}]}"#)
            .unwrap();

        let report = run_batch(&DocumentPipeline::default(), input, &output, date()).unwrap();
        assert!(!report.success);
        assert_eq!(report.files_written, 0);
        assert!(report.message.contains("1 skipped"));

        let empty = TempDir::new().unwrap();
        let report = run_batch(&DocumentPipeline::default(), empty.path(), &output, date()).unwrap();
        assert!(!report.success);
        assert_eq!(report.files_written, 0);
    }

    #[test]
    fn test_config_file_is_applied() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"exclude_types": ["ORG"]}"#).unwrap();

        let pipeline = load_pipeline(Some(path.as_path())).unwrap();
        let analysis = pipeline.refine(&sample_annotation());
        assert!(!analysis.entity_types.values().any(|label| label == "ORG"));

        fs::write(&path, "{not json").unwrap();
        assert!(load_pipeline(Some(path.as_path())).is_err());
    }
}
