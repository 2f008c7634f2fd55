//! Batch command - extract fields from every receipt in a folder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use rcpt_core::source::has_pdf_extension;
use rcpt_core::{Document, DocumentOutcome, ReceiptPipeline};

use crate::output::{OutputFormat, render};

/// Message printed when a folder holds no PDF files.
pub const NO_PDF_MESSAGE: &str = "No PDF files found in the specified folder.";

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Folder of receipts, or a glob pattern such as "receipts/*.pdf"
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Add a confidence column
    #[arg(long)]
    show_confidence: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let documents = collect_documents(&args.input)?;
    if documents.is_empty() {
        println!("{}", NO_PDF_MESSAGE);
        return Ok(());
    }

    eprintln!(
        "{} Found {} PDF files to process",
        style("ℹ").blue(),
        documents.len()
    );

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let pipeline = ReceiptPipeline::from_config(&config);
    let mut confidences = Vec::with_capacity(documents.len());
    let mut skipped = Vec::new();

    let batch = pipeline.extract_batch_with(&documents, |document, outcome| {
        match outcome {
            DocumentOutcome::Extracted(result) => confidences.push(result.matches.confidence()),
            DocumentOutcome::Skipped => skipped.push(document.name().into_owned()),
        }
        pb.inc(1);
    });

    pb.finish_and_clear();

    if let Some(message) = batch.empty_message() {
        println!("{}", message);
        return Ok(());
    }

    let output = render(
        &batch.records,
        args.show_confidence.then_some(&confidences[..]),
        args.format,
    )?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        documents.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} extracted, {} without text",
        style(batch.len()).green(),
        style(batch.skipped).yellow()
    );
    for name in &skipped {
        eprintln!("  - {}", name);
    }

    Ok(())
}

/// Documents named by a folder path or a glob pattern.
fn collect_documents(input: &str) -> anyhow::Result<Vec<Document>> {
    let path = Path::new(input);
    if path.is_dir() {
        debug!("Scanning folder {}", path.display());
        return Ok(Document::scan_dir(path)?);
    }

    let mut files: Vec<PathBuf> = glob(input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && has_pdf_extension(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching PDF files found for: {}", input);
    }

    files.sort();
    Ok(files.into_iter().map(Document::File).collect())
}
