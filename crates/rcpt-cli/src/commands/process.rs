//! Process command - extract fields from a single receipt.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use rcpt_core::source::has_pdf_extension;
use rcpt_core::{Document, DocumentOutcome, NO_DATA_MESSAGE, ReceiptPipeline};

use crate::output::{OutputFormat, render};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input receipt PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Show extraction confidence and per-field details
    #[arg(long)]
    show_confidence: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if !has_pdf_extension(&args.input) {
        anyhow::bail!("Unsupported file format: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let pipeline = ReceiptPipeline::from_config(&config);
    let document = Document::file(&args.input);

    pb.set_message("Extracting fields...");
    let result = match pipeline.process_document(&document) {
        DocumentOutcome::Extracted(result) => result,
        DocumentOutcome::Skipped => {
            pb.finish_and_clear();
            eprintln!(
                "{} No text could be read from {}",
                style("⚠").yellow(),
                args.input.display()
            );
            println!("{}", NO_DATA_MESSAGE);
            return Ok(());
        }
    };
    pb.finish_and_clear();

    for warning in &result.warnings {
        info!("{}", warning);
    }

    let confidences = [result.matches.confidence()];
    let output = render(
        std::slice::from_ref(&result.record),
        args.show_confidence.then_some(&confidences[..]),
        args.format,
    )?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        eprintln!();
        eprintln!(
            "{} Read {} lines in {:?}",
            style("ℹ").blue(),
            result.line_count,
            start.elapsed()
        );
        let fields = [
            ("Date", result.matches.date.as_ref().map(|m| (m.confidence, m.source.as_str()))),
            ("Vendor", result.matches.vendor.as_ref().map(|m| (m.confidence, m.source.as_str()))),
            ("Total", result.matches.total.as_ref().map(|m| (m.confidence, m.source.as_str()))),
        ];
        for (name, found) in fields {
            match found {
                Some((confidence, line)) => eprintln!(
                    "   {:<7}{:>4.0}%  {}",
                    name,
                    confidence * 100.0,
                    style(line).dim()
                ),
                None => eprintln!("   {:<7}{}", name, style("not found").yellow()),
            }
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
