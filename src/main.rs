//! # inboxpack CLI
//!
//! Command-line interface for the inboxpack library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use inboxpack::cli::Args;
use inboxpack::format::{OutputFormat, write_to_format};
use inboxpack::ingest::{IngestInput, Ingestor};
use inboxpack::progress::{stderr_progress, tracing_progress};
use inboxpack::IngestError;

#[tokio::main]
async fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(&args);

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "Ingestion failed");
        eprintln!("❌ Error: {e}");
        process::exit(1);
    }
}

fn init_tracing(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<(), IngestError> {
    let total_start = Instant::now();
    let output_path = args.output_path();
    let format: OutputFormat = args.format.into();

    if !args.quiet {
        println!("📦 inboxpack v{}", env!("CARGO_PKG_VERSION"));
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        for input in &args.inputs {
            println!("📂 Input:   {}", input.display());
        }
        println!("💾 Output:  {output_path}");
        println!("📄 Format:  {format}");
        println!();
    }

    let progress = if args.quiet {
        tracing_progress()
    } else {
        stderr_progress()
    };
    let ingestor = Ingestor::new(args.to_config()).with_progress(progress);

    let input = IngestInput::from_paths(args.inputs.as_slice()).await?;
    let outcome = ingestor.ingest_detailed(input).await?;
    let result = &outcome.result;

    write_to_format(result, &output_path, format)?;

    if args.quiet {
        return Ok(());
    }

    println!();
    println!("✅ Done! Output saved to {output_path}");
    println!();
    println!("📊 Summary:");
    println!("   Conversations: {}", result.conversations.len());
    println!("   Messages:      {}", result.total_messages());
    if let Some(owner) = &result.owner_name {
        println!("   Owner:         {owner}");
    }
    if !outcome.skipped.is_empty() {
        println!("   Skipped:       {} folders", outcome.skipped.len());
    }
    if !outcome.file_failures.is_empty() {
        println!("   Failed files:  {}", outcome.file_failures.len());
    }
    println!("   Session:       {}", result.session_token);
    println!();
    println!("⚡ Total time: {:.2}s", total_start.elapsed().as_secs_f64());

    Ok(())
}
