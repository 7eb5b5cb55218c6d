use anyhow::{Context, Result};
use clap::Parser;
use hero_draft::adapters::catalog::{normalize_records, parse_catalog};
use hero_draft::utils::logger;

#[derive(Parser)]
#[command(name = "normalize-catalog")]
#[command(about = "Rewrites a listing catalog with canonical property types")]
struct Args {
    /// Catalog JSON file, rewritten in place unless --output is given
    #[arg(default_value = "data/empreendimentos.json")]
    path: String,

    /// Write the normalized catalog here instead
    #[arg(short, long)]
    output: Option<String>,

    /// Report changes without writing
    #[arg(long)]
    dry_run: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let content = std::fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read catalog '{}'", args.path))?;
    let mut document: serde_json::Value =
        serde_json::from_str(&content).context("Catalog is not valid JSON")?;

    let report = normalize_records(&mut document)?;
    let rendered = serde_json::to_string_pretty(&document)?;

    // the rewritten file must still load
    let catalog = parse_catalog(&rendered)?;
    tracing::debug!("Normalized catalog holds {} listings", catalog.len());

    println!(
        "Normalized {} records, updated {} entries.",
        report.total, report.changed
    );
    if !report.samples.is_empty() {
        println!("\nSample type changes:");
        for sample in &report.samples {
            println!(
                "- {}: {:?} -> {:?}",
                sample.name, sample.before, sample.after
            );
        }
    }

    if args.dry_run {
        println!("🔍 Dry run, nothing written");
        return Ok(());
    }

    let target = args.output.as_deref().unwrap_or(&args.path);
    std::fs::write(target, rendered + "\n")
        .with_context(|| format!("Failed to write '{}'", target))?;
    println!("📁 File written: {}", target);
    Ok(())
}
