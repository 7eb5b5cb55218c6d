use anyhow::{Context, Result};
use clap::Parser;
use hero_draft::adapters::JsonCatalog;
use hero_draft::core::composer::delivery_or_pending;
use hero_draft::core::tables::type_label;
use hero_draft::domain::ports::CatalogProvider;
use hero_draft::utils::logger;
use hero_draft::{build_engine_with_catalog, HeroConfig};

#[derive(Parser)]
#[command(name = "match-preview")]
#[command(about = "Shows how messages resolve against a catalog, without generating replies")]
struct Args {
    /// Messages to resolve
    #[arg(required = true)]
    queries: Vec<String>,

    #[arg(short, long, default_value = "data/empreendimentos.json")]
    catalog: String,

    /// Optional TOML config for aliases and ignored name tokens
    #[arg(long)]
    config: Option<String>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let mut config = match &args.config {
        Some(path) => HeroConfig::from_file(path)
            .with_context(|| format!("Failed to load config '{}'", path))?,
        None => HeroConfig::default(),
    };
    config.generator.enabled = false;
    config.session.enabled = false;

    let catalog = JsonCatalog::new(&args.catalog).load()?;
    let engine = build_engine_with_catalog(&config, catalog)?;

    for query in &args.queries {
        let (signals, result) = engine.resolve(query);
        println!("🔎 {}", query);
        println!(
            "   types: {:?} | neighborhoods: {:?} | names: {}",
            signals.property_type_codes,
            signals.neighborhoods,
            signals.name_matches.len()
        );
        println!(
            "   reason: {} | candidates: {}",
            result.reason,
            result.listings.len()
        );
        for listing in &result.listings {
            let types: Vec<String> = listing.property_types.iter().map(|t| type_label(t)).collect();
            println!(
                "   - {} ({}) [{}] entrega: {}",
                listing.name,
                listing.neighborhood,
                types.join(", "),
                delivery_or_pending(listing)
            );
        }
        println!();
    }
    Ok(())
}
