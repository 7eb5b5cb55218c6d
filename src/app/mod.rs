//! Wiring from configuration to a ready `DraftEngine`.

use crate::adapters::{JsonCatalog, OpenAiGenerator};
use crate::config::toml_config::HeroConfig;
use crate::core::composer::ResponseComposer;
use crate::core::engine::DraftEngine;
use crate::core::sanitizer::TextSanitizer;
use crate::core::session_cache::SessionCache;
use crate::core::tables::MatchingTables;
use crate::domain::model::Catalog;
use crate::domain::ports::{CatalogProvider, ReplyGenerator};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// Loads the catalog named by the config and builds the engine around it.
pub fn build_engine(config: &HeroConfig) -> Result<DraftEngine> {
    let catalog = JsonCatalog::new(&config.catalog.path).load()?;
    build_engine_with_catalog(config, catalog)
}

pub fn build_engine_with_catalog(config: &HeroConfig, catalog: Catalog) -> Result<DraftEngine> {
    let catalog = Arc::new(catalog);
    let tables = Arc::new(MatchingTables::new(
        &config.matching.aliases,
        &config.matching.ignored_name_tokens,
    )?);
    let composer = ResponseComposer::new(catalog.clone(), config.composer.max_listings);
    let sanitizer = TextSanitizer::new(
        config.signature.mode,
        &config.signature.text,
        &config.signature.company,
    )?;

    let mut engine = DraftEngine::new(catalog, tables, composer, sanitizer);

    if config.session.enabled {
        let ttl = chrono::Duration::seconds(config.session.ttl_seconds as i64);
        engine = engine.with_session_cache(
            SessionCache::new(ttl, config.session.max_entries),
            config.session.max_followup_tokens,
        );
    }

    if config.generator.is_active() {
        let generator: Arc<dyn ReplyGenerator> =
            Arc::new(OpenAiGenerator::from_config(&config.generator)?);
        engine = engine.with_generator(
            generator,
            Duration::from_secs(config.generator.timeout_seconds),
        );
    } else {
        tracing::info!("Generator disabled or missing API key, replies will be deterministic");
    }

    Ok(engine)
}
