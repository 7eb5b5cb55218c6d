pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{JsonCatalog, OpenAiGenerator};
pub use app::{build_engine, build_engine_with_catalog};
pub use config::toml_config::HeroConfig;
pub use core::engine::DraftEngine;
pub use domain::model::{DraftOutcome, DraftRequest, ReasonCode, ReplyOrigin};
pub use utils::error::{HeroError, Result};
