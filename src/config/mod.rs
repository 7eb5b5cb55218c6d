pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::sanitizer::SignatureMode;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use toml_config::HeroConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "hero-draft")]
#[command(about = "Drafts grounded WhatsApp replies from a real-estate listing catalog")]
pub struct CliConfig {
    /// Message to answer; without it, one message is read per stdin line.
    pub message: Option<String>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Catalog JSON file, overrides catalog.path")]
    pub catalog: Option<String>,

    #[arg(long, help = "Sender id used for session follow-ups")]
    pub sender: Option<String>,

    #[arg(long, help = "Never call the generative collaborator")]
    pub no_generator: bool,

    #[arg(long, help = "Signature mode: always, never or closing")]
    pub signature_mode: Option<SignatureMode>,

    #[arg(long, help = "Print the full outcome as JSON")]
    pub json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// File configuration (or defaults) with command-line overrides applied.
    pub fn load_config(&self) -> Result<HeroConfig> {
        let mut config = match &self.config {
            Some(path) => HeroConfig::from_file(path)?,
            None => HeroConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut HeroConfig) {
        if let Some(catalog) = &self.catalog {
            config.catalog.path = catalog.clone();
        }
        if self.no_generator {
            config.generator.enabled = false;
        }
        if let Some(mode) = self.signature_mode {
            config.signature.mode = mode;
        }
    }
}
