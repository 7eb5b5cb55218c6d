use crate::core::composer::DEFAULT_MAX_LISTINGS;
use crate::core::engine::DEFAULT_MAX_FOLLOWUP_TOKENS;
use crate::core::sanitizer::{SignatureMode, DEFAULT_COMPANY, DEFAULT_SIGNATURE};
use crate::utils::error::{HeroError, Result};
use crate::utils::validation::{
    validate_at_least, validate_catalog_path, validate_endpoint, validate_non_empty,
    validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Whole application configuration. Every section may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    pub catalog: CatalogConfig,
    pub generator: GeneratorConfig,
    pub session: SessionConfig,
    pub signature: SignatureConfig,
    pub composer: ComposerConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: "data/empreendimentos.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    pub temperature: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_seconds: 20,
            temperature: 0.4,
        }
    }
}

impl GeneratorConfig {
    /// Key usable for requests; blank or unsubstituted `${VAR}` counts as absent.
    pub fn resolved_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !(k.starts_with("${") && k.ends_with('}')))
    }

    pub fn is_active(&self) -> bool {
        self.enabled && self.resolved_api_key().is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub enabled: bool,
    pub ttl_seconds: u64,
    pub max_entries: usize,
    pub max_followup_tokens: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 30 * 60,
            max_entries: 10_000,
            max_followup_tokens: DEFAULT_MAX_FOLLOWUP_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    pub mode: SignatureMode,
    pub text: String,
    pub company: String,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            mode: SignatureMode::default(),
            text: DEFAULT_SIGNATURE.to_string(),
            company: DEFAULT_COMPANY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub max_listings: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_listings: DEFAULT_MAX_LISTINGS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Extra spellings mapped onto catalog neighborhoods, on top of the built-ins.
    pub aliases: BTreeMap<String, String>,
    pub ignored_name_tokens: Vec<String>,
}

impl HeroConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(HeroError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| HeroError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_catalog_path("catalog.path", &self.catalog.path)?;

        if self.generator.enabled {
            validate_endpoint("generator.endpoint", &self.generator.endpoint)?;
            validate_non_empty("generator.model", &self.generator.model)?;
            validate_at_least("generator.timeout_seconds", self.generator.timeout_seconds, 1)?;
            validate_range("generator.temperature", self.generator.temperature, 0.0, 2.0)?;
        }

        if self.session.enabled {
            validate_at_least("session.ttl_seconds", self.session.ttl_seconds, 1)?;
            validate_at_least("session.max_entries", self.session.max_entries, 1)?;
            validate_at_least(
                "session.max_followup_tokens",
                self.session.max_followup_tokens,
                1,
            )?;
        }

        if self.signature.mode != SignatureMode::Never {
            validate_non_empty("signature.text", &self.signature.text)?;
        }

        validate_at_least("composer.max_listings", self.composer.max_listings, 1)?;
        Ok(())
    }
}

impl Validate for HeroConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
