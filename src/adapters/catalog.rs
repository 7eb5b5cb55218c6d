use crate::core::normalizer::normalize;
use crate::core::tables::canonical_type_codes;
use crate::domain::model::{Catalog, Listing};
use crate::domain::ports::CatalogProvider;
use crate::utils::error::{HeroError, Result};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const TYPE_KEYS: [&str; 3] = ["property_types", "tipologia", "tipologias"];
const DESCRIPTION_KEYS: [&str; 2] = ["description", "descricao"];
const PENDING_DELIVERY_TEXT: &str = "Entrega: a confirmar";
const DELIVERY_IN_DESCRIPTION: &str = r"(?i)Entrega:\s*([^|\n]+)";
const MAX_NORMALIZE_SAMPLES: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TypeLabels {
    One(String),
    Many(Vec<String>),
}

/// Catalog record as found on disk; accepts the Portuguese field names.
#[derive(Debug, Deserialize)]
struct RawListing {
    #[serde(alias = "nome")]
    name: String,
    #[serde(alias = "bairro")]
    neighborhood: String,
    #[serde(default, alias = "tipologia", alias = "tipologias")]
    property_types: Option<TypeLabels>,
    #[serde(default, alias = "entrega")]
    delivery_status: Option<String>,
    #[serde(default, alias = "descricao")]
    description: Option<String>,
}

impl RawListing {
    fn into_listing(self, delivery_hint: &Regex) -> Listing {
        let labels = match self.property_types {
            Some(TypeLabels::One(label)) => vec![label],
            Some(TypeLabels::Many(labels)) => labels,
            None => Vec::new(),
        };

        let description = self.description.unwrap_or_default().trim().to_string();
        let delivery_status = self
            .delivery_status
            .map(|d| d.trim().to_string())
            .filter(|d| !is_placeholder_delivery(d))
            .or_else(|| delivery_from_description(delivery_hint, &description));

        Listing {
            name: self.name.trim().to_string(),
            neighborhood: self.neighborhood.trim().to_string(),
            property_types: canonical_types(&labels),
            delivery_status,
            description,
        }
    }
}

/// Canonical codes for a list of free-text labels, deduplicated in first-seen order.
pub fn canonical_types(labels: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    labels
        .iter()
        .flat_map(|label| label.split([',', ';', '/', '|']))
        .flat_map(canonical_type_codes)
        .filter(|code| seen.insert(code.clone()))
        .collect()
}

/// "—", "-" and blank delivery values carry no information.
pub fn is_placeholder_delivery(value: &str) -> bool {
    value
        .trim()
        .chars()
        .all(|c| c == '-' || c == '—' || c == '–' || c.is_whitespace())
}

/// First "Entrega: X" note in a description, unless it is a placeholder or
/// already says the date is pending.
fn delivery_from_description(hint: &Regex, description: &str) -> Option<String> {
    let value = hint
        .captures(description)?
        .get(1)?
        .as_str()
        .trim()
        .trim_end_matches(['.', ';'])
        .trim();
    if is_placeholder_delivery(value) || normalize(value) == "a confirmar" {
        return None;
    }
    Some(value.to_string())
}

/// Parses and validates a catalog document. The result is never empty and
/// never holds two listings whose names normalize to the same text.
pub fn parse_catalog(content: &str) -> Result<Catalog> {
    let raw: Vec<RawListing> =
        serde_json::from_str(content).map_err(|e| HeroError::CatalogError {
            message: format!("Invalid catalog JSON: {}", e),
        })?;

    if raw.is_empty() {
        return Err(HeroError::CatalogError {
            message: "Catalog has no listings".to_string(),
        });
    }

    let delivery_hint = Regex::new(DELIVERY_IN_DESCRIPTION)?;
    let mut names = HashSet::new();
    let mut listings = Vec::with_capacity(raw.len());
    for (index, record) in raw.into_iter().enumerate() {
        let listing = record.into_listing(&delivery_hint);
        if listing.name.is_empty() || listing.neighborhood.is_empty() {
            return Err(HeroError::CatalogError {
                message: format!("Listing #{} is missing a name or neighborhood", index + 1),
            });
        }
        if !names.insert(normalize(&listing.name)) {
            return Err(HeroError::CatalogError {
                message: format!("Duplicate listing name: {}", listing.name),
            });
        }
        listings.push(listing);
    }

    Ok(Catalog::new(listings))
}

/// Catalog backed by a JSON array file.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogProvider for JsonCatalog {
    fn load(&self) -> Result<Catalog> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| HeroError::CatalogError {
                message: format!("Cannot read {}: {}", self.path.display(), e),
            })?;
        let catalog = parse_catalog(&content)?;
        tracing::info!(
            "📚 Loaded {} listings from {}",
            catalog.len(),
            self.path.display()
        );
        Ok(catalog)
    }
}

/// One record whose type labels were rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeChange {
    pub name: String,
    pub before: Vec<String>,
    pub after: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub total: usize,
    pub changed: usize,
    /// At most the first ten type rewrites, for review.
    pub samples: Vec<TypeChange>,
}

/// Rewrites raw catalog records in place: canonical type codes and a
/// pending delivery note instead of "Entrega: —" in descriptions. Keys the
/// loader does not know about are preserved.
pub fn normalize_records(document: &mut Value) -> Result<NormalizeReport> {
    let records = document
        .as_array_mut()
        .ok_or_else(|| HeroError::CatalogError {
            message: "Catalog file must hold a JSON array".to_string(),
        })?;
    let placeholder = Regex::new(r"Entrega:\s*[—–\-]+")?;

    let mut changed = 0;
    let mut samples = Vec::new();
    for record in records.iter_mut() {
        let Some(fields) = record.as_object_mut() else {
            continue;
        };
        let before = fields.clone();

        for key in TYPE_KEYS {
            let labels: Vec<String> = match fields.get(key) {
                Some(Value::String(label)) => vec![label.clone()],
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
                _ => continue,
            };
            let codes = canonical_types(&labels);
            if codes != labels && samples.len() < MAX_NORMALIZE_SAMPLES {
                let name = ["name", "nome"]
                    .iter()
                    .find_map(|k| fields.get(*k).and_then(Value::as_str))
                    .unwrap_or("?")
                    .to_string();
                samples.push(TypeChange {
                    name,
                    before: labels,
                    after: codes.clone(),
                });
            }
            fields.insert(
                key.to_string(),
                Value::Array(codes.into_iter().map(Value::String).collect()),
            );
        }

        for key in DESCRIPTION_KEYS {
            if let Some(Value::String(text)) = fields.get_mut(key) {
                let replaced = placeholder
                    .replace_all(text, PENDING_DELIVERY_TEXT)
                    .into_owned();
                *text = replaced;
            }
        }

        if *fields != before {
            changed += 1;
        }
    }

    Ok(NormalizeReport {
        total: records.len(),
        changed,
        samples,
    })
}
