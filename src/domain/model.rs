use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One real-estate development from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub name: String,
    pub neighborhood: String,
    /// Canonical type codes (`studio`, `loft`, `1q`..`4q`, `lote`), in catalog order.
    pub property_types: Vec<String>,
    /// Descriptive only, never a match criterion.
    pub delivery_status: Option<String>,
    pub description: String,
}

impl Listing {
    pub fn has_any_type(&self, codes: &BTreeSet<String>) -> bool {
        self.property_types.iter().any(|t| codes.contains(t))
    }
}

/// Immutable, ordered set of listings loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    listings: Vec<Listing>,
}

impl Catalog {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSignals {
    pub property_type_codes: BTreeSet<String>,
    /// Normalized, alias-resolved neighborhood names.
    pub neighborhoods: BTreeSet<String>,
    pub name_matches: Vec<Listing>,
}

impl MatchSignals {
    pub fn is_empty(&self) -> bool {
        self.property_type_codes.is_empty()
            && self.neighborhoods.is_empty()
            && self.name_matches.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonCode {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "neighborhood+type")]
    NeighborhoodType,
    #[serde(rename = "neighborhood")]
    Neighborhood,
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "none")]
    None,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::Name => "name",
            ReasonCode::NeighborhoodType => "neighborhood+type",
            ReasonCode::Neighborhood => "neighborhood",
            ReasonCode::Type => "type",
            ReasonCode::None => "none",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    pub listings: Vec<Listing>,
    pub reason: ReasonCode,
}

impl ResolutionResult {
    pub fn none() -> Self {
        Self {
            listings: Vec::new(),
            reason: ReasonCode::None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub text: String,
    pub followups: Vec<String>,
}

/// Where the final reply text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyOrigin {
    Generated,
    Deterministic,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct DraftRequest {
    pub message: String,
    pub sender_id: Option<String>,
}

impl DraftRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sender_id: None,
        }
    }

    pub fn with_sender(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = Some(sender_id.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftOutcome {
    #[serde(flatten)]
    pub payload: ResponsePayload,
    pub reason: ReasonCode,
    pub origin: ReplyOrigin,
    pub reused_session: bool,
}
