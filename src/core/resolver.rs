use crate::core::normalizer::normalize;
use crate::domain::model::{Catalog, Listing, MatchSignals, ReasonCode, ResolutionResult};
use std::sync::Arc;

/// Strict priority cascade over the catalog: name, neighborhood (type as a
/// refinement), type only, nothing. First satisfied branch wins; results
/// keep catalog order.
pub struct CandidateResolver {
    catalog: Arc<Catalog>,
    normalized_neighborhoods: Vec<String>,
}

impl CandidateResolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let normalized_neighborhoods = catalog
            .listings()
            .iter()
            .map(|l| normalize(&l.neighborhood))
            .collect();
        Self {
            catalog,
            normalized_neighborhoods,
        }
    }

    pub fn resolve(&self, signals: &MatchSignals) -> ResolutionResult {
        if !signals.name_matches.is_empty() {
            return ResolutionResult {
                listings: signals.name_matches.clone(),
                reason: ReasonCode::Name,
            };
        }

        if !signals.neighborhoods.is_empty() {
            let in_neighborhood: Vec<&Listing> = self
                .catalog
                .listings()
                .iter()
                .zip(&self.normalized_neighborhoods)
                .filter(|(_, n)| signals.neighborhoods.contains(n.as_str()))
                .map(|(listing, _)| listing)
                .collect();

            if !signals.property_type_codes.is_empty() {
                let refined: Vec<Listing> = in_neighborhood
                    .iter()
                    .filter(|l| l.has_any_type(&signals.property_type_codes))
                    .map(|l| (*l).clone())
                    .collect();
                if !refined.is_empty() {
                    return ResolutionResult {
                        listings: refined,
                        reason: ReasonCode::NeighborhoodType,
                    };
                }
            }

            return ResolutionResult {
                listings: in_neighborhood.into_iter().cloned().collect(),
                reason: ReasonCode::Neighborhood,
            };
        }

        if !signals.property_type_codes.is_empty() {
            return ResolutionResult {
                listings: self
                    .catalog
                    .listings()
                    .iter()
                    .filter(|l| l.has_any_type(&signals.property_type_codes))
                    .cloned()
                    .collect(),
                reason: ReasonCode::Type,
            };
        }

        ResolutionResult::none()
    }
}
