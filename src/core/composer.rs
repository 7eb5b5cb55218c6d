use crate::core::normalizer::normalize;
use crate::core::tables::type_label;
use crate::domain::model::{
    Catalog, Listing, MatchSignals, ReasonCode, ResolutionResult, ResponsePayload,
};
use std::sync::Arc;

pub const DEFAULT_MAX_LISTINGS: usize = 8;
pub const PENDING_DELIVERY: &str = "a confirmar";
const MAX_TYPE_EXAMPLES: usize = 5;

const LISTING_FOLLOWUPS: [&str; 3] = [
    "Quer agendar uma visita?",
    "Posso te enviar o book completo?",
    "Prefere que eu te ligue?",
];
const TYPE_MISS_FOLLOWUPS: [&str; 3] = [
    "Alguma outra tipologia te atende?",
    "Quer ver opções em bairros próximos?",
    "Posso detalhar alguma dessas opções?",
];
const NEIGHBORHOOD_TYPE_FOLLOWUPS: [&str; 3] = [
    "Quer ver outras tipologias nesse bairro?",
    "Posso buscar em bairros próximos?",
    "Quer agendar uma conversa?",
];
const NARROWING_FOLLOWUPS: [&str; 2] = [
    "Qual bairro você prefere?",
    "Tem algum empreendimento em mente?",
];
const NO_SIGNAL_FOLLOWUPS: [&str; 3] = [
    "Qual bairro você procura?",
    "Quantos quartos você precisa?",
    "Tem algum empreendimento em mente?",
];

/// Joins items as "a, b e c".
pub fn humanize_list(items: &[String], conjunction: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} {} {}", init.join(", "), conjunction, last),
    }
}

fn followups(items: &[&str]) -> Vec<String> {
    items.iter().map(|f| f.to_string()).collect()
}

/// Delivery text, or "a confirmar" when the catalog has none.
pub fn delivery_or_pending(listing: &Listing) -> &str {
    listing
        .delivery_status
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(PENDING_DELIVERY)
}

fn render_listing(listing: &Listing) -> String {
    let mut line = format!("- {}, em {}.", listing.name, listing.neighborhood);
    if !listing.property_types.is_empty() {
        let labels: Vec<String> = listing.property_types.iter().map(|t| type_label(t)).collect();
        line.push_str(&format!(" Tipologias: {}.", humanize_list(&labels, "e")));
    }
    line.push_str(&format!(" Entrega: {}.", delivery_or_pending(listing)));
    let description = listing.description.trim();
    if !description.is_empty() {
        line.push(' ');
        line.push_str(description);
    }
    line
}

/// Deterministic replies built from a resolution, used whenever the
/// generative step is absent or its output was rejected.
pub struct ResponseComposer {
    catalog: Arc<Catalog>,
    max_listings: usize,
}

impl ResponseComposer {
    pub fn new(catalog: Arc<Catalog>, max_listings: usize) -> Self {
        Self {
            catalog,
            max_listings: max_listings.max(1),
        }
    }

    pub fn compose(&self, result: &ResolutionResult, signals: &MatchSignals) -> ResponsePayload {
        if result.listings.is_empty() {
            return self.fallback(result.reason, signals);
        }

        match result.reason {
            ReasonCode::Type => self.type_narrowing(&result.listings, signals),
            ReasonCode::Neighborhood if !signals.property_type_codes.is_empty() => {
                let preamble = self.type_miss_preamble(&result.listings, signals);
                let mut payload = self.enumerate(&result.listings, Some(preamble));
                payload.followups = followups(&TYPE_MISS_FOLLOWUPS);
                payload
            }
            _ => self.enumerate(&result.listings, None),
        }
    }

    /// Listing reply: up to `max_listings` entries plus a call to action.
    pub fn enumerate(&self, listings: &[Listing], preamble: Option<String>) -> ResponsePayload {
        let shown = &listings[..listings.len().min(self.max_listings)];
        let header = preamble.unwrap_or_else(|| {
            if shown.len() == 1 {
                "Encontrei esta opção na nossa base:".to_string()
            } else {
                "Encontrei estas opções na nossa base:".to_string()
            }
        });

        let mut text = header;
        text.push_str("\n\n");
        text.push_str(
            &shown
                .iter()
                .map(render_listing)
                .collect::<Vec<_>>()
                .join("\n"),
        );

        let hidden = listings.len() - shown.len();
        if hidden > 0 {
            let noun = if hidden == 1 { "opção" } else { "opções" };
            text.push_str(&format!("\n\nTenho ainda mais {} {}.", hidden, noun));
        }

        text.push_str("\n\nQuer que eu detalhe alguma delas ou prefere agendar uma visita? 😊");

        ResponsePayload {
            text,
            followups: followups(&LISTING_FOLLOWUPS),
        }
    }

    /// Reason-keyed message for an empty resolution.
    pub fn fallback(&self, reason: ReasonCode, signals: &MatchSignals) -> ResponsePayload {
        match reason {
            ReasonCode::NeighborhoodType | ReasonCode::Neighborhood
                if !signals.neighborhoods.is_empty() =>
            {
                let places = self.display_neighborhoods(signals.neighborhoods.iter());
                let types = requested_types(signals);
                let text = if types.is_empty() {
                    format!(
                        "No momento não tenho opções disponíveis em {}. Quer que eu busque em bairros próximos? 😊",
                        places
                    )
                } else {
                    format!(
                        "Não encontrei {} em {} no momento. Posso te mostrar outras opções em {} ou buscar em bairros próximos? 😊",
                        types, places, places
                    )
                };
                ResponsePayload {
                    text,
                    followups: followups(&NEIGHBORHOOD_TYPE_FOLLOWUPS),
                }
            }
            ReasonCode::Type if !signals.property_type_codes.is_empty() => ResponsePayload {
                text: format!(
                    "Ainda não tenho opções de {} na base. Você pode me dizer o bairro ou o nome do empreendimento que procura? 😊",
                    requested_types(signals)
                ),
                followups: followups(&NARROWING_FOLLOWUPS),
            },
            _ => ResponsePayload {
                text: "Para te orientar melhor, você pode informar o bairro ou o nome do empreendimento que procura? 😊"
                    .to_string(),
                followups: followups(&NO_SIGNAL_FOLLOWUPS),
            },
        }
    }

    /// Type-only matches are too broad to list; name a few and ask for a
    /// neighborhood or listing name.
    fn type_narrowing(&self, listings: &[Listing], signals: &MatchSignals) -> ResponsePayload {
        let examples: Vec<String> = listings
            .iter()
            .take(MAX_TYPE_EXAMPLES)
            .map(|l| format!("{} em {}", l.name, l.neighborhood))
            .collect();
        let types = requested_types(signals);
        let subject = if types.is_empty() {
            "essa tipologia".to_string()
        } else {
            types
        };

        ResponsePayload {
            text: format!(
                "Tenho algumas opções com {}, como {}. Você tem algum bairro ou empreendimento específico em mente? 😊",
                subject,
                humanize_list(&examples, "e")
            ),
            followups: followups(&NARROWING_FOLLOWUPS),
        }
    }

    fn type_miss_preamble(&self, listings: &[Listing], signals: &MatchSignals) -> String {
        let mut places: Vec<String> = Vec::new();
        for listing in listings {
            if !places.contains(&listing.neighborhood) {
                places.push(listing.neighborhood.clone());
            }
        }
        let scope = if places.len() == 1 { "no bairro" } else { "nesses bairros" };
        format!(
            "Não encontrei {} em {} no momento, mas estas são as opções disponíveis {}:",
            requested_types(signals),
            humanize_list(&places, "e"),
            scope
        )
    }

    /// Catalog spelling for normalized neighborhood names; alias targets
    /// absent from the catalog are shown as-is.
    fn display_neighborhoods<'a>(&self, normalized: impl Iterator<Item = &'a String>) -> String {
        let names: Vec<String> = normalized
            .map(|n| {
                self.catalog
                    .listings()
                    .iter()
                    .find(|l| normalize(&l.neighborhood) == *n)
                    .map(|l| l.neighborhood.clone())
                    .unwrap_or_else(|| n.clone())
            })
            .collect();
        humanize_list(&names, "e")
    }
}

fn requested_types(signals: &MatchSignals) -> String {
    let labels: Vec<String> = signals
        .property_type_codes
        .iter()
        .map(|c| type_label(c))
        .collect();
    humanize_list(&labels, "ou")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{listing, niteroi_catalog};
    use std::collections::BTreeSet;

    fn composer(max: usize) -> ResponseComposer {
        ResponseComposer::new(Arc::new(niteroi_catalog()), max)
    }

    fn signals(types: &[&str], neighborhoods: &[&str]) -> MatchSignals {
        MatchSignals {
            property_type_codes: types.iter().map(|t| t.to_string()).collect(),
            neighborhoods: neighborhoods.iter().map(|n| n.to_string()).collect::<BTreeSet<_>>(),
            name_matches: Vec::new(),
        }
    }

    #[test]
    fn test_humanize_list() {
        let items = |xs: &[&str]| xs.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        assert_eq!(humanize_list(&items(&[]), "e"), "");
        assert_eq!(humanize_list(&items(&["a"]), "e"), "a");
        assert_eq!(humanize_list(&items(&["a", "b"]), "e"), "a e b");
        assert_eq!(humanize_list(&items(&["a", "b", "c"]), "e"), "a, b e c");
    }

    #[test]
    fn test_enumeration_renders_listing_fields() {
        let catalog = niteroi_catalog();
        let result = ResolutionResult {
            listings: vec![catalog.listings()[0].clone(), catalog.listings()[1].clone()],
            reason: ReasonCode::Neighborhood,
        };
        let payload = composer(8).compose(&result, &MatchSignals::default());

        assert!(payload.text.contains(
            "- Marem, em Icaraí. Tipologias: 2 quartos e 3 quartos. Entrega: Dez/2026. Frente para a praia, lazer completo."
        ));
        assert!(payload
            .text
            .contains("- Alameda Icaraí, em Icaraí. Tipologias: 3 quartos e 4 quartos. Entrega: a confirmar."));
        assert!(payload.text.ends_with("prefere agendar uma visita? 😊"));
        assert_eq!(payload.followups.len(), 3);
    }

    #[test]
    fn test_enumeration_is_capped() {
        let listings: Vec<Listing> = (0..10)
            .map(|i| listing(&format!("Torre {}", i), "Centro", &["2q"]))
            .collect();
        let payload = composer(8).enumerate(&listings, None);

        assert!(payload.text.contains("Torre 7"));
        assert!(!payload.text.contains("Torre 8"));
        assert!(payload.text.contains("Tenho ainda mais 2 opções."));
    }

    #[test]
    fn test_type_miss_in_neighborhood_explains_and_offers() {
        let catalog = niteroi_catalog();
        let result = ResolutionResult {
            listings: vec![catalog.listings()[0].clone(), catalog.listings()[1].clone()],
            reason: ReasonCode::Neighborhood,
        };
        let payload = composer(8).compose(&result, &signals(&["studio"], &["icarai"]));

        assert!(payload
            .text
            .starts_with("Não encontrei studio em Icaraí no momento, mas estas são as opções disponíveis no bairro:"));
        assert!(payload.text.contains("- Marem, em Icaraí."));
        assert_eq!(payload.followups[0], "Alguma outra tipologia te atende?");
    }

    #[test]
    fn test_type_only_narrows_with_examples() {
        let catalog = niteroi_catalog();
        let result = ResolutionResult {
            listings: vec![catalog.listings()[2].clone(), catalog.listings()[5].clone()],
            reason: ReasonCode::Type,
        };
        let payload = composer(8).compose(&result, &signals(&["studio"], &[]));

        assert_eq!(
            payload.text,
            "Tenho algumas opções com studio, como Pulse Santa Rosa em Santa Rosa e Nexus em Centro. Você tem algum bairro ou empreendimento específico em mente? 😊"
        );
        assert_eq!(payload.followups.len(), 2);
    }

    #[test]
    fn test_fallback_by_reason() {
        let c = composer(8);

        let nt = c.fallback(ReasonCode::NeighborhoodType, &signals(&["4q"], &["regiao oceanica"]));
        assert!(nt.text.starts_with("Não encontrei 4 quartos em Região Oceânica no momento."));
        assert_eq!(nt.followups.len(), 3);

        let t = c.fallback(ReasonCode::Type, &signals(&["loft", "lote"], &[]));
        assert!(t.text.starts_with("Ainda não tenho opções de loft ou lote na base."));
        assert_eq!(t.followups.len(), 2);

        let none = c.compose(&ResolutionResult::none(), &MatchSignals::default());
        assert!(none.text.contains("bairro ou o nome do empreendimento"));
        assert!((2..=3).contains(&none.followups.len()));
    }
}
