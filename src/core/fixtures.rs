//! Shared test catalog.

use crate::domain::model::{Catalog, Listing};

pub fn listing(name: &str, neighborhood: &str, types: &[&str]) -> Listing {
    Listing {
        name: name.to_string(),
        neighborhood: neighborhood.to_string(),
        property_types: types.iter().map(|t| t.to_string()).collect(),
        delivery_status: None,
        description: String::new(),
    }
}

pub fn niteroi_catalog() -> Catalog {
    let mut marem = listing("Marem", "Icaraí", &["2q", "3q"]);
    marem.delivery_status = Some("Dez/2026".to_string());
    marem.description = "Frente para a praia, lazer completo.".to_string();

    Catalog::new(vec![
        marem,
        listing("Alameda Icaraí", "Icaraí", &["3q", "4q"]),
        listing("Pulse Santa Rosa", "Santa Rosa", &["studio", "1q"]),
        listing("Horizonte", "Piratininga", &["lote"]),
        listing("Ventura", "Região Oceânica", &["2q"]),
        listing("Nexus", "Centro", &["studio", "loft"]),
    ])
}
