use crate::core::normalizer::{normalize, padded};
use crate::core::tables::MatchingTables;
use crate::domain::model::{Catalog, Listing, MatchSignals};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Terms shorter than this use plain substring containment.
pub const SHORT_TERM_CHARS: usize = 4;

/// Whole-word containment of `term` in `haystack`, both already normalized.
///
/// A hit must be preceded and followed by a non-alphanumeric character or
/// the string edge. Short terms skip the boundary check and accept any
/// substring hit.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    if term.chars().count() < SHORT_TERM_CHARS {
        return haystack.contains(term);
    }

    let mut from = 0;
    while let Some(offset) = haystack[from..].find(term) {
        let start = from + offset;
        let end = start + term.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        if !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric) {
            return true;
        }
        from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

#[derive(Debug)]
struct NameEntry {
    full: String,
    tokens: Vec<String>,
}

/// Derives type, neighborhood and name signals from a raw message.
pub struct IntentExtractor {
    catalog: Arc<Catalog>,
    tables: Arc<MatchingTables>,
    neighborhoods: Vec<String>,
    aliases: Vec<(String, String)>,
    names: Vec<NameEntry>,
}

impl IntentExtractor {
    pub fn new(catalog: Arc<Catalog>, tables: Arc<MatchingTables>) -> Self {
        let mut seen = BTreeSet::new();
        let neighborhoods: Vec<String> = catalog
            .listings()
            .iter()
            .map(|l| normalize(&l.neighborhood))
            .filter(|n| !n.is_empty() && seen.insert(n.clone()))
            .collect();

        // An alias pointing outside the catalog would only add a dead signal.
        let aliases: Vec<(String, String)> = tables
            .aliases()
            .filter(|(_, target)| neighborhoods.iter().any(|n| n == target))
            .map(|(alias, target)| (alias.to_string(), target.to_string()))
            .collect();

        // A name token that only repeats a place word ("Alameda Icaraí") would
        // turn every neighborhood mention into a name hit.
        let place_words: BTreeSet<String> = neighborhoods
            .iter()
            .map(String::as_str)
            .chain(
                aliases
                    .iter()
                    .flat_map(|(alias, target)| [alias.as_str(), target.as_str()]),
            )
            .flat_map(|n| n.split(' '))
            .map(str::to_string)
            .collect();

        let names = catalog
            .listings()
            .iter()
            .map(|l| {
                let full = normalize(&l.name);
                let tokens = full
                    .split(' ')
                    .filter(|t| {
                        t.chars().count() >= SHORT_TERM_CHARS
                            && !tables.is_ignored_name_token(t)
                            && !place_words.contains(*t)
                    })
                    .map(str::to_string)
                    .collect();
                NameEntry { full, tokens }
            })
            .collect();

        Self {
            catalog,
            tables,
            neighborhoods,
            aliases,
            names,
        }
    }

    pub fn extract(&self, message: &str) -> MatchSignals {
        let text = padded(message);
        MatchSignals {
            property_type_codes: self.tables.property_type_codes(&text),
            neighborhoods: self.neighborhoods(&text),
            name_matches: self.name_matches(&text),
        }
    }

    /// Direct catalog hits and alias hits land in the same set.
    fn neighborhoods(&self, text: &str) -> BTreeSet<String> {
        let mut found: BTreeSet<String> = self
            .neighborhoods
            .iter()
            .filter(|n| contains_term(text, n))
            .cloned()
            .collect();

        for (alias, target) in &self.aliases {
            if contains_term(text, alias) {
                found.insert(target.clone());
            }
        }
        found
    }

    fn name_matches(&self, text: &str) -> Vec<Listing> {
        self.catalog
            .listings()
            .iter()
            .zip(&self.names)
            .filter(|(_, entry)| {
                contains_term(text, &entry.full)
                    || entry.tokens.iter().any(|t| contains_term(text, t))
            })
            .map(|(listing, _)| listing.clone())
            .collect()
    }
}
