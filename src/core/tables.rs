use crate::core::normalizer::normalize;
use crate::utils::error::Result;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

pub const TYPE_STUDIO: &str = "studio";
pub const TYPE_LOFT: &str = "loft";
pub const TYPE_LOTE: &str = "lote";

const BEDROOM_WORDS: [(u8, &str); 4] = [(1, "um"), (2, "dois"), (3, "tres"), (4, "quatro")];

const DEFAULT_ALIASES: [(&str, &str); 6] = [
    ("icaria", "icarai"),
    ("icarahy", "icarai"),
    ("pe pequeno", "santa rosa"),
    ("viradouro", "santa rosa"),
    ("camboinhas", "regiao oceanica"),
    ("itacoatiara", "regiao oceanica"),
];

const DEFAULT_IGNORED_NAME_TOKENS: [&str; 4] = ["residencial", "edificio", "condominio", "residence"];

#[derive(Debug)]
struct TypePattern {
    regex: Regex,
    code: String,
}

/// Immutable lookup tables shared by extraction and composition.
#[derive(Debug)]
pub struct MatchingTables {
    type_patterns: Vec<TypePattern>,
    aliases: BTreeMap<String, String>,
    ignored_name_tokens: BTreeSet<String>,
}

impl MatchingTables {
    /// Builds the built-in tables, then layers `extra_aliases` on top.
    /// Keys and targets are normalized, so config may use accents freely.
    pub fn new(
        extra_aliases: &BTreeMap<String, String>,
        extra_ignored_tokens: &[String],
    ) -> Result<Self> {
        let mut type_patterns = vec![
            TypePattern {
                regex: Regex::new(r"\bstudios?\b")?,
                code: TYPE_STUDIO.to_string(),
            },
            TypePattern {
                regex: Regex::new(r"\blofts?\b")?,
                code: TYPE_LOFT.to_string(),
            },
        ];
        for (n, word) in BEDROOM_WORDS {
            let pattern = format!(
                r"\b(?:{}|{})\s*(?:q|qs|qto|qtos|quartos?|dorms?|dormitorios?)\b",
                n, word
            );
            type_patterns.push(TypePattern {
                regex: Regex::new(&pattern)?,
                code: format!("{}q", n),
            });
        }
        type_patterns.push(TypePattern {
            regex: Regex::new(r"\b(?:lotes?|terrenos?)\b")?,
            code: TYPE_LOTE.to_string(),
        });

        let mut aliases: BTreeMap<String, String> = DEFAULT_ALIASES
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        for (from, to) in extra_aliases {
            let (from, to) = (normalize(from), normalize(to));
            if !from.is_empty() && !to.is_empty() {
                aliases.insert(from, to);
            }
        }

        let ignored_name_tokens = DEFAULT_IGNORED_NAME_TOKENS
            .iter()
            .map(|t| t.to_string())
            .chain(extra_ignored_tokens.iter().map(|t| normalize(t)))
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Self {
            type_patterns,
            aliases,
            ignored_name_tokens,
        })
    }

    pub fn builtin() -> Result<Self> {
        Self::new(&BTreeMap::new(), &[])
    }

    /// Every type code whose pattern fires on `text` (normalized). Patterns
    /// are independent, so one message may yield several codes.
    pub fn property_type_codes(&self, text: &str) -> BTreeSet<String> {
        self.type_patterns
            .iter()
            .filter(|p| p.regex.is_match(text))
            .map(|p| p.code.clone())
            .collect()
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_ignored_name_token(&self, token: &str) -> bool {
        self.ignored_name_tokens.contains(token)
    }
}

/// Maps a free-text catalog type label to canonical codes.
///
/// "2 e 3 quartos" yields both `2q` and `3q`; labels that match nothing
/// known are kept in normalized form.
pub fn canonical_type_codes(label: &str) -> Vec<String> {
    let x = normalize(label);
    if x.is_empty() {
        return Vec::new();
    }
    if x.contains("studio") {
        return vec![TYPE_STUDIO.to_string()];
    }
    if x.contains("loft") {
        return vec![TYPE_LOFT.to_string()];
    }
    if x.contains("lote") || x.contains("terreno") {
        return vec![TYPE_LOTE.to_string()];
    }

    let tokens: Vec<&str> = x
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    let mentions_rooms = tokens
        .iter()
        .any(|t| t.starts_with("quarto") || t.starts_with("dorm"));

    let mut codes = Vec::new();
    for (n, word) in BEDROOM_WORDS {
        let compact = format!("{}q", n);
        let digit = n.to_string();
        let hit = tokens.iter().any(|t| *t == compact)
            || (mentions_rooms && tokens.iter().any(|t| *t == digit || *t == word));
        if hit {
            codes.push(compact);
        }
    }

    if codes.is_empty() {
        vec![x]
    } else {
        codes
    }
}

/// Human label for a canonical code, used in composed replies.
pub fn type_label(code: &str) -> String {
    match code {
        "1q" => "1 quarto".to_string(),
        "2q" | "3q" | "4q" => format!("{} quartos", &code[..1]),
        other => other.to_string(),
    }
}
