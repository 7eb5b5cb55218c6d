use crate::core::normalizer::normalize;
use crate::domain::model::Listing;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub listings: Vec<Listing>,
    pub expires_at: DateTime<Utc>,
}

/// Last non-empty candidate set per sender, with lazy expiry and a hard
/// capacity. Writes are last-writer-wins.
pub struct SessionCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl SessionCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // a panic mid-insert leaves the map usable
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, sender_id: &str) -> Option<Vec<Listing>> {
        self.get_at(sender_id, Utc::now())
    }

    pub fn set(&self, sender_id: &str, listings: &[Listing]) {
        self.set_at(sender_id, listings, Utc::now())
    }

    pub fn get_at(&self, sender_id: &str, now: DateTime<Utc>) -> Option<Vec<Listing>> {
        let mut entries = self.lock();
        let entry = entries.get(sender_id)?;
        if now <= entry.expires_at {
            return Some(entry.listings.clone());
        }

        entries.remove(sender_id);
        tracing::debug!("Session entry for {} expired", sender_id);
        None
    }

    /// No-op for an empty candidate set, so a failed resolution never
    /// clobbers a still-valid entry.
    pub fn set_at(&self, sender_id: &str, listings: &[Listing], now: DateTime<Utc>) {
        if listings.is_empty() {
            return;
        }

        let mut entries = self.lock();
        if !entries.contains_key(sender_id) && entries.len() >= self.max_entries {
            entries.retain(|_, e| now <= e.expires_at);
            if entries.len() >= self.max_entries {
                let soonest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.expires_at)
                    .map(|(k, _)| k.clone());
                if let Some(key) = soonest {
                    entries.remove(&key);
                }
            }
        }

        entries.insert(
            sender_id.to_string(),
            CacheEntry {
                listings: listings.to_vec(),
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const FOLLOWUP_CUES: [&str; 24] = [
    "interesse",
    "interessad",
    "gostei",
    "investimento",
    "investir",
    "book",
    "folder",
    "material",
    "apresentacao",
    "tabela",
    "planta",
    "valores",
    "preco",
    "detalhe",
    "mais informac",
    "mais info",
    "agendar",
    "agenda",
    "visita",
    "ligacao",
    "ligar",
    "me liga",
    "conversar",
    "whats",
];

/// Short, signal-free follow-up ("tenho interesse", "me manda o book")
/// that may reuse the sender's previous candidates.
pub fn is_followup(message: &str, max_tokens: usize) -> bool {
    let text = normalize(message);
    let tokens = text.split(' ').filter(|t| !t.is_empty()).count();
    if tokens == 0 || tokens > max_tokens {
        return false;
    }
    FOLLOWUP_CUES.iter().any(|cue| text.contains(cue))
}
