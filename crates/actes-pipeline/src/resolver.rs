//! Contact resolution against the reference directory

use actes_domain::{normalize, ContactResult, DirectoryEntry, ExtractedFields};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// One step of the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStrategy {
    /// Match the declarant name against declarant keys
    Declarant,
    /// Match the street against address keys
    Street,
    /// Match the city against address keys
    City,
}

impl ResolutionStrategy {
    /// Strategies in the order they are tried
    pub const FALLBACK_CHAIN: [ResolutionStrategy; 3] = [
        ResolutionStrategy::Declarant,
        ResolutionStrategy::Street,
        ResolutionStrategy::City,
    ];

    /// Short name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStrategy::Declarant => "declarant",
            ResolutionStrategy::Street => "street",
            ResolutionStrategy::City => "city",
        }
    }

    fn query<'a>(&self, fields: &'a ExtractedFields) -> Option<&'a str> {
        match self {
            ResolutionStrategy::Declarant => fields.declarant_name.as_deref(),
            ResolutionStrategy::Street => fields.street.as_deref(),
            ResolutionStrategy::City => fields.city.as_deref(),
        }
    }

    fn key_field(&self) -> KeyField {
        match self {
            ResolutionStrategy::Declarant => KeyField::Declarant,
            ResolutionStrategy::Street | ResolutionStrategy::City => KeyField::Address,
        }
    }
}

/// Result of a single lookup step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The step had no input
    Skipped,
    /// The input matched nothing, or an entry without contact data
    Miss,
    /// The input matched an entry with a phone or an email
    Hit(ContactResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum KeyField {
    Declarant,
    Address,
}

/// Best-effort phone/email lookup
///
/// A query matches an entry when its normalized key is a substring of the
/// entry's key; the first matching entry in load order wins. Results are
/// memoized per key field and query key.
pub struct ContactResolver {
    entries: Arc<[DirectoryEntry]>,
    memo: Mutex<HashMap<(KeyField, String), ContactResult>>,
}

impl ContactResolver {
    /// Create a resolver over loaded directory entries
    pub fn new(entries: Arc<[DirectoryEntry]>) -> Self {
        Self {
            entries,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Contact of the first entry whose declarant key contains `name`
    pub fn resolve_by_declarant(&self, name: &str) -> ContactResult {
        self.resolve(KeyField::Declarant, name)
    }

    /// Contact of the first entry whose address key contains `text`
    pub fn resolve_by_address(&self, text: &str) -> ContactResult {
        self.resolve(KeyField::Address, text)
    }

    /// Run one step of the fallback chain
    pub fn lookup(&self, strategy: ResolutionStrategy, fields: &ExtractedFields) -> LookupOutcome {
        let query = match strategy.query(fields) {
            Some(q) if !normalize(q).is_empty() => q,
            _ => return LookupOutcome::Skipped,
        };

        let contact = self.resolve(strategy.key_field(), query);
        if contact.is_found() {
            LookupOutcome::Hit(contact)
        } else {
            LookupOutcome::Miss
        }
    }

    /// Declarant, then street, then city; the first hit is returned as is
    pub fn resolve_fields(&self, fields: &ExtractedFields) -> ContactResult {
        for strategy in ResolutionStrategy::FALLBACK_CHAIN {
            match self.lookup(strategy, fields) {
                LookupOutcome::Hit(contact) => {
                    debug!(strategy = strategy.as_str(), "contact resolved");
                    return contact;
                }
                LookupOutcome::Miss => debug!(strategy = strategy.as_str(), "no contact"),
                LookupOutcome::Skipped => {}
            }
        }
        ContactResult::none()
    }

    /// Number of memoized lookups
    pub fn memoized(&self) -> usize {
        self.memo.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn resolve(&self, field: KeyField, query: &str) -> ContactResult {
        let key = normalize(query);
        if key.is_empty() {
            return ContactResult::none();
        }

        let mut memo = self.memo.lock().unwrap_or_else(|e| e.into_inner());
        memo.entry((field, key))
            .or_insert_with_key(|(field, key)| self.scan(*field, key))
            .clone()
    }

    fn scan(&self, field: KeyField, key: &str) -> ContactResult {
        self.entries
            .iter()
            .find(|entry| {
                let stored = match field {
                    KeyField::Declarant => entry.declarant_key(),
                    KeyField::Address => entry.address_key(),
                };
                stored.contains(key)
            })
            .map(DirectoryEntry::contact)
            .unwrap_or_default()
    }
}
