//! Dedup guard for published images

use actes_domain::normalize;

/// Names already published, with their references
///
/// Keys are normalized. A lookup hits when the normalized query is a
/// substring of a stored key, so a bare name finds the display name it was
/// published under. The earliest recorded key wins.
#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    entries: Vec<(String, String)>,
}

impl DedupIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from `(name, reference)` pairs read from the destination
    pub fn seeded<I, N, R>(existing: I) -> Self
    where
        I: IntoIterator<Item = (N, R)>,
        N: AsRef<str>,
        R: Into<String>,
    {
        let mut index = Self::new();
        for (name, reference) in existing {
            index.record(name.as_ref(), reference);
        }
        index
    }

    /// Reference already published for `name`
    pub fn contains(&self, name: &str) -> Option<&str> {
        let key = normalize(name);
        if key.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(stored, _)| stored.contains(&key))
            .map(|(_, reference)| reference.as_str())
    }

    /// Remember that `name` was published as `reference`
    ///
    /// Names that normalize to an empty key are ignored.
    pub fn record(&mut self, name: &str, reference: impl Into<String>) {
        let key = normalize(name);
        if !key.is_empty() {
            self.entries.push((key, reference.into()));
        }
    }

    /// Number of recorded names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
