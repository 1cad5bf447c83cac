//! Per-run caches

use crate::dedup::DedupIndex;
use crate::directory::ReferenceDirectory;
use crate::resolver::ContactResolver;
use std::sync::Arc;

/// State that lives for one batch: the loaded directory, memoized contact
/// lookups and the dedup index
pub struct RunContext {
    directory: Arc<ReferenceDirectory>,
    resolver: ContactResolver,
    dedup: DedupIndex,
}

impl RunContext {
    /// Assemble a context from a loaded directory and a seeded dedup index
    pub fn new(directory: Arc<ReferenceDirectory>, resolver: ContactResolver, dedup: DedupIndex) -> Self {
        Self {
            directory,
            resolver,
            dedup,
        }
    }

    /// Reference directory of this run
    pub fn directory(&self) -> &ReferenceDirectory {
        &self.directory
    }

    /// Contact resolver of this run
    pub fn resolver(&self) -> &ContactResolver {
        &self.resolver
    }

    /// Dedup index of this run
    pub fn dedup(&self) -> &DedupIndex {
        &self.dedup
    }

    pub(crate) fn dedup_mut(&mut self) -> &mut DedupIndex {
        &mut self.dedup
    }
}
