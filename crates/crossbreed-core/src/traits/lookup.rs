use crate::errors::CrossOutcome;
use crate::key::ParentRef;
use crate::models::ParentGenetics;

/// Resolves a parent ref to its genetic record (e.g. a document store).
pub trait IGeneticsLookup: Send + Sync {
    /// `parent` arrives in canonical form (`"blue_dream"`, not `"Blue Dream"`),
    /// so stores keyed by display name must canonicalize their own keys.
    ///
    /// Returns `CrossError::ParentNotFound` when the parent is unknown.
    fn lookup(&self, parent: &ParentRef) -> CrossOutcome<ParentGenetics>;
}
