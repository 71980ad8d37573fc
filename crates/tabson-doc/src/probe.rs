use bson::Document;

use crate::error::BuildError;

/// One-shot existence probe against the target collection.
///
/// The write layer owns the real connection; the modifier builder only
/// needs a single bounded read (find with limit 1) per row to decide
/// insert-vs-update for per-field apply policies.
pub trait MatchProbe {
    /// Does any record match `query`?
    fn exists(&self, query: &Document) -> Result<bool, BuildError>;
}

impl<F> MatchProbe for F
where
    F: Fn(&Document) -> Result<bool, BuildError>,
{
    fn exists(&self, query: &Document) -> Result<bool, BuildError> {
        self(query)
    }
}
