use alloc::boxed::Box;

use crate::types::RowId;

/// Error produced by a host `get_children` fetch.
pub type FetchError = Box<dyn core::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A required host capability was not supplied at construction. Fatal.
    #[error("missing required capability `{capability}`")]
    MissingCapability { capability: &'static str },

    /// `expand` was called on a row whose children are already visible. The row list is
    /// left unmodified; checking state first is the caller's responsibility.
    #[error("row {index} is already expanded")]
    AlreadyExpanded { index: usize },

    #[error("row index {index} out of bounds (len {len})")]
    OutOfBounds { index: usize, len: usize },

    /// The target of an in-flight expand was collapsed away before the fetch resolved.
    /// See `VirtualTree::apply_expand` for the staleness policy.
    #[error("expand target row {row_id} is no longer visible")]
    StaleExpand { row_id: RowId },

    /// A `get_children` fetch failed. Not retried; surfaces to the host's error boundary.
    #[error("child fetch failed: {0}")]
    Fetch(FetchError),
}
