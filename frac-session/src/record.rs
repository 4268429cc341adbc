//! One persisted (expression, derivative) pair.

/// A single expression record, keyed by sequence number. Immutable once written; a session file
/// only ever grows by whole records.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionRecord {
    /// The sequence number of the record within its session.
    pub num: u64,

    /// The rendered expression text. May span multiple lines.
    pub expr: String,

    /// The rendered derivative text. May span multiple lines.
    pub diff_expr: String,
}
