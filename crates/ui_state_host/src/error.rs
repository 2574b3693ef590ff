//! Domain errors for notification construction and snapshot import.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Error raised by notification construction and snapshot import paths.
pub enum InvalidNotification {
    /// Neither a title nor a message was supplied.
    #[error("notification must have a message or a title")]
    MissingContent,
    /// A single snapshot record failed structural validation.
    #[error("notification snapshot record is structurally invalid")]
    MalformedRecord,
    /// The persisted snapshot text is not a JSON array.
    #[error("notification snapshot is not a JSON array")]
    UnreadableSnapshot,
    /// A snapshot batch was rejected wholesale; no records were applied.
    #[error("rejected notification snapshot batch: {invalid} invalid of {total} records")]
    RejectedBatch {
        /// Number of records that failed validation.
        invalid: usize,
        /// Total records in the batch.
        total: usize,
    },
}
