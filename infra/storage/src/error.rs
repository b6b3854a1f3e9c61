use std::borrow::Cow;

/// A specialized [`StorageError`] enum of this crate.
#[razed_derive::razed_error]
pub enum StorageError {
    #[error("Invalid character id{}: {message}", format_context(.context))]
    InvalidId { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Path traversal security violation{}: {message}", format_context(.context))]
    PathTraversalAttempt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Hardware I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Snapshot encoding failure{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// A snapshot file holds a different character than its name says.
    #[error("Snapshot mismatch{}: {message}", format_context(.context))]
    Mismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal storage error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
