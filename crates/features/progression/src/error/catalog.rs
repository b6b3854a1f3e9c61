use std::borrow::Cow;

/// Catalog load failures. All of them are fatal at startup.
#[razed_derive::razed_error]
pub enum CatalogError {
    #[error("Catalog I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Malformed TOML catalog{}: {source}", format_context(.context))]
    Toml { source: toml::de::Error, context: Option<Cow<'static, str>> },

    #[error("Malformed JSON catalog{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Unsupported catalog format{}: {message}", format_context(.context))]
    UnsupportedFormat { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Duplicate tome id{}: {message}", format_context(.context))]
    DuplicateTome { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Duplicate background id{}: {message}", format_context(.context))]
    DuplicateBackground { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Reputation would be credited to a faction other than the gating one.
    #[error("Reputation reward targets the wrong faction{}: {message}", format_context(.context))]
    FactionRewardMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A reputation reward with no faction to credit, rejected in strict mode.
    #[error("Reputation reward without faction{}: {message}", format_context(.context))]
    UnassignedReward { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid catalog entry{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
