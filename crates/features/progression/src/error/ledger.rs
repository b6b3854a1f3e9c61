use std::borrow::Cow;

/// Ledger failures. Denials are not errors; see `Outcome`.
#[razed_derive::razed_error]
pub enum LedgerError {
    #[error("Character not loaded{}: {message}", format_context(.context))]
    CharacterNotLoaded { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Character already loaded{}: {message}", format_context(.context))]
    AlreadyLoaded { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown background{}: {message}", format_context(.context))]
    UnknownBackground { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A counter would leave its range; the commit was not applied.
    #[error("Arithmetic overflow{}: {message}", format_context(.context))]
    Overflow { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A committed revision has not reached the store yet.
    #[error("Write pending{}: {message}", format_context(.context))]
    WritePending { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Persistence worker unavailable{}: {message}", format_context(.context))]
    PersistenceClosed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal ledger error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
