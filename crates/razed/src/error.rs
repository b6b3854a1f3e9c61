use razed_progression::{CatalogError, LedgerError};
use razed_storage::StorageError;
use std::borrow::Cow;

#[razed_derive::razed_error]
pub enum ProgressionError {
    #[error("Catalog error{}: {source}", format_context(.context))]
    Catalog { source: CatalogError, context: Option<Cow<'static, str>> },

    #[error("Ledger error{}: {source}", format_context(.context))]
    Ledger { source: LedgerError, context: Option<Cow<'static, str>> },

    #[error("Storage error{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    /// Neither resident nor present in the store.
    #[error("Character not found{}: {message}", format_context(.context))]
    CharacterNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Failure reported by a caller-supplied store.
    #[error("Store failure{}: {message}", format_context(.context))]
    Store { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
