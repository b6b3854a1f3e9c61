mod catalog;
mod ledger;

pub use catalog::{CatalogError, CatalogErrorExt};
pub use ledger::{LedgerError, LedgerErrorExt};
