use razed_derive::razed_error;
use std::borrow::Cow;

#[razed_error]
pub enum CatalogError {
    #[error("Catalog I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Duplicate tome{}: {id}", format_context(.context))]
    Duplicate { id: String, context: Option<Cow<'static, str>> },

    #[error("Internal catalog error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let _: CatalogError = "boom".into();
}
