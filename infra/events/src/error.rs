use std::borrow::Cow;

#[razed_derive::razed_error]
pub enum EventsError {
    /// Broadcast capacity must be greater than zero.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
