pub mod constants;
pub mod errors;

pub use constants::{ExitStatus, NamePolicy};
pub use errors::ValidationError;
