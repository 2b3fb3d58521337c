//! Domain models with validation at construction
//!
//! User input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod message;

pub use validation::ValidationError;
pub use message::MessageContent;
