//! Names Module
//!
//! Input cleanup and leprechaun name generation.

mod generator;
mod validation;

pub use generator::{generate_leprechaun_name, FIRST_NAMES, LAST_NAMES};
pub use validation::{sanitize_input, validate_input, MAX_NAME_LENGTH};
