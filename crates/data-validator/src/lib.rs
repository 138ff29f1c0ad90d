//! Data Validation
//!
//! Provides range checking and text/credential validation for dashboard form input.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{Validator, ValidationConfig, ValidationResult};
