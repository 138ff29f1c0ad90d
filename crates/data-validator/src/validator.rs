//! Validator for Form Fields and Credentials

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Customer age valid range (years)
    pub age_range: (f64, f64),
    /// Number of dependents valid range
    pub dependents_range: (f64, f64),
    /// Monetary amounts and usage figures
    pub amount_range: (f64, f64),
    /// Latitude valid range (degrees)
    pub latitude_range: (f64, f64),
    /// Longitude valid range (degrees)
    pub longitude_range: (f64, f64),
    /// Non-negative counts (referrals, tenure, population)
    pub count_range: (f64, f64),
    /// Username length bounds (characters)
    pub username_length: (usize, usize),
    /// Minimum password length (characters)
    pub min_password_length: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            age_range: (0.0, 120.0),
            dependents_range: (0.0, 10.0),
            amount_range: (0.0, 1.0e9),
            latitude_range: (-90.0, 90.0),
            longitude_range: (-180.0, 180.0),
            count_range: (0.0, 1.0e9),
            username_length: (3, 64),
            min_password_length: 8,
        }
    }
}

/// Result of validating a whole record
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }

    /// Build a result from a batch of individual field checks
    pub fn collect<I>(checks: I) -> Self
    where
        I: IntoIterator<Item = Result<(), ValidationError>>,
    {
        let mut fields_checked = 0;
        let mut errors = Vec::new();
        for check in checks {
            fields_checked += 1;
            if let Err(e) = check {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Self::valid(fields_checked)
        } else {
            debug!("{} of {} fields failed validation", errors.len(), fields_checked);
            Self::invalid(errors, fields_checked)
        }
    }

    /// Convert into a `Result`, yielding the errors when invalid
    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.valid {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Validator for customer form fields and account credentials
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite(field));
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate age
    pub fn validate_age(&self, age: f64) -> Result<(), ValidationError> {
        self.validate_range("age", age, self.config.age_range)
    }

    /// Validate number of dependents
    pub fn validate_dependents(&self, count: f64) -> Result<(), ValidationError> {
        self.validate_range("num_dependents", count, self.config.dependents_range)
    }

    /// Validate a monetary amount or usage figure
    pub fn validate_amount(&self, field: &'static str, value: f64) -> Result<(), ValidationError> {
        self.validate_range(field, value, self.config.amount_range)
    }

    /// Validate a non-negative count
    pub fn validate_count(&self, field: &'static str, value: f64) -> Result<(), ValidationError> {
        self.validate_range(field, value, self.config.count_range)
    }

    /// Validate latitude
    pub fn validate_latitude(&self, latitude: f64) -> Result<(), ValidationError> {
        self.validate_range("latitude", latitude, self.config.latitude_range)
    }

    /// Validate longitude
    pub fn validate_longitude(&self, longitude: f64) -> Result<(), ValidationError> {
        self.validate_range("longitude", longitude, self.config.longitude_range)
    }

    /// Validate that a free-text field is not blank
    pub fn validate_text(&self, field: &'static str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::MissingField(field))
        } else {
            Ok(())
        }
    }

    /// Validate a username for signup
    pub fn validate_username(&self, username: &str) -> Result<(), ValidationError> {
        self.validate_text("username", username)?;

        let (min, max) = self.config.username_length;
        let len = username.chars().count();
        if len < min || len > max {
            return Err(ValidationError::InvalidFormat(format!(
                "username must be between {} and {} characters",
                min, max
            )));
        }
        if username.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidFormat(
                "username must not contain whitespace".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate a password for signup
    pub fn validate_password(&self, password: &str) -> Result<(), ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        if password.chars().count() < self.config.min_password_length {
            return Err(ValidationError::InvalidFormat(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }
        Ok(())
    }

    /// Validate a signup request
    pub fn validate_credentials(&self, username: &str, password: &str) -> ValidationResult {
        ValidationResult::collect([
            self.validate_username(username),
            self.validate_password(password),
        ])
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_age() {
        let validator = Validator::default();
        assert!(validator.validate_age(0.0).is_ok());
        assert!(validator.validate_age(42.0).is_ok());
        assert!(validator.validate_age(120.0).is_ok());
    }

    #[test]
    fn test_invalid_age() {
        let validator = Validator::default();
        assert!(validator.validate_age(-1.0).is_err());
        assert!(validator.validate_age(121.0).is_err());
        assert_eq!(
            validator.validate_age(f64::NAN),
            Err(ValidationError::NotFinite("age"))
        );
    }

    #[test]
    fn test_coordinates() {
        let validator = Validator::default();
        assert!(validator.validate_latitude(34.05).is_ok());
        assert!(validator.validate_longitude(-118.24).is_ok());
        assert!(validator.validate_latitude(91.0).is_err());
        assert!(validator.validate_longitude(-181.0).is_err());
    }

    #[test]
    fn test_blank_text() {
        let validator = Validator::default();
        assert_eq!(
            validator.validate_text("city", "   "),
            Err(ValidationError::MissingField("city"))
        );
        assert!(validator.validate_text("city", "Los Angeles").is_ok());
    }

    #[test]
    fn test_credentials() {
        let validator = Validator::default();
        assert!(validator.validate_credentials("alice", "correct horse").valid);

        let result = validator.validate_credentials("al", "short");
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.fields_checked, 2);

        assert!(validator.validate_username("bad name").is_err());
    }

    #[test]
    fn test_into_result() {
        let result = ValidationResult::collect([Ok(()), Err(ValidationError::MissingField("x"))]);
        assert_eq!(
            result.into_result(),
            Err(vec![ValidationError::MissingField("x")])
        );
    }

    proptest! {
        #[test]
        fn amounts_accept_non_negative(value in 0.0f64..1.0e6) {
            let validator = Validator::default();
            prop_assert!(validator.validate_amount("monthly_charge", value).is_ok());
        }

        #[test]
        fn amounts_reject_negative(value in -1.0e6f64..-0.001) {
            let validator = Validator::default();
            prop_assert!(validator.validate_amount("monthly_charge", value).is_err());
        }
    }
}
