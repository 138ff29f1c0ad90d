//! Customer Profile Form Record

use crate::attributes::{RawAttributes, YesNo};
use data_validator::{ValidationError, ValidationResult, Validator};
use serde::{Deserialize, Serialize};

/// Every field of the churn prediction form with its semantic type.
///
/// Field names are the form's; [`CustomerProfile::to_raw_attributes`] maps them
/// onto the dataset column names the model was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    // Demographics
    pub gender: String,
    pub age: i64,
    pub senior_citizen: YesNo,
    pub married: YesNo,
    pub dependents: YesNo,
    pub num_dependents: i64,
    pub under_30: YesNo,
    pub partner: YesNo,

    // Charges
    pub monthly_charge: f64,
    pub total_charges: f64,
    pub total_refunds: f64,
    pub total_long_distance_charges: f64,
    pub total_extra_data_charges: f64,
    pub avg_monthly_gb_download: f64,
    pub avg_monthly_long_distance_charges: f64,
    pub payment_method: String,
    pub paperless_billing: YesNo,

    // Location
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub population: i64,

    // Referrals and contract
    pub referred: YesNo,
    pub num_referrals: i64,
    pub offer: String,
    pub contract: String,
    pub tenure_months: i64,
    pub quarter: String,

    // Services
    pub phone_service: YesNo,
    pub multiple_lines: String,
    pub internet_service: String,
    pub internet_type: String,
    pub streaming_tv: YesNo,
    pub streaming_movies: YesNo,
    pub streaming_music: YesNo,
    pub online_security: YesNo,
    pub online_backup: YesNo,
    pub device_protection: YesNo,
    pub premium_support: YesNo,
    pub unlimited_data: YesNo,
}

impl CustomerProfile {
    /// Check every range and free-text field, collecting all failures
    pub fn validate(&self, validator: &Validator) -> ValidationResult {
        ValidationResult::collect([
            validator.validate_text("gender", &self.gender),
            validator.validate_age(self.age as f64),
            validator.validate_dependents(self.num_dependents as f64),
            validator.validate_amount("monthly_charge", self.monthly_charge),
            validator.validate_amount("total_charges", self.total_charges),
            validator.validate_amount("total_refunds", self.total_refunds),
            validator.validate_amount(
                "total_long_distance_charges",
                self.total_long_distance_charges,
            ),
            validator.validate_amount("total_extra_data_charges", self.total_extra_data_charges),
            validator.validate_amount("avg_monthly_gb_download", self.avg_monthly_gb_download),
            validator.validate_amount(
                "avg_monthly_long_distance_charges",
                self.avg_monthly_long_distance_charges,
            ),
            validator.validate_text("payment_method", &self.payment_method),
            validator.validate_text("city", &self.city),
            validator.validate_text("state", &self.state),
            validator.validate_text("country", &self.country),
            validator.validate_text("zip_code", &self.zip_code),
            validator.validate_latitude(self.latitude),
            validator.validate_longitude(self.longitude),
            validator.validate_count("population", self.population as f64),
            validator.validate_count("num_referrals", self.num_referrals as f64),
            validator.validate_text("offer", &self.offer),
            validator.validate_text("contract", &self.contract),
            validator.validate_count("tenure_months", self.tenure_months as f64),
            validator.validate_text("quarter", &self.quarter),
            validator.validate_text("multiple_lines", &self.multiple_lines),
            validator.validate_text("internet_service", &self.internet_service),
            validator.validate_text("internet_type", &self.internet_type),
        ])
    }

    /// Consume the profile, returning it only if every field validates
    pub fn validated(self, validator: &Validator) -> Result<Self, Vec<ValidationError>> {
        self.validate(validator).into_result().map(|()| self)
    }

    /// Map form fields onto dataset column names
    pub fn to_raw_attributes(&self) -> RawAttributes {
        RawAttributes::new()
            .with("Gender", self.gender.as_str())
            .with("Age", self.age)
            .with("Senior Citizen", self.senior_citizen)
            .with("Married", self.married)
            .with("Dependents", self.dependents)
            .with("Number of Dependents", self.num_dependents)
            .with("Under 30", self.under_30)
            .with("Partner", self.partner)
            .with("Monthly Charge", self.monthly_charge)
            .with("Total Charges", self.total_charges)
            .with("Total Refunds", self.total_refunds)
            .with("Total Long Distance Charges", self.total_long_distance_charges)
            .with("Total Extra Data Charges", self.total_extra_data_charges)
            .with("Avg Monthly GB Download", self.avg_monthly_gb_download)
            .with(
                "Avg Monthly Long Distance Charges",
                self.avg_monthly_long_distance_charges,
            )
            .with("Payment Method", self.payment_method.as_str())
            .with("Paperless Billing", self.paperless_billing)
            .with("City", self.city.as_str())
            .with("State", self.state.as_str())
            .with("Country", self.country.as_str())
            .with("Zip Code", self.zip_code.as_str())
            .with("Latitude", self.latitude)
            .with("Longitude", self.longitude)
            .with("Population", self.population)
            .with("Referred a Friend", self.referred)
            .with("Number of Referrals", self.num_referrals)
            .with("Offer", self.offer.as_str())
            .with("Contract", self.contract.as_str())
            .with("Tenure in Months", self.tenure_months)
            .with("Quarter", self.quarter.as_str())
            .with("Phone Service", self.phone_service)
            .with("Multiple Lines", self.multiple_lines.as_str())
            .with("Internet Service", self.internet_service.as_str())
            .with("Internet Type", self.internet_type.as_str())
            .with("Streaming TV", self.streaming_tv)
            .with("Streaming Movies", self.streaming_movies)
            .with("Streaming Music", self.streaming_music)
            .with("Online Security", self.online_security)
            .with("Online Backup", self.online_backup)
            .with("Device Protection Plan", self.device_protection)
            .with("Premium Tech Support", self.premium_support)
            .with("Unlimited Data", self.unlimited_data)
    }
}

impl Default for CustomerProfile {
    fn default() -> Self {
        Self {
            gender: "Male".to_string(),
            age: 0,
            senior_citizen: YesNo::No,
            married: YesNo::No,
            dependents: YesNo::No,
            num_dependents: 0,
            under_30: YesNo::No,
            partner: YesNo::No,
            monthly_charge: 0.0,
            total_charges: 0.0,
            total_refunds: 0.0,
            total_long_distance_charges: 0.0,
            total_extra_data_charges: 0.0,
            avg_monthly_gb_download: 0.0,
            avg_monthly_long_distance_charges: 0.0,
            payment_method: "Bank Withdrawal".to_string(),
            paperless_billing: YesNo::No,
            city: "Los Angeles".to_string(),
            state: "California".to_string(),
            country: "United States".to_string(),
            zip_code: "90001".to_string(),
            latitude: 34.05,
            longitude: -118.24,
            population: 10_000,
            referred: YesNo::No,
            num_referrals: 0,
            offer: "None".to_string(),
            contract: "Month-to-Month".to_string(),
            tenure_months: 0,
            quarter: "Q3".to_string(),
            phone_service: YesNo::Yes,
            multiple_lines: "No".to_string(),
            internet_service: "Yes".to_string(),
            internet_type: "Cable".to_string(),
            streaming_tv: YesNo::No,
            streaming_movies: YesNo::No,
            streaming_music: YesNo::No,
            online_security: YesNo::No,
            online_backup: YesNo::No,
            device_protection: YesNo::No,
            premium_support: YesNo::No,
            unlimited_data: YesNo::No,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::FeatureValue;
    use crate::columns::ModelColumnSpec;
    use crate::encoder::EncoderTable;
    use crate::features::assemble;

    #[test]
    fn test_default_profile_is_valid() {
        let profile = CustomerProfile::default();
        let result = profile.validate(&Validator::default());
        assert!(result.valid, "{:?}", result.errors);
        assert_eq!(result.fields_checked, 26);
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let profile = CustomerProfile {
            age: 150,
            monthly_charge: -5.0,
            city: String::new(),
            ..Default::default()
        };

        let errors = profile.validated(&Validator::default()).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::MissingField("city")));
    }

    #[test]
    fn test_raw_attributes_use_dataset_names() {
        let profile = CustomerProfile {
            dependents: YesNo::Yes,
            tenure_months: 12,
            ..Default::default()
        };
        let raw = profile.to_raw_attributes();

        assert_eq!(raw.len(), 42);
        assert_eq!(raw.get("Dependents"), Some(&FeatureValue::Flag(YesNo::Yes)));
        assert_eq!(raw.get("Tenure in Months"), Some(&FeatureValue::Numeric(12.0)));
        assert_eq!(raw.get("Offer"), Some(&FeatureValue::from("None")));
        assert!(raw.get("tenure_months").is_none());
    }

    #[test]
    fn test_form_and_raw_json_assemble_alike() {
        let spec = ModelColumnSpec::new(["Multiple Lines", "Internet Service", "Dependents"]).unwrap();
        let encoders = EncoderTable::new();

        let profile = CustomerProfile {
            multiple_lines: "Yes".to_string(),
            internet_service: "Yes".to_string(),
            ..Default::default()
        };
        let from_form = assemble(&profile.to_raw_attributes(), &spec, &encoders).unwrap();

        let raw: RawAttributes = serde_json::from_str(
            r#"{"Multiple Lines": "Yes", "Internet Service": "Yes", "Dependents": "No"}"#,
        )
        .unwrap();
        let from_raw = assemble(&raw, &spec, &encoders).unwrap();

        assert_eq!(from_form.values, vec![Some(1.0), Some(1.0), Some(0.0)]);
        assert_eq!(from_form, from_raw);
    }

    #[test]
    fn test_deserialize_form_json() {
        let mut json = serde_json::to_value(CustomerProfile::default()).unwrap();
        json["dependents"] = serde_json::json!("Yes");
        json["contract"] = serde_json::json!("Two Year");

        let profile: CustomerProfile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.dependents, YesNo::Yes);
        assert_eq!(profile.contract, "Two Year");
    }
}
