//! Raw Attribute Records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Literal a categorical field carries when the customer has no value for it
pub const MISSING_SENTINEL: &str = "None";

/// Boolean-like yes/no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    /// Fixed numeric code (`Yes` = 1, `No` = 0)
    pub const fn code(self) -> f64 {
        match self {
            YesNo::Yes => 1.0,
            YesNo::No => 0.0,
        }
    }

    /// Parse the exact `"Yes"` / `"No"` literals
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "Yes" => Some(YesNo::Yes),
            "No" => Some(YesNo::No),
            _ => None,
        }
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

/// A single raw attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Yes/no answer
    Flag(YesNo),
    /// Numeric amount or count
    Numeric(f64),
    /// Categorical label
    Category(String),
}

impl FeatureValue {
    /// Classify loosely-typed text: `"Yes"`/`"No"` become flags, anything else a category
    pub fn from_text(text: &str) -> Self {
        match YesNo::parse(text) {
            Some(flag) => FeatureValue::Flag(flag),
            None => FeatureValue::Category(text.to_string()),
        }
    }

    /// Whether this is the categorical missing sentinel
    pub fn is_missing_sentinel(&self) -> bool {
        matches!(self, FeatureValue::Category(text) if text == MISSING_SENTINEL)
    }
}

impl From<YesNo> for FeatureValue {
    fn from(value: YesNo) -> Self {
        FeatureValue::Flag(value)
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Numeric(value)
    }
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        FeatureValue::Numeric(value as f64)
    }
}

/// Text goes through [`FeatureValue::from_text`], so `"Yes"`/`"No"` become flags
/// exactly as they do when deserialized.
impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::from_text(value)
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        match YesNo::parse(&value) {
            Some(flag) => FeatureValue::Flag(flag),
            None => FeatureValue::Category(value),
        }
    }
}

/// Raw attributes of one prediction request, keyed by model column name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAttributes {
    values: BTreeMap<String, FeatureValue>,
}

impl RawAttributes {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace an attribute
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FeatureValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up an attribute by column name
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.values.get(name)
    }

    /// Whether the record provides `name`
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate attributes in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, FeatureValue)> for RawAttributes {
    fn from_iter<I: IntoIterator<Item = (K, FeatureValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        assert_eq!(FeatureValue::from_text("Yes"), FeatureValue::Flag(YesNo::Yes));
        assert_eq!(FeatureValue::from_text("No"), FeatureValue::Flag(YesNo::No));
        assert_eq!(
            FeatureValue::from_text("yes"),
            FeatureValue::Category("yes".to_string())
        );
    }

    #[test]
    fn test_from_str_matches_deserialized() {
        assert_eq!(FeatureValue::from("Yes"), FeatureValue::Flag(YesNo::Yes));
        assert_eq!(FeatureValue::from("No".to_string()), FeatureValue::Flag(YesNo::No));
        assert_eq!(
            FeatureValue::from("Fiber Optic"),
            FeatureValue::Category("Fiber Optic".to_string())
        );

        let parsed: FeatureValue = serde_json::from_str(r#""Yes""#).unwrap();
        assert_eq!(FeatureValue::from("Yes"), parsed);
    }

    #[test]
    fn test_missing_sentinel() {
        assert!(FeatureValue::from("None").is_missing_sentinel());
        assert!(!FeatureValue::from("Offer A").is_missing_sentinel());
        assert!(!FeatureValue::Numeric(0.0).is_missing_sentinel());
    }

    #[test]
    fn test_deserialize_untagged() {
        let raw: RawAttributes = serde_json::from_str(
            r#"{"Dependents": "Yes", "Tenure in Months": 12, "Contract": "One Year"}"#,
        )
        .unwrap();

        assert_eq!(raw.len(), 3);
        assert_eq!(raw.get("Dependents"), Some(&FeatureValue::Flag(YesNo::Yes)));
        assert_eq!(raw.get("Tenure in Months"), Some(&FeatureValue::Numeric(12.0)));
        assert_eq!(raw.get("Contract"), Some(&FeatureValue::from("One Year")));
    }
}
