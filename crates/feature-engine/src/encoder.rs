//! Fitted Label Encoders

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;

/// A categorical value the fitted encoder never saw
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Cannot encode column {column:?}: value {value:?} was not seen when the encoder was fitted")]
pub struct EncodingError {
    pub column: String,
    pub value: String,
}

/// Errors building a label encoder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncoderFitError {
    #[error("Encoder has no classes")]
    NoClasses,
    #[error("Encoder class {0:?} appears more than once")]
    DuplicateClass(String),
}

/// Fitted mapping from category string to integer code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl LabelEncoder {
    /// Fit on observed values: classes are the sorted distinct values, codes their rank
    pub fn fit<I, S>(values: I) -> Result<Self, EncoderFitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        Self::from_classes(distinct)
    }

    /// Rebuild a persisted encoder; code of a class is its index
    pub fn from_classes<I, S>(classes: I) -> Result<Self, EncoderFitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            return Err(EncoderFitError::NoClasses);
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if codes.insert(class.clone(), code as u32).is_some() {
                return Err(EncoderFitError::DuplicateClass(class.clone()));
            }
        }

        Ok(Self { classes, codes })
    }

    /// Code for `value`, if it was fitted
    pub fn encode(&self, value: &str) -> Option<u32> {
        self.codes.get(value).copied()
    }

    /// Class for `code`
    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    /// Whether `value` was fitted
    pub fn contains(&self, value: &str) -> bool {
        self.codes.contains_key(value)
    }

    /// Fitted classes in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TryFrom<Vec<String>> for LabelEncoder {
    type Error = EncoderFitError;

    fn try_from(classes: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_classes(classes)
    }
}

impl From<LabelEncoder> for Vec<String> {
    fn from(encoder: LabelEncoder) -> Self {
        encoder.classes
    }
}

/// Encoders keyed by categorical column name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncoderTable {
    encoders: BTreeMap<String, LabelEncoder>,
}

impl EncoderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, column: impl Into<String>, encoder: LabelEncoder) -> Self {
        self.insert(column, encoder);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, encoder: LabelEncoder) {
        self.encoders.insert(column.into(), encoder);
    }

    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.encoders.contains_key(column)
    }

    /// Encoded column names
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Encode `value` through the encoder for `column`
    pub fn encode(&self, column: &str, value: &str) -> Option<Result<u32, EncodingError>> {
        self.encoders.get(column).map(|encoder| {
            encoder.encode(value).ok_or_else(|| EncodingError {
                column: column.to_string(),
                value: value.to_string(),
            })
        })
    }
}
