//! Model Column Specification

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors building a column specification
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColumnSpecError {
    #[error("Column specification is empty")]
    Empty,
    #[error("Column at position {0} has a blank name")]
    BlankName(usize),
    #[error("Column {0:?} appears more than once")]
    Duplicate(String),
}

/// Ordered column names a trained model consumes.
///
/// The order is positional: the model sees `values[i]` as `columns[i]` and has
/// no other notion of column identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ModelColumnSpec {
    columns: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ModelColumnSpec {
    /// Build a specification, rejecting empty, blank or duplicated columns
    pub fn new<I, S>(columns: I) -> Result<Self, ColumnSpecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(ColumnSpecError::Empty);
        }

        let mut positions = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ColumnSpecError::BlankName(idx));
            }
            if positions.insert(name.clone(), idx).is_some() {
                return Err(ColumnSpecError::Duplicate(name.clone()));
            }
        }

        Ok(Self { columns, positions })
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false; an empty spec cannot be constructed
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Whether the spec contains `name`
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Column names in model order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Iterate column names in model order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for ModelColumnSpec {
    type Error = ColumnSpecError;

    fn try_from(columns: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(columns)
    }
}

impl From<ModelColumnSpec> for Vec<String> {
    fn from(spec: ModelColumnSpec) -> Self {
        spec.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_follow_order() {
        let spec = ModelColumnSpec::new(["Gender", "Age", "Contract"]).unwrap();
        assert_eq!(spec.len(), 3);
        assert_eq!(spec.position("Gender"), Some(0));
        assert_eq!(spec.position("Contract"), Some(2));
        assert_eq!(spec.position("Offer"), None);
    }

    #[test]
    fn test_rejects_bad_specs() {
        assert_eq!(
            ModelColumnSpec::new(Vec::<String>::new()),
            Err(ColumnSpecError::Empty)
        );
        assert_eq!(
            ModelColumnSpec::new(["Age", " "]),
            Err(ColumnSpecError::BlankName(1))
        );
        assert_eq!(
            ModelColumnSpec::new(["Age", "Age"]),
            Err(ColumnSpecError::Duplicate("Age".to_string()))
        );
    }

    #[test]
    fn test_deserialize_json_array() {
        let spec: ModelColumnSpec = serde_json::from_str(r#"["Age", "Married"]"#).unwrap();
        assert_eq!(spec.columns(), ["Age", "Married"]);

        assert!(serde_json::from_str::<ModelColumnSpec>(r#"["Age", "Age"]"#).is_err());
    }
}
