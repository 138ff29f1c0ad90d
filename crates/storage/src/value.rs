//! Typed Cell Values and Result Sets

use crate::schema::{CustomerTable, SqlType};
use serde::{Deserialize, Serialize};

/// One SQLite cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl CellValue {
    /// Parse a CSV cell by its declared column type.
    ///
    /// Empty cells are NULL; numerics that do not parse are kept as text.
    pub fn parse(raw: &str, sql_type: SqlType) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return CellValue::Null;
        }

        let as_real = || {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(CellValue::Real)
        };

        match sql_type {
            SqlType::Text => CellValue::Text(raw.to_string()),
            SqlType::Integer => raw
                .parse::<i64>()
                .ok()
                .map(CellValue::Integer)
                .or_else(as_real)
                .unwrap_or_else(|| CellValue::Text(raw.to_string())),
            SqlType::Real => as_real().unwrap_or_else(|| CellValue::Text(raw.to_string())),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// All rows of one table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableData {
    pub table: CustomerTable,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// A named field of a joined customer record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordField {
    pub name: String,
    pub value: CellValue,
}

/// One customer joined across all six tables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub fields: Vec<RecordField>,
}

impl CustomerRecord {
    /// Field value by joined column name (e.g. `"churn_Churn Score"`)
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}
