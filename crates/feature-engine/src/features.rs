//! Feature Vector Assembly

use crate::attributes::{FeatureValue, RawAttributes, MISSING_SENTINEL};
use crate::columns::ModelColumnSpec;
use crate::encoder::{EncoderTable, EncodingError, LabelEncoder};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors assembling a feature vector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    /// Categorical value unseen by its fitted encoder
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Text value in a column that has no encoder and is not numeric
    #[error("Column {column:?} has no encoder and {value:?} is not numeric")]
    UnencodedCategory { column: String, value: String },
}

/// Positional feature vector aligned to a [`ModelColumnSpec`].
///
/// `None` is the explicit missing marker produced by the `"None"` categorical
/// sentinel; it is distinct from the zero default of absent columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub values: Vec<Option<f64>>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cell at `position`
    pub fn get(&self, position: usize) -> Option<Option<f64>> {
        self.values.get(position).copied()
    }

    /// Number of missing-marker cells
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.values.iter().copied()
    }
}

/// Value after the yes/no table has been applied
enum Semantic<'a> {
    Number(f64),
    Text(&'a str),
}

impl<'a> Semantic<'a> {
    fn of(value: &'a FeatureValue) -> Self {
        match value {
            FeatureValue::Flag(flag) => Semantic::Number(flag.code()),
            FeatureValue::Numeric(n) => Semantic::Number(*n),
            FeatureValue::Category(text) => Semantic::Text(text),
        }
    }

    /// String form fed to an encoder
    fn to_encoder_key(&self) -> String {
        match self {
            Semantic::Number(n) => n.to_string(),
            Semantic::Text(text) => (*text).to_string(),
        }
    }
}

/// Assemble the model input for `raw`.
///
/// Columns of `spec` that `raw` does not provide take the zero default; columns
/// of `raw` outside `spec` are dropped; output order is `spec` order. Provided
/// columns with an encoder are label-encoded, with `"None"` kept as missing.
pub fn assemble(
    raw: &RawAttributes,
    spec: &ModelColumnSpec,
    encoders: &EncoderTable,
) -> Result<FeatureVector, AssemblyError> {
    let mut values = Vec::with_capacity(spec.len());

    for column in spec.iter() {
        let cell = match raw.get(column) {
            None => Some(0.0),
            Some(value) => resolve(column, value, encoders.get(column))?,
        };
        values.push(cell);
    }

    Ok(FeatureVector { values })
}

fn resolve(
    column: &str,
    value: &FeatureValue,
    encoder: Option<&LabelEncoder>,
) -> Result<Option<f64>, AssemblyError> {
    let semantic = Semantic::of(value);

    match (encoder, semantic) {
        (_, Semantic::Text(MISSING_SENTINEL)) => Ok(None),
        (Some(encoder), semantic) => {
            let key = semantic.to_encoder_key();
            match encoder.encode(&key) {
                Some(code) => Ok(Some(f64::from(code))),
                None => Err(EncodingError {
                    column: column.to_string(),
                    value: key,
                }
                .into()),
            }
        }
        (None, Semantic::Number(n)) => Ok(Some(n)),
        (None, Semantic::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| AssemblyError::UnencodedCategory {
                column: column.to_string(),
                value: text.to_string(),
            }),
    }
}

/// Column spec and encoders of one trained model, bundled for repeated assembly
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    spec: ModelColumnSpec,
    encoders: EncoderTable,
}

impl FeatureAssembler {
    /// Create a new assembler
    pub fn new(spec: ModelColumnSpec, encoders: EncoderTable) -> Self {
        for column in encoders.columns() {
            if !spec.contains(column) {
                warn!("Encoder for {:?} has no matching model column and will never be used", column);
            }
        }
        debug!(
            "Creating feature assembler: {} columns, {} encoders",
            spec.len(),
            encoders.len()
        );
        Self { spec, encoders }
    }

    /// Assemble the feature vector for `raw`
    pub fn assemble(&self, raw: &RawAttributes) -> Result<FeatureVector, AssemblyError> {
        let vector = assemble(raw, &self.spec, &self.encoders)?;

        let provided = self.spec.iter().filter(|c| raw.contains(c)).count();
        debug!(
            "Assembled {} features: {} provided, {} zero-filled, {} dropped, {} missing",
            vector.len(),
            provided,
            self.spec.len() - provided,
            raw.len() - provided,
            vector.missing_count()
        );

        Ok(vector)
    }

    pub fn spec(&self) -> &ModelColumnSpec {
        &self.spec
    }

    pub fn encoders(&self) -> &EncoderTable {
        &self.encoders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::YesNo;
    use proptest::prelude::*;

    fn contract_encoder() -> EncoderTable {
        EncoderTable::new().with(
            "Contract",
            LabelEncoder::fit(["Month-to-Month", "One Year", "Two Year"]).unwrap(),
        )
    }

    #[test]
    fn test_end_to_end_example() {
        let raw = RawAttributes::new()
            .with("Gender", "Male")
            .with("Dependents", YesNo::Yes)
            .with("Tenure in Months", 12i64)
            .with("Contract", "Month-to-Month")
            .with("Monthly Charge", 65.5);
        let spec = ModelColumnSpec::new([
            "Dependents",
            "Tenure in Months",
            "Contract",
            "Number of Referrals",
            "Age",
        ])
        .unwrap();

        let vector = assemble(&raw, &spec, &contract_encoder()).unwrap();

        assert_eq!(vector.len(), 5);
        assert_eq!(vector.get(0), Some(Some(1.0)));
        assert_eq!(vector.get(1), Some(Some(12.0)));
        assert_eq!(vector.get(2), Some(Some(0.0)));
        assert_eq!(vector.get(3), Some(Some(0.0)));
        assert_eq!(vector.get(4), Some(Some(0.0)));
    }

    #[test]
    fn test_contract_code_follows_encoder() {
        let raw = RawAttributes::new().with("Contract", "Two Year");
        let spec = ModelColumnSpec::new(["Contract"]).unwrap();

        let vector = assemble(&raw, &spec, &contract_encoder()).unwrap();
        assert_eq!(vector.values, vec![Some(2.0)]);
    }

    #[test]
    fn test_unseen_category_fails() {
        let encoders =
            EncoderTable::new().with("Offer", LabelEncoder::fit(["None", "Offer A"]).unwrap());
        let raw = RawAttributes::new().with("Offer", "Offer Z");
        let spec = ModelColumnSpec::new(["Offer", "Age"]).unwrap();

        let err = assemble(&raw, &spec, &encoders).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::Encoding(EncodingError {
                column: "Offer".to_string(),
                value: "Offer Z".to_string(),
            })
        );
    }

    #[test]
    fn test_none_sentinel_is_missing_not_encoded() {
        // Encoder deliberately lacks "None": consulting it would fail.
        let encoders =
            EncoderTable::new().with("Offer", LabelEncoder::fit(["Offer A", "Offer B"]).unwrap());
        let raw = RawAttributes::new().with("Offer", "None");
        let spec = ModelColumnSpec::new(["Age", "Offer"]).unwrap();

        let vector = assemble(&raw, &spec, &encoders).unwrap();
        assert_eq!(vector.values, vec![Some(0.0), None]);
        assert_eq!(vector.missing_count(), 1);
    }

    #[test]
    fn test_absent_encoded_column_takes_zero_default() {
        let raw = RawAttributes::new().with("Age", 40.0);
        let spec = ModelColumnSpec::new(["Age", "Contract"]).unwrap();

        let vector = assemble(&raw, &spec, &contract_encoder()).unwrap();
        assert_eq!(vector.values, vec![Some(40.0), Some(0.0)]);
    }

    #[test]
    fn test_flags_encoded_through_string_form() {
        let encoders = EncoderTable::new().with("Married", LabelEncoder::fit(["0", "1"]).unwrap());
        let raw = RawAttributes::new().with("Married", YesNo::Yes);
        let spec = ModelColumnSpec::new(["Married"]).unwrap();

        let vector = assemble(&raw, &spec, &encoders).unwrap();
        assert_eq!(vector.values, vec![Some(1.0)]);
    }

    #[test]
    fn test_numeric_value_encoded_as_integral_text() {
        let encoders =
            EncoderTable::new().with("Zip Code", LabelEncoder::fit(["90001", "90002"]).unwrap());
        let raw = RawAttributes::new().with("Zip Code", 90002.0);
        let spec = ModelColumnSpec::new(["Zip Code"]).unwrap();

        let vector = assemble(&raw, &spec, &encoders).unwrap();
        assert_eq!(vector.values, vec![Some(1.0)]);
    }

    #[test]
    fn test_unencoded_text() {
        let spec = ModelColumnSpec::new(["Zip Code", "City"]).unwrap();
        let raw = RawAttributes::new()
            .with("Zip Code", "90001")
            .with("City", "Los Angeles");

        let err = assemble(&raw, &spec, &EncoderTable::new()).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::UnencodedCategory {
                column: "City".to_string(),
                value: "Los Angeles".to_string(),
            }
        );

        let raw = RawAttributes::new().with("Zip Code", "90001");
        let vector = assemble(&raw, &spec, &EncoderTable::new()).unwrap();
        assert_eq!(vector.values, vec![Some(90001.0), Some(0.0)]);
    }

    #[test]
    fn test_assembler_wrapper() {
        let spec = ModelColumnSpec::new(["Contract", "Age"]).unwrap();
        let assembler = FeatureAssembler::new(spec, contract_encoder());

        let raw = RawAttributes::new()
            .with("Contract", "One Year")
            .with("Age", 30.0)
            .with("Ignored", 5.0);
        let vector = assembler.assemble(&raw).unwrap();
        assert_eq!(vector.values, vec![Some(1.0), Some(30.0)]);
    }

    fn column_names() -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set("[A-Z][a-z]{1,8}", 1..12)
            .prop_map(|set| set.into_iter().collect())
    }

    proptest! {
        #[test]
        fn output_aligned_to_spec(
            columns in column_names(),
            mask in prop::collection::vec(any::<bool>(), 12),
            values in prop::collection::vec(-1.0e6f64..1.0e6, 12),
        ) {
            let spec = ModelColumnSpec::new(columns.clone()).unwrap();
            let raw: RawAttributes = columns
                .iter()
                .enumerate()
                .filter(|(i, _)| mask[*i])
                .map(|(i, c)| (c.clone(), FeatureValue::Numeric(values[i])))
                .collect();

            let vector = assemble(&raw, &spec, &EncoderTable::new()).unwrap();
            prop_assert_eq!(vector.len(), spec.len());

            for (i, column) in spec.iter().enumerate() {
                let expected = if mask[i] { values[i] } else { 0.0 };
                prop_assert_eq!(vector.get(i), Some(Some(expected)), "column {}", column);
            }
        }

        #[test]
        fn extra_columns_are_dropped(extra in "[a-z]{3,10}") {
            let spec = ModelColumnSpec::new(["Age"]).unwrap();
            let raw = RawAttributes::new().with("Age", 33.0).with(extra, 7.0);

            let vector = assemble(&raw, &spec, &EncoderTable::new()).unwrap();
            prop_assert_eq!(vector.values, vec![Some(33.0)]);
        }
    }
}
