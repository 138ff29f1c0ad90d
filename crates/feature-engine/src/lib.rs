//! Feature Engineering Engine
//!
//! Turns raw customer attributes into the positional, label-encoded feature
//! vector a persisted churn model expects.

mod attributes;
mod columns;
mod encoder;
mod features;
mod profile;

pub use attributes::{FeatureValue, RawAttributes, YesNo, MISSING_SENTINEL};
pub use columns::{ColumnSpecError, ModelColumnSpec};
pub use encoder::{EncoderFitError, EncoderTable, EncodingError, LabelEncoder};
pub use features::{assemble, AssemblyError, FeatureAssembler, FeatureVector};
pub use profile::CustomerProfile;
