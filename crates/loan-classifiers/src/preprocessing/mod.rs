//! Cleaning, encoding and scaling applied before the classifier.
//!
//! The encoder and scaler are fitted once by the training pipeline and
//! persisted; inference only ever calls their `encode` / `transform`.
pub mod encoding;
pub mod imputation;
pub mod scaling;

pub use encoding::CategoricalEncoder;
pub use imputation::{impute, ImputationSummary};
pub use scaling::FeatureScaler;
