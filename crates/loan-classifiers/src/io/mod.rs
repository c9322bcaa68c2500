pub mod artifacts;
pub mod loan_csv;

pub use artifacts::{ArtifactBundle, ArtifactCache, ArtifactHeader, ArtifactKind};
pub use loan_csv::read_loan_dataset;
