use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// Errors raised by the training pipeline, artifact store and decision engine.
#[derive(Debug)]
pub enum LoanError {
    /// The training dataset does not exist at the configured path.
    DatasetNotFound(PathBuf),
    /// None of the accepted target column names are present.
    MissingTargetColumn { tried: Vec<String> },
    /// A required feature column is absent from the dataset header.
    MissingColumn(String),
    /// A dataset cell could not be interpreted.
    InvalidValue {
        field: String,
        row: usize,
        value: String,
    },
    /// The dataset has a header but no rows.
    EmptyDataset,
    /// An artifact file is absent at load time.
    ArtifactMissing(PathBuf),
    /// An artifact file exists but cannot be decoded or has the wrong header.
    ArtifactCorrupt { path: PathBuf, reason: String },
    /// Feature layout disagrees with the one the artifacts were fitted on.
    SchemaMismatch { expected: String, found: String },
    /// A categorical value was never seen when the encoder was fitted.
    UnrecognizedCategory { field: String, value: String },
    /// An applicant field failed validation.
    InvalidField { field: String, reason: String },
    /// The classifier could not be fitted.
    Training(String),
    Io(std::io::Error),
    Csv(csv::Error),
    Serialization(String),
}

impl LoanError {
    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        LoanError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's input rather than the setup.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LoanError::UnrecognizedCategory { .. } | LoanError::InvalidField { .. }
        )
    }
}

impl fmt::Display for LoanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoanError::DatasetNotFound(path) => {
                write!(f, "Dataset not found: {}", path.display())
            }
            LoanError::MissingTargetColumn { tried } => write!(
                f,
                "Configuration error: target column not found (tried: {})",
                tried.join(", ")
            ),
            LoanError::MissingColumn(name) => {
                write!(f, "Configuration error: missing column '{}'", name)
            }
            LoanError::InvalidValue { field, row, value } => write!(
                f,
                "Invalid value '{}' for '{}' at row {}",
                value, field, row
            ),
            LoanError::EmptyDataset => write!(f, "Dataset contains no rows"),
            LoanError::ArtifactMissing(path) => write!(
                f,
                "Artifact not found: {} (run training first)",
                path.display()
            ),
            LoanError::ArtifactCorrupt { path, reason } => {
                write!(f, "Artifact {} is unreadable: {}", path.display(), reason)
            }
            LoanError::SchemaMismatch { expected, found } => write!(
                f,
                "Feature schema mismatch: expected [{}], found [{}]",
                expected, found
            ),
            LoanError::UnrecognizedCategory { field, value } => {
                write!(f, "Unrecognized category '{}' for '{}'", value, field)
            }
            LoanError::InvalidField { field, reason } => {
                write!(f, "Invalid '{}': {}", field, reason)
            }
            LoanError::Training(msg) => write!(f, "Model fitting failed: {}", msg),
            LoanError::Io(err) => write!(f, "I/O error: {}", err),
            LoanError::Csv(err) => write!(f, "CSV error: {}", err),
            LoanError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl Error for LoanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoanError::Io(err) => Some(err),
            LoanError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoanError {
    fn from(err: std::io::Error) -> Self {
        LoanError::Io(err)
    }
}

impl From<csv::Error> for LoanError {
    fn from(err: csv::Error) -> Self {
        LoanError::Csv(err)
    }
}

impl From<bincode::Error> for LoanError {
    fn from(err: bincode::Error) -> Self {
        LoanError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;
