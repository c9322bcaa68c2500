pub mod classifier_trait;
pub mod svm;

pub use classifier_trait::{ClassProbabilities, ClassifierModel};
pub use svm::SvmClassifier;
