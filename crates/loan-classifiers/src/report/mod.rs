pub mod html;
pub mod report;

pub use report::{ClassMetrics, ClassificationReport, EvaluationSet};
