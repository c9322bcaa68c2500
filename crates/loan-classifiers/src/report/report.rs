use std::fmt;

use serde::{Deserialize, Serialize};

/// Which rows a report was computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationSet {
    /// The rows the model was fitted on. Metrics overstate real quality.
    TrainingSet,
    Holdout,
}

impl EvaluationSet {
    pub fn describe(self) -> &'static str {
        match self {
            EvaluationSet::TrainingSet => "training set (optimistic: no held-out data)",
            EvaluationSet::Holdout => "held-out set",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Precision / recall / F1 per class, the way a classification report lays
/// them out: class 0 is "N" (rejected), class 1 is "Y" (approved).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub evaluated_on: EvaluationSet,
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn from_predictions(truth: &[u8], predicted: &[u8], evaluated_on: EvaluationSet) -> Self {
        assert_eq!(
            truth.len(),
            predicted.len(),
            "truth and predictions must have equal lengths"
        );

        let mut confusion = [[0usize; 2]; 2];
        for (&t, &p) in truth.iter().zip(predicted.iter()) {
            confusion[t.min(1) as usize][p.min(1) as usize] += 1;
        }

        let metrics_for = |class: usize, label: &str| {
            let tp = confusion[class][class] as f64;
            let predicted_n = (confusion[0][class] + confusion[1][class]) as f64;
            let support = confusion[class][0] + confusion[class][1];
            let precision = ratio(tp, predicted_n);
            let recall = ratio(tp, support as f64);
            ClassMetrics {
                label: label.to_string(),
                precision,
                recall,
                f1: ratio(2.0 * precision * recall, precision + recall),
                support,
            }
        };

        let classes = [metrics_for(0, "N"), metrics_for(1, "Y")];
        let total = truth.len();
        let correct = confusion[0][0] + confusion[1][1];

        let macro_avg = ClassMetrics {
            label: "macro avg".to_string(),
            precision: (classes[0].precision + classes[1].precision) / 2.0,
            recall: (classes[0].recall + classes[1].recall) / 2.0,
            f1: (classes[0].f1 + classes[1].f1) / 2.0,
            support: total,
        };

        let weight = |f: fn(&ClassMetrics) -> f64| {
            ratio(
                classes.iter().map(|c| f(c) * c.support as f64).sum::<f64>(),
                total as f64,
            )
        };
        let weighted_avg = ClassMetrics {
            label: "weighted avg".to_string(),
            precision: weight(|c| c.precision),
            recall: weight(|c| c.recall),
            f1: weight(|c| c.f1),
            support: total,
        };

        Self {
            evaluated_on,
            accuracy: ratio(correct as f64, total as f64),
            classes,
            macro_avg,
            weighted_avg,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &ClassMetrics> {
        self.classes
            .iter()
            .chain(std::iter::once(&self.macro_avg))
            .chain(std::iter::once(&self.weighted_avg))
    }
}

/// Zero when the denominator is zero.
fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Evaluated on: {}", self.evaluated_on.describe())?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for row in &self.classes {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                row.label, row.precision, row.recall, row.f1, row.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for row in [&self.macro_avg, &self.weighted_avg] {
            writeln!(
                f,
                "{:>14} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                row.label, row.precision, row.recall, row.f1, row.support
            )?;
        }
        Ok(())
    }
}
