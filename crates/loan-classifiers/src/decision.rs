//! Per-applicant decisions: knockout rules first, then the classifier.
//!
//! `DecisionEngine` holds only its `RuleConfig`. Every call is a pure
//! function of the record, the loaded artifacts and that configuration.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::applicant::{ApplicantInput, ApplicantRecord, CreditHistory};
use crate::config::RuleConfig;
use crate::error::Result;
use crate::io::ArtifactBundle;
use crate::models::ClassifierModel;
use crate::preprocessing::{CategoricalEncoder, FeatureScaler};
use crate::schema::EncodedFeatureVector;

pub const REASON_PRIOR_DEFAULT: &str = "credit history failed: prior default on record";
pub const REASON_MODEL_APPROVED: &str =
    "healthy income-to-loan ratio and good credit standing per historical patterns";
pub const REASON_MODEL_REJECTED: &str = "elevated risk per historical patterns";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionSource {
    Rule,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub outcome: Outcome,
    /// Probability of `outcome`, 1.0 for rule rejections.
    pub confidence: f64,
    pub reason: String,
    pub source: DecisionSource,
}

impl DecisionResult {
    fn rule_rejection(reason: String) -> Self {
        Self {
            outcome: Outcome::Rejected,
            confidence: 1.0,
            reason,
            source: DecisionSource::Rule,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.outcome == Outcome::Approved
    }

    pub fn confidence_pct(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }
}

impl fmt::Display for DecisionResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let verdict = if self.is_approved() {
            "Loan Approved"
        } else {
            "Loan Rejected"
        };
        write!(
            f,
            "{} ({:?}, confidence {}): {}",
            verdict,
            self.source,
            self.confidence_pct(),
            self.reason
        )
    }
}

/// Loan amount in income currency units divided by income.
///
/// Zero income gives `+inf` for any positive loan and 0 for a zero loan.
pub fn debt_to_income_ratio(record: &ApplicantRecord, loan_amount_multiplier: f64) -> f64 {
    let loan = record.loan_amount * loan_amount_multiplier;
    if record.income > 0.0 {
        loan / record.income
    } else if loan > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Validate a record and encode it in schema order.
pub fn encode_record(record: &ApplicantRecord, encoder: &CategoricalEncoder) -> Result<EncodedFeatureVector> {
    record.validate()?;
    Ok(EncodedFeatureVector {
        income: record.income,
        loan_amount: record.loan_amount,
        credit_history: record.credit_history.code(),
        self_employed_code: encoder.encode(&record.self_employed)? as f64,
    })
}

#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    rules: RuleConfig,
}

impl DecisionEngine {
    /// Fails when a rule threshold is unusable.
    pub fn new(rules: RuleConfig) -> Result<Self> {
        rules.validate()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    /// Decide on unvalidated input.
    pub fn decide_raw(&self, input: &ApplicantInput, artifacts: &ArtifactBundle) -> Result<DecisionResult> {
        let record = ApplicantRecord::try_from(input)?;
        self.decide(&record, artifacts)
    }

    pub fn decide(&self, record: &ApplicantRecord, artifacts: &ArtifactBundle) -> Result<DecisionResult> {
        self.decide_with(record, &artifacts.encoder, &artifacts.scaler, &artifacts.model)
    }

    /// Decide using explicit components.
    ///
    /// Validation runs before any rule, so an invalid record never yields a
    /// decision. The model is not consulted when a rule fires.
    pub fn decide_with(
        &self,
        record: &ApplicantRecord,
        encoder: &CategoricalEncoder,
        scaler: &FeatureScaler,
        model: &dyn ClassifierModel,
    ) -> Result<DecisionResult> {
        let features = encode_record(record, encoder)?;

        if let Some(rejection) = self.check_rules(record) {
            log::debug!("Knockout rule fired: {}", rejection.reason);
            return Ok(rejection);
        }

        let scaled = scaler.transform(&features.to_row())?;
        let label = first(model.predict(&scaled)?)?;
        let probabilities = first(model.predict_proba(&scaled)?)?;

        let (outcome, reason) = if label == 1 {
            (Outcome::Approved, REASON_MODEL_APPROVED)
        } else {
            (Outcome::Rejected, REASON_MODEL_REJECTED)
        };
        let confidence = probabilities[usize::from(label == 1)].clamp(0.0, 1.0);

        log::debug!(
            "{} predicted label {} with p = {:?}",
            model.name(),
            label,
            probabilities
        );

        Ok(DecisionResult {
            outcome,
            confidence,
            reason: reason.to_string(),
            source: DecisionSource::Model,
        })
    }

    /// Evaluate the knockout rules in order. `None` means no rule fired.
    pub fn check_rules(&self, record: &ApplicantRecord) -> Option<DecisionResult> {
        if !self.rules.knockout_rules {
            return None;
        }

        if record.credit_history == CreditHistory::PriorDefault {
            return Some(DecisionResult::rule_rejection(REASON_PRIOR_DEFAULT.to_string()));
        }

        let ratio = debt_to_income_ratio(record, self.rules.loan_amount_multiplier);
        if ratio > self.rules.debt_to_income_ceiling {
            return Some(DecisionResult::rule_rejection(format!(
                "debt-to-income ratio {:.1} exceeds ceiling {:.1}",
                ratio, self.rules.debt_to_income_ceiling
            )));
        }

        None
    }
}

fn first<T>(values: Vec<T>) -> Result<T> {
    values
        .into_iter()
        .next()
        .ok_or_else(|| crate::error::LoanError::Training("classifier returned no prediction".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applicant::EmploymentStatus;
    use crate::models::ClassProbabilities;
    use ndarray::Array2;
    use std::cell::Cell;

    /// Returns a fixed probability and counts how often it is asked.
    struct FixedModel {
        p_approve: f64,
        calls: Cell<usize>,
    }

    impl FixedModel {
        fn new(p_approve: f64) -> Self {
            Self {
                p_approve,
                calls: Cell::new(0),
            }
        }
    }

    impl ClassifierModel for FixedModel {
        fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<ClassProbabilities>> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![[1.0 - self.p_approve, self.p_approve]; x.nrows()])
        }
    }

    fn components() -> (CategoricalEncoder, FeatureScaler) {
        let encoder = CategoricalEncoder::fit("Self_Employed", &["No".to_string(), "Yes".to_string()]).unwrap();
        let scaler = FeatureScaler {
            mean: vec![0.0; 4],
            std: vec![1.0; 4],
        };
        (encoder, scaler)
    }

    fn record(income: f64, loan: f64, credit: CreditHistory) -> ApplicantRecord {
        ApplicantRecord::new(income, loan, credit, EmploymentStatus::Salaried).unwrap()
    }

    #[test]
    fn prior_default_is_rejected_by_rule() {
        let (enc, sc) = components();
        let model = FixedModel::new(0.99);
        let engine = DecisionEngine::default();
        let result = engine
            .decide_with(&record(5000.0, 120.0, CreditHistory::PriorDefault), &enc, &sc, &model)
            .unwrap();
        assert_eq!(result.outcome, Outcome::Rejected);
        assert_eq!(result.source, DecisionSource::Rule);
        assert_eq!(result.confidence, 1.0);
        assert!(result.reason.contains("default"));
        assert_eq!(model.calls.get(), 0);
    }

    #[test]
    fn high_debt_to_income_cites_ratio() {
        let (enc, sc) = components();
        let model = FixedModel::new(0.99);
        let result = DecisionEngine::default()
            .decide_with(&record(4000.0, 100.0, CreditHistory::Clean), &enc, &sc, &model)
            .unwrap();
        assert_eq!(result.source, DecisionSource::Rule);
        assert_eq!(result.outcome, Outcome::Rejected);
        assert!(result.reason.contains("25.0"), "{}", result.reason);
        assert!(result.reason.contains("12.0"));
        assert_eq!(model.calls.get(), 0);
    }

    #[test]
    fn passing_rules_defers_to_model() {
        let (enc, sc) = components();
        let engine = DecisionEngine::default();

        let approve = FixedModel::new(0.8);
        let result = engine
            .decide_with(&record(10000.0, 50.0, CreditHistory::Clean), &enc, &sc, &approve)
            .unwrap();
        assert_eq!(result.outcome, Outcome::Approved);
        assert_eq!(result.source, DecisionSource::Model);
        assert!((result.confidence - 0.8).abs() < 1e-12);

        let reject = FixedModel::new(0.3);
        let result = engine
            .decide_with(&record(10000.0, 50.0, CreditHistory::Clean), &enc, &sc, &reject)
            .unwrap();
        assert_eq!(result.outcome, Outcome::Rejected);
        assert!((result.confidence - 0.7).abs() < 1e-12);
        assert_eq!(result.reason, REASON_MODEL_REJECTED);
    }

    #[test]
    fn disabled_rules_always_use_model() {
        let (enc, sc) = components();
        let model = FixedModel::new(0.9);
        let engine = DecisionEngine::new(RuleConfig::model_only()).unwrap();
        let result = engine
            .decide_with(&record(5000.0, 120.0, CreditHistory::PriorDefault), &enc, &sc, &model)
            .unwrap();
        assert_eq!(result.source, DecisionSource::Model);
        assert!(model.calls.get() > 0);
    }

    #[test]
    fn unknown_category_fails_before_rules() {
        let (enc, sc) = components();
        let model = FixedModel::new(0.9);
        let rec = ApplicantRecord::with_category(5000.0, 120.0, CreditHistory::PriorDefault, "Maybe").unwrap();
        let err = DecisionEngine::default().decide_with(&rec, &enc, &sc, &model).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn engine_rejects_nan_and_negative_ceilings() {
        for ceiling in [f64::NAN, -12.0] {
            let rules = RuleConfig {
                debt_to_income_ceiling: ceiling,
                ..RuleConfig::default()
            };
            let err = DecisionEngine::new(rules).unwrap_err();
            assert!(err.is_validation());
        }
        let engine = DecisionEngine::new(RuleConfig::default()).unwrap();
        assert_eq!(engine.rules().debt_to_income_ceiling, 12.0);
    }

    #[test]
    fn display_names_the_verdict() {
        let rejected = DecisionResult::rule_rejection("prior default".to_string());
        assert!(!rejected.is_approved());
        assert!(rejected.to_string().starts_with("Loan Rejected"));
    }

    #[test]
    fn ratio_edge_cases() {
        let zero_income = ApplicantRecord::with_category(0.0, 10.0, CreditHistory::Clean, "No").unwrap();
        assert!(debt_to_income_ratio(&zero_income, 1000.0).is_infinite());
        let nothing = ApplicantRecord::with_category(0.0, 0.0, CreditHistory::Clean, "No").unwrap();
        assert_eq!(debt_to_income_ratio(&nothing, 1000.0), 0.0);
        assert_eq!(debt_to_income_ratio(&record(10000.0, 50.0, CreditHistory::Clean), 1000.0), 5.0);
    }

    #[test]
    fn ratio_at_ceiling_passes() {
        let (enc, sc) = components();
        let model = FixedModel::new(0.6);
        // 48 * 1000 / 4000 = 12.0, not above the ceiling
        let result = DecisionEngine::default()
            .decide_with(&record(4000.0, 48.0, CreditHistory::Clean), &enc, &sc, &model)
            .unwrap();
        assert_eq!(result.source, DecisionSource::Model);
    }

    #[test]
    fn display_shows_percent() {
        let result = DecisionResult::rule_rejection(REASON_PRIOR_DEFAULT.to_string());
        assert_eq!(result.confidence_pct(), "100.00%");
        assert!(result.to_string().contains("Loan Rejected"));
    }
}
