use maud::{html, Markup, DOCTYPE};

use crate::report::report::ClassificationReport;

/// Run metadata shown above the metric tables.
pub struct ReportContext<'a> {
    pub dataset: &'a str,
    pub policy: &'a str,
    pub credit_history_imputation: &'a str,
    pub imputed_cells: usize,
    pub trained_at: &'a str,
}

fn metrics_table(report: &ClassificationReport) -> Markup {
    html! {
        h2 { "Evaluated on " (report.evaluated_on.describe()) }
        table {
            thead {
                tr { th { "" } th { "precision" } th { "recall" } th { "f1-score" } th { "support" } }
            }
            tbody {
                @for row in report.rows() {
                    tr {
                        td { (row.label) }
                        td { (format!("{:.2}", row.precision)) }
                        td { (format!("{:.2}", row.recall)) }
                        td { (format!("{:.2}", row.f1)) }
                        td { (row.support) }
                    }
                }
                tr { td { "accuracy" } td {} td {} td { (format!("{:.2}", report.accuracy)) } td { (report.macro_avg.support) } }
            }
        }
    }
}

/// Render the training report as a standalone HTML page.
pub fn render_training_report(
    ctx: &ReportContext,
    training: &ClassificationReport,
    holdout: Option<&ClassificationReport>,
) -> String {
    let page = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Loan eligibility model: training report" }
                style { "table { border-collapse: collapse; } td, th { padding: 4px 12px; text-align: right; }" }
            }
            body {
                h1 { "Loan eligibility model" }
                ul {
                    li { "Dataset: " (ctx.dataset) }
                    li { "Training policy: " (ctx.policy) }
                    li { "Credit history imputation: " (ctx.credit_history_imputation) }
                    li { "Imputed cells: " (ctx.imputed_cells) }
                    li { "Trained at: " (ctx.trained_at) }
                }
                (metrics_table(training))
                @if let Some(holdout) = holdout {
                    (metrics_table(holdout))
                } @else {
                    p { strong { "Note: " } "no held-out split was used; the metrics above are computed on the training rows and overstate real-world quality." }
                }
            }
        }
    };
    page.into_string()
}
