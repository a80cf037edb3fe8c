/**
This modules gives a few tools to prettyprint the output of an evaluation.
*/
use crate::metrics::{MatchStrategy, MetricResult};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Metrics of the three matching strategies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Score {
    pub strict: MetricResult,
    #[serde(rename = "macro")]
    pub macro_: MetricResult,
    pub micro: MetricResult,
}

impl Score {
    pub fn get(&self, strategy: MatchStrategy) -> &MetricResult {
        match strategy {
            MatchStrategy::Strict => &self.strict,
            MatchStrategy::Macro => &self.macro_,
            MatchStrategy::Micro => &self.micro,
        }
    }
}

/// The report holds the metrics of every strategy and the geometric mean of their f-scores. It
/// can be displayed (i.e. prettyprinted) as if it was collected into a dataframe and serialized
/// to JSON. The report can be built with the `evaluate` function.
///
/// # Example
///
/// ```rust
/// use typeval::{evaluate, DefaultEvalConfig};
///
/// let ground_truth = r#"{"data": [{"text": "John saw Mary", "entity": "John", "types": "PERSON"}]}"#;
/// let submission = r#"{"data": [{"text": "John saw Mary", "entity": "John", "types": "PERSON"}]}"#;
///
/// let report = evaluate(ground_truth, submission, DefaultEvalConfig::default()).unwrap();
///
/// let expected_report =
/// "Strategy, Precision, Recall, Fscore
/// Strict, 1, 1, 1
/// Loose_Macro, 1, 1, 1
/// Loose_Micro, 1, 1, 1
/// Geometric_Mean, , , 1\n";
///
/// assert_eq!(expected_report, report.to_string());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub score: Score,
    /// Geometric mean of the strict, loose macro and loose micro f-scores.
    pub score_secondary: f64,
}

impl EvaluationReport {
    pub fn get(&self, strategy: MatchStrategy) -> &MetricResult {
        self.score.get(strategy)
    }
}

/// The report acts as a dataframe when displayed.
impl Display for EvaluationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Strategy, Precision, Recall, Fscore")?;
        for strategy in enum_iterator::all::<MatchStrategy>() {
            let m = self.get(strategy);
            writeln!(
                f,
                "{}, {}, {}, {}",
                strategy, m.precision, m.recall, m.fscore
            )?
        }
        writeln!(f, "Geometric_Mean, , , {}", self.score_secondary)
    }
}
