/*!
This library scores entity-typing predictions against a ground truth. Each example is a text, the
entity mentioned in it and the space separated labels (types) of that entity. Both annotation sets
are loaded, joined on their anonymized text and every joined pair of label sets is scored.

# STRATEGIES
* Strict: a pair is correct when the predicted label set is equal to the true label set. The
    precision and the recall are both the ratio of correct pairs.
* Loose macro: the precision (`|true ∩ predicted| / |predicted|`) and the recall
    (`|true ∩ predicted| / |true|`) of each pair are averaged over all the pairs.
* Loose micro: the precision and the recall are computed out of the label counts summed over all
    the pairs.

The f-score of each strategy is the harmonic mean of its precision and recall. The secondary score
is the geometric mean of the three f-scores.

# Terminology
* A normalized text is a text whose entity mention has been replaced by the `XXXX XXXX`
    placeholder. It is the key joining the ground truth and the submission.
* A paired example is the couple (true labels, predicted labels) of a normalized text present in
    both annotation sets.

# Annotation files
The annotation files are JSON documents shaped as
`{"data": [{"text": "...", "entity": "...", "types": "A B"}, ...]}`. Documents holding their
records under a single key of any other name are accepted as well, unless disabled in the
configuration.
*/

mod annotations;
mod anonymizer;
mod config;
mod error;
mod metrics;
mod pairing;
mod reporter;
mod tally;

// The public api starts here
pub use anonymizer::{anonymize, locate_mention, Mention, PLACEHOLDER, PLACEHOLDER_PATTERNS};

pub use annotations::{Annotation, AnnotationMap, AnnotationRecord, LoadStats, DATA_KEY};

pub use metrics::{
    f1, geometric_mean, loose_macro, loose_micro, score, strict, ComputationError,
    DivByZeroStrat, DivisionByZeroError, MatchStrategy, MetricResult,
};

pub use pairing::{pair_annotations, PairedExample};

pub use reporter::{EvaluationReport, Score};

pub use tally::EntityTally;

pub use config::{DefaultEvalConfig, EvalConfig, EvalConfigBuilder};

pub use error::{EvalError, Result};

use std::path::Path;

/// Main entrypoint of the typeval library. This function loads the ground truth and the
/// submission out of their JSON documents, pairs their examples and computes the metrics of every
/// strategy.
///
/// * `ground_truth`: JSON document of the true annotations
/// * `submission`: JSON document of the predicted annotations
/// * `config`: Parameters used to load the annotations and compute the metrics.
///
/// #Example
/// ```rust
/// use typeval::{evaluate, EvalConfigBuilder, DivByZeroStrat};
///
/// let ground_truth = r#"{"data": [{"text": "John saw Mary", "entity": "John", "types": "PERSON"}]}"#;
/// let submission =
///     r#"{"data": [{"text": "John saw Mary", "entity": "John", "types": "PERSON LOCATION"}]}"#;
/// let config = EvalConfigBuilder::default()
///     .division_by_zero(DivByZeroStrat::ReturnError)
///     .build();
///
/// let report = evaluate(ground_truth, submission, config).unwrap();
/// assert_eq!(report.score.strict.fscore, 0.0);
/// assert_eq!(report.score.macro_.precision, 0.5);
/// assert_eq!(report.score.micro.recall, 1.0);
/// ```
pub fn evaluate<ZeroDiv>(
    ground_truth: &str,
    submission: &str,
    config: EvalConfig<ZeroDiv>,
) -> Result<EvaluationReport>
where
    ZeroDiv: Into<DivByZeroStrat> + Copy,
{
    let ground_truth_map = AnnotationMap::from_json_str(ground_truth, &config)?;
    let submission_map = AnnotationMap::from_json_str(submission, &config)?;
    evaluate_maps(&ground_truth_map, &submission_map, config.zero_division())
}

/// Same as [`evaluate`], reading the JSON documents from files.
pub fn evaluate_paths<P, Q, ZeroDiv>(
    ground_truth: P,
    submission: Q,
    config: EvalConfig<ZeroDiv>,
) -> Result<EvaluationReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    ZeroDiv: Into<DivByZeroStrat> + Copy,
{
    let ground_truth_map = AnnotationMap::from_path(ground_truth, &config)?;
    let submission_map = AnnotationMap::from_path(submission, &config)?;
    evaluate_maps(&ground_truth_map, &submission_map, config.zero_division())
}

/// Scores already loaded annotation maps. Fails when the maps share no normalized text.
pub fn evaluate_maps(
    ground_truth: &AnnotationMap,
    submission: &AnnotationMap,
    zero_division: DivByZeroStrat,
) -> Result<EvaluationReport> {
    let pairs = pair_annotations(ground_truth, submission)?;
    let report = score(&pairs, zero_division)?;
    log::info!(
        "Scored {} paired examples, strict f1: {}, secondary score: {}",
        pairs.len(),
        report.score.strict.fscore,
        report.score_secondary
    );
    Ok(report)
}
