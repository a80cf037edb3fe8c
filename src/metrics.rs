/**
This module computes the metrics (precision, recall, f-score) of paired true and predicted label
sets under three matching strategies: strict, loose macro and loose micro.
*/
use crate::pairing::PairedExample;
use crate::reporter::{EvaluationReport, Score};
use core::fmt;
use enum_iterator::Sequence;
use ndarray::prelude::*;
use ndarray_stats::{errors::EmptyInput, SummaryStatisticsExt};
use num::Float;
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt::{Debug, Display},
    str::FromStr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
/// How do we handle cases with a division by zero? Only the loose micro strategy can divide by
/// zero, when no label was predicted or when no true label exists across all pairs. `ReplaceBy0`
/// is the default.
pub enum DivByZeroStrat {
    /// Replace denominator equal to `0` by `1` for the calculations
    ReplaceBy1,
    /// Returns an error
    ReturnError,
    /// Returns 0 when the denominator is 0
    #[default]
    ReplaceBy0,
}

#[derive(Debug)]
pub struct ParsingDivisionByZeroStrategyError<S: Debug + Display>(S);

impl<S: Debug + Display> Display for ParsingDivisionByZeroStrategyError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Could not parse the {} into a `DivisionByZeroStrategy`",
            self.0
        )
    }
}
impl<S: Debug + Display> Error for ParsingDivisionByZeroStrategyError<S> {}

impl FromStr for DivByZeroStrat {
    type Err = ParsingDivisionByZeroStrategyError<String>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "replaceby0" | "replacebyzero" | "zero" => Ok(DivByZeroStrat::ReplaceBy0),
            "replaceby1" | "replacebyone" | "one" => Ok(DivByZeroStrat::ReplaceBy1),
            "returnerror" | "error" => Ok(DivByZeroStrat::ReturnError),
            _ => Err(ParsingDivisionByZeroStrategyError(String::from(s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Division by zero, carrying the name of the null denominator.
pub struct DivisionByZeroError(pub &'static str);

impl Display for DivisionByZeroError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Encountered division by zero: no {}", self.0)
    }
}

impl Error for DivisionByZeroError {}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
/// Failures that can happen when computing the precision, recall and f-score.
pub enum ComputationError {
    #[error("{0}")]
    DivisionByZero(DivisionByZeroError),
    #[error("Received an empty input: {0}")]
    EmptyInput(String),
    #[error("Could not compute the geometric mean: {0}")]
    EmptyArray(EmptyInput),
}

impl From<DivisionByZeroError> for ComputationError {
    fn from(value: DivisionByZeroError) -> Self {
        Self::DivisionByZero(value)
    }
}

impl From<EmptyInput> for ComputationError {
    fn from(value: EmptyInput) -> Self {
        Self::EmptyArray(value)
    }
}

/// Matching strategies supported by this crate. &str can be parsed to create a `MatchStrategy`.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Serialize, Deserialize, Sequence)]
pub enum MatchStrategy {
    /// The predicted label set must be equal to the true label set.
    Strict,
    /// Precision and recall of each pair, averaged over the pairs.
    Macro,
    /// Precision and recall of the label counts summed over the pairs.
    Micro,
}

impl Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let str_content = match self {
            Self::Strict => "Strict",
            Self::Macro => "Loose_Macro",
            Self::Micro => "Loose_Micro",
        };
        write!(f, "{}", str_content)
    }
}

#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone)]
pub struct MatchStrategyParsingError(String);

impl Display for MatchStrategyParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Impossible to parse the string ({}) into a MatchStrategy",
            self.0
        )
    }
}
impl Error for MatchStrategyParsingError {}

impl FromStr for MatchStrategy {
    type Err = MatchStrategyParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(MatchStrategy::Strict),
            "macro" | "loose_macro" => Ok(MatchStrategy::Macro),
            "micro" | "loose_micro" => Ok(MatchStrategy::Micro),
            _ => Err(MatchStrategyParsingError(String::from(s))),
        }
    }
}

/// Precision, recall and f-score of one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricResult {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1")]
    pub fscore: f64,
}

impl MetricResult {
    /// Builds the result and derives the f-score with [`f1`].
    pub fn new(precision: f64, recall: f64) -> Self {
        Self {
            precision,
            recall,
            fscore: f1(precision, recall),
        }
    }
}

/// Harmonic mean of the precision and the recall. Only a null recall is guarded: a null precision
/// with a positive recall still yields 0 through the formula.
pub fn f1<F: Float>(precision: F, recall: F) -> F {
    if recall == F::zero() {
        return F::zero();
    }
    let two = F::one() + F::one();
    two * precision * recall / (precision + recall)
}

fn check_not_empty(pairs: &[PairedExample<'_>]) -> Result<(), ComputationError> {
    if pairs.is_empty() {
        return Err(ComputationError::EmptyInput(String::from("pairs")));
    }
    Ok(())
}

/// A pair scores 1 when its label sets are equal, 0 otherwise. Precision and recall are both the
/// mean score.
pub fn strict(pairs: &[PairedExample<'_>]) -> Result<MetricResult, ComputationError> {
    check_not_empty(pairs)?;
    let correct = pairs.iter().filter(|p| p.is_exact_match()).count();
    let ratio = correct as f64 / pairs.len() as f64;
    Ok(MetricResult::new(ratio, ratio))
}

/// Precision and recall of each pair, averaged over all the pairs. A pair without predicted
/// (resp. true) labels contributes 0 to the precision (resp. recall) but still counts in the
/// average.
pub fn loose_macro(pairs: &[PairedExample<'_>]) -> Result<MetricResult, ComputationError> {
    check_not_empty(pairs)?;
    let precisions: Array1<f64> = pairs
        .iter()
        .map(|p| ratio_or_zero(p.correct_count(), p.predicted_labels.len()))
        .collect();
    let recalls: Array1<f64> = pairs
        .iter()
        .map(|p| ratio_or_zero(p.correct_count(), p.true_labels.len()))
        .collect();
    let precision = precisions
        .mean()
        .ok_or_else(|| ComputationError::EmptyInput(String::from("precisions")))?;
    let recall = recalls
        .mean()
        .ok_or_else(|| ComputationError::EmptyInput(String::from("recalls")))?;
    Ok(MetricResult::new(precision, recall))
}

#[inline(always)]
fn ratio_or_zero(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Precision and recall of the label counts summed over all the pairs. When no label was
/// predicted, or when no true label exists, the `zero_division` strategy decides the outcome.
pub fn loose_micro(
    pairs: &[PairedExample<'_>],
    zero_division: DivByZeroStrat,
) -> Result<MetricResult, ComputationError> {
    check_not_empty(pairs)?;
    let (predicted, true_sum, correct) =
        pairs.iter().fold((0usize, 0usize, 0usize), |(p, t, c), pair| {
            (
                p + pair.predicted_labels.len(),
                t + pair.true_labels.len(),
                c + pair.correct_count(),
            )
        });
    let precision = prf_divide(correct, predicted, zero_division, "predicted labels")?;
    let recall = prf_divide(correct, true_sum, zero_division, "true labels")?;
    Ok(MetricResult::new(precision, recall))
}

fn prf_divide(
    numerator: usize,
    denominator: usize,
    zero_division: DivByZeroStrat,
    denominator_name: &'static str,
) -> Result<f64, DivisionByZeroError> {
    if denominator != 0 {
        return Ok(numerator as f64 / denominator as f64);
    }
    match zero_division {
        DivByZeroStrat::ReturnError => Err(DivisionByZeroError(denominator_name)),
        DivByZeroStrat::ReplaceBy1 => Ok(numerator as f64),
        DivByZeroStrat::ReplaceBy0 => Ok(0.),
    }
}

/// Geometric mean of the f-scores. The f-scores are expected to lie in `[0, 1]`: a negative value
/// has no real geometric mean and yields `NaN`.
pub fn geometric_mean(fscores: &[f64]) -> Result<f64, ComputationError> {
    if fscores.iter().any(|f| *f == 0.) {
        // ln(0) is -inf
        return Ok(0.);
    }
    let array = ArrayView1::from(fscores);
    Ok(array.geometric_mean()?)
}

/// Computes every strategy and their geometric mean. This is the main entrypoint of this module.
pub fn score(
    pairs: &[PairedExample<'_>],
    zero_division: DivByZeroStrat,
) -> Result<EvaluationReport, ComputationError> {
    let score = Score {
        strict: strict(pairs)?,
        macro_: loose_macro(pairs)?,
        micro: loose_micro(pairs, zero_division)?,
    };
    let fscores: Vec<f64> = enum_iterator::all::<MatchStrategy>()
        .map(|s| score.get(s).fscore)
        .collect();
    let score_secondary = geometric_mean(&fscores)?;
    Ok(EvaluationReport {
        score,
        score_secondary,
    })
}
