/*
 * This modules contains some quality of life structs and alias. Most importantly, it contains the
 * `EvalConfig` struct, which implements the default trait. This config can be passed to the
 * `evaluate` function or to the loaders of `AnnotationMap` to simplify their arguments.
*/
use crate::metrics::DivByZeroStrat;
use either::Either as LeftOrRight;
use std::fmt::{Debug, Display};

/// Reasonable default configuration when computing metrics.
pub type DefaultEvalConfig = EvalConfig<DivByZeroStrat>;

impl DefaultEvalConfig {
    pub fn new() -> Self {
        Self {
            zero_division: DivByZeroStrat::ReplaceBy0,
            legacy_shape: true,
        }
    }
}

impl<ZeroDiv> From<(ZeroDiv, bool)> for EvalConfig<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    fn from(value: (ZeroDiv, bool)) -> Self {
        Self {
            zero_division: value.0,
            legacy_shape: value.1,
        }
    }
}

impl<ZeroDiv> From<EvalConfigBuilder<ZeroDiv>> for EvalConfig<DivByZeroStrat>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    fn from(value: EvalConfigBuilder<ZeroDiv>) -> Self {
        Self {
            zero_division: value.zero_division.either_into(),
            legacy_shape: value.legacy_shape,
        }
    }
}

impl<ZeroDiv> From<EvalConfig<ZeroDiv>> for (DivByZeroStrat, bool)
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    fn from(value: EvalConfig<ZeroDiv>) -> Self {
        (value.zero_division.into(), value.legacy_shape)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
/// Config struct used to simplify the inputs of parameters to the main functions of `typeval`.
/// It implements the default trait.
pub struct EvalConfig<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    /// This parameter describe what to do when we encounter a division by zero when computing
    /// the loose micro precision and recall. The most common solution is to replace the results
    /// by 0.
    zero_division: ZeroDiv,
    /// Do we accept annotation documents holding their records under a single key of any name
    /// instead of the `data` key? A warning is logged each time such a document is read.
    legacy_shape: bool,
}

impl<ZeroDiv> EvalConfig<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat> + Copy,
{
    pub fn zero_division(&self) -> DivByZeroStrat {
        self.zero_division.into()
    }
    pub fn legacy_shape(&self) -> bool {
        self.legacy_shape
    }
}

impl Default for DefaultEvalConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl<ZeroDiv> Display for EvalConfig<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat> + Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let string = format!("Strategy when encountering a division by zero: {:?}\n Accepting legacy annotation documents: {}", self.zero_division, self.legacy_shape);
        write!(f, "{}", string)
    }
}

/// This builder can be used to build and customize an `EvalConfig` stucture.
pub struct EvalConfigBuilder<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    zero_division: LeftOrRight<ZeroDiv, DivByZeroStrat>,
    legacy_shape: bool,
}

impl Default for EvalConfigBuilder<DivByZeroStrat> {
    fn default() -> Self {
        Self::new()
    }
}

impl<ZeroDiv> EvalConfigBuilder<ZeroDiv>
where
    ZeroDiv: Into<DivByZeroStrat>,
{
    pub fn division_by_zero(mut self, division_by_zero: ZeroDiv) -> Self {
        self.zero_division = LeftOrRight::Left(division_by_zero);
        self
    }
    pub fn legacy_shape(mut self, legacy_shape: bool) -> Self {
        self.legacy_shape = legacy_shape;
        self
    }
    pub fn new() -> Self {
        Self {
            zero_division: LeftOrRight::Right(DivByZeroStrat::ReplaceBy0),
            legacy_shape: true,
        }
    }
    pub fn build(self) -> EvalConfig<DivByZeroStrat> {
        EvalConfig::from(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DivByZeroStrat::ReplaceBy1)]
    #[case(DivByZeroStrat::ReplaceBy0)]
    #[case(DivByZeroStrat::ReturnError)]
    fn test_builder_setters_division_by_zero(#[case] strat: DivByZeroStrat) {
        let builder = EvalConfigBuilder::default();
        let config = builder.division_by_zero(strat).build();
        assert_eq!(config.zero_division(), strat)
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_builder_setters_legacy_shape(#[case] legacy_shape: bool) {
        let builder = EvalConfigBuilder::default();
        let config = builder.legacy_shape(legacy_shape).build();
        assert_eq!(config.legacy_shape(), legacy_shape)
    }

    #[test]
    fn test_defaults() {
        let config = DefaultEvalConfig::default();
        assert_eq!(config.zero_division(), DivByZeroStrat::ReplaceBy0);
        assert!(config.legacy_shape());
        assert_eq!(config, EvalConfigBuilder::default().build());
    }

    #[test]
    fn test_tuple_conversions() {
        let config = EvalConfig::from((DivByZeroStrat::ReturnError, false));
        let (strat, legacy_shape): (DivByZeroStrat, bool) = config.into();
        assert_eq!(strat, DivByZeroStrat::ReturnError);
        assert!(!legacy_shape);
    }

    #[test]
    fn test_display() {
        let config = DefaultEvalConfig::default();
        let expected = "Strategy when encountering a division by zero: ReplaceBy0\n Accepting legacy annotation documents: true";
        assert_eq!(config.to_string(), expected);
    }
}
