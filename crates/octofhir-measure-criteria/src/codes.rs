//! Population, scoring and improvement notation codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Measure population code.
///
/// Variant order is the order populations appear in a generated group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PopulationCode {
    InitialPopulation,
    Numerator,
    NumeratorExclusion,
    Denominator,
    DenominatorExclusion,
    DenominatorException,
    MeasurePopulation,
    MeasurePopulationExclusion,
    MeasureObservation,
}

impl PopulationCode {
    pub const ALL: [PopulationCode; 9] = [
        Self::InitialPopulation,
        Self::Numerator,
        Self::NumeratorExclusion,
        Self::Denominator,
        Self::DenominatorExclusion,
        Self::DenominatorException,
        Self::MeasurePopulation,
        Self::MeasurePopulationExclusion,
        Self::MeasureObservation,
    ];

    /// Codes that accept a list of entries
    pub const MULTI_VALUED: [PopulationCode; 2] =
        [Self::InitialPopulation, Self::MeasureObservation];

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    /// Code in the measure-population code system
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InitialPopulation => "initial-population",
            Self::Numerator => "numerator",
            Self::NumeratorExclusion => "numerator-exclusion",
            Self::Denominator => "denominator",
            Self::DenominatorExclusion => "denominator-exclusion",
            Self::DenominatorException => "denominator-exception",
            Self::MeasurePopulation => "measure-population",
            Self::MeasurePopulationExclusion => "measure-population-exclusion",
            Self::MeasureObservation => "measure-observation",
        }
    }

    pub fn is_multi_valued(&self) -> bool {
        Self::MULTI_VALUED.contains(self)
    }
}

impl fmt::Display for PopulationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Measure scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringCode {
    Proportion,
    Ratio,
    ContinuousVariable,
    Cohort,
    Composite,
}

impl ScoringCode {
    pub const ALL: [ScoringCode; 5] = [
        Self::Proportion,
        Self::Ratio,
        Self::ContinuousVariable,
        Self::Cohort,
        Self::Composite,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Proportion => "proportion",
            Self::Ratio => "ratio",
            Self::ContinuousVariable => "continuous-variable",
            Self::Cohort => "cohort",
            Self::Composite => "composite",
        }
    }

    /// Populations a group with this scoring must define
    pub const fn required_populations(&self) -> &'static [PopulationCode] {
        use PopulationCode as P;
        match self {
            Self::Proportion | Self::Ratio => &[P::InitialPopulation, P::Denominator, P::Numerator],
            Self::ContinuousVariable => &[P::InitialPopulation, P::MeasurePopulation],
            Self::Cohort => &[P::InitialPopulation],
            Self::Composite => &[],
        }
    }

    /// Populations a group with this scoring must not define
    pub const fn disallowed_populations(&self) -> &'static [PopulationCode] {
        use PopulationCode as P;
        match self {
            Self::Proportion => &[P::MeasurePopulation, P::MeasurePopulationExclusion],
            Self::Ratio => &[
                P::DenominatorException,
                P::MeasurePopulation,
                P::MeasurePopulationExclusion,
            ],
            Self::ContinuousVariable => &[
                P::Denominator,
                P::DenominatorExclusion,
                P::DenominatorException,
                P::Numerator,
                P::NumeratorExclusion,
            ],
            Self::Cohort => &[
                P::Denominator,
                P::DenominatorExclusion,
                P::DenominatorException,
                P::Numerator,
                P::NumeratorExclusion,
                P::MeasurePopulation,
                P::MeasurePopulationExclusion,
            ],
            Self::Composite => &PopulationCode::ALL,
        }
    }
}

impl fmt::Display for ScoringCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Whether a higher or lower score is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImprovementNotation {
    #[default]
    Increase,
    Decrease,
}

impl ImprovementNotation {
    pub const ALL: [ImprovementNotation; 2] = [Self::Increase, Self::Decrease];

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.code() == code)
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        }
    }
}

impl fmt::Display for ImprovementNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How component scores of a composite measure are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositeScoring {
    Opportunity,
    AllOrNothing,
    Linear,
    Weighted,
}

impl CompositeScoring {
    pub const ALL: [CompositeScoring; 4] = [
        Self::Opportunity,
        Self::AllOrNothing,
        Self::Linear,
        Self::Weighted,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Opportunity => "opportunity",
            Self::AllOrNothing => "all-or-nothing",
            Self::Linear => "linear",
            Self::Weighted => "weighted",
        }
    }
}

impl fmt::Display for CompositeScoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
