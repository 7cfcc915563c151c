//! Measure group description

use crate::codes::{ImprovementNotation, ScoringCode};
use crate::criteria::GroupCriteria;
use serde::{Deserialize, Serialize};

/// Default population basis for patient-based measures
pub const BOOLEAN_BASIS: &str = "boolean";

/// Everything needed to emit one `Measure.group`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub scoring: ScoringCode,
    pub improvement_notation: ImprovementNotation,
    pub population_basis: String,
    pub criteria: GroupCriteria,
}

impl GroupInfo {
    pub fn new(scoring: ScoringCode, criteria: GroupCriteria) -> Self {
        Self {
            scoring,
            improvement_notation: ImprovementNotation::default(),
            population_basis: BOOLEAN_BASIS.to_string(),
            criteria,
        }
    }

    pub fn with_improvement_notation(mut self, notation: ImprovementNotation) -> Self {
        self.improvement_notation = notation;
        self
    }

    pub fn with_population_basis(mut self, basis: impl Into<String>) -> Self {
        self.population_basis = basis.into();
        self
    }
}
