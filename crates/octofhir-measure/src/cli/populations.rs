//! Measure group description from command-line flags

use crate::criteria::{
    CompositeScoring, GroupCriteria, GroupInfo, ImprovementNotation, PopulationCode,
    PopulationCriteria, PopulationEntry, ScoringCode, BOOLEAN_BASIS,
};
use crate::diagnostics::Result;

/// Population expressions and references for a single group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationFlags {
    pub ipop: Vec<String>,
    pub numer: Option<String>,
    pub numex: Option<String>,
    pub denom: Option<String>,
    pub denex: Option<String>,
    pub denexcep: Option<String>,
    pub msrpopl: Option<String>,
    pub msrpoplex: Option<String>,
    pub msrobs: Vec<String>,
    /// Initial population the numerator draws from
    pub numer_ipop_ref: Option<String>,
    /// Initial population the denominator draws from
    pub denom_ipop_ref: Option<String>,
    /// Observed population per measure observation, paired by position
    pub msrobs_ref: Vec<String>,
    pub scoring: ScoringCode,
    pub improvement_notation: ImprovementNotation,
    pub basis: String,
}

impl PopulationFlags {
    pub fn new(scoring: ScoringCode) -> Self {
        Self {
            ipop: Vec::new(),
            numer: None,
            numex: None,
            denom: None,
            denex: None,
            denexcep: None,
            msrpopl: None,
            msrpoplex: None,
            msrobs: Vec::new(),
            numer_ipop_ref: None,
            denom_ipop_ref: None,
            msrobs_ref: Vec::new(),
            scoring,
            improvement_notation: ImprovementNotation::default(),
            basis: BOOLEAN_BASIS.to_string(),
        }
    }

    /// Build the group, wiring every requested reference
    pub fn into_group_info(self) -> Result<GroupInfo> {
        let mut criteria = GroupCriteria::new();

        if !self.ipop.is_empty() {
            criteria.insert(PopulationCode::InitialPopulation, multi(&self.ipop))?;
        }
        let singles = [
            (PopulationCode::Numerator, &self.numer),
            (PopulationCode::NumeratorExclusion, &self.numex),
            (PopulationCode::Denominator, &self.denom),
            (PopulationCode::DenominatorExclusion, &self.denex),
            (PopulationCode::DenominatorException, &self.denexcep),
            (PopulationCode::MeasurePopulation, &self.msrpopl),
            (PopulationCode::MeasurePopulationExclusion, &self.msrpoplex),
        ];
        for (code, expression) in singles {
            if let Some(expression) = expression {
                criteria.insert(code, PopulationCriteria::Single(PopulationEntry::new(expression)))?;
            }
        }
        if !self.msrobs.is_empty() {
            criteria.insert(PopulationCode::MeasureObservation, multi(&self.msrobs))?;
        }

        if let Some(target) = &self.numer_ipop_ref {
            criteria.reference_population(PopulationCode::Numerator, target)?;
        }
        if let Some(target) = &self.denom_ipop_ref {
            criteria.reference_population(PopulationCode::Denominator, target)?;
        }
        for (index, target) in self.msrobs_ref.iter().enumerate() {
            criteria.reference_observation(index, target)?;
        }

        Ok(GroupInfo::new(self.scoring, criteria)
            .with_improvement_notation(self.improvement_notation)
            .with_population_basis(self.basis))
    }
}

fn multi(expressions: &[String]) -> PopulationCriteria {
    PopulationCriteria::Multi(expressions.iter().map(PopulationEntry::new).collect())
}

fn unknown(kind: &str, value: &str, allowed: impl Iterator<Item = &'static str>) -> String {
    format!(
        "unknown {} '{}' (expected one of: {})",
        kind,
        value,
        allowed.collect::<Vec<_>>().join(", ")
    )
}

/// Parse a measure scoring code
pub fn parse_scoring(value: &str) -> std::result::Result<ScoringCode, String> {
    ScoringCode::from_code(value)
        .ok_or_else(|| unknown("scoring code", value, ScoringCode::ALL.iter().map(|s| s.code())))
}

/// Parse an improvement notation code
pub fn parse_improvement_notation(value: &str) -> std::result::Result<ImprovementNotation, String> {
    ImprovementNotation::from_code(value).ok_or_else(|| {
        unknown(
            "improvement notation",
            value,
            ImprovementNotation::ALL.iter().map(|n| n.code()),
        )
    })
}

/// Parse a composite scoring code
pub fn parse_composite_scoring(value: &str) -> std::result::Result<CompositeScoring, String> {
    CompositeScoring::from_code(value).ok_or_else(|| {
        unknown(
            "composite scoring",
            value,
            CompositeScoring::ALL.iter().map(|c| c.code()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{MB0300, MB0301};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_proportion_flags() {
        let mut flags = PopulationFlags::new(ScoringCode::Proportion);
        flags.ipop = vec!["Initial Population".into()];
        flags.denom = Some("Denominator".into());
        flags.numer = Some("Numerator".into());
        flags.denex = Some("Denominator Exclusions".into());

        let group = flags.into_group_info().unwrap();

        let codes: Vec<_> = group.criteria.codes().collect();
        assert_eq!(
            codes,
            vec![
                PopulationCode::InitialPopulation,
                PopulationCode::Numerator,
                PopulationCode::Denominator,
                PopulationCode::DenominatorExclusion,
            ]
        );
        assert_eq!(group.population_basis, BOOLEAN_BASIS);
    }

    #[test]
    fn test_ratio_references() {
        let mut flags = PopulationFlags::new(ScoringCode::Ratio);
        flags.ipop = vec!["IPP 1".into(), "IPP 2".into()];
        flags.numer = Some("Numer".into());
        flags.denom = Some("Denom".into());
        flags.msrobs = vec!["Obs Numer".into(), "Obs Denom".into()];
        flags.numer_ipop_ref = Some("IPP 2".into());
        flags.denom_ipop_ref = Some("IPP 1".into());
        flags.msrobs_ref = vec!["Numer".into(), "Denom".into()];

        let group = flags.into_group_info().unwrap();
        let criteria = &group.criteria;
        let id_of = |expr: &str| criteria.find_entry_by_expression(expr).unwrap().id.clone();
        let reference_of = |expr: &str| {
            criteria
                .find_entry_by_expression(expr)
                .unwrap()
                .observing_population_id
                .clone()
        };

        assert_eq!(reference_of("Numer"), Some(id_of("IPP 2")));
        assert_eq!(reference_of("Denom"), Some(id_of("IPP 1")));
        assert_eq!(reference_of("Obs Numer"), Some(id_of("Numer")));
        assert_eq!(reference_of("Obs Denom"), Some(id_of("Denom")));
        assert_eq!(reference_of("IPP 1"), None);
    }

    #[test]
    fn test_reference_to_unknown_expression() {
        let mut flags = PopulationFlags::new(ScoringCode::Ratio);
        flags.ipop = vec!["IPP".into()];
        flags.numer = Some("Numer".into());
        flags.numer_ipop_ref = Some("Other IPP".into());

        assert_eq!(flags.into_group_info().unwrap_err().code(), MB0300);
    }

    #[test]
    fn test_more_observation_references_than_observations() {
        let mut flags = PopulationFlags::new(ScoringCode::ContinuousVariable);
        flags.ipop = vec!["IPP".into()];
        flags.msrpopl = Some("Measure Population".into());
        flags.msrobs = vec!["Obs".into()];
        flags.msrobs_ref = vec!["Measure Population".into(), "IPP".into()];

        assert_eq!(flags.into_group_info().unwrap_err().code(), MB0301);
    }

    #[test]
    fn test_parse_codes() {
        assert_eq!(parse_scoring("cohort"), Ok(ScoringCode::Cohort));
        assert!(parse_scoring("average").unwrap_err().contains("proportion"));
        assert_eq!(
            parse_improvement_notation("decrease"),
            Ok(ImprovementNotation::Decrease)
        );
        assert_eq!(
            parse_composite_scoring("all-or-nothing"),
            Ok(CompositeScoring::AllOrNothing)
        );
    }

    #[rstest]
    #[case("proportion", ScoringCode::Proportion)]
    #[case("ratio", ScoringCode::Ratio)]
    #[case("continuous-variable", ScoringCode::ContinuousVariable)]
    #[case("cohort", ScoringCode::Cohort)]
    fn test_parse_scoring_codes(#[case] code: &str, #[case] expected: ScoringCode) {
        assert_eq!(parse_scoring(code), Ok(expected));
    }
}
