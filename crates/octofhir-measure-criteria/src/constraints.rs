//! Scoring constraints on group populations

use crate::codes::PopulationCode;
use crate::group::GroupInfo;
use octofhir_measure_diagnostics::{MeasureError, Result};
use tracing::debug;

/// Check every group against the populations its scoring requires and
/// forbids.
///
/// Returns one message per group and category (disallowed, then missing),
/// each listing every offending code. An empty list means all groups conform.
pub fn validate_constraints(groups: &[GroupInfo]) -> Vec<String> {
    let mut violations = Vec::new();

    for (index, group) in groups.iter().enumerate() {
        let display = format!("Group {}", index + 1);
        let scoring = group.scoring;

        let disallowed: Vec<PopulationCode> = group
            .criteria
            .codes()
            .filter(|code| scoring.disallowed_populations().contains(code))
            .collect();
        if !disallowed.is_empty() {
            violations.push(format!(
                "{}: {} not permitted when using scoring \"{}\"",
                display,
                join_codes(&disallowed),
                scoring
            ));
        }

        let missing: Vec<PopulationCode> = scoring
            .required_populations()
            .iter()
            .copied()
            .filter(|code| !group.criteria.contains(*code))
            .collect();
        if !missing.is_empty() {
            violations.push(format!(
                "{}: {} required when using scoring \"{}\"",
                display,
                join_codes(&missing),
                scoring
            ));
        }
    }

    debug!(groups = groups.len(), violations = violations.len(), "Validated population constraints");
    violations
}

/// [`validate_constraints`] as a single error carrying every message
pub fn ensure_constraints(groups: &[GroupInfo]) -> Result<()> {
    let violations = validate_constraints(groups);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(MeasureError::constraints(violations))
    }
}

fn join_codes(codes: &[PopulationCode]) -> String {
    codes.iter().map(PopulationCode::code).collect::<Vec<_>>().join(", ")
}
