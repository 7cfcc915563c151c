//! Population entries and per-group criteria

use crate::codes::PopulationCode;
use octofhir_measure_diagnostics::{MeasureError, Result, MB0300, MB0301, MB0303};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Generated id of a population entry, group or composite measure
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueId(String);

impl UniqueId {
    /// Fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UniqueId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One population assertion of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationEntry {
    pub id: UniqueId,
    pub criteria_expression: String,
    /// Id of another entry in the same group this one is defined against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observing_population_id: Option<UniqueId>,
}

impl PopulationEntry {
    pub fn new(criteria_expression: impl Into<String>) -> Self {
        Self {
            id: UniqueId::generate(),
            criteria_expression: criteria_expression.into(),
            observing_population_id: None,
        }
    }
}

/// Entries assigned to one population code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PopulationCriteria {
    Single(PopulationEntry),
    Multi(Vec<PopulationEntry>),
}

impl PopulationCriteria {
    pub fn entries(&self) -> &[PopulationEntry] {
        match self {
            Self::Single(entry) => std::slice::from_ref(entry),
            Self::Multi(entries) => entries,
        }
    }

    fn entries_mut(&mut self) -> &mut [PopulationEntry] {
        match self {
            Self::Single(entry) => std::slice::from_mut(entry),
            Self::Multi(entries) => entries,
        }
    }

    fn shape_fits(&self, code: PopulationCode) -> bool {
        matches!(self, Self::Multi(_)) == code.is_multi_valued()
    }
}

/// Expression name(s) for one population code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaInput {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for CriteriaInput {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for CriteriaInput {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for CriteriaInput {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

impl From<&[&str]> for CriteriaInput {
    fn from(value: &[&str]) -> Self {
        Self::Many(value.iter().map(|s| s.to_string()).collect())
    }
}

/// Population criteria of one measure group, keyed by population code.
///
/// Iteration always follows population code declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupCriteria {
    populations: BTreeMap<PopulationCode, PopulationCriteria>,
}

impl GroupCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign criteria to `code`, replacing any previous assignment.
    ///
    /// A list is accepted only for multi-valued codes and a single entry only
    /// for the others.
    pub fn insert(&mut self, code: PopulationCode, criteria: PopulationCriteria) -> Result<()> {
        if !criteria.shape_fits(code) {
            let expected = if code.is_multi_valued() {
                "a list of expressions"
            } else {
                "a single expression"
            };
            return Err(MeasureError::reference(
                MB0303,
                format!("Population {} takes {}", code, expected),
            ));
        }
        self.populations.insert(code, criteria);
        Ok(())
    }

    /// Add every assignment of `other`
    pub fn merge(&mut self, other: GroupCriteria) {
        self.populations.extend(other.populations);
    }

    pub fn get(&self, code: PopulationCode) -> Option<&PopulationCriteria> {
        self.populations.get(&code)
    }

    pub fn contains(&self, code: PopulationCode) -> bool {
        self.populations.contains_key(&code)
    }

    /// Codes with an assignment, in declaration order
    pub fn codes(&self) -> impl Iterator<Item = PopulationCode> + '_ {
        self.populations.keys().copied()
    }

    /// Every entry with its code, multi-valued codes flattened in place
    pub fn entries(&self) -> impl Iterator<Item = (PopulationCode, &PopulationEntry)> {
        self.populations
            .iter()
            .flat_map(|(code, criteria)| criteria.entries().iter().map(move |e| (*code, e)))
    }

    pub fn len(&self) -> usize {
        self.populations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.populations.is_empty()
    }

    /// First entry whose expression is `expression`, scanning codes in
    /// declaration order
    pub fn find_entry_by_expression(&self, expression: &str) -> Option<&PopulationEntry> {
        self.entries()
            .map(|(_, entry)| entry)
            .find(|entry| entry.criteria_expression == expression)
    }

    /// Make the single entry of `code` draw from the entry defined by
    /// `target_expression`
    pub fn reference_population(
        &mut self,
        code: PopulationCode,
        target_expression: &str,
    ) -> Result<()> {
        if code.is_multi_valued() {
            return Err(MeasureError::reference(
                MB0303,
                format!("Population {} has several entries; reference one by position", code),
            ));
        }
        self.reference_entry(code, 0, target_expression)
    }

    /// Make the measure observation at `index` aggregate over the entry
    /// defined by `target_expression`
    pub fn reference_observation(&mut self, index: usize, target_expression: &str) -> Result<()> {
        self.reference_entry(PopulationCode::MeasureObservation, index, target_expression)
    }

    fn reference_entry(
        &mut self,
        code: PopulationCode,
        index: usize,
        target_expression: &str,
    ) -> Result<()> {
        let target = self
            .find_entry_by_expression(target_expression)
            .map(|entry| entry.id.clone())
            .ok_or_else(|| {
                MeasureError::reference(
                    MB0300,
                    format!(
                        "Could not find population entry for expression \"{}\" referenced by {}",
                        target_expression, code
                    ),
                )
            })?;

        let entry = self
            .populations
            .get_mut(&code)
            .and_then(|criteria| criteria.entries_mut().get_mut(index))
            .ok_or_else(|| {
                MeasureError::reference(
                    MB0301,
                    format!("No {} entry at position {} to attach a reference to", code, index + 1),
                )
            })?;

        entry.observing_population_id = Some(target);
        Ok(())
    }

    /// Every observing reference points at an entry of this group
    pub fn validate_references(&self) -> Result<()> {
        for (code, entry) in self.entries() {
            let Some(target) = &entry.observing_population_id else {
                continue;
            };
            if !self.entries().any(|(_, other)| &other.id == target) {
                return Err(MeasureError::reference(
                    MB0300,
                    format!(
                        "{} entry \"{}\" references unknown population {}",
                        code, entry.criteria_expression, target
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Wrap expression names into fresh entries for `code`.
///
/// A list is accepted only for multi-valued codes and a single name only for
/// the others.
pub fn build_simple_criteria(
    code: PopulationCode,
    input: impl Into<CriteriaInput>,
) -> Result<GroupCriteria> {
    let criteria = match input.into() {
        CriteriaInput::One(expression) => PopulationCriteria::Single(PopulationEntry::new(expression)),
        CriteriaInput::Many(expressions) => {
            PopulationCriteria::Multi(expressions.into_iter().map(PopulationEntry::new).collect())
        }
    };

    let mut group = GroupCriteria::new();
    group.insert(code, criteria)?;
    Ok(group)
}

/// See [`GroupCriteria::find_entry_by_expression`]
pub fn find_entry_by_expression<'a>(
    expression: &str,
    criteria: &'a GroupCriteria,
) -> Option<&'a PopulationEntry> {
    criteria.find_entry_by_expression(expression)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_entry() {
        let group = build_simple_criteria(PopulationCode::Numerator, "Numer").unwrap();

        let entries: Vec<_> = group.entries().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, PopulationCode::Numerator);
        assert_eq!(entries[0].1.criteria_expression, "Numer");
        assert!(!entries[0].1.id.as_str().is_empty());
        assert!(entries[0].1.observing_population_id.is_none());
    }

    #[test]
    fn test_fresh_ids() {
        let a = build_simple_criteria(PopulationCode::Numerator, "Numer").unwrap();
        let b = build_simple_criteria(PopulationCode::Numerator, "Numer").unwrap();

        let id_a = &a.entries().next().unwrap().1.id;
        let id_b = &b.entries().next().unwrap().1.id;
        assert_ne!(id_a, id_b);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = build_simple_criteria(PopulationCode::Numerator, vec!["A".to_string()])
            .unwrap_err();
        assert_eq!(err.code(), MB0303);

        let err = build_simple_criteria(PopulationCode::InitialPopulation, "IPP").unwrap_err();
        assert_eq!(err.code(), MB0303);
    }

    #[test]
    fn test_serializes_by_code() {
        let group =
            build_simple_criteria(PopulationCode::InitialPopulation, &["A", "B"][..]).unwrap();
        let value = serde_json::to_value(&group).unwrap();

        assert_eq!(value["initial-population"].as_array().unwrap().len(), 2);
        assert_eq!(value["initial-population"][1]["criteriaExpression"], "B");
    }
}
