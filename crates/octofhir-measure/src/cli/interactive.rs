//! Interactive collection of measure groups

use crate::cql::extract_defined_expression_names;
use crate::criteria::{
    GroupCriteria, GroupInfo, ImprovementNotation, PopulationCode, PopulationCriteria,
    PopulationEntry, ScoringCode, BOOLEAN_BASIS,
};
use crate::diagnostics::{MeasureError, MB0301};
use anyhow::{bail, Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Choice that leaves an optional population undefined
pub const SKIP_CHOICE: &str = "SKIP";

/// Source of answers for the group wizard
pub trait Prompter {
    /// Ask for a count; empty input yields `default`
    fn number(&mut self, message: &str, default: usize) -> Result<usize>;

    /// Ask for free text; empty input yields `default`
    fn input(&mut self, message: &str, default: &str) -> Result<String>;

    /// Ask for one of `choices`, returning the chosen text
    fn select(&mut self, message: &str, choices: &[String]) -> Result<String>;
}

/// Terminal prompts backed by a line editor
pub struct RustylinePrompter {
    editor: DefaultEditor,
}

impl RustylinePrompter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }

    fn read(&mut self, prompt: &str) -> Result<String> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(line.trim().to_string()),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                bail!("Interactive input cancelled")
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Prompter for RustylinePrompter {
    fn number(&mut self, message: &str, default: usize) -> Result<usize> {
        loop {
            let line = self.read(&format!("{} ({}): ", message, default))?;
            if line.is_empty() {
                return Ok(default);
            }
            match line.parse() {
                Ok(n) => return Ok(n),
                Err(_) => println!("Please enter a whole number"),
            }
        }
    }

    fn input(&mut self, message: &str, default: &str) -> Result<String> {
        let line = self.read(&format!("{} ({}): ", message, default))?;
        Ok(if line.is_empty() {
            default.to_string()
        } else {
            line
        })
    }

    fn select(&mut self, message: &str, choices: &[String]) -> Result<String> {
        println!("{}", message);
        for (i, choice) in choices.iter().enumerate() {
            println!("  {}) {}", i + 1, choice);
        }
        loop {
            let line = self.read(&format!("Select [1-{}]: ", choices.len()))?;
            let by_index = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| choices.get(i));
            if let Some(choice) = by_index.or_else(|| choices.iter().find(|c| **c == line)) {
                return Ok(choice.clone());
            }
            println!("Please pick one of the listed options");
        }
    }
}

/// Prompt for every group of the measure defined in `main_cql`
pub fn run(main_cql: &Path) -> Result<Vec<GroupInfo>> {
    let cql = fs::read_to_string(main_cql)
        .with_context(|| format!("Failed to read CQL file: {}", main_cql.display()))?;
    let expressions = extract_defined_expression_names(&cql);
    debug!(count = expressions.len(), "Found defined expressions");

    let mut prompter = RustylinePrompter::new()?;
    collect_group_info(&mut prompter, &expressions)
}

/// Walk through group settings and population choices.
///
/// Each expression can back one population per group. Optional populations
/// offer [`SKIP_CHOICE`]; initial populations do not. Once a group's
/// expressions are used up, its remaining populations are left undefined.
pub fn collect_group_info(
    prompter: &mut dyn Prompter,
    expression_names: &[String],
) -> Result<Vec<GroupInfo>> {
    let group_count = prompter.number("Enter number of Groups in the Measure", 1)?;
    let mut groups = Vec::with_capacity(group_count);
    for n in 1..=group_count {
        groups.push(collect_group(prompter, expression_names, &format!("Group {}", n))?);
    }
    Ok(groups)
}

fn collect_group(
    prompter: &mut dyn Prompter,
    expression_names: &[String],
    group: &str,
) -> Result<GroupInfo> {
    let scoring_choices: Vec<String> = ScoringCode::ALL
        .iter()
        .filter(|s| **s != ScoringCode::Composite)
        .map(|s| s.code().to_string())
        .collect();
    let scoring = prompter.select(&format!("Enter {} scoring code", group), &scoring_choices)?;
    let scoring = ScoringCode::from_code(&scoring)
        .with_context(|| format!("Unknown scoring code {}", scoring))?;

    let notation_choices: Vec<String> = ImprovementNotation::ALL
        .iter()
        .map(|n| n.code().to_string())
        .collect();
    let notation =
        prompter.select(&format!("Enter {} improvement notation", group), &notation_choices)?;
    let notation = ImprovementNotation::from_code(&notation)
        .with_context(|| format!("Unknown improvement notation {}", notation))?;

    let basis = prompter.input(
        &format!(
            "Enter {} population basis (see https://build.fhir.org/ig/HL7/cqf-measures/StructureDefinition-cqfm-populationBasis.html for more info)",
            group
        ),
        BOOLEAN_BASIS,
    )?;
    let observation_count = prompter.number(
        &format!("Enter {} number of \"measure-observation\"s", group),
        0,
    )?;
    let ipp_count = if scoring == ScoringCode::Ratio {
        prompter.number(&format!("Enter {} number of \"initial-population\"s", group), 1)?
    } else {
        1
    };

    let mut remaining = expression_names.to_vec();
    let mut criteria = GroupCriteria::new();

    for code in PopulationCode::ALL {
        if remaining.is_empty() {
            continue;
        }

        match code {
            PopulationCode::InitialPopulation => {
                let mut entries = Vec::with_capacity(ipp_count);
                for n in 1..=ipp_count {
                    if remaining.is_empty() {
                        break;
                    }
                    let expression = prompter
                        .select(&format!("{} \"{}\" {} expression", group, code, n), &remaining)?;
                    take(&mut remaining, &expression);
                    entries.push(PopulationEntry::new(expression));
                }
                if !entries.is_empty() {
                    criteria.insert(code, PopulationCriteria::Multi(entries))?;
                }
            }
            PopulationCode::MeasureObservation => {
                let mut entries = Vec::new();
                let mut observed = Vec::new();
                for _ in 0..observation_count {
                    let Some(expression) = select_optional(
                        prompter,
                        &format!("{} \"{}\" expression", group, code),
                        &remaining,
                    )?
                    else {
                        continue;
                    };
                    observed.push(prompter.select(
                        &format!("{} \"{}\" {} observing population", group, code, expression),
                        expression_names,
                    )?);
                    take(&mut remaining, &expression);
                    entries.push(PopulationEntry::new(expression));
                }
                if !entries.is_empty() {
                    criteria.insert(code, PopulationCriteria::Multi(entries))?;
                    for (index, target) in observed.iter().enumerate() {
                        criteria.reference_observation(index, target)?;
                    }
                }
            }
            _ => {
                if let Some(expression) = select_optional(
                    prompter,
                    &format!("{} \"{}\" expression", group, code),
                    &remaining,
                )? {
                    take(&mut remaining, &expression);
                    criteria.insert(code, PopulationCriteria::Single(PopulationEntry::new(expression)))?;
                }
            }
        }

        let draws_from_ipp = matches!(code, PopulationCode::Numerator | PopulationCode::Denominator);
        if scoring == ScoringCode::Ratio && ipp_count > 1 && draws_from_ipp {
            let ipp_choices: Vec<String> = criteria
                .get(PopulationCode::InitialPopulation)
                .map(|c| c.entries().iter().map(|e| e.criteria_expression.clone()).collect())
                .unwrap_or_default();
            if ipp_choices.is_empty() {
                return Err(MeasureError::reference(
                    MB0301,
                    "Could not detect initial-population entries to draw from for ratio measure with multiple initial populations",
                )
                .into());
            }
            let target = prompter.select(
                &format!("{} initial-population that \"{}\" draws from", group, code),
                &ipp_choices,
            )?;
            criteria.reference_population(code, &target)?;
        }
    }

    Ok(GroupInfo::new(scoring, criteria)
        .with_improvement_notation(notation)
        .with_population_basis(basis))
}

fn select_optional(
    prompter: &mut dyn Prompter,
    message: &str,
    remaining: &[String],
) -> Result<Option<String>> {
    let mut choices = Vec::with_capacity(remaining.len() + 1);
    choices.push(SKIP_CHOICE.to_string());
    choices.extend(remaining.iter().cloned());

    let choice = prompter.select(message, &choices)?;
    Ok((choice != SKIP_CHOICE).then_some(choice))
}

fn take(remaining: &mut Vec<String>, expression: &str) {
    if let Some(pos) = remaining.iter().position(|e| e == expression) {
        remaining.remove(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MB0300;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    /// Answers prompts from a fixed script and records what was offered
    #[derive(Default)]
    struct ScriptedPrompter {
        answers: VecDeque<String>,
        offered: Vec<(String, Vec<String>)>,
    }

    impl ScriptedPrompter {
        fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                offered: Vec::new(),
            }
        }

        fn next(&mut self, message: &str) -> Result<String> {
            self.answers
                .pop_front()
                .with_context(|| format!("no scripted answer for '{}'", message))
        }
    }

    impl Prompter for ScriptedPrompter {
        fn number(&mut self, message: &str, default: usize) -> Result<usize> {
            let answer = self.next(message)?;
            Ok(if answer.is_empty() { default } else { answer.parse()? })
        }

        fn input(&mut self, message: &str, default: &str) -> Result<String> {
            let answer = self.next(message)?;
            Ok(if answer.is_empty() { default.to_string() } else { answer })
        }

        fn select(&mut self, message: &str, choices: &[String]) -> Result<String> {
            self.offered.push((message.to_string(), choices.to_vec()));
            let answer = self.next(message)?;
            if !choices.contains(&answer) {
                bail!("'{}' is not offered for '{}'", answer, message);
            }
            Ok(answer)
        }
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_proportion_group() {
        let expressions = names(&["IPP", "Denom", "Numer", "SDE"]);
        let mut prompter = ScriptedPrompter::new(&[
            "",           // groups
            "proportion", // scoring
            "increase",   // improvement notation
            "",           // basis
            "",           // observations
            "IPP",
            "Numer",
            "SKIP", // numerator-exclusion
            "Denom",
            "SKIP", // denominator-exclusion
            "SKIP", // denominator-exception
            "SKIP", // measure-population
            "SKIP", // measure-population-exclusion
        ]);

        let groups = collect_group_info(&mut prompter, &expressions).unwrap();

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.scoring, ScoringCode::Proportion);
        assert_eq!(group.population_basis, "boolean");
        let picked: Vec<_> = group
            .criteria
            .entries()
            .map(|(code, e)| (code, e.criteria_expression.as_str()))
            .collect();
        assert_eq!(
            picked,
            vec![
                (PopulationCode::InitialPopulation, "IPP"),
                (PopulationCode::Numerator, "Numer"),
                (PopulationCode::Denominator, "Denom"),
            ]
        );

        // used expressions are no longer offered
        let (_, numerator_choices) = &prompter.offered[3];
        assert_eq!(numerator_choices, &names(&["SKIP", "Denom", "Numer", "SDE"]));
        let (_, denominator_choices) = &prompter.offered[5];
        assert_eq!(denominator_choices, &names(&["SKIP", "Denom", "SDE"]));
    }

    #[test]
    fn test_stops_offering_once_expressions_run_out() {
        let expressions = names(&["Everyone"]);
        let mut prompter = ScriptedPrompter::new(&["1", "cohort", "decrease", "Encounter", "0", "Everyone"]);

        let groups = collect_group_info(&mut prompter, &expressions).unwrap();

        assert_eq!(groups[0].criteria.len(), 1);
        assert_eq!(groups[0].population_basis, "Encounter");
        assert_eq!(groups[0].improvement_notation, ImprovementNotation::Decrease);
    }

    #[test]
    fn test_ratio_with_two_initial_populations_and_observations() {
        let expressions = names(&["IPP 1", "IPP 2", "Numer", "Denom", "Obs N", "Obs D"]);
        let mut prompter = ScriptedPrompter::new(&[
            "1",
            "ratio",
            "increase",
            "Encounter",
            "2", // observations
            "2", // initial populations
            "IPP 1",
            "IPP 2",
            "Numer",
            "IPP 2", // numerator draws from
            "SKIP",  // numerator-exclusion
            "Denom",
            "IPP 1", // denominator draws from
            "SKIP",  // denominator-exclusion
            "SKIP",  // denominator-exception
            "SKIP",  // measure-population
            "SKIP",  // measure-population-exclusion
            "Obs N",
            "Numer",
            "Obs D",
            "Denom",
        ]);

        let groups = collect_group_info(&mut prompter, &expressions).unwrap();
        let criteria = &groups[0].criteria;
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
        assert_eq!(reference_of("Obs N"), Some(id_of("Numer")));
        assert_eq!(reference_of("Obs D"), Some(id_of("Denom")));
        assert!(criteria.validate_references().is_ok());
    }

    #[test]
    fn test_observing_an_undefined_population() {
        let expressions = names(&["IPP", "MP", "Obs"]);
        let mut prompter = ScriptedPrompter::new(&[
            "1",
            "continuous-variable",
            "increase",
            "",
            "1",
            "IPP",
            "SKIP",
            "SKIP",
            "SKIP",
            "SKIP",
            "SKIP",
            "SKIP", // measure-population
            "SKIP",
            "Obs",
            "MP", // never assigned to a population
        ]);

        let err = collect_group_info(&mut prompter, &expressions).unwrap_err();

        assert_eq!(err.downcast_ref::<MeasureError>().unwrap().code(), MB0300);
    }

    #[test]
    fn test_ratio_reference_without_numerator() {
        let expressions = names(&["IPP 1", "IPP 2", "Denom"]);
        let mut prompter = ScriptedPrompter::new(&[
            "1", "ratio", "increase", "", "0", "2", "IPP 1", "IPP 2", "SKIP", "IPP 1",
        ]);

        let err = collect_group_info(&mut prompter, &expressions).unwrap_err();

        assert_eq!(err.downcast_ref::<MeasureError>().unwrap().code(), MB0301);
    }
}
