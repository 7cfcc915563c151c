//! Measure resource construction

use octofhir_measure_criteria::{GroupInfo, PopulationCode, UniqueId};
use octofhir_measure_deps::library_resource_id;
use octofhir_measure_elm::LibraryIdentifier;
use octofhir_measure_model::codes::{
    CRITERIA_REFERENCE_EXT, IMPROVEMENT_NOTATION_EXT, IMPROVEMENT_NOTATION_SYSTEM,
    MEASURE_POPULATION_SYSTEM, MEASURE_SCORING_SYSTEM, POPULATION_BASIS_EXT, SCORING_EXT,
};
use octofhir_measure_model::{
    canonical_url, CodeableConcept, Expression, Extension, Measure, MeasureGroup,
    MeasureGroupPopulation,
};

/// FHIR resource id of the Measure generated for a main library
pub fn measure_resource_id(library_id: &str) -> String {
    format!("measure-{}", library_id)
}

/// Measure whose logic lives in the main library's Library resource.
///
/// Groups follow `groups` order. Measure-level scoring and improvement
/// notation are set only when every group agrees on them.
pub fn build_measure(
    main_library: &LibraryIdentifier,
    groups: &[GroupInfo],
    canonical_base: &str,
) -> Measure {
    let id = measure_resource_id(&main_library.id);
    let library_url = canonical_url(
        canonical_base,
        "Library",
        &library_resource_id(&main_library.id),
    );

    let scoring = shared(groups, |g| g.scoring.code())
        .map(|code| CodeableConcept::from_code(MEASURE_SCORING_SYSTEM, code));
    let improvement_notation = shared(groups, |g| g.improvement_notation.code())
        .map(|code| CodeableConcept::from_code(IMPROVEMENT_NOTATION_SYSTEM, code));

    Measure {
        url: Some(canonical_url(canonical_base, "Measure", &id)),
        id: Some(id),
        version: main_library.version.clone(),
        name: Some(main_library.id.clone()),
        status: Some("draft".to_string()),
        library: vec![library_url],
        scoring,
        improvement_notation,
        group: groups.iter().map(build_group).collect(),
        ..Default::default()
    }
}

fn shared(groups: &[GroupInfo], key: impl Fn(&GroupInfo) -> &'static str) -> Option<&'static str> {
    let first = key(groups.first()?);
    groups.iter().all(|g| key(g) == first).then_some(first)
}

/// One `Measure.group` with a fresh id.
///
/// Populations are emitted in population code order, one per entry, and
/// carry a criteriaReference extension when they observe another entry.
pub fn build_group(info: &GroupInfo) -> MeasureGroup {
    let extension = vec![
        Extension::code(POPULATION_BASIS_EXT, info.population_basis.clone()),
        Extension::codeable_concept(
            SCORING_EXT,
            CodeableConcept::from_code(MEASURE_SCORING_SYSTEM, info.scoring.code()),
        ),
        Extension::codeable_concept(
            IMPROVEMENT_NOTATION_EXT,
            CodeableConcept::from_code(
                IMPROVEMENT_NOTATION_SYSTEM,
                info.improvement_notation.code(),
            ),
        ),
    ];

    let population = info
        .criteria
        .entries()
        .map(|(code, entry)| {
            build_population(
                code,
                &entry.id,
                &entry.criteria_expression,
                entry.observing_population_id.as_ref(),
            )
        })
        .collect();

    MeasureGroup {
        id: Some(UniqueId::generate().to_string()),
        extension,
        population,
        ..Default::default()
    }
}

fn build_population(
    code: PopulationCode,
    id: &UniqueId,
    expression: &str,
    observing: Option<&UniqueId>,
) -> MeasureGroupPopulation {
    let extension = observing
        .map(|target| vec![Extension::string(CRITERIA_REFERENCE_EXT, target.as_str())])
        .unwrap_or_default();

    MeasureGroupPopulation {
        id: Some(id.to_string()),
        extension,
        code: Some(CodeableConcept::from_code(MEASURE_POPULATION_SYSTEM, code.code())),
        criteria: Some(Expression::cql_identifier(expression)),
        ..Default::default()
    }
}
