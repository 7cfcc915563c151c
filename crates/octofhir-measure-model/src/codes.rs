//! Code systems and extension URLs used in measure bundles

pub const MEASURE_POPULATION_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/measure-population";
pub const MEASURE_SCORING_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/measure-scoring";
pub const COMPOSITE_SCORING_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/composite-measure-scoring";
pub const IMPROVEMENT_NOTATION_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/measure-improvement-notation";
pub const LIBRARY_TYPE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/library-type";

pub const POPULATION_BASIS_EXT: &str =
    "http://hl7.org/fhir/us/cqfm/StructureDefinition/cqfm-populationBasis";
pub const SCORING_EXT: &str = "http://hl7.org/fhir/us/cqfm/StructureDefinition/cqfm-scoring";
pub const IMPROVEMENT_NOTATION_EXT: &str =
    "http://hl7.org/fhir/us/cqfm/StructureDefinition/cqfm-improvementNotation";
pub const CRITERIA_REFERENCE_EXT: &str =
    "http://hl7.org/fhir/us/cqfm/StructureDefinition/cqfm-criteriaReference";
pub const GROUP_ID_EXT: &str = "http://hl7.org/fhir/us/cqfm/StructureDefinition/cqfm-groupId";
pub const WEIGHT_EXT: &str = "http://hl7.org/fhir/us/cqfm/StructureDefinition/cqfm-weight";

pub const LOGIC_LIBRARY: &str = "logic-library";

pub const ELM_JSON_CONTENT_TYPE: &str = "application/elm+json";
pub const CQL_CONTENT_TYPE: &str = "text/cql";
pub const CQL_IDENTIFIER_LANGUAGE: &str = "text/cql-identifier";

pub const DEPENDS_ON: &str = "depends-on";
pub const COMPOSED_OF: &str = "composed-of";
