//! End-to-end bundle command tests
//!
//! Covers:
//! - CQL input with a dependency directory and a canned translator
//! - ELM input without translation
//! - Value set directory matching and failures

use async_trait::async_trait;
use octofhir_measure::cli::bundle::bundle;
use octofhir_measure::cli::config::{BundleConfig, DependencyInput, MainInput, ValueSetMode};
use octofhir_measure::cli::translator::{TranslationRequest, Translator};
use octofhir_measure::criteria::{
    build_simple_criteria, GroupCriteria, GroupInfo, PopulationCode, ScoringCode,
};
use octofhir_measure::diagnostics::{MeasureError, MB0100, MB0401};
use octofhir_measure::model::codes::{CQL_CONTENT_TYPE, ELM_JSON_CONTENT_TYPE};
use octofhir_measure::model::{BundleResource, Resource};
use octofhir_measure::LibraryDocument;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const MAIN_CQL: &str = "library Main version '1.0.0'\n\
using FHIR version '4.0.1'\n\
include Helpers version '2.0.0' called H\n\
valueset \"Encounters\": 'http://example.com/ValueSet/encounters'\n\
define \"IPP\": true\n\
define \"Denom\": true\n\
define \"Numer\": true\n";

const HELPERS_CQL: &str = "library Helpers version '2.0.0'\ndefine \"X\": 1\n";

const UNUSED_CQL: &str = "library Unused version '1.0.0'\n";

const MAIN_ELM: &str = r#"{"library":{"identifier":{"id":"Main","version":"1.0.0"},
"includes":{"def":[{"localIdentifier":"H","path":"Helpers","version":"2.0.0"}]},
"valueSets":{"def":[{"name":"Encounters","id":"http://example.com/ValueSet/encounters"}]}}}"#;

const HELPERS_ELM: &str = r#"{"library":{"identifier":{"id":"Helpers","version":"2.0.0"}}}"#;

/// Returns canned documents for the requested libraries
struct CannedTranslator {
    documents: BTreeMap<&'static str, &'static str>,
    requested: Mutex<Vec<String>>,
}

impl CannedTranslator {
    fn new() -> Self {
        Self {
            documents: BTreeMap::from([("Main", MAIN_ELM), ("Helpers", HELPERS_ELM)]),
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Translator for CannedTranslator {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> octofhir_measure::Result<BTreeMap<String, LibraryDocument>> {
        let mut result = BTreeMap::new();
        for name in request.names() {
            self.requested.lock().unwrap().push(name.to_string());
            let elm = self.documents[name];
            result.insert(name.to_string(), LibraryDocument::from_json(elm)?);
        }
        Ok(result)
    }
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn groups() -> Vec<GroupInfo> {
    let mut criteria = GroupCriteria::new();
    criteria.merge(
        build_simple_criteria(PopulationCode::InitialPopulation, vec!["IPP".to_string()]).unwrap(),
    );
    criteria.merge(build_simple_criteria(PopulationCode::Denominator, "Denom").unwrap());
    criteria.merge(build_simple_criteria(PopulationCode::Numerator, "Numer").unwrap());
    vec![GroupInfo::new(ScoringCode::Proportion, criteria)]
}

fn value_set_dir(dir: &Path) -> PathBuf {
    write(
        dir,
        "valuesets/encounters.json",
        r#"{"resourceType":"ValueSet","id":"encounters","url":"http://example.com/ValueSet/encounters","status":"active"}"#,
    );
    dir.join("valuesets")
}

#[tokio::test]
async fn test_cql_bundle_with_dependency_directory() {
    let dir = tempfile::tempdir().unwrap();
    let main = write(dir.path(), "cql/Main.cql", MAIN_CQL);
    write(dir.path(), "cql/Helpers.cql", HELPERS_CQL);
    write(dir.path(), "cql/Unused.cql", UNUSED_CQL);

    let mut config = BundleConfig::new(MainInput::Cql(main));
    config.dependencies = DependencyInput::Directory(dir.path().join("cql"));
    config.value_sets = ValueSetMode::Directory(value_set_dir(dir.path()));
    let translator = CannedTranslator::new();

    let bundle = bundle(&config, &groups(), &translator).await.unwrap();

    assert_eq!(
        *translator.requested.lock().unwrap(),
        vec!["Helpers".to_string(), "Main".to_string()]
    );

    let requests: Vec<_> = bundle
        .entries()
        .iter()
        .map(|e| e.request.as_ref().unwrap().url.clone())
        .collect();
    assert_eq!(
        requests,
        vec![
            "Measure/measure-Main",
            "Library/library-Main",
            "Library/library-Helpers",
            "ValueSet/encounters",
        ]
    );

    match bundle.entries()[1].resource.as_ref().unwrap() {
        BundleResource::Known(Resource::Library(library)) => {
            let types: Vec<_> = library
                .content
                .iter()
                .map(|c| c.content_type.as_deref().unwrap())
                .collect();
            assert_eq!(types, vec![CQL_CONTENT_TYPE, ELM_JSON_CONTENT_TYPE]);
        }
        other => panic!("expected Library, got {:?}", other),
    }
}

#[tokio::test]
async fn test_elm_bundle_without_translation() {
    let dir = tempfile::tempdir().unwrap();
    let main = write(dir.path(), "elm/Main.json", MAIN_ELM);
    let helpers = write(dir.path(), "elm/Helpers.json", HELPERS_ELM);

    let mut config = BundleConfig::new(MainInput::Elm(main));
    config.dependencies = DependencyInput::Files(vec![helpers]);
    config.value_sets = ValueSetMode::Disabled;
    let translator = CannedTranslator::new();

    let bundle = bundle(&config, &groups(), &translator).await.unwrap();

    assert!(translator.requested.lock().unwrap().is_empty());
    assert_eq!(bundle.entries().len(), 3);
    match bundle.entries()[2].resource.as_ref().unwrap() {
        BundleResource::Known(Resource::Library(library)) => {
            assert_eq!(library.content.len(), 1);
            assert_eq!(
                library.content[0].content_type.as_deref(),
                Some(ELM_JSON_CONTENT_TYPE)
            );
        }
        other => panic!("expected Library, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unmatched_value_sets() {
    let dir = tempfile::tempdir().unwrap();
    let main = write(dir.path(), "elm/Main.json", MAIN_ELM);
    let helpers = write(dir.path(), "elm/Helpers.json", HELPERS_ELM);
    write(
        dir.path(),
        "valuesets/other.json",
        r#"{"resourceType":"ValueSet","id":"other","url":"http://example.com/ValueSet/other"}"#,
    );

    let mut config = BundleConfig::new(MainInput::Elm(main));
    config.dependencies = DependencyInput::Files(vec![helpers]);
    config.value_sets = ValueSetMode::Directory(dir.path().join("valuesets"));

    let err = bundle(&config, &groups(), &CannedTranslator::new())
        .await
        .unwrap_err();

    let err = err.downcast_ref::<MeasureError>().unwrap();
    assert_eq!(err.code(), MB0401);
    assert!(err.to_string().contains("http://example.com/ValueSet/encounters"));
}

#[tokio::test]
async fn test_missing_dependency_source() {
    let dir = tempfile::tempdir().unwrap();
    let main = write(dir.path(), "cql/Main.cql", MAIN_CQL);

    let mut config = BundleConfig::new(MainInput::Cql(main));
    config.value_sets = ValueSetMode::Disabled;

    let err = bundle(&config, &groups(), &CannedTranslator::new())
        .await
        .unwrap_err();

    assert_eq!(err.downcast_ref::<MeasureError>().unwrap().code(), MB0100);
}
