//! Run configuration built from command-line flags

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_CANONICAL_BASE: &str = "http://example.com";
pub const DEFAULT_TRANSLATOR_URL: &str = "http://localhost:8080/cql/translator";
pub const DEFAULT_OUTPUT: &str = "./measure-bundle.json";
pub const DEFAULT_DEBUG_DIR: &str = "./debug";

/// The main library input, either CQL source or a compiled ELM document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainInput {
    Cql(PathBuf),
    Elm(PathBuf),
}

impl MainInput {
    /// Exactly one of the two flags must be given
    pub fn from_flags(cql_file: Option<PathBuf>, elm_file: Option<PathBuf>) -> Result<Self> {
        match (cql_file, elm_file) {
            (Some(cql), None) => Ok(Self::Cql(cql)),
            (None, Some(elm)) => Ok(Self::Elm(elm)),
            (Some(_), Some(_)) => bail!("Only one of --cql-file and --elm-file may be provided"),
            (None, None) => bail!("One of --cql-file or --elm-file must be provided"),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Cql(path) | Self::Elm(path) => path,
        }
    }

    /// Extension dependency files must share with the main input
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Cql(_) => "cql",
            Self::Elm(_) => "json",
        }
    }

    pub fn is_cql(&self) -> bool {
        matches!(self, Self::Cql(_))
    }
}

/// Where dependency libraries come from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DependencyInput {
    Files(Vec<PathBuf>),
    Directory(PathBuf),
    #[default]
    None,
}

impl DependencyInput {
    pub fn from_flags(deps: Vec<PathBuf>, deps_directory: Option<PathBuf>) -> Result<Self> {
        match (deps.is_empty(), deps_directory) {
            (true, None) => Ok(Self::None),
            (false, None) => Ok(Self::Files(deps)),
            (true, Some(dir)) => Ok(Self::Directory(dir)),
            (false, Some(_)) => bail!("Only one of --deps and --deps-directory may be provided"),
        }
    }
}

/// How referenced value sets are resolved
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValueSetMode {
    Directory(PathBuf),
    Disabled,
    #[default]
    Unspecified,
}

impl ValueSetMode {
    pub fn from_flags(valuesets: Option<PathBuf>, no_valuesets: bool) -> Result<Self> {
        match (valuesets, no_valuesets) {
            (Some(dir), false) => Ok(Self::Directory(dir)),
            (None, true) => Ok(Self::Disabled),
            (None, false) => Ok(Self::Unspecified),
            (Some(_), true) => bail!("Only one of --valuesets and --no-valuesets may be provided"),
        }
    }
}

/// Configuration for the bundle command
#[derive(Debug, Clone)]
pub struct BundleConfig {
    pub main: MainInput,
    pub dependencies: DependencyInput,
    pub value_sets: ValueSetMode,
    pub canonical_base: String,
    pub translator_url: String,
    pub output: PathBuf,
    /// Directory compiled documents are written to, when set
    pub debug_dir: Option<PathBuf>,
    pub summary: bool,
}

impl BundleConfig {
    /// Configuration with defaults for everything but the main input
    pub fn new(main: MainInput) -> Self {
        Self {
            main,
            dependencies: DependencyInput::None,
            value_sets: ValueSetMode::Unspecified,
            canonical_base: DEFAULT_CANONICAL_BASE.to_string(),
            translator_url: DEFAULT_TRANSLATOR_URL.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            debug_dir: None,
            summary: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_input_requires_exactly_one() {
        assert_eq!(
            MainInput::from_flags(Some("a.cql".into()), None).unwrap(),
            MainInput::Cql("a.cql".into())
        );
        assert!(MainInput::from_flags(None, None).is_err());
        assert!(MainInput::from_flags(Some("a.cql".into()), Some("a.json".into())).is_err());
        assert_eq!(MainInput::Elm("a.json".into()).extension(), "json");
    }

    #[test]
    fn test_dependency_input() {
        assert_eq!(DependencyInput::from_flags(vec![], None).unwrap(), DependencyInput::None);
        assert_eq!(
            DependencyInput::from_flags(vec![], Some("deps".into())).unwrap(),
            DependencyInput::Directory("deps".into())
        );
        assert!(DependencyInput::from_flags(vec!["a.cql".into()], Some("deps".into())).is_err());
    }

    #[test]
    fn test_value_set_mode() {
        assert_eq!(ValueSetMode::from_flags(None, true).unwrap(), ValueSetMode::Disabled);
        assert_eq!(ValueSetMode::from_flags(None, false).unwrap(), ValueSetMode::Unspecified);
        assert!(ValueSetMode::from_flags(Some("vs".into()), true).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = BundleConfig::new(MainInput::Cql("main.cql".into()));

        assert_eq!(config.canonical_base, DEFAULT_CANONICAL_BASE);
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert!(config.debug_dir.is_none());
    }
}
