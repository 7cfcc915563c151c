//! Measure bundler command-line interface

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use octofhir_measure::cli::config::{
    BundleConfig, DependencyInput, MainInput, ValueSetMode, DEFAULT_CANONICAL_BASE,
    DEFAULT_DEBUG_DIR, DEFAULT_OUTPUT, DEFAULT_TRANSLATOR_URL,
};
use octofhir_measure::cli::composite::{parse_component_value, ComponentValue};
use octofhir_measure::cli::populations::{
    parse_composite_scoring, parse_improvement_notation, parse_scoring, PopulationFlags,
};
use octofhir_measure::cli::{bundle, combine, composite, interactive, output};
use octofhir_measure::criteria::{CompositeScoring, ImprovementNotation, ScoringCode};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// FHIR Measure Bundle generator
#[derive(Parser)]
#[command(name = "measure-bundler")]
#[command(author, version, about = "Generate FHIR Measure Bundles from CQL measure logic", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(long, global = true)]
    verbose: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    /// Print a table of the written bundle's entries
    #[arg(long, global = true)]
    summary: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a measure bundle from a main library and its dependencies
    Bundle(Box<BundleArgs>),

    /// Merge the groups of several measure bundles into one measure
    CombineGroups {
        /// Measure bundles to combine; the first provides everything but the groups
        #[arg(required = true, num_args = 2..)]
        bundles: Vec<PathBuf>,

        /// Path to output file
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        out: PathBuf,
    },

    /// Build a composite measure over component measure bundles
    MakeComposite {
        /// Component measure bundles
        #[arg(required = true)]
        bundles: Vec<PathBuf>,

        /// Composite scoring (opportunity, all-or-nothing, linear, weighted)
        #[arg(long, value_parser = parse_composite_scoring)]
        composite_scoring: CompositeScoring,

        /// Group id of a component measure: `<id>` in bundle order, or `<n>=<id>` for bundle n
        #[arg(long = "component-group-id", value_parser = parse_component_value::<String>)]
        component_group_ids: Vec<ComponentValue<String>>,

        /// Weight of a component measure: `<weight>` in bundle order, or `<n>=<weight>` for bundle n
        #[arg(long = "component-weight", value_parser = parse_component_value::<Decimal>)]
        component_weights: Vec<ComponentValue<Decimal>>,

        /// Id of the composite Measure (default: generated)
        #[arg(long)]
        id: Option<String>,

        /// Base URL for canonical URLs
        #[arg(long, default_value = DEFAULT_CANONICAL_BASE)]
        canonical_base: String,

        /// Path to output file
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        out: PathBuf,
    },
}

#[derive(Args)]
struct BundleArgs {
    /// Main CQL library
    #[arg(short = 'c', long)]
    cql_file: Option<PathBuf>,

    /// Main compiled ELM JSON library
    #[arg(short = 'e', long)]
    elm_file: Option<PathBuf>,

    /// CQL or ELM dependency files of the main library
    #[arg(long, num_args = 1..)]
    deps: Vec<PathBuf>,

    /// Directory containing all dependent CQL or ELM files
    #[arg(long)]
    deps_directory: Option<PathBuf>,

    /// Directory containing the ValueSet resources the libraries reference
    #[arg(short = 'v', long)]
    valuesets: Option<PathBuf>,

    /// Disable ValueSet resolution and bundling
    #[arg(long)]
    no_valuesets: bool,

    /// Path to output file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    out: PathBuf,

    /// URL of the CQL translation service
    #[arg(short = 'u', long, env = "TRANSLATOR_URL", default_value = DEFAULT_TRANSLATOR_URL)]
    translator_url: String,

    /// Base URL for canonical URLs of Library and Measure resources
    #[arg(long, default_value = DEFAULT_CANONICAL_BASE)]
    canonical_base: String,

    /// Write compiled libraries to ./debug
    #[arg(long)]
    debug: bool,

    /// Prompt for groups and populations
    #[arg(long)]
    interactive: bool,

    /// Measure scoring code
    #[arg(short = 's', long, default_value = "proportion", value_parser = parse_scoring)]
    scoring_code: ScoringCode,

    /// Measure improvement notation
    #[arg(long, default_value = "increase", value_parser = parse_improvement_notation)]
    improvement_notation: ImprovementNotation,

    /// Population basis
    #[arg(long, default_value = "boolean")]
    basis: String,

    /// "initial-population" expression(s)
    #[arg(long, num_args = 1..)]
    ipop: Vec<String>,

    /// "numerator" expression
    #[arg(long)]
    numer: Option<String>,

    /// "numerator-exclusion" expression
    #[arg(long)]
    numex: Option<String>,

    /// "denominator" expression
    #[arg(long)]
    denom: Option<String>,

    /// "denominator-exclusion" expression
    #[arg(long)]
    denex: Option<String>,

    /// "denominator-exception" expression
    #[arg(long)]
    denexcep: Option<String>,

    /// "measure-population" expression
    #[arg(long)]
    msrpopl: Option<String>,

    /// "measure-population-exclusion" expression
    #[arg(long)]
    msrpoplex: Option<String>,

    /// "measure-observation" expression(s)
    #[arg(long, num_args = 1..)]
    msrobs: Vec<String>,

    /// Initial population expression the numerator draws from
    #[arg(long)]
    numer_ipop_ref: Option<String>,

    /// Initial population expression the denominator draws from
    #[arg(long)]
    denom_ipop_ref: Option<String>,

    /// Population expression each measure observation observes, in --msrobs order
    #[arg(long, num_args = 1..)]
    msrobs_ref: Vec<String>,
}

impl BundleArgs {
    fn population_flags(&self) -> PopulationFlags {
        PopulationFlags {
            ipop: self.ipop.clone(),
            numer: self.numer.clone(),
            numex: self.numex.clone(),
            denom: self.denom.clone(),
            denex: self.denex.clone(),
            denexcep: self.denexcep.clone(),
            msrpopl: self.msrpopl.clone(),
            msrpoplex: self.msrpoplex.clone(),
            msrobs: self.msrobs.clone(),
            numer_ipop_ref: self.numer_ipop_ref.clone(),
            denom_ipop_ref: self.denom_ipop_ref.clone(),
            msrobs_ref: self.msrobs_ref.clone(),
            scoring: self.scoring_code,
            improvement_notation: self.improvement_notation,
            basis: self.basis.clone(),
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

async fn run_bundle(args: BundleArgs, summary: bool) -> Result<()> {
    let main = MainInput::from_flags(args.cql_file.clone(), args.elm_file.clone())?;

    let groups = if args.interactive {
        let MainInput::Cql(path) = &main else {
            bail!("--interactive requires -c/--cql-file");
        };
        interactive::run(path)?
    } else {
        vec![args.population_flags().into_group_info()?]
    };
    debug!(groups = groups.len(), "Collected measure groups");

    let config = BundleConfig {
        main,
        dependencies: DependencyInput::from_flags(args.deps, args.deps_directory)?,
        value_sets: ValueSetMode::from_flags(args.valuesets, args.no_valuesets)?,
        canonical_base: args.canonical_base,
        translator_url: args.translator_url,
        output: args.out,
        debug_dir: args.debug.then(|| PathBuf::from(DEFAULT_DEBUG_DIR)),
        summary,
    };

    bundle::run(config, groups).await
}

#[tokio::main]
async fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Bundle(args) => run_bundle(*args, cli.summary).await,

        Commands::CombineGroups { bundles, out } => {
            let config = combine::CombineConfig {
                bundles,
                output: out,
                summary: cli.summary,
            };
            combine::run(config).await
        }

        Commands::MakeComposite {
            bundles,
            composite_scoring,
            component_group_ids,
            component_weights,
            id,
            canonical_base,
            out,
        } => {
            let config = composite::CompositeConfig {
                bundles,
                output: out,
                composite_scoring,
                canonical_base,
                id,
                group_ids: component_group_ids,
                weights: component_weights,
                summary: cli.summary,
            };
            composite::run(config).await
        }
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
