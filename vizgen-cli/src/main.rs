//! VizGen CLI — generation, enum listing, and input validation commands.
//!
//! Commands:
//! - `generate` — run candidate generation from a TOML config file or inline flags
//! - `enums` — list the values a property can take, with popularity weights
//! - `validate` — check distribution/definitions/schema files without running

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use vizgen_core::distribution::{Definitions, Distributions};
use vizgen_core::domain::Property;
use vizgen_core::schema::DataSchema;
use vizgen_runner::{save_artifacts, GenerationConfig, GenerationReport};

#[derive(Parser)]
#[command(
    name = "vizgen",
    about = "VizGen CLI — chart-spec candidate generator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run candidate generation from a TOML config file or inline flags.
    Generate {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Properties to mutate over, outermost first (e.g. mark,channel).
        #[arg(long, value_delimiter = ',')]
        props: Vec<String>,

        /// Encodings per base spec.
        #[arg(long, default_value_t = 1)]
        dimensions: usize,

        /// Number of base specs to expand.
        #[arg(long, default_value_t = 1)]
        interactions: usize,

        /// Master seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Popularity distribution table (JSON). Defaults to the built-in table.
        #[arg(long)]
        distributions: Option<PathBuf>,

        /// Top-level/encoding property split (JSON). Defaults to mark + encoding props.
        #[arg(long)]
        definitions: Option<PathBuf>,

        /// Dataset schema to validate against (JSON). Defaults to a synthetic schema.
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Expand interactions on the rayon thread pool.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Output directory for artifacts.
        #[arg(long, default_value = "runs")]
        output_dir: PathBuf,
    },
    /// List the enum values a property can take, with popularity weights.
    Enums {
        /// Property name: mark, channel, type, aggregate, bin, scale.
        property: String,

        /// Popularity distribution table (JSON). Defaults to the built-in table.
        #[arg(long)]
        distributions: Option<PathBuf>,
    },
    /// Check distribution/definitions/schema files without running generation.
    Validate {
        /// Popularity distribution table (JSON).
        #[arg(long)]
        distributions: Option<PathBuf>,

        /// Top-level/encoding property split (JSON).
        #[arg(long)]
        definitions: Option<PathBuf>,

        /// Dataset schema (JSON).
        #[arg(long)]
        schema: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            props,
            dimensions,
            interactions,
            seed,
            distributions,
            definitions,
            schema,
            parallel,
            output_dir,
        } => run_generate(
            config,
            props,
            dimensions,
            interactions,
            seed,
            distributions,
            definitions,
            schema,
            parallel,
            output_dir,
        ),
        Commands::Enums {
            property,
            distributions,
        } => run_enums(&property, distributions),
        Commands::Validate {
            distributions,
            definitions,
            schema,
        } => run_validate(distributions, definitions, schema),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_generate(
    config_path: Option<PathBuf>,
    props: Vec<String>,
    dimensions: usize,
    interactions: usize,
    seed: u64,
    distributions: Option<PathBuf>,
    definitions: Option<PathBuf>,
    schema: Option<PathBuf>,
    parallel: bool,
    output_dir: PathBuf,
) -> Result<()> {
    // Validate mutually exclusive options
    if config_path.is_some() && !props.is_empty() {
        bail!("--config and --props are mutually exclusive");
    }

    let config = if let Some(path) = config_path {
        GenerationConfig::from_file(&path)?
    } else {
        let mut config = GenerationConfig::default();
        if !props.is_empty() {
            config.generation.properties = parse_props(&props)?;
        }
        config.generation.dimensions = dimensions;
        config.generation.interactions = interactions;
        config.generation.seed = seed;
        config.generation.parallel = parallel;
        config.paths.distributions = distributions;
        config.paths.definitions = definitions;
        config.paths.data_schema = schema;
        config
    };

    let report = vizgen_runner::run_generation(&config)?;

    print_summary(&report);

    // Save full artifact set (manifest.json, specs.json, summary.csv)
    let run_dir = save_artifacts(&report, &output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

fn parse_props(names: &[String]) -> Result<Vec<Property>> {
    names
        .iter()
        .map(|name| {
            name.parse::<Property>().map_err(|_| {
                anyhow::anyhow!(
                    "unknown property '{name}'. Valid: mark, channel, type, aggregate, bin, scale"
                )
            })
        })
        .collect()
}

fn run_enums(property_name: &str, distributions_path: Option<PathBuf>) -> Result<()> {
    let property = parse_props(&[property_name.to_string()])?[0];
    let distributions = match distributions_path {
        Some(path) => Distributions::from_path(&path)?,
        None => Distributions::default_table(),
    };

    let Some(dist) = distributions.get(property) else {
        bail!("no distribution declared for property '{property}'");
    };

    println!("Property:  {property}");
    println!("Inclusion: {:.2}", dist.probability);
    println!();
    println!("{:<16} {:>8}", "Value", "Weight");
    println!("{}", "-".repeat(25));
    for value in &dist.values {
        println!("{:<16} {:>8.2}", value.name, value.probability);
    }

    Ok(())
}

fn run_validate(
    distributions_path: Option<PathBuf>,
    definitions_path: Option<PathBuf>,
    schema_path: Option<PathBuf>,
) -> Result<()> {
    if distributions_path.is_none() && definitions_path.is_none() && schema_path.is_none() {
        bail!("nothing to validate: pass --distributions, --definitions, or --schema");
    }

    let mut failed = false;

    let distributions = match &distributions_path {
        Some(path) => {
            // Construction runs the weight and inclusion checks.
            match Distributions::from_path(path) {
                Ok(table) => {
                    println!(
                        "distributions OK: {} ({} properties)",
                        path.display(),
                        table.properties().count()
                    );
                    Some(table)
                }
                Err(err) => {
                    eprintln!("distributions INVALID: {}: {err}", path.display());
                    failed = true;
                    None
                }
            }
        }
        None => None,
    };

    if let Some(path) = &definitions_path {
        // The split is checked against the explicit table when one was given,
        // otherwise against the built-in table.
        let table = distributions.unwrap_or_else(Distributions::default_table);
        match Definitions::from_path(path).and_then(|defs| {
            table.validate_definitions(&defs)?;
            Ok(defs)
        }) {
            Ok(defs) => println!(
                "definitions OK: {} ({} top-level, {} encoding)",
                path.display(),
                defs.top_level_props.len(),
                defs.encoding_props.len()
            ),
            Err(err) => {
                eprintln!("definitions INVALID: {}: {err}", path.display());
                failed = true;
            }
        }
    }

    if let Some(path) = &schema_path {
        match DataSchema::from_path(path) {
            Ok(schema) => {
                let validation = schema.validate();
                if validation.is_valid {
                    println!("schema OK: {} ({} fields)", path.display(), schema.len());
                } else {
                    for error in &validation.errors {
                        eprintln!("schema INVALID: {}: {error}", path.display());
                    }
                    failed = true;
                }
            }
            Err(err) => {
                eprintln!("schema INVALID: {}: {err}", path.display());
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

fn print_summary(report: &GenerationReport) {
    let properties: Vec<String> = report.properties.iter().map(|p| p.to_string()).collect();

    println!();
    println!("=== Generation Run ===");
    println!("Run ID:        {}", &report.run_id[..report.run_id.len().min(12)]);
    println!("Seed:          {}", report.seed);
    println!("Dimensions:    {}", report.dimensions);
    println!("Properties:    {}", properties.join(", "));
    println!("Interactions:  {}", report.interactions.len());
    println!();
    println!("--- Results ---");
    println!("Leaves:        {}", report.totals.leaves);
    println!("Accepted:      {}", report.totals.accepted);
    println!("Rejected:      {}", report.totals.rejected);
    if report.totals.leaves > 0 {
        println!(
            "Acceptance:    {:.1}%",
            report.totals.accepted as f64 / report.totals.leaves as f64 * 100.0
        );
    }
    println!();
    println!("{:<12} {:>7} {:>9} {:>9}", "Interaction", "Leaves", "Accepted", "Rejected");
    println!("{}", "-".repeat(40));
    for record in &report.interactions {
        println!(
            "{:<12} {:>7} {:>9} {:>9}",
            record.index,
            record.leaves,
            record.accepted,
            record.rejected()
        );
    }

    if let Some(sample) = report.accepted_specs().next() {
        if let Ok(json) = serde_json::to_string_pretty(sample) {
            println!();
            println!("--- First Accepted Spec ---");
            println!("{json}");
        }
    }
    println!();
}
