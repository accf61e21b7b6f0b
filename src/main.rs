use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rangeq::catalog::TagCatalog;
use rangeq::config::EngineConfig;
use rangeq::engine::{QueryEngine, Representation};
use rangeq::output;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Catalog used when neither the command line nor the config names one
const DEFAULT_BUILTIN: &str = "locomotion";

#[derive(Parser)]
#[command(name = "rangeq")]
#[command(about = "Boolean set-algebra queries over tagged frame ranges")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Tag grid file to load
    #[arg(long, global = true, conflicts_with = "builtin")]
    catalog: Option<PathBuf>,

    /// Built-in catalog to load (locomotion, gait, simple)
    #[arg(long, global = true)]
    builtin: Option<String>,

    /// JSON config file (also read from RANGEQ_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// When to use colors
    #[arg(long, global = true, value_enum, default_value = "auto")]
    color: ColorMode,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorMode {
    Auto,
    Never,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a query, e.g. `Running & Male & (Tired | Limping)`
    Query {
        /// Query text (joined with spaces); put text starting with '-' after `--`
        #[arg(required = true)]
        text: Vec<String>,

        /// Evaluate over bitmasks
        #[arg(long, conflicts_with = "ranges")]
        masks: bool,

        /// Evaluate over interval lists
        #[arg(long)]
        ranges: bool,

        /// Skip the result cache
        #[arg(long)]
        no_cache: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List tags with their entity and interval counts
    Tags,
    /// Render tags as timeline grids
    Show {
        /// Tag to render (all tags when omitted)
        tag: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = EngineConfig::load(cli.config.as_deref())?;
    let catalog = load_catalog(&cli, &config)?;
    let color = matches!(cli.color, ColorMode::Auto);

    match cli.command {
        Commands::Query {
            text,
            masks,
            ranges,
            no_cache,
            json,
        } => {
            if masks {
                config.representation = Representation::Masks;
            } else if ranges {
                config.representation = Representation::Ranges;
            }
            if no_cache {
                config.cache_enabled = false;
            }

            let query = text.join(" ");
            let mut engine = QueryEngine::new(catalog, config);
            let outcome = engine.query(&query);
            debug!(stats = ?engine.stats(), "session finished");

            if json {
                let mut stdout = std::io::stdout().lock();
                output::write_outcome_json(&mut stdout, &query, &outcome)?;
                stdout.flush()?;
            } else {
                let mut stdout = output::stdout(color);
                output::print_outcome(&mut stdout, engine.catalog(), &query, &outcome)?;
            }

            if outcome.error.is_some() {
                std::process::exit(1);
            }
        }
        Commands::Tags => {
            let mut stdout = output::stdout(color);
            output::print_tags(&mut stdout, &catalog)?;
        }
        Commands::Show { tag } => {
            let rows: Vec<(&str, _)> = match &tag {
                Some(name) => match catalog.range_set(name) {
                    Some(set) => vec![(name.as_str(), set)],
                    None => bail!("Unknown tag name: \"{}\"", name),
                },
                None => catalog
                    .names()
                    .iter()
                    .map(String::as_str)
                    .zip(catalog.range_sets())
                    .collect(),
            };
            let mut stdout = output::stdout(color);
            output::print_grid(&mut stdout, &catalog, &rows)?;
        }
    }

    Ok(())
}

/// Command line beats config, and a built-in catalog is the fallback
fn load_catalog(cli: &Cli, config: &EngineConfig) -> Result<TagCatalog> {
    if let Some(name) = &cli.builtin {
        return TagCatalog::builtin(name).context("Failed to load built-in catalog");
    }

    let path: Option<&Path> = cli.catalog.as_deref().or(config.catalog.as_deref());
    match path {
        Some(path) => TagCatalog::load(path),
        None => TagCatalog::builtin(DEFAULT_BUILTIN).context("Failed to load built-in catalog"),
    }
}
