use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use shimgen_generator::{ArtifactCategory, CancellationFlag, Diagnostic, GeneratedSource, Generator};
use std::path::{Path, PathBuf};

mod environment;
mod options;
mod output;

#[derive(Parser)]
#[command(name = "shimgen")]
#[command(about = "Generate the polyfill sources a target environment is missing", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Select and materialize artifacts for one environment snapshot
    Generate(GenerateArgs),

    /// List the artifacts a template set provides
    Catalog(CatalogArgs),

    /// Print the JSON schema of environment snapshots
    Schema,
}

#[derive(Args)]
struct GenerateArgs {
    /// Environment snapshot (JSON)
    #[arg(long)]
    env: PathBuf,

    /// Generation option, e.g. UsePublicAccessibility=true (repeatable)
    #[arg(long = "option", value_name = "KEY=VALUE")]
    options: Vec<String>,

    /// JSON object of generation options; --option values take precedence
    #[arg(long)]
    options_file: Option<PathBuf>,

    /// Template directory to use instead of the built-in templates
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Directory to write generated sources into
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CatalogArgs {
    /// Template directory to list instead of the built-in templates
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct CatalogEntry<'a> {
    id: &'a str,
    category: ArtifactCategory,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Catalog(args) => run_catalog(args),
        Commands::Schema => run_schema(),
    }
}

fn load_generator(templates: Option<&Path>) -> Result<Generator> {
    match templates {
        Some(dir) => Generator::from_template_dir(dir)
            .with_context(|| format!("Failed to load templates from {}", dir.display())),
        None => Ok(Generator::builtin()),
    }
}

/// Run one evaluation and emit its sources
fn run_generate(args: GenerateArgs) -> Result<()> {
    let snapshot = environment::load_snapshot(&args.env)?;
    let oracle = environment::oracle_from_snapshot(&snapshot);
    let raw_options = options::collect(args.options_file.as_deref(), &args.options)?;
    let generator = load_generator(args.templates.as_deref())?;

    let mut sources: Vec<GeneratedSource> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let summary = generator.evaluate(
        &raw_options,
        &oracle,
        &CancellationFlag::new(),
        &mut sources,
        &mut diagnostics,
    )?;

    for diagnostic in &diagnostics {
        if diagnostic.is_error() {
            log::error!("{diagnostic}");
        } else {
            log::warn!("{diagnostic}");
        }
    }

    if let Some(out_dir) = &args.out {
        output::write_sources(out_dir, &sources)?;
    }

    if args.json {
        let report = output::build_report(&sources, &diagnostics);
        println!("{}", shimgen_protocol::serialize_json(&report)?);
    } else {
        for source in &sources {
            println!("{}", source.name);
        }
        eprintln!(
            "Generated {} artifacts and {} type forwards ({} diagnostics)",
            summary.artifacts, summary.forwards, summary.diagnostics
        );
    }
    Ok(())
}

/// List catalog ids with their categories
fn run_catalog(args: CatalogArgs) -> Result<()> {
    let generator = load_generator(args.templates.as_deref())?;
    let catalog = generator.catalog();

    if args.json {
        let entries: Vec<_> = catalog
            .iter()
            .map(|candidate| CatalogEntry {
                id: &candidate.id,
                category: candidate.category,
            })
            .collect();
        println!("{}", shimgen_protocol::serialize_json(&entries)?);
    } else {
        for candidate in catalog.iter() {
            println!("{}\t{}", candidate.category, candidate.id);
        }
    }
    Ok(())
}

fn run_schema() -> Result<()> {
    let schema = shimgen_protocol::snapshot_schema()?;
    println!("{}", shimgen_protocol::serialize_json(&schema)?);
    Ok(())
}
