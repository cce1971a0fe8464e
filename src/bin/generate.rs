//! Fieldset Code Generator CLI
//!
//! Loads fieldset definitions, builds the type graph and runs the selected
//! generators, writing `<output>/<generator>.<extension>` for each.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fieldset_graph::codegen::{output_path, write_output};
use fieldset_graph::{
    discover_sources, load_sources, GenConfig, GenContext, Namespace, Registry,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fieldset-gen")]
#[command(about = "Generate typed code from dot-addressed fieldset schemas")]
struct Cli {
    /// Config file layered over the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of *.yml fieldset definitions
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Directory generated files are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Generator to run (repeatable; replaces the configured list)
    #[arg(short, long = "generator")]
    generators: Vec<String>,

    /// Only admit fields whose flat name matches (repeatable)
    #[arg(long)]
    allow: Vec<String>,

    /// Drop fields whose flat name matches (repeatable)
    #[arg(long)]
    deny: Vec<String>,

    /// Extra acronym to preserve when casing names (repeatable)
    #[arg(long = "acronym")]
    acronyms: Vec<String>,

    /// Continue with the sources that loaded when some fail
    #[arg(long)]
    allow_partial: bool,

    /// List available generators and exit
    #[arg(long)]
    list_generators: bool,

    /// Run generators without writing files
    #[arg(long)]
    dry_run: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let registry = Registry::with_builtins();

    if cli.list_generators {
        for generator in registry.iter() {
            println!(
                "{:<8} .{:<5} {}",
                generator.id(),
                generator.extension(),
                generator.description()
            );
        }
        return Ok(());
    }

    let config = apply_overrides(
        GenConfig::load_from(cli.config.as_deref()).context("loading configuration")?,
        &cli,
    );
    config.validate().context("invalid configuration")?;

    // fail on bad generator ids or settings before touching any source
    let settings = config.generator_settings();
    for id in &config.output.generators {
        registry.get(id)?.validate(&settings)?;
    }

    let source_dir = config
        .source
        .dir
        .as_deref()
        .context("no source directory configured")?;
    let sources = discover_sources(source_dir)?;
    info!(sources = sources.len(), dir = %source_dir.display(), "loading fieldsets");

    let definitions = match load_sources(&sources) {
        Ok(definitions) => definitions,
        Err(failure) if cli.allow_partial => {
            warn!(
                failed = failure.errors().len(),
                loaded = failure.partial().len(),
                "continuing with partially loaded definitions"
            );
            failure.into_partial()
        }
        Err(failure) => return Err(failure.into()),
    };

    let namespace = Namespace::build(&definitions, &config.field_filter()?)
        .context("building type graph")?;
    info!(types = namespace.len(), "type graph ready");

    let casing = config.casing();
    let ctx = GenContext::new(&namespace, &casing, &settings);

    for id in &config.output.generators {
        let generator = registry.get(id)?;
        let content = registry
            .generate(id, &ctx)
            .with_context(|| format!("running generator '{}'", id))?;

        if cli.dry_run {
            println!(
                "would write {} ({} bytes)",
                output_path(&config.output.dir, generator).display(),
                content.len()
            );
        } else {
            let path = write_output(&config.output.dir, generator, &content)?;
            println!("wrote {}", path.display());
        }
    }

    Ok(())
}

/// Command-line values win over the config file
fn apply_overrides(mut config: GenConfig, cli: &Cli) -> GenConfig {
    if let Some(dir) = &cli.source_dir {
        config.source.dir = Some(dir.clone());
    }
    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.clone();
    }
    if !cli.generators.is_empty() {
        config.output.generators = cli.generators.clone();
    }
    if !cli.allow.is_empty() {
        config.filter.allow = cli.allow.clone();
    }
    if !cli.deny.is_empty() {
        config.filter.deny = cli.deny.clone();
    }
    config.naming.acronyms.extend(cli.acronyms.iter().cloned());
    config
}
