//! Reliquary CLI
//!
//! Command-line interface for converting decoded fragment tables to GLB
//! scenes, deriving model specs from existing containers, and rebuilding
//! the aggregate indices.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use reliquary_convert::{run_units, ConversionUnit};
use reliquary_export::{derive_model_spec, write_indices};
use reliquary_fragments::FragmentTable;

/// Reliquary - legacy MMO resource archive converter
#[derive(Parser)]
#[command(name = "reliquary")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert decoded fragment tables into a GLB output tree
    Convert(ConvertArgs),

    /// Derive a model spec from an existing GLB container
    Spec(SpecArgs),

    /// Rebuild the aggregate index files for an output tree
    Index(IndexArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Directory of decoded fragment tables (one `<unit>.json` per archive,
    /// with optional `<unit>_objects.json` companions)
    #[arg(short, long)]
    input: PathBuf,

    /// Output tree root
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct SpecArgs {
    /// Path to the GLB container
    #[arg(short, long)]
    glb: PathBuf,

    /// Race code (defaults to the container's file stem)
    #[arg(short, long)]
    race: Option<String>,

    /// Directory of extracted texture files (defaults to the container's
    /// directory)
    #[arg(short, long)]
    textures: Option<PathBuf>,

    /// Where to write the derived record (defaults to `<race>.json` beside the GLB)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct IndexArgs {
    /// Output tree root
    #[arg(short, long)]
    root: PathBuf,
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_file(verbosity >= 3)
        .with_line_number(verbosity >= 3)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Convert(args) => cmd_convert(args),
        Commands::Spec(args) => cmd_spec(args),
        Commands::Index(args) => cmd_index(args),
    }
}

fn cmd_convert(args: ConvertArgs) -> Result<()> {
    info!("Reading decoded tables from {:?}", args.input);

    let textures = texture_basenames(&args.input)?;
    let mut units = Vec::new();
    for path in table_paths(&args.input)? {
        let stem = file_stem(&path)?;
        let table = load_table(&path)?;
        let mut unit = ConversionUnit::new(stem, table);

        let objects_path = args.input.join(format!("{}_objects.json", unit.name));
        if objects_path.is_file() {
            unit.objects = Some(load_table(&objects_path)?);
        }
        unit.texture_files = textures.clone();
        units.push(unit);
    }
    if units.is_empty() {
        bail!("no fragment tables found in {:?}", args.input);
    }

    let summary = run_units(&units, &args.output)?;
    println!(
        "Converted {} unit(s), {} failed",
        summary.converted, summary.failed
    );
    Ok(())
}

fn cmd_spec(args: SpecArgs) -> Result<()> {
    let race = match args.race {
        Some(race) => race,
        None => file_stem(&args.glb)?,
    };
    let texture_dir = match args.textures {
        Some(dir) => dir,
        None => args
            .glb
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let buffer = fs::read(&args.glb)
        .with_context(|| format!("failed to read {:?}", args.glb))?;
    let textures = texture_basenames(&texture_dir)?;
    let spec = derive_model_spec(&buffer, &race, &textures)
        .context("model spec derivation failed")?;

    let output = args
        .output
        .unwrap_or_else(|| args.glb.with_file_name(format!("{race}.json")));
    fs::write(&output, serde_json::to_string_pretty(&spec)?)
        .with_context(|| format!("failed to write {output:?}"))?;
    println!("Wrote {output:?}");
    Ok(())
}

fn cmd_index(args: IndexArgs) -> Result<()> {
    write_indices(&args.root).context("failed to write aggregate indices")?;
    println!("Indices written under {:?}", args.root);
    Ok(())
}

/// Fragment table files in a directory, sorted, companions excluded
fn table_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {dir:?}"))? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if file_stem(&path)?.ends_with("_objects") {
            continue;
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}

fn load_table(path: &Path) -> Result<FragmentTable> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {path:?}"))?;
    serde_json::from_slice(&bytes).with_context(|| format!("failed to parse {path:?}"))
}

/// Basenames of the texture images in a directory
fn texture_basenames(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {dir:?}"))? {
        let path = entry?.path();
        if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("png") | Some("bmp") | Some("dds")
        ) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

fn file_stem(path: &Path) -> Result<String> {
    match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => Ok(stem.to_string()),
        None => bail!("{path:?} has no usable file name"),
    }
}
