//! `search-shp-dir`: index a directory of zipped shapefiles and query it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use shp_meta_cli::{init_logging, write_output};
use shp_meta_core::parse_filter;
use shp_meta_extract::output::{RowsFormat, format_rows};
use shp_meta_extract::scan::scan_directory;
use shp_meta_sqlite::MetadataIndex;

#[derive(Debug, Parser)]
#[command(name = "search-shp-dir")]
#[command(about = "Index a directory of zipped shapefiles and search the result")]
struct Cli {
    /// Increase verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan a directory tree and build the metadata database.
    Mkdb(MkdbArgs),
    /// Search the database with a filter expression.
    Ssearch(SsearchArgs),
    /// List every field of the stored schema.
    Fields(FieldsArgs),
    /// Show declared type and observed values for one or more fields.
    FieldsInfo(FieldsInfoArgs),
}

#[derive(Debug, Args)]
struct MkdbArgs {
    /// Root directory to scan for zipped shapefiles.
    dir: PathBuf,
    /// Database file to (re)create.
    #[arg(long)]
    db: PathBuf,
    /// Number of parallel extraction jobs (default: adaptive).
    #[arg(long)]
    jobs: Option<usize>,
}

#[derive(Debug, Args)]
struct SsearchArgs {
    /// Database file built by mkdb.
    #[arg(long)]
    db: PathBuf,
    /// Filter expression, e.g. "satellite = 'Landsat-8' & cloudperce < 40".
    #[arg(long)]
    query: String,
    /// Output file; extension selects yml, yaml, csv, xml, or json.
    /// Prints YAML to stdout when omitted.
    #[arg(long)]
    to: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct FieldsArgs {
    /// Database file built by mkdb.
    #[arg(long)]
    db: PathBuf,
}

#[derive(Debug, Args)]
struct FieldsInfoArgs {
    /// Field names to describe.
    #[arg(required = true)]
    fields: Vec<String>,
    /// Database file built by mkdb.
    #[arg(long)]
    db: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Mkdb(args) => run_mkdb(args),
        Command::Ssearch(args) => run_ssearch(args),
        Command::Fields(args) => run_fields(args),
        Command::FieldsInfo(args) => run_fields_info(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_mkdb(args: MkdbArgs) -> Result<(), String> {
    let outcome = scan_directory(&args.dir, args.jobs).map_err(|e| e.to_string())?;

    if outcome.records.is_empty() {
        return Err(format!(
            "no indexable shapefiles under '{}' ({} candidate(s) failed extraction)",
            args.dir.display(),
            outcome.failures.len()
        ));
    }

    let mut index = MetadataIndex::open(&args.db).map_err(|e| e.to_string())?;
    let report = index.rebuild(&outcome.records).map_err(|e| e.to_string())?;

    let skipped = outcome.failures.len() + report.mismatched;
    println!("{} indexed, {} skipped", report.inserted, skipped);
    println!(
        "Created database '{}' from '{}'.",
        args.db.display(),
        args.dir.display()
    );
    Ok(())
}

fn run_ssearch(args: SsearchArgs) -> Result<(), String> {
    // Output format is resolved before any database work.
    let target = match &args.to {
        Some(path) => Some((path.clone(), RowsFormat::from_path(path).map_err(|e| e.to_string())?)),
        None => None,
    };

    let index = MetadataIndex::open(&args.db).map_err(|e| e.to_string())?;
    let catalog = index.catalog().map_err(|e| e.to_string())?;
    let filter = parse_filter(&args.query, &catalog).map_err(|e| e.to_string())?;
    let rows = index.search(&filter).map_err(|e| e.to_string())?;

    match target {
        Some((path, format)) => {
            let raw = format_rows(&rows, format).map_err(|e| e.to_string())?;
            write_output(&path, &raw)?;
            println!("Wrote {} row(s) to '{}'.", rows.len(), path.display());
        }
        None => {
            let raw = format_rows(&rows, RowsFormat::Yaml).map_err(|e| e.to_string())?;
            print!("{raw}");
        }
    }
    Ok(())
}

fn run_fields(args: FieldsArgs) -> Result<(), String> {
    let index = MetadataIndex::open(&args.db).map_err(|e| e.to_string())?;
    let catalog = index.catalog().map_err(|e| e.to_string())?;
    for name in catalog.names() {
        println!("{name}");
    }
    Ok(())
}

fn run_fields_info(args: FieldsInfoArgs) -> Result<(), String> {
    let index = MetadataIndex::open(&args.db).map_err(|e| e.to_string())?;
    for name in &args.fields {
        let info = index.field_info(name).map_err(|e| e.to_string())?;
        match info.values {
            Some(values) => {
                let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
                println!("{}: {} [{}]", info.name, info.ty, rendered.join(", "));
            }
            None => {
                println!(
                    "{}: {} ({} distinct values)",
                    info.name, info.ty, info.distinct_count
                );
            }
        }
    }
    Ok(())
}
