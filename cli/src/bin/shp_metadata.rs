//! `shp-metadata`: preview and export metadata from one zipped shapefile.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use shp_meta_cli::{init_logging, write_output};
use shp_meta_extract::extractor::extract_metadata;
use shp_meta_extract::output::{ExportFormat, format_record};

#[derive(Debug, Parser)]
#[command(name = "shp-metadata")]
#[command(about = "Extract metadata from a zipped shapefile")]
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
    /// Print the metadata record to stdout.
    Show(ShowArgs),
    /// Serialize the metadata record to a file (format from extension).
    Export(ExportArgs),
}

#[derive(Debug, Args)]
struct ShowArgs {
    /// Path to the zipped shapefile.
    #[arg(long)]
    path: PathBuf,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Path to the zipped shapefile.
    input: PathBuf,
    /// Output file; extension selects toml, xml, yaml, or json.
    #[arg(long)]
    to: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Show(args) => run_show(args),
        Command::Export(args) => run_export(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_show(args: ShowArgs) -> Result<(), String> {
    let record = extract_metadata(&args.path).map_err(|e| e.to_string())?;

    let width = record
        .field_names()
        .map(str::len)
        .max()
        .unwrap_or(0);
    for entry in record.iter() {
        println!("{:<width$}  {}", entry.name, entry.value);
    }
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<(), String> {
    let format = ExportFormat::from_path(&args.to).map_err(|e| e.to_string())?;
    let record = extract_metadata(&args.input).map_err(|e| e.to_string())?;
    let raw = format_record(&record, format).map_err(|e| e.to_string())?;
    write_output(&args.to, &raw)?;
    println!(
        "Exported '{}' -> '{}'.",
        args.input.display(),
        args.to.display()
    );
    Ok(())
}
