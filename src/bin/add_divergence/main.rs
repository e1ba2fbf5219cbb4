//! Adds the spectral divergence of vector and tensor fields to ASCII tables.
//!
//! Every table is expected to hold the coordinates of a periodic, regular
//! grid and one row per grid point, x varying fastest. Without file
//! arguments the tool reads a table from standard input and writes the
//! result to standard output. Files are rewritten in place.

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod settings;

use crate::errors::*;
use crate::settings::Settings;
use clap::Parser;
use env_logger::Env;
use spectraldiv::pipeline::{add_divergence, FieldRequest};
use spectraldiv::table::Table;
use std::env;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

mod errors {
    error_chain! {
        links {
            Settings(crate::settings::Error, crate::settings::ErrorKind);
            Divergence(spectraldiv::errors::Error, spectraldiv::errors::ErrorKind);
        }

        foreign_links {
            Io(::std::io::Error);
            ThreadPool(::rayon::ThreadPoolBuildError);
        }
    }
}

const TOOL_NAME: &str = env!("CARGO_BIN_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "add_divergence")]
#[command(about = "Add column(s) containing the divergence of requested vector and tensor fields", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Label of coordinates [default: pos]
    #[arg(short, long, value_name = "LABEL")]
    pos: Option<String>,

    /// Label(s) of vector fields, comma separated or repeated
    #[arg(short, long = "vector", value_name = "LABEL", value_delimiter = ',')]
    vector: Vec<String>,

    /// Label(s) of tensor fields, comma separated or repeated
    #[arg(short, long = "tensor", value_name = "LABEL", value_delimiter = ',')]
    tensor: Vec<String>,

    /// Significant digits of written numbers [default: 12]
    #[arg(long, value_name = "DIGITS")]
    precision: Option<usize>,

    /// Tables to process, standard input if none given
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

/// Command line arguments take precedence over the settings file. Field
/// labels given on the command line are appended to the ones of the file.
fn merge_settings(mut settings: Settings, cli: &Cli) -> Result<Settings> {
    if let Some(ref p) = cli.pos {
        settings.labels.position = p.clone();
    }

    settings.labels.vector.extend(cli.vector.iter().cloned());
    settings.labels.tensor.extend(cli.tensor.iter().cloned());

    if let Some(p) = cli.precision {
        settings.output.precision = p;
    }

    settings::check_settings(&settings)?;

    Ok(settings)
}

/// Path of the temporary file used to replace `path`.
fn tmp_path(path: &Path) -> PathBuf {
    let mut p: OsString = path.as_os_str().to_owned();
    p.push("_tmp");
    PathBuf::from(p)
}

/// Header line documenting an invocation with `args`. Arguments that are
/// not valid UTF-8 are written lossily.
fn info_line<I: IntoIterator<Item = OsString>>(args: I) -> String {
    let args: Vec<String> = args
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    format!("{} {}\t{}", TOOL_NAME, VERSION, args.join(" "))
}

fn process_table(table: &mut Table, request: &FieldRequest, info: &str) -> Result<()> {
    let geometry = add_divergence(table, request)?;
    table.append_info(info);

    info!(
        "Added divergence of {} field(s) on a {} x {} x {} grid.",
        request.vectors.len() + request.tensors.len(),
        geometry.grid.x,
        geometry.grid.y,
        geometry.grid.z
    );

    Ok(())
}

fn process_stdin(settings: &Settings, info: &str) -> Result<()> {
    info!("Reading table from standard input.");

    let stdin = io::stdin();
    let mut table = Table::read(stdin.lock()).chain_err(|| "Cannot read table.")?;

    process_table(&mut table, &settings.request(), info)?;

    let stdout = io::stdout();
    table
        .write(BufWriter::new(stdout.lock()), settings.output.precision)
        .chain_err(|| "Cannot write table.")?;

    Ok(())
}

fn process_file(path: &Path, settings: &Settings, info: &str) -> Result<()> {
    info!("Processing {}.", path.display());

    let f = File::open(path).chain_err(|| format!("Unable to open file '{}'.", path.display()))?;
    let mut table = Table::read(BufReader::new(f))
        .chain_err(|| format!("Cannot read table '{}'.", path.display()))?;

    process_table(&mut table, &settings.request(), info)?;

    replace_file(&table, path, settings.output.precision)
}

/// Writes `table` to `<path>_tmp` and moves it over `path`. The temporary
/// file is removed if either step fails.
fn replace_file(table: &Table, path: &Path, precision: usize) -> Result<()> {
    let tmp = tmp_path(path);

    let res = write_table(table, &tmp, precision).and_then(|_| {
        fs::rename(&tmp, path).chain_err(|| format!("Cannot replace '{}'.", path.display()))
    });

    if res.is_err() && tmp.exists() {
        if let Err(e) = fs::remove_file(&tmp) {
            warn!("Cannot remove '{}': {}", tmp.display(), e);
        }
    }

    res
}

fn write_table(table: &Table, path: &Path, precision: usize) -> Result<()> {
    let f = File::create(path)
        .chain_err(|| format!("Unable to create file '{}'.", path.display()))?;
    table
        .write(BufWriter::new(f), precision)
        .chain_err(|| format!("Cannot write table '{}'.", path.display()))?;

    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let settings = match cli.config {
        Some(ref p) => settings::read_parameter_file(&p.to_string_lossy())
            .chain_err(|| format!("Error reading parameter file '{}'.", p.display()))?,
        None => Settings::default(),
    };

    let settings = merge_settings(settings, cli)?;

    if settings.request().is_empty() {
        bail!("No vector or tensor labels given.");
    }

    if let Some(n) = settings.environment.threads {
        debug!("Using {} threads.", n);
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()?;
    }

    let info = info_line(env::args_os().skip(1));

    if cli.files.is_empty() {
        return process_stdin(&settings, &info);
    }

    let mut failed = 0;
    for path in &cli.files {
        if let Err(ref e) = process_file(path, &settings, &info) {
            report(e);
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} file(s) could not be processed.", failed, cli.files.len());
    }

    Ok(())
}

fn report(e: &Error) {
    error!("{}", e);

    for e in e.iter().skip(1) {
        error!("caused by: {}", e);
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(ref e) = run(&cli) {
        report(e);
        ::std::process::exit(1);
    }
}
