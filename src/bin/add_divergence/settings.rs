//! This module handles a TOML settings file.

use spectraldiv::consts::DEFAULT_PRECISION;
use spectraldiv::pipeline::FieldRequest;
use std::fs::File;
use std::io::prelude::*;

const DEFAULT_POSITION_LABEL: &str = "pos";
/// Largest number of significant digits that still carries information for
/// an `f64`.
const MAX_PRECISION: usize = 17;

error_chain! {
    foreign_links {
        TOMLError(toml::de::Error);
    }
}

/// Structure that holds settings, which are defined externally in a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub environment: EnvironmentSettings,
}

/// Column labels of coordinates and fields to differentiate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Labels {
    #[serde(default = "default_position")]
    pub position: String,
    #[serde(default)]
    pub vector: Vec<String>,
    #[serde(default)]
    pub tensor: Vec<String>,
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            position: default_position(),
            vector: Vec::new(),
            tensor: Vec::new(),
        }
    }
}

fn default_position() -> String {
    DEFAULT_POSITION_LABEL.to_string()
}

/// Holds output configuration
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Output {
    /// Significant digits of written numbers
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            precision: default_precision(),
        }
    }
}

fn default_precision() -> usize {
    DEFAULT_PRECISION
}

/// Holds environment variables.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentSettings {
    /// Size of the worker pool. Uses rayon's default if not given.
    #[serde(default)]
    pub threads: Option<usize>,
}

/// Reads the content of a file `filename` into an string and return it.
fn read_from_file(filename: &str) -> Result<String> {
    let mut f = File::open(filename).chain_err(|| "Unable to open file.")?;
    let mut content = String::new();

    f.read_to_string(&mut content)
        .chain_err(|| "Unable to read file.")?;

    Ok(content)
}

/// Parses settings from a TOML string and checks them.
pub fn parse_settings(toml_string: &str) -> Result<Settings> {
    let settings: Settings =
        toml::from_str(toml_string).chain_err(|| "Unable to parse parameter file.")?;

    check_settings(&settings)?;

    Ok(settings)
}

/// Reads content of a file `param_file`, that should point to a valid TOML
/// file, and parses it.
/// Then returns the deserialized data in form of a Settings struct.
pub fn read_parameter_file(param_file: &str) -> Result<Settings> {
    let toml_string = read_from_file(param_file).chain_err(|| "Unable to read parameter file.")?;

    parse_settings(&toml_string)
}

pub fn check_settings(s: &Settings) -> Result<()> {
    let p = s.output.precision;
    if p == 0 || p > MAX_PRECISION {
        bail!(
            "Precision must be between 1 and {} significant digits: {}",
            MAX_PRECISION,
            p
        )
    }

    if s.environment.threads == Some(0) {
        bail!("Number of threads must be bigger than 0.")
    }

    if s.labels.position.is_empty() {
        bail!("Position label must not be empty.")
    }

    Ok(())
}

impl Settings {
    /// Labels to process.
    pub fn request(&self) -> FieldRequest {
        FieldRequest {
            position: self.labels.position.clone(),
            vectors: self.labels.vector.clone(),
            tensors: self.labels.tensor.clone(),
        }
    }
}
