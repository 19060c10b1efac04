//! Configuration document describing the axes of a build matrix.
//!
//! A configuration lists the build types and the target devices that CI
//! should combine. The document is usually JSON; YAML files are accepted as
//! well and detected from the file extension.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{self, Error},
    matrix::{Matrix, MatrixEntry},
    scalar,
};

/// Axes of the build matrix.
///
/// Both keys are required. Values are taken verbatim and never validated
/// against any hardware or toolchain list; numbers and booleans are kept as
/// their textual form.
///
/// # Examples
///
/// ```
/// use ci_matrix::MatrixConfig;
///
/// let json = r#"{"build_types": ["debug", "release"], "devices": ["xc7a35t"]}"#;
/// let config: MatrixConfig = serde_json::from_str(json,).expect("valid configuration",);
/// assert_eq!(config.len(), 2);
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct MatrixConfig
{
    /// Build profiles, iterated in the outer loop of the expansion.
    #[serde(deserialize_with = "scalar::deserialize_scalars")]
    pub build_types: Vec<String,>,
    /// Hardware targets, iterated in the inner loop of the expansion.
    #[serde(deserialize_with = "scalar::deserialize_scalars")]
    pub devices:     Vec<String,>,
}

impl MatrixConfig
{
    /// Number of entries the expanded matrix will contain.
    pub fn len(&self,) -> usize
    {
        self.build_types.len() * self.devices.len()
    }

    /// Returns `true` when either axis is empty.
    pub fn is_empty(&self,) -> bool
    {
        self.len() == 0
    }

    /// Expands the configuration into its cartesian product.
    ///
    /// Entries are ordered build-type-major: the entry at 0-based position
    /// `i * devices.len() + j` pairs `build_types[i]` with `devices[j]`.
    /// Lookup relies on this order to translate CI node indices.
    ///
    /// # Examples
    ///
    /// ```
    /// use ci_matrix::MatrixConfig;
    ///
    /// let config = MatrixConfig {
    ///     build_types: vec!["debug".to_owned(), "release".to_owned()],
    ///     devices:     vec!["xc7a35t".to_owned(), "xczu7ev".to_owned()],
    /// };
    /// let matrix = config.expand();
    /// assert_eq!(matrix.len(), 4);
    /// assert_eq!(matrix.entries()[1].device, "xczu7ev");
    /// ```
    pub fn expand(&self,) -> Matrix
    {
        let mut entries = Vec::with_capacity(self.len(),);
        for build_type in &self.build_types {
            for device in &self.devices {
                entries.push(MatrixEntry {
                    build_type: build_type.clone(),
                    device:     device.clone(),
                },);
            }
        }

        debug!(
            "Expanded {} build types x {} devices into {} entries",
            self.build_types.len(),
            self.devices.len(),
            entries.len()
        );
        Matrix::new(entries,)
    }
}

/// Encoding of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum ConfigFormat
{
    /// JSON object with `build_types` and `devices` arrays.
    Json,
    /// The same document written as YAML.
    Yaml,
}

impl ConfigFormat
{
    /// Picks the format from a file extension, defaulting to JSON.
    pub fn from_path(path: &Path,) -> Self
    {
        match path.extension().and_then(|extension| extension.to_str(),) {
            Some(extension,)
                if extension.eq_ignore_ascii_case("yaml",)
                    || extension.eq_ignore_ascii_case("yml",) =>
            {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Loads a configuration from the provided file path.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and
/// [`Error::Parse`]/[`Error::ParseYaml`] when the document cannot be decoded
/// or a required key is missing.
pub fn load_config(path: &Path,) -> Result<MatrixConfig, Error,>
{
    debug!("Reading matrix configuration from {}", path.display());
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    parse_config(&contents, ConfigFormat::from_path(path,),)
}

/// Parses a configuration from an in-memory document.
///
/// # Errors
///
/// Propagates decoding failures as [`Error::Parse`] for JSON and
/// [`Error::ParseYaml`] for YAML.
pub fn parse_config(contents: &str, format: ConfigFormat,) -> Result<MatrixConfig, Error,>
{
    let config = match format {
        ConfigFormat::Json => serde_json::from_str(contents,)?,
        ConfigFormat::Yaml => serde_yaml::from_str(contents,)?,
    };
    Ok(config,)
}
