#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared by the generator and lookup commands."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.

use std::path::{Path, PathBuf};

/// Unified error type returned by the library and the CLI.
///
/// Every variant is fatal for the running command. The CLI prints the
/// [`Display`](std::fmt::Display) form and exits with a non-zero status.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors raised while reading or writing matrix files.
    #[error("failed to access {path:?}: {source}")]
    Io {
        /// File that triggered the failure.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps JSON decoding and encoding errors.
    #[error("invalid JSON document: {source}")]
    Parse {
        /// Source error from serde_json.
        source: serde_json::Error
    },
    /// Wraps YAML decoding errors for YAML configuration files.
    #[error("invalid YAML document: {source}")]
    ParseYaml {
        /// Source error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when the sink path for the selected platform is not set.
    #[error("environment variable {variable} is not set")]
    MissingEnvironment {
        /// Name of the variable that should carry the path.
        variable: &'static str
    },
    /// Returned when a platform name is not one of the supported targets.
    #[error("unknown platform '{name}', expected one of: github, gitlab")]
    UnknownPlatform {
        /// Name supplied by the caller.
        name: String
    },
    /// Returned when a lookup names a field that matrix entries do not have.
    #[error("unknown matrix field '{name}', expected one of: build_type, device")]
    UnknownField {
        /// Field name supplied by the caller.
        name: String
    },
    /// Returned when a 1-based CI node index does not address an entry.
    #[error("ci node index {index} is out of range for a matrix of {len} entries")]
    IndexOutOfRange {
        /// Index supplied by the caller.
        index: i64,
        /// Number of entries in the matrix, when known.
        len:   usize
    }
}

impl Error {
    /// Constructs an [`Error::MissingEnvironment`] for the provided variable.
    pub fn missing_environment(variable: &'static str) -> Self {
        Self::MissingEnvironment {
            variable
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation
    /// and is what the CLI prints before exiting.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::ParseYaml {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - File that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}
