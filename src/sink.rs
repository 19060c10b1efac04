// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Delivery of a generated matrix to a CI platform.
//!
//! Each supported platform is a [`Sink`] variant. GitHub Actions expands the
//! matrix natively, so its sink forwards the raw configuration as a step
//! output. GitLab CI only hands jobs a node index, so its sink persists the
//! expanded matrix for [`lookup`](crate::lookup) to read later.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::ValueEnum;
use tracing::info;

use crate::{
    config::{self, MatrixConfig},
    error::{self, Error},
};

/// Environment variable naming the GitHub Actions step output file.
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";
/// Environment variable naming the persisted GitLab matrix file.
pub const GITLAB_MATRIX_PATH_ENV: &str = "GITLAB_MATRIX_PATH";

/// CI platform a matrix is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Platform {
    /// GitHub Actions: append `matrix=<json>` to the step output file.
    Github,
    /// GitLab CI: write the expanded matrix to a standalone JSON file.
    Gitlab
}

impl Platform {
    /// Name of the environment variable holding this platform's sink path.
    pub fn environment_variable(self) -> &'static str {
        match self {
            Self::Github => GITHUB_OUTPUT_ENV,
            Self::Gitlab => GITLAB_MATRIX_PATH_ENV
        }
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "github" => Ok(Self::Github),
            "gitlab" => Ok(Self::Gitlab),
            _ => Err(Error::UnknownPlatform {
                name: name.to_owned()
            })
        }
    }
}

/// Sink locations resolved once by the caller.
///
/// The CLI fills these from the environment; library callers and tests pass
/// paths directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkPaths {
    /// GitHub Actions step output file.
    pub github_output:      Option<PathBuf>,
    /// Persisted GitLab matrix file.
    pub gitlab_matrix_path: Option<PathBuf>
}

/// Appends the configuration to a GitHub Actions output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubOutput {
    path: PathBuf
}

impl GithubOutput {
    /// Creates a sink writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into()
        }
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `matrix=<json>\n`, creating the file when it does not exist.
    ///
    /// The configuration is forwarded unexpanded; the workflow feeds it to
    /// `fromJSON` and lets GitHub compute the product.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be opened or written.
    pub fn deliver(&self, config: &MatrixConfig) -> Result<(), Error> {
        let line = format!("matrix={}\n", serde_json::to_string(config)?);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| error::io_error(&self.path, source))?;
        file.write_all(line.as_bytes())
            .map_err(|source| error::io_error(&self.path, source))?;

        info!("Appended matrix output to {}", self.path.display());
        Ok(())
    }
}

/// Writes the expanded matrix to a standalone JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitlabMatrixFile {
    path: PathBuf
}

impl GitlabMatrixFile {
    /// Creates a sink writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into()
        }
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Expands the configuration and overwrites the target with the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be written.
    pub fn deliver(&self, config: &MatrixConfig) -> Result<(), Error> {
        let matrix = config.expand();
        let contents = matrix.to_json()?;

        fs::write(&self.path, contents).map_err(|source| error::io_error(&self.path, source))?;

        info!(
            "Wrote {} matrix entries to {}",
            matrix.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Destination of a generated matrix, one variant per platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    /// GitHub Actions step output.
    Github(GithubOutput),
    /// GitLab persisted matrix file.
    Gitlab(GitlabMatrixFile)
}

impl Sink {
    /// Builds the sink for `platform` from the resolved paths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingEnvironment`] when the platform's path is not
    /// set. No file is touched in that case.
    pub fn for_platform(platform: Platform, paths: &SinkPaths) -> Result<Self, Error> {
        let missing = || Error::missing_environment(platform.environment_variable());

        match platform {
            Platform::Github => {
                let path = paths.github_output.clone().ok_or_else(missing)?;
                Ok(Self::Github(GithubOutput::new(path)))
            }
            Platform::Gitlab => {
                let path = paths.gitlab_matrix_path.clone().ok_or_else(missing)?;
                Ok(Self::Gitlab(GitlabMatrixFile::new(path)))
            }
        }
    }

    /// Delivers the configuration using the platform's convention.
    ///
    /// # Errors
    ///
    /// Propagates the I/O and serialization failures of the variant.
    pub fn deliver(&self, config: &MatrixConfig) -> Result<(), Error> {
        match self {
            Self::Github(sink) => sink.deliver(config),
            Self::Gitlab(sink) => sink.deliver(config)
        }
    }
}

/// Loads the configuration at `config_path` and delivers it for `platform`.
///
/// # Errors
///
/// Returns [`Error::MissingEnvironment`] when the sink path is unset, and
/// propagates configuration loading and delivery failures. The sink is only
/// written after the configuration loaded successfully.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use ci_matrix::{Platform, SinkPaths, generate};
///
/// # fn example() -> Result<(), ci_matrix::Error> {
/// let paths = SinkPaths {
///     gitlab_matrix_path: Some("matrix.json".into()),
///     ..SinkPaths::default()
/// };
/// generate(Platform::Gitlab, Path::new("ci/matrix.json"), &paths)?;
/// # Ok(())
/// # }
/// ```
pub fn generate(platform: Platform, config_path: &Path, paths: &SinkPaths) -> Result<(), Error> {
    let sink = Sink::for_platform(platform, paths)?;
    let config = config::load_config(config_path)?;
    sink.deliver(&config)
}
