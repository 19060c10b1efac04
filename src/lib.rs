//! Utilities for generating CI build matrices.
//!
//! The library expands a configuration of build types and devices into the
//! cartesian product consumed by CI job arrays, delivers it in the format a
//! given CI platform expects, and reads individual entries back by 1-based
//! node index. All operations take explicit paths; resolving them from the
//! process environment is left to the `ci-matrix` binary.

mod config;
mod error;
mod matrix;
mod scalar;
mod sink;

pub use config::{ConfigFormat, MatrixConfig, load_config, parse_config};
pub use error::{Error, io_error};
pub use matrix::{Matrix, MatrixEntry, MatrixField, NodeIndex, load_matrix, lookup};
pub use sink::{
    GITHUB_OUTPUT_ENV, GITLAB_MATRIX_PATH_ENV, GithubOutput, GitlabMatrixFile, Platform, Sink,
    SinkPaths, generate,
};
