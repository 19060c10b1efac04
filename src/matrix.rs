//! Expanded build matrices and index-based lookup.
//!
//! A [`Matrix`] is the persisted form consumed by CI platforms that only hand
//! each parallel job a 1-based node index. [`lookup`] turns such an index and
//! a field name back into the value the generator computed.

use std::{fmt, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{self, Error},
    scalar,
};

/// Single combination of build type and device.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq,)]
pub struct MatrixEntry
{
    /// Build profile name.
    #[serde(deserialize_with = "scalar::deserialize_scalar")]
    pub build_type: String,
    /// Hardware target identifier.
    #[serde(deserialize_with = "scalar::deserialize_scalar")]
    pub device:     String,
}

impl MatrixEntry
{
    /// Returns the value of the selected field.
    pub fn field(&self, field: MatrixField,) -> &str
    {
        match field {
            MatrixField::BuildType => &self.build_type,
            MatrixField::Device => &self.device,
        }
    }
}

/// Field of a [`MatrixEntry`] addressable by lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash,)]
pub enum MatrixField
{
    /// The `build_type` field.
    BuildType,
    /// The `device` field.
    Device,
}

impl MatrixField
{
    /// Name of the field as it appears in the persisted JSON.
    pub fn as_str(self,) -> &'static str
    {
        match self {
            Self::BuildType => "build_type",
            Self::Device => "device",
        }
    }
}

impl FromStr for MatrixField
{
    type Err = Error;

    fn from_str(name: &str,) -> Result<Self, Self::Err,>
    {
        match name {
            "build_type" => Ok(Self::BuildType,),
            "device" => Ok(Self::Device,),
            _ => Err(Error::UnknownField {
                name: name.to_owned(),
            },),
        }
    }
}

impl fmt::Display for MatrixField
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.write_str(self.as_str(),)
    }
}

/// 1-based position of a parallel CI job within its job array.
///
/// The value is guaranteed to be at least 1; the upper bound is checked
/// against a concrete matrix in [`Matrix::entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub struct NodeIndex(usize,);

impl NodeIndex
{
    /// Validates a raw CI node index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] for zero and negative values. The
    /// reported `len` is 0 because no matrix is known at this point.
    pub fn new(index: i64,) -> Result<Self, Error,>
    {
        usize::try_from(index,)
            .ok()
            .filter(|value| *value >= 1,)
            .map(Self,)
            .ok_or(Error::IndexOutOfRange {
                index,
                len: 0,
            },)
    }

    /// The 1-based value as supplied by the CI platform.
    pub fn get(self,) -> usize
    {
        self.0
    }

    /// The 0-based position inside a [`Matrix`].
    pub fn position(self,) -> usize
    {
        self.0 - 1
    }
}

/// Ordered list of matrix entries, serialized as a plain JSON array.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default,)]
#[serde(transparent)]
pub struct Matrix
{
    entries: Vec<MatrixEntry,>,
}

impl Matrix
{
    /// Wraps already ordered entries.
    pub fn new(entries: Vec<MatrixEntry,>,) -> Self
    {
        Self {
            entries,
        }
    }

    /// Entries in build-type-major order.
    pub fn entries(&self,) -> &[MatrixEntry]
    {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self,) -> usize
    {
        self.entries.len()
    }

    /// Returns `true` when the matrix has no entries.
    pub fn is_empty(&self,) -> bool
    {
        self.entries.is_empty()
    }

    /// Returns the entry addressed by a CI node index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] when the index exceeds the number of
    /// entries.
    pub fn entry(&self, index: NodeIndex,) -> Result<&MatrixEntry, Error,>
    {
        self.entries.get(index.position(),).ok_or(Error::IndexOutOfRange {
            index: index.get() as i64,
            len:   self.entries.len(),
        },)
    }

    /// Serializes the matrix as a compact JSON array.
    ///
    /// # Errors
    ///
    /// Propagates serialization failures as [`Error::Parse`].
    pub fn to_json(&self,) -> Result<String, Error,>
    {
        Ok(serde_json::to_string(self,)?,)
    }
}

/// Reads a persisted matrix from disk.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and [`Error::Parse`]
/// when it does not hold a JSON array of entries.
pub fn load_matrix(path: &Path,) -> Result<Matrix, Error,>
{
    debug!("Reading matrix from {}", path.display());
    let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
    Ok(serde_json::from_str(&contents,)?,)
}

/// Resolves the value of `field` for the job at 1-based `index`.
///
/// The field name is parsed before the file is read, so an unknown field is
/// reported even when the matrix file is missing. The index is checked
/// against the loaded matrix and never wraps around.
///
/// # Errors
///
/// Returns [`Error::UnknownField`] for unsupported field names,
/// [`Error::IndexOutOfRange`] for indices outside `1..=len`, and propagates
/// the failures of [`load_matrix`].
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// # fn example() -> Result<(), ci_matrix::Error> {
/// let device = ci_matrix::lookup(Path::new("matrix.json"), 3, "device")?;
/// println!("{device}");
/// # Ok(())
/// # }
/// ```
pub fn lookup(path: &Path, index: i64, field: &str,) -> Result<String, Error,>
{
    let field = field.parse::<MatrixField>()?;
    let matrix = load_matrix(path,)?;
    let index = NodeIndex::new(index,).map_err(|_| Error::IndexOutOfRange {
        index,
        len: matrix.len(),
    },)?;
    let value = matrix.entry(index,)?.field(field,).to_owned();

    debug!("Resolved {} for node {} to '{}'", field, index.get(), value);
    Ok(value,)
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use proptest::prelude::*;
    use tempfile::tempdir;

    use super::{Matrix, MatrixEntry, MatrixField, NodeIndex, load_matrix, lookup};
    use crate::{Error, MatrixConfig};

    const PERSISTED: &str = r#"[{"build_type":"debug","device":"xc7a35t"},{"build_type":"debug","device":"xczu7ev"},{"build_type":"release","device":"xc7a35t"},{"build_type":"release","device":"xczu7ev"}]"#;

    fn persisted_matrix() -> (tempfile::TempDir, std::path::PathBuf,)
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("matrix.json",);
        fs::write(&path, PERSISTED,).expect("failed to write matrix",);
        (temp, path,)
    }

    #[test]
    fn lookup_translates_one_based_index()
    {
        let (_temp, path,) = persisted_matrix();

        assert_eq!(lookup(&path, 3, "device").expect("lookup failed"), "xc7a35t");
        assert_eq!(lookup(&path, 3, "build_type").expect("lookup failed"), "release");
        assert_eq!(lookup(&path, 1, "device").expect("lookup failed"), "xc7a35t");
        assert_eq!(lookup(&path, 4, "device").expect("lookup failed"), "xczu7ev");
    }

    #[test]
    fn lookup_rejects_index_past_the_end()
    {
        let (_temp, path,) = persisted_matrix();

        match lookup(&path, 5, "device",).expect_err("expected out of range",) {
            Error::IndexOutOfRange {
                index,
                len,
            } => {
                assert_eq!(index, 5);
                assert_eq!(len, 4);
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn lookup_rejects_zero_and_negative_indices()
    {
        let (_temp, path,) = persisted_matrix();

        for index in [0, -1, -4] {
            let error = lookup(&path, index, "device",).expect_err("expected out of range",);
            assert!(matches!(error, Error::IndexOutOfRange { .. }), "index {index}: {error:?}");
        }
    }

    #[test]
    fn lookup_rejects_unknown_field()
    {
        let (_temp, path,) = persisted_matrix();

        match lookup(&path, 1, "toolchain",).expect_err("expected unknown field",) {
            Error::UnknownField {
                name,
            } => assert_eq!(name, "toolchain"),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn lookup_prints_numeric_values_without_quotes()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("matrix.json",);
        fs::write(&path, r#"[{"build_type":"debug","device":7035},{"build_type":false,"device":1.5}]"#,)
            .expect("failed to write matrix",);

        assert_eq!(lookup(&path, 1, "device").expect("lookup failed"), "7035");
        assert_eq!(lookup(&path, 2, "build_type").expect("lookup failed"), "false");
        assert_eq!(lookup(&path, 2, "device").expect("lookup failed"), "1.5");
    }

    #[test]
    fn lookup_reports_missing_matrix_file()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let error = lookup(&temp.path().join("absent.json",), 1, "device",).unwrap_err();
        assert!(matches!(error, Error::Io { .. }));
    }

    #[test]
    fn load_matrix_rejects_invalid_json()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("matrix.json",);
        fs::write(&path, "{\"build_type\": \"debug\"}",).expect("failed to write matrix",);

        assert!(matches!(load_matrix(&path), Err(Error::Parse { .. })));
    }

    #[test]
    fn field_names_round_trip_through_from_str()
    {
        for field in [MatrixField::BuildType, MatrixField::Device] {
            assert_eq!(field.as_str().parse::<MatrixField>().expect("known field"), field);
        }
        assert!("Device".parse::<MatrixField>().is_err());
    }

    #[test]
    fn node_index_converts_to_zero_based_position()
    {
        let index = NodeIndex::new(3,).expect("valid index",);
        assert_eq!(index.get(), 3);
        assert_eq!(index.position(), 2);
    }

    #[test]
    fn matrix_serializes_as_plain_array()
    {
        let matrix = Matrix::new(vec![MatrixEntry {
            build_type: "debug".to_owned(),
            device:     "xc7a35t".to_owned(),
        }],);

        assert_eq!(
            matrix.to_json().expect("serialize"),
            r#"[{"build_type":"debug","device":"xc7a35t"}]"#
        );
    }

    proptest! {
        #[test]
        fn persisted_lookup_matches_in_memory_matrix(
            build_types in prop::collection::vec("[a-z]{1,6}", 1..5),
            devices in prop::collection::vec("[a-z0-9]{1,6}", 1..5),
            seed in any::<prop::sample::Index>(),
        ) {
            let matrix = MatrixConfig { build_types, devices }.expand();
            let temp = tempdir().expect("failed to create tempdir");
            let path = temp.path().join("matrix.json");
            fs::write(&path, matrix.to_json().expect("serialize")).expect("failed to write matrix");

            let position = seed.index(matrix.len());
            let expected = &matrix.entries()[position];
            let index = i64::try_from(position + 1).expect("index fits");

            prop_assert_eq!(lookup(&path, index, "build_type").expect("lookup"), expected.build_type.clone());
            prop_assert_eq!(lookup(&path, index, "device").expect("lookup"), expected.device.clone());
        }
    }
}
