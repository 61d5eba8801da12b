//! Persistence of the resolved version between pipeline steps.
//!
//! The in step writes the chosen version to a fixed relative path inside
//! the materialized tree; the out step reads it back verbatim without
//! re-resolving anything.

use camino::{Utf8Path, Utf8PathBuf};

use super::error::ResourceError;
use super::models::Version;

/// Name of the version file persisted at the working-tree root.
pub const VERSION_FILENAME: &str = ".version.json";

/// Returns the version-file path for a materialized tree.
#[must_use]
pub fn version_path(directory: &Utf8Path) -> Utf8PathBuf {
    directory.join(VERSION_FILENAME)
}

/// Writes `version` to the fixed relative path inside `directory`.
///
/// # Errors
///
/// Returns [`ResourceError::Io`] when the file cannot be written.
pub fn write_version(directory: &Utf8Path, version: &Version) -> Result<(), ResourceError> {
    let path = version_path(directory);
    let payload = serde_json::to_string(version).map_err(|error| ResourceError::StorageDecode {
        path: path.to_string(),
        message: error.to_string(),
    })?;

    std::fs::write(path.as_std_path(), payload).map_err(|error| ResourceError::Io {
        operation: format!("writing version file {path}"),
        message: error.to_string(),
    })
}

/// Reads the version persisted inside `directory`.
///
/// # Errors
///
/// Returns [`ResourceError::Io`] when the file cannot be read or
/// [`ResourceError::StorageDecode`] when it is not valid JSON.
pub fn read_version(directory: &Utf8Path) -> Result<Version, ResourceError> {
    read_version_at(&version_path(directory))
}

/// Reads a version file from an explicit location.
///
/// # Errors
///
/// Returns [`ResourceError::Io`] when the file cannot be read or
/// [`ResourceError::StorageDecode`] when it is not valid JSON.
pub fn read_version_at(path: &Utf8Path) -> Result<Version, ResourceError> {
    let raw = std::fs::read_to_string(path.as_std_path()).map_err(|error| ResourceError::Io {
        operation: format!("reading version file {path}"),
        message: error.to_string(),
    })?;

    serde_json::from_str(&raw).map_err(|error| ResourceError::StorageDecode {
        path: path.to_string(),
        message: error.to_string(),
    })
}

#[cfg(test)]
#[expect(
    clippy::panic_in_result_fn,
    reason = "Test assertions are expected to panic on failure"
)]
mod tests {
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    use super::{read_version, read_version_at, version_path, write_version};
    use crate::repo::CommitSha;
    use crate::resource::ResourceError;
    use crate::resource::models::Version;

    type TestError = Box<dyn std::error::Error>;

    #[test]
    fn version_survives_a_write_read_round_trip() -> Result<(), TestError> {
        let dir = TempDir::new()?;
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf())?;

        let version = Version {
            commit: CommitSha::from("abcdef0123"),
            id: Some("12".to_owned()),
            branch: Some("feature-x".to_owned()),
            title: Some("Fix login".to_owned()),
        };

        write_version(&path, &version)?;
        let back = read_version(&path)?;

        assert_eq!(back, version);
        Ok(())
    }

    #[test]
    fn reading_a_missing_file_is_an_io_error() -> Result<(), TestError> {
        let dir = TempDir::new()?;
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf())?;

        let result = read_version(&path);
        assert!(matches!(result, Err(ResourceError::Io { .. })));
        Ok(())
    }

    #[test]
    fn reading_malformed_json_is_a_decode_error() -> Result<(), TestError> {
        let dir = TempDir::new()?;
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf())?;
        std::fs::write(version_path(&path).as_std_path(), "{not json")?;

        let result = read_version_at(&version_path(&path));
        assert!(matches!(result, Err(ResourceError::StorageDecode { .. })));
        Ok(())
    }
}
