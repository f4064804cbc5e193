//! Grid state persisted between CLI invocations.
//!
//! The file holds the serialized `GridState` as pretty JSON. Every command
//! reads it, applies one action and writes the result back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use periodgrid_engine::GridState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateFileError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{} is not a valid grid state: {source}", path.display())]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("{} already exists", .0.display())]
    Exists(PathBuf),
}

pub fn load(path: &Path) -> Result<GridState, StateFileError> {
    let text = fs::read_to_string(path).map_err(|source| StateFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| StateFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the state next to `path` and rename it into place.
pub fn save(path: &Path, state: &GridState) -> Result<(), StateFileError> {
    let write_err = |source| StateFileError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut json = serde_json::to_string_pretty(state)
        .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
    json.push('\n');

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(write_err)?;
    log::debug!("saved grid state to {}", path.display());
    Ok(())
}

/// Save a brand new state, refusing to clobber an existing file unless `force`.
pub fn create(path: &Path, state: &GridState, force: bool) -> Result<(), StateFileError> {
    if path.exists() && !force {
        return Err(StateFileError::Exists(path.to_path_buf()));
    }
    save(path, state)
}
