//! # Selected Location
//!
//! The application tracks exactly one selected location. It is persisted as a
//! small JSON document behind the [`LocationStore`] trait so the store can be
//! injected (a file in production, anything else in tests) instead of living
//! in global state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocationError {
    /// Store file could not be read or written
    #[error("location store IO: {0}")]
    Io(#[from] io::Error),

    /// Store file exists but does not hold a location
    #[error("location store corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

/// A named geographic coordinate in decimal degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Create a location, rejecting coordinates outside `[-90, 90]` x `[-180, 180]`.
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            name: name.into(),
            latitude,
            longitude,
        })
    }
}

/// Persistence for the one selected location.
pub trait LocationStore {
    /// The saved location, or `None` if nothing has been selected yet.
    fn load(&self) -> Result<Option<Location>, LocationError>;

    /// Replace the saved location.
    fn save(&self, location: &Location) -> Result<(), LocationError>;
}

/// Stores the location as pretty-printed JSON in a single file.
#[derive(Clone, Debug)]
pub struct FileLocationStore {
    path: PathBuf,
}

impl FileLocationStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocationStore for FileLocationStore {
    fn load(&self) -> Result<Option<Location>, LocationError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let location: Location = serde_json::from_slice(&data)?;
        // Re-validate in case the file was edited by hand
        Location::new(location.name, location.latitude, location.longitude).map(Some)
    }

    fn save(&self, location: &Location) -> Result<(), LocationError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(location)?;
        fs::write(&self.path, data)?;
        tracing::info!(name = %location.name, path = %self.path.display(), "saved location");
        Ok(())
    }
}
