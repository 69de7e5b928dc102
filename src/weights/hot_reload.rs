//! Default expert weights with hot-reload from config/weights.json.
//!
//! JSON shape (one vector, or one vector per expert):
//! {
//!   "weights": [0.15, 0.10, 0.10, 0.10, 0.15, 0.10, 0.10, 0.10, 0.10]
//! }
//!
//! On each `current()` call we check the file's modified time and reload if changed.
//! A missing or unparsable file leaves the last good value in place.

use parking_lot::RwLock;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};
use tracing::{debug, warn};

use super::ManualWeights;

pub const DEFAULT_WEIGHTS_PATH: &str = "config/weights.json";

#[derive(Debug, Deserialize)]
struct WeightsFile {
    weights: ManualWeights,
}

/// Hot-reload wrapper: reloads when the config file mtime changes.
#[derive(Debug)]
pub struct HotReloadWeights {
    path: PathBuf,
    inner: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    weights: Option<ManualWeights>,
    last_modified: Option<SystemTime>,
}

impl HotReloadWeights {
    /// Create with a path (defaults to "config/weights.json" if `None`).
    pub fn new(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WEIGHTS_PATH));
        Self {
            path,
            inner: RwLock::new(State::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Latest default weights, reloading if the config file changed.
    pub fn current(&self) -> Option<ManualWeights> {
        let mtime = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            // No file: keep whatever we had (usually nothing).
            Err(_) => return self.inner.read().weights.clone(),
        };

        if self.inner.read().last_modified == Some(mtime) {
            return self.inner.read().weights.clone();
        }

        let mut guard = self.inner.write();
        // Double-check in case another request reloaded meanwhile.
        if guard.last_modified != Some(mtime) {
            match load_weights_file(&self.path) {
                Ok(w) => {
                    debug!(path = %self.path.display(), experts = w.experts(), "default weights reloaded");
                    guard.weights = Some(w);
                }
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "default weights not reloaded");
                }
            }
            guard.last_modified = Some(mtime);
        }
        guard.weights.clone()
    }
}

/// Load weights directly (no caching). Public for tests/tools.
pub fn load_weights_file(path: &Path) -> io::Result<ManualWeights> {
    let bytes = fs::read(path)?;
    let file: WeightsFile = serde_json::from_slice(&bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(file.weights)
}
