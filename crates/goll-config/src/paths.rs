//! File system paths for the goll client.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Config filename under the base directory.
const CONFIG_FILE_NAME: &str = "config.json";
/// Durable client state filename (redirect intent, etc.).
const STATE_FILE_NAME: &str = "state.json";

/// Manages file system paths for the client.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for client files (~/.goll)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.goll`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".goll"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.goll).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.goll/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE_NAME)
    }

    /// Get the durable client state file path (~/.goll/state.json).
    pub fn state_file(&self) -> PathBuf {
        self.base_dir.join(STATE_FILE_NAME)
    }

    /// Ensure the base directory exists.
    pub fn ensure_base_dir(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_base_dir() {
        let paths = Paths::with_base_dir(PathBuf::from("/tmp/goll-test"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/goll-test/config.json"));
        assert_eq!(paths.state_file(), PathBuf::from("/tmp/goll-test/state.json"));
    }
}
