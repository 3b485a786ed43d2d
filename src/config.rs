//! Log location settings.

use std::path::{Path, PathBuf};

/// Directory name under the home directory.
pub const DEFAULT_DIR_NAME: &str = ".mileage";
/// Log file name inside the directory.
pub const DEFAULT_FILE_NAME: &str = "mileage.conf";
/// Environment variable that overrides the log directory.
pub const DIR_ENV_VAR: &str = "MILEAGE_DIR";

/// Where the log lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the log and its archives.
    pub dir: PathBuf,
    /// Log file name within `dir`.
    pub file_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let base = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            dir: base.join(DEFAULT_DIR_NAME),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

impl StoreConfig {
    /// Default file name inside `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }

    /// Explicit log file path.
    pub fn at(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
        Self { dir, file_name }
    }

    /// Defaults, with the directory taken from `MILEAGE_DIR` when set.
    pub fn from_env() -> Self {
        match std::env::var_os(DIR_ENV_VAR) {
            Some(dir) if !dir.is_empty() => Self::in_dir(dir),
            _ => Self::default(),
        }
    }

    /// Full path of the log file.
    pub fn log_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_splits_dir_and_name() {
        let cfg = StoreConfig::at("/var/tmp/fuel/log.txt");
        assert_eq!(cfg.dir, PathBuf::from("/var/tmp/fuel"));
        assert_eq!(cfg.file_name, "log.txt");
        assert_eq!(cfg.log_path(), PathBuf::from("/var/tmp/fuel/log.txt"));
    }

    #[test]
    fn default_uses_dot_mileage() {
        let cfg = StoreConfig::default();
        assert!(cfg.dir.ends_with(DEFAULT_DIR_NAME));
        assert_eq!(cfg.file_name, DEFAULT_FILE_NAME);
    }
}
