//! # Config Loader
//!
//! Locates and reads configuration files from disk. Parsing is left to the
//! consumer.
//!
//! ```no_run
//! use config_loader::{find_config_file, load_config_file};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let found = find_config_file("multicam_config.json")?;
//!     let content = load_config_file(&found.path)?;
//!     println!("{} bytes from {}", content.len(), found.source);
//!     Ok(())
//! }
//! ```

pub mod error;

pub use error::{ConfigError, Result};

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding an explicit configuration file path.
pub const CONFIG_PATH_ENV: &str = "MULTICAM_CONFIG_PATH";

/// System-wide configuration directory, searched last.
pub const SYSTEM_CONFIG_DIR: &str = "/etc/multicam";

/// Where a configuration file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path taken from [`CONFIG_PATH_ENV`]
    Environment,
    /// `./config/<filename>`
    ConfigDir,
    /// `./<filename>`
    WorkingDir,
    /// `/etc/multicam/<filename>`
    System,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSource::Environment => "environment",
            ConfigSource::ConfigDir => "./config",
            ConfigSource::WorkingDir => "working directory",
            ConfigSource::System => SYSTEM_CONFIG_DIR,
        };
        f.write_str(label)
    }
}

/// A located configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundConfig {
    pub path: PathBuf,
    pub source: ConfigSource,
}

/// Reads a configuration file into a String.
///
/// # Errors
///
/// `FileNotFound` when the path does not exist, `ReadError` when it cannot be
/// read (permissions, invalid UTF-8, or a directory).
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    fs::read_to_string(path).map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))
}

/// Searches the usual locations for a configuration file.
///
/// Order:
/// 1. `MULTICAM_CONFIG_PATH` environment variable (if it points to a file)
/// 2. `./config/{filename}`
/// 3. `./{filename}`
/// 4. `/etc/multicam/{filename}`
pub fn find_config_file(filename: &str) -> Result<FoundConfig> {
    let env_path = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    find_in(filename, env_path, Path::new("."), Path::new(SYSTEM_CONFIG_DIR))
}

/// Finds and reads a configuration file in one step.
pub fn find_and_load(filename: &str) -> Result<(FoundConfig, String)> {
    let found = find_config_file(filename)?;
    let content = load_config_file(&found.path)?;
    Ok((found, content))
}

fn find_in(
    filename: &str,
    env_path: Option<PathBuf>,
    working_dir: &Path,
    system_dir: &Path,
) -> Result<FoundConfig> {
    let candidates = [
        (env_path, ConfigSource::Environment),
        (
            Some(working_dir.join("config").join(filename)),
            ConfigSource::ConfigDir,
        ),
        (Some(working_dir.join(filename)), ConfigSource::WorkingDir),
        (Some(system_dir.join(filename)), ConfigSource::System),
    ];

    for (candidate, source) in candidates {
        if let Some(path) = candidate
            && path.is_file()
        {
            return Ok(FoundConfig { path, source });
        }
    }

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found. Searched: {} env var, ./config/{}, ./{}, {}/{}",
        filename, CONFIG_PATH_ENV, filename, filename, SYSTEM_CONFIG_DIR, filename
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_config_file("/path/that/does/not/exist.json");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_directory_is_read_error() {
        let dir = tempdir().unwrap();
        let result = load_config_file(dir.path());
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }

    #[test]
    fn test_env_path_wins() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("explicit.json");
        fs::write(&explicit, "{}").unwrap();
        fs::write(dir.path().join("multicam_config.json"), "{}").unwrap();

        let found = find_in(
            "multicam_config.json",
            Some(explicit.clone()),
            dir.path(),
            dir.path(),
        )
        .unwrap();

        assert_eq!(found.path, explicit);
        assert_eq!(found.source, ConfigSource::Environment);
    }

    #[test]
    fn test_config_dir_before_working_dir() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("config")).unwrap();
        fs::write(dir.path().join("config").join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();

        let found = find_in("a.json", None, dir.path(), Path::new("/nonexistent")).unwrap();
        assert_eq!(found.source, ConfigSource::ConfigDir);
    }

    #[test]
    fn test_missing_env_file_falls_through_to_system() {
        let work = tempdir().unwrap();
        let system = tempdir().unwrap();
        fs::write(system.path().join("a.json"), "{}").unwrap();

        let found = find_in(
            "a.json",
            Some(work.path().join("gone.json")),
            work.path(),
            system.path(),
        )
        .unwrap();
        assert_eq!(found.source, ConfigSource::System);
    }

    #[test]
    fn test_find_nonexistent_file() {
        let dir = tempdir().unwrap();
        let result = find_in("nope.json", None, dir.path(), dir.path());
        assert!(matches!(result, Err(ConfigError::FileNotFound(msg)) if msg.contains("nope.json")));
    }
}
