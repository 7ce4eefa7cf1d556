//! Configuration loading and discovery for `seasonfall.toml`

use super::schema::SeasonfallConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up while walking towards the filesystem root.
pub const CONFIG_FILE_NAME: &str = "seasonfall.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse seasonfall.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// Find `seasonfall.toml` from the current directory upwards, falling back
/// to `$XDG_CONFIG_HOME/seasonfall/seasonfall.toml`.
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }
    find_xdg_config()
}

/// Checks XDG_CONFIG_HOME/seasonfall/ or ~/.config/seasonfall/
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("seasonfall").join(CONFIG_FILE_NAME);
    config_path.exists().then_some(config_path)
}

/// Walk up from `start` looking for `seasonfall.toml`.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from `path`, or from a discovered file when `None`.
///
/// No file at all is not an error: the built-in defaults are returned.
pub fn load_config(path: Option<&Path>) -> Result<SeasonfallConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(SeasonfallConfig::default()),
    }
}

fn load_config_file(path: &Path) -> Result<SeasonfallConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: SeasonfallConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    tracing::info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Resolve a path relative to the directory holding the config file.
///
/// Absolute paths come back unchanged.
pub fn resolve_path(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match config_path.parent() {
        Some(root) => root.join(path),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::Season;
    use tempfile::TempDir;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, body).expect("should write config");
        path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = write_config(temp.path(), "");
        assert_eq!(find_config_from(temp.path().to_path_buf()), Some(path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = write_config(temp.path(), "");
        let subdir = temp.path().join("site").join("assets");
        fs::create_dir_all(&subdir).expect("should create subdirectories");
        assert_eq!(find_config_from(subdir), Some(path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        assert_eq!(find_config_from(temp.path().to_path_buf()), None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = write_config(temp.path(), "[seasons.spring]\nleaf_count = 7\n");
        let config = load_config(Some(&path)).expect("should load");
        assert_eq!(config.season_table().get(Season::Spring).leaf_count, 7);
    }

    #[test]
    fn test_load_config_missing_file_is_io_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_parse_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = write_config(temp.path(), "[scene\nseason = ");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let path = write_config(temp.path(), "[seasons.autumn]\ngravity = -3.0\n");
        match load_config(Some(&path)) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("seasons.autumn.gravity"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_path() {
        let cfg = Path::new("/site/seasonfall.toml");
        assert_eq!(resolve_path(cfg, Path::new("assets")), PathBuf::from("/site/assets"));
        assert_eq!(resolve_path(cfg, Path::new("/abs/assets")), PathBuf::from("/abs/assets"));
    }
}
