//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/goal-tracker/)
    Project = 1,
    /// User-level config (~/.goal-tracker/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: GOAL_TRACKER_USER_DIR or ~/.goal-tracker
        let user_dir = std::env::var("GOAL_TRACKER_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".goal-tracker")));

        // Project dir: GOAL_TRACKER_PROJECT_DIR or $CWD/goal-tracker
        let project_dir = std::env::var("GOAL_TRACKER_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("goal-tracker")));

        Self {
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }
}

/// Read one tier's `config.yaml`. Unreadable or invalid files are skipped with a warning.
fn read_tier(dir: Option<&Path>, tier: ConfigTier) -> Option<(Value, PathBuf)> {
    let file = dir?.join("config.yaml");
    if !file.exists() {
        return None;
    }
    let parsed = std::fs::read_to_string(&file)
        .map_err(anyhow::Error::from)
        .and_then(|content| serde_yaml::from_str::<Value>(&content).map_err(Into::into));
    match parsed {
        Ok(value) => Some((value, file)),
        Err(e) => {
            warn!("Ignoring {} config {}: {}", tier, file.display(), e);
            None
        }
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    /// Highest-priority config file that contributed (if any)
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    ///
    /// An explicit file (from `--config`) replaces the tiers entirely.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover(), explicit.map(Path::to_path_buf))
    }

    /// Load configuration with explicit paths.
    ///
    /// `explicit` wins over `GOAL_TRACKER_CONFIG_PATH`; either one skips the tiers.
    pub fn load_with_paths(paths: ConfigPaths, explicit: Option<PathBuf>) -> Result<Self> {
        let explicit = explicit.or_else(|| {
            std::env::var("GOAL_TRACKER_CONFIG_PATH")
                .ok()
                .map(PathBuf::from)
        });
        if let Some(path) = explicit {
            let mut config = Config::load(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            Self::apply_env_overrides(&mut config)?;
            return Ok(Self {
                paths,
                config,
                config_path: Some(path),
            });
        }

        let mut configs: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut config_path = None;

        for (dir, tier) in [
            (paths.project_dir.as_deref(), ConfigTier::Project),
            (paths.user_dir.as_deref(), ConfigTier::User),
        ] {
            if let Some((value, file)) = read_tier(dir, tier) {
                configs.push(value);
                config_path = Some(file);
            }
        }

        let merged = deep_merge_all(configs);
        let mut config: Config = serde_json::from_value(merged)?;

        Self::apply_env_overrides(&mut config)?;

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides(config: &mut Config) -> Result<()> {
        if let Ok(db_path) = std::env::var("GOAL_TRACKER_DB_PATH") {
            config.server.db_path = PathBuf::from(db_path);
        }

        if let Ok(host) = std::env::var("GOAL_TRACKER_HOST") {
            config.server.host = host
                .parse()
                .with_context(|| format!("GOAL_TRACKER_HOST is not an IP address: {}", host))?;
        }

        if let Ok(port) = std::env::var("GOAL_TRACKER_PORT") {
            config.server.port = port
                .parse()
                .with_context(|| format!("GOAL_TRACKER_PORT is not a port: {}", port))?;
        }

        if let Ok(origin) = std::env::var("GOAL_TRACKER_CORS_ORIGIN") {
            config.cors.allowed_origin = origin;
        }

        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_paths_discover() {
        let paths = ConfigPaths::discover();
        assert!(paths.project_dir.is_some());
    }

    #[test]
    fn test_load_defaults_only() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = ConfigLoader::load_with_paths(paths, None).unwrap();

        assert_eq!(loader.config().server.port, 8000);
        assert_eq!(loader.config().cors.allowed_origin, "http://localhost:3000");
        assert!(loader.config_path().is_none());
    }

    #[test]
    fn test_user_config_overrides_project() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("goal-tracker");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        std::fs::write(
            project_dir.join("config.yaml"),
            "server:\n  port: 8100\n  db_path: project.db\n",
        )
        .unwrap();
        std::fs::write(user_dir.join("config.yaml"), "server:\n  port: 8200\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), Some(user_dir.clone()));
        let loader = ConfigLoader::load_with_paths(paths, None).unwrap();
        let config = loader.config();

        assert_eq!(config.server.port, 8200);
        assert_eq!(config.server.db_path, PathBuf::from("project.db"));
        assert_eq!(loader.config_path(), Some(user_dir.join("config.yaml").as_path()));
    }

    #[test]
    fn test_invalid_yaml_tier_is_skipped() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("goal-tracker");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("config.yaml"), "server: [unclosed").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), None);
        let loader = ConfigLoader::load_with_paths(paths, None).unwrap();

        assert_eq!(loader.config().server.port, 8000);
    }

    #[test]
    fn test_explicit_file_replaces_tiers() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("goal-tracker");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("config.yaml"), "server:\n  port: 8100\n").unwrap();
        let explicit = temp.path().join("explicit.yaml");
        std::fs::write(&explicit, "cors:\n  allowed_origin: http://app.local\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), None);
        let loader = ConfigLoader::load_with_paths(paths, Some(explicit.clone())).unwrap();

        assert_eq!(loader.config().cors.allowed_origin, "http://app.local");
        assert_eq!(loader.config().server.port, 8000);
        assert_eq!(loader.config_path(), Some(explicit.as_path()));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(None, None);

        let result = ConfigLoader::load_with_paths(paths, Some(temp.path().join("absent.yaml")));

        assert!(result.is_err());
    }
}
