//! Configuration management for xmake-bridge.
//!
//! Handles loading and saving configuration from TOML files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{BridgeError, BridgeResult};

/// Name of the project-local configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".xmake-bridge.toml";

/// Bridge configuration.
///
/// Constructed once and handed to the bridge; nothing reads it from globals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Path or name of the xmake executable
    pub executable: PathBuf,

    /// Directory xmake runs in (the project root)
    pub working_dir: PathBuf,

    /// Directory holding the `<name>.lua` script assets
    pub assets_dir: PathBuf,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("xmake"),
            working_dir: PathBuf::from("."),
            assets_dir: default_assets_dir(),
        }
    }
}

impl BridgeConfig {
    /// Create a configuration with explicit paths.
    pub fn new(
        executable: impl Into<PathBuf>,
        working_dir: impl Into<PathBuf>,
        assets_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executable: executable.into(),
            working_dir: working_dir.into(),
            assets_dir: assets_dir.into(),
        }
    }

    /// Set the xmake executable.
    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Set the assets directory.
    #[must_use]
    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.xmake-bridge.toml` in current directory
    /// 2. `~/.config/xmake-bridge/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> BridgeResult<Self> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(global_config) = Self::config_dir().map(|d| d.join("config.toml")) {
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> BridgeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| BridgeError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Save configuration to the global config file.
    pub fn save(&self) -> BridgeResult<PathBuf> {
        let dir = Self::config_dir()
            .ok_or_else(|| BridgeError::Config("Could not determine config directory".into()))?;
        std::fs::create_dir_all(&dir)?;

        let path = dir.join("config.toml");
        self.save_to_file(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific file.
    pub fn save_to_file(&self, path: &Path) -> BridgeResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| BridgeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(crate::APP_NAME))
    }
}

/// Default location of the bundled scripts.
fn default_assets_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(crate::APP_NAME).join("assets"))
        .filter(|d| d.is_dir())
        .unwrap_or_else(|| PathBuf::from("assets"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.executable, PathBuf::from("xmake"));
        assert_eq!(config.working_dir, PathBuf::from("."));
    }

    #[test]
    fn test_builder_overrides() {
        let config = BridgeConfig::default()
            .with_executable("/opt/xmake/bin/xmake")
            .with_working_dir("/src/project")
            .with_assets_dir("/usr/share/xmake-bridge");

        assert_eq!(config.executable, PathBuf::from("/opt/xmake/bin/xmake"));
        assert_eq!(config.working_dir, PathBuf::from("/src/project"));
        assert_eq!(config.assets_dir, PathBuf::from("/usr/share/xmake-bridge"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            executable = "/usr/local/bin/xmake"
            working_dir = "/home/me/game"
        "#;

        let config: BridgeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.executable, PathBuf::from("/usr/local/bin/xmake"));
        assert_eq!(config.working_dir, PathBuf::from("/home/me/game"));
        assert_eq!(config.assets_dir, default_assets_dir());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = BridgeConfig::new("xmake", "/work", "/assets");
        config.save_to_file(&path).unwrap();

        let loaded = BridgeConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "executable = [").unwrap();

        let err = BridgeConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, BridgeError::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = BridgeConfig::load_from_file(Path::new("/nonexistent/xmake-bridge.toml"))
            .unwrap_err();
        assert!(matches!(err, BridgeError::Io(_)));
    }
}
