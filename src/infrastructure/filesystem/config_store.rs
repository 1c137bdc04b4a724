use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

use crate::common::error::WcError;
use crate::common::result::{ResultExt, WcResult};
use crate::domain::value_objects::output_filter::RuleSet;

/// Name of the per-tree configuration file looked up in the root working copy
pub const CONFIG_FILE_NAME: &str = ".wctree.yml";

/// `git status` noise that says nothing about a working copy's state
const STATUS_NOISE: &[(&str, &str)] = &[
    ("-", r#"^\s*\(use "git "#),
    ("-", "^On branch "),
    ("-", "^Your branch is up to date"),
    ("-", "^nothing to commit"),
    ("-", r"^\s*$"),
];

const FETCH_NOISE: &[(&str, &str)] = &[("-", r"^\s*$")];

/// Child discovery cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub enabled: bool,

    #[validate(range(min = 1, max = 8760))]
    pub max_age_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_hours: 24,
        }
    }
}

impl CacheConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_hours * 60 * 60)
    }
}

/// Settings read from `.wctree.yml`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// git binary, looked up on PATH unless absolute
    #[validate(length(min = 1))]
    pub git_executable: String,

    /// Directory whose presence marks a repository root
    #[validate(length(min = 1, max = 255))]
    pub metadata_marker: String,

    #[validate(nested)]
    pub cache: CacheConfig,

    /// Replaces the built-in `git status` noise filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_filter: Option<RuleSet>,

    /// Replaces the built-in `git fetch` noise filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_filter: Option<RuleSet>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            git_executable: "git".to_string(),
            metadata_marker: ".git".to_string(),
            cache: CacheConfig::default(),
            status_filter: None,
            fetch_filter: None,
        }
    }
}

impl ToolConfig {
    pub fn status_rules(&self) -> WcResult<RuleSet> {
        match &self.status_filter {
            Some(rules) => Ok(rules.clone()),
            None => RuleSet::from_pairs(STATUS_NOISE),
        }
    }

    pub fn fetch_rules(&self) -> WcResult<RuleSet> {
        match &self.fetch_filter {
            Some(rules) => Ok(rules.clone()),
            None => RuleSet::from_pairs(FETCH_NOISE),
        }
    }
}

/// Reads and validates [`ToolConfig`] YAML files
#[derive(Debug, Default, Clone)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// `explicit` if given (it must exist), else `<root>/.wctree.yml` if present, else defaults
    pub fn load(&self, explicit: Option<&Path>, root: &Path) -> WcResult<ToolConfig> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(WcError::config_error(format!(
                    "Configuration file not found at path: {}",
                    path.display()
                )));
            }
            return self.read_config(path);
        }

        let default_path = Self::default_path(root);
        if default_path.is_file() {
            return self.read_config(&default_path);
        }

        tracing::debug!("no configuration file, using defaults");
        Ok(ToolConfig::default())
    }

    pub fn read_config<P: AsRef<Path>>(&self, config_path: P) -> WcResult<ToolConfig> {
        let config_path = config_path.as_ref();
        let contents = fs::read_to_string(config_path).with_filesystem_error(
            "Configuration file read failed",
            Some(config_path.to_path_buf()),
        )?;

        let config: ToolConfig = serde_yaml::from_str(&contents).map_err(|e| {
            WcError::config_error_with_source(
                format!("Invalid configuration in {}", config_path.display()),
                e,
            )
        })?;

        self.validate_tool_config(&config)?;
        tracing::debug!(path = %config_path.display(), "loaded configuration");
        Ok(config)
    }

    /// Where the configuration of the tree rooted at `root` is looked up
    pub fn default_path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE_NAME)
    }

    fn validate_tool_config(&self, config: &ToolConfig) -> WcResult<()> {
        config
            .validate()
            .map_err(|e| WcError::config_error_with_source("Configuration validation failed", e))?;

        // The marker is a single directory name, never a path
        if config.metadata_marker.contains(['/', '\\']) || config.metadata_marker == ".." {
            return Err(WcError::config_error(format!(
                "metadata_marker must be a plain directory name, got '{}'",
                config.metadata_marker
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigStore::new().load(None, temp_dir.path()).unwrap();

        assert_eq!(config.git_executable, "git");
        assert_eq!(config.metadata_marker, ".git");
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_age(), Duration::from_secs(24 * 3600));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.yml");
        let result = ConfigStore::new().load(Some(&missing), temp_dir.path());
        assert!(matches!(result, Err(WcError::ConfigError { .. })));
    }

    #[test]
    fn test_root_config_file_is_picked_up() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "git_executable: /usr/local/bin/git\ncache:\n  max_age_hours: 2\nstatus_filter:\n  - action: exclude\n    pattern: '^#'\n",
        )
        .unwrap();

        let config = ConfigStore::new().load(None, temp_dir.path()).unwrap();
        assert_eq!(config.git_executable, "/usr/local/bin/git");
        assert_eq!(config.cache.max_age_hours, 2);
        assert!(config.cache.enabled);

        let rules = config.status_rules().unwrap();
        assert_eq!(rules.rules().len(), 1);
        assert!(!rules.keep("# comment"));
        assert!(rules.keep("On branch master"));
    }

    #[test]
    fn test_validation_rejects_out_of_range_cache_age() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yml");
        fs::write(&path, "cache:\n  max_age_hours: 0\n").unwrap();

        let result = ConfigStore::new().read_config(&path);
        assert!(matches!(result, Err(WcError::ConfigError { .. })));
    }

    #[test]
    fn test_validation_rejects_marker_paths_and_unknown_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yml");

        fs::write(&path, "metadata_marker: a/b\n").unwrap();
        assert!(ConfigStore::new().read_config(&path).is_err());

        fs::write(&path, "git_exe: git\n").unwrap();
        assert!(matches!(
            ConfigStore::new().read_config(&path),
            Err(WcError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_root_config_file_is_found_at_default_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigStore::default_path(temp_dir.path());
        assert_eq!(path, temp_dir.path().join(".wctree.yml"));

        fs::write(&path, "cache:\n  enabled: false\n").unwrap();
        let config = ConfigStore::new().load(None, temp_dir.path()).unwrap();
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_builtin_status_rules_hide_clean_status() {
        let rules = ToolConfig::default().status_rules().unwrap();
        let clean = [
            "On branch master",
            "Your branch is up to date with 'origin/master'.",
            "",
            "nothing to commit, working tree clean",
        ];
        assert!(rules.filter(clean).is_empty());

        let dirty = [
            "Changes not staged for commit:",
            "  (use \"git add <file>...\" to update what will be committed)",
            "\tmodified:   README",
        ];
        assert_eq!(
            rules.filter(dirty),
            vec!["Changes not staged for commit:", "\tmodified:   README"]
        );
    }
}
