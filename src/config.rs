//! Configuration file schema and loader.
//!
//! A TOML file with `${VAR}` environment substitution; every section
//! is optional and CLI flags override whatever the file says.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Wayfarer configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub oracle: OracleConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub bridge: BridgeSection,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Decision oracle settings.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OracleConfig {
    /// API key; usually injected via `${OPENAI_API_KEY}`.
    pub api_key: Option<String>,

    /// OpenAI-compatible endpoint override.
    pub api_url: Option<String>,

    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Run bounds; CLI flags take precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub max_steps: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub settle_delay_ms: Option<u64>,
}

/// Tool-server command override.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeSection {
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Diagnostic artifact settings.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Directory for per-run artifacts; tilde-expanded.
    pub log_dir: Option<String>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),
}

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Default location: `~/.wayfarer/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".wayfarer").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// The file at `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.wayfarer`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert!(config.oracle.api_key.is_none());
        assert!(config.run.max_steps.is_none());
        assert!(config.bridge.command.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [oracle]
            model = "gpt-4o"
            temperature = 0.2
            max_tokens = 4096

            [run]
            max_steps = 50
            timeout_seconds = 600
            settle_delay_ms = 500

            [bridge]
            command = "node"
            args = ["tool-server.js"]

            [diagnostics]
            log_dir = "~/.wayfarer/runs"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.oracle.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.run.max_steps, Some(50));
        assert_eq!(config.bridge.command.as_deref(), Some("node"));
        assert_eq!(config.bridge.args, vec!["tool-server.js"]);
        assert_eq!(config.diagnostics.log_dir.as_deref(), Some("~/.wayfarer/runs"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let result = ConfigLoader::load_str("[oracle]\nmodle = \"typo\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[run]").unwrap();
        writeln!(file, "max_steps = 12").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.run.max_steps, Some(12));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = ConfigLoader::load_or_default(Path::new("/nonexistent/wayfarer.toml")).unwrap();
        assert!(config.oracle.api_key.is_none());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("WAYFARER_TEST_KEY", "sk-test");
        }
        let content = "[oracle]\napi_key = \"${WAYFARER_TEST_KEY}\"";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.oracle.api_key.as_deref(), Some("sk-test"));
        unsafe {
            std::env::remove_var("WAYFARER_TEST_KEY");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "[oracle]\napi_key = \"${WAYFARER_NONEXISTENT_VAR_9}\"";
        let result = ConfigLoader::load_str(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/runs");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/runs"));
    }
}
