//! Chat configuration.
//!
//! Settings are resolved in layers: built-in defaults, then a JSON config
//! file, then the environment, then command-line flags (applied by the CLI).

use crate::error::{Error, IoError, Result};
use crate::provider::{
    API_KEY_ENV, CompletionParams, DEFAULT_API_BASE, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE, resolve_model_id,
};
use crate::reveal::{DEFAULT_CURSOR, DEFAULT_PACE_MS, IncrementalRevealer};
use crate::sanitize::ResponseSanitizer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "lunga";

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Resolved chat settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// `OpenAI`-compatible API base.
    pub api_base: String,

    /// API key. Never written back to disk.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Catalog display name or raw provider id.
    pub model: String,

    /// Sampling temperature in `[0, 1]`.
    pub temperature: f32,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Pause between revealed words, in milliseconds.
    pub pace_ms: u64,

    /// Progress marker shown while revealing.
    pub cursor: String,

    /// Control tokens stripped in addition to the defaults.
    pub extra_tokens: Vec<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            pace_ms: DEFAULT_PACE_MS,
            cursor: DEFAULT_CURSOR.to_string(),
            extra_tokens: Vec::new(),
        }
    }
}

impl ChatConfig {
    /// Platform default config file path (e.g. `~/.config/lunga/config.json`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads configuration.
    ///
    /// An explicit `path` must exist. Without one, the default path is used
    /// if present, otherwise defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Reads a JSON config file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| IoError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Fills unset values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Fills unset values using `lookup` for environment variables.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.is_none() {
            self.api_key = lookup(API_KEY_ENV).filter(|key| !key.trim().is_empty());
        }
    }

    /// Checks every setting.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a temperature outside `[0, 1]`, a
    /// zero token cap, or an unknown model name.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(Error::config(format!(
                "temperature {} is outside [0, 1]",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(Error::config("max_tokens must be > 0"));
        }
        resolve_model_id(&self.model)?;
        Ok(())
    }

    /// The API key, or an error naming the variable to set.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no key is configured.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::config(format!("no API key; set {API_KEY_ENV}")))
    }

    /// Completion parameters for the configured model.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings are invalid.
    pub fn params(&self) -> Result<CompletionParams> {
        self.validate()?;
        Ok(CompletionParams::new(resolve_model_id(&self.model)?)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens))
    }

    /// Sanitizer with the default tokens plus `extra_tokens`.
    #[must_use]
    pub fn sanitizer(&self) -> ResponseSanitizer {
        ResponseSanitizer::new().extended(self.extra_tokens.iter().cloned())
    }

    /// Revealer with the configured pace and cursor.
    #[must_use]
    pub fn revealer(&self) -> IncrementalRevealer {
        IncrementalRevealer::new(Duration::from_millis(self.pace_ms)).with_cursor(self.cursor.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_valid() {
        let config = ChatConfig::default();
        assert!(config.validate().is_ok());
        let params = config.params().unwrap();
        assert_eq!(params.model_id, "mistralai/mistral-7b-instruct:free");
        assert_eq!(params.max_tokens, 1000);
    }

    #[test]
    fn test_temperature_out_of_range() {
        let config = ChatConfig {
            temperature: 1.2,
            ..ChatConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_unknown_model_rejected() {
        let config = ChatConfig {
            model: "gpt".to_string(),
            ..ChatConfig::default()
        };
        assert!(config.params().is_err());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"model": "Grok 3 (Free)", "pace_ms": 0, "extra_tokens": ["<|eot_id|>"]}}"#
        )
        .unwrap();

        let config = ChatConfig::from_file(file.path()).unwrap();
        assert_eq!(config.model, "Grok 3 (Free)");
        assert_eq!(config.pace_ms, 0);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.sanitizer().clean("ok<|eot_id|>"), "ok");
        assert!(config.revealer().pace().is_zero());
    }

    #[test]
    fn test_from_file_malformed() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = ChatConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ChatConfig::load(Some(&dir.path().join("missing.json"))).unwrap_err();
        assert!(matches!(err, Error::Io(IoError::ReadFailed { .. })));
    }

    #[test]
    fn test_apply_env_with() {
        let mut config = ChatConfig::default();
        config.apply_env_with(|key| (key == API_KEY_ENV).then(|| "sk-test".to_string()));
        assert_eq!(config.require_api_key().unwrap(), "sk-test");

        let mut config = ChatConfig {
            api_key: Some("from-file".to_string()),
            ..ChatConfig::default()
        };
        config.apply_env_with(|_| Some("from-env".to_string()));
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_missing_api_key() {
        let mut config = ChatConfig::default();
        config.apply_env_with(|_| Some("   ".to_string()));
        let err = config.require_api_key().unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = ChatConfig {
            api_key: Some("secret".to_string()),
            ..ChatConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
