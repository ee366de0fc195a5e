//! Theme configuration.
//!
//! [`ThemeSettings`] is the configuration mapping consumed by the catalog and
//! the resolver. It deserializes from JSON or YAML:
//!
//! ```yaml
//! default: light
//! available: [light, dark]
//! cookie_name: theme
//! query_param: theme
//! templates_path: templates/themes
//! engines:
//!   simple:
//!     templates_path: templates/simple
//!     cookie_name: simple_theme
//! ```
//!
//! Every key is optional. Per-engine entries under `engines` override the
//! global `templates_path`, `cookie_name` and `query_param` for that engine;
//! use [`ThemeSettings::for_engine`] to get the effective values.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default cookie and query parameter name.
pub const DEFAULT_SIGNAL_NAME: &str = "theme";

/// Errors raised while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON document is malformed or has the wrong shape.
    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    /// The YAML document is malformed or has the wrong shape.
    #[error("invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file extension is not `.json`, `.yaml` or `.yml`.
    #[error("unsupported settings format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// Theme configuration shared by every engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    /// Name of the default theme.
    pub default: Option<String>,
    /// When non-empty, only these directories become catalog entries.
    pub available: Vec<String>,
    /// Cookie that persists an explicit theme choice.
    pub cookie_name: String,
    /// Query parameter that selects a theme explicitly.
    pub query_param: String,
    /// Themes directory, relative to the application root unless absolute.
    pub templates_path: Option<String>,
    /// Fail discovery instead of promoting a theme when none is flagged default.
    pub strict_default: bool,
    /// Per-engine overrides keyed by engine id.
    pub engines: BTreeMap<String, EngineSettings>,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            default: None,
            available: Vec::new(),
            cookie_name: DEFAULT_SIGNAL_NAME.to_string(),
            query_param: DEFAULT_SIGNAL_NAME.to_string(),
            templates_path: None,
            strict_default: false,
            engines: BTreeMap::new(),
        }
    }
}

/// Overrides applied for one engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub templates_path: Option<String>,
    pub cookie_name: Option<String>,
    pub query_param: Option<String>,
}

/// Settings after applying an engine's overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveSettings {
    /// Themes directory override, if either the engine or the global settings set one.
    pub templates_path: Option<String>,
    pub cookie_name: String,
    pub query_param: String,
}

impl ThemeSettings {
    /// Creates settings with every key at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default theme name.
    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default = Some(name.into());
        self
    }

    /// Restricts discovery to the given theme names.
    pub fn with_available<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the global themes directory.
    pub fn with_templates_path(mut self, path: impl Into<String>) -> Self {
        self.templates_path = Some(path.into());
        self
    }

    /// Sets the cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Sets the query parameter name.
    pub fn with_query_param(mut self, name: impl Into<String>) -> Self {
        self.query_param = name.into();
        self
    }

    /// Requires an explicit default theme.
    pub fn with_strict_default(mut self, strict: bool) -> Self {
        self.strict_default = strict;
        self
    }

    /// Adds overrides for one engine.
    pub fn with_engine(mut self, id: impl Into<String>, engine: EngineSettings) -> Self {
        self.engines.insert(id.into(), engine);
        self
    }

    /// Parses settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses settings from a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads settings from a file, picking the format from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Err(SettingsError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Returns true if `name` passes the `available` filter.
    pub fn is_available(&self, name: &str) -> bool {
        self.available.is_empty() || self.available.iter().any(|n| n == name)
    }

    /// Returns the settings in effect for the engine identified by `id`.
    ///
    /// Engine overrides win over the global values.
    pub fn for_engine(&self, id: &str) -> EffectiveSettings {
        let engine = self.engines.get(id);
        let pick = |over: Option<&Option<String>>, global: &str| {
            over.and_then(|v| v.clone())
                .unwrap_or_else(|| global.to_string())
        };

        EffectiveSettings {
            templates_path: engine
                .and_then(|e| e.templates_path.clone())
                .or_else(|| self.templates_path.clone()),
            cookie_name: pick(engine.map(|e| &e.cookie_name), &self.cookie_name),
            query_param: pick(engine.map(|e| &e.query_param), &self.query_param),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = ThemeSettings::default();
        assert_eq!(settings.cookie_name, "theme");
        assert_eq!(settings.query_param, "theme");
        assert!(settings.default.is_none());
        assert!(settings.is_available("anything"));
    }

    #[test]
    fn test_from_json_partial() {
        let settings = ThemeSettings::from_json_str(r#"{"default": "light"}"#).unwrap();
        assert_eq!(settings.default.as_deref(), Some("light"));
        assert_eq!(settings.cookie_name, "theme");
    }

    #[test]
    fn test_from_yaml_with_engines() {
        let settings = ThemeSettings::from_yaml_str(
            r#"
default: light
available: [light, dark]
templates_path: views
engines:
  simple:
    templates_path: views/simple
    cookie_name: simple_theme
"#,
        )
        .unwrap();

        assert!(settings.is_available("dark"));
        assert!(!settings.is_available("neon"));

        let simple = settings.for_engine("simple");
        assert_eq!(simple.templates_path.as_deref(), Some("views/simple"));
        assert_eq!(simple.cookie_name, "simple_theme");
        assert_eq!(simple.query_param, "theme");

        let other = settings.for_engine("minijinja");
        assert_eq!(other.templates_path.as_deref(), Some("views"));
        assert_eq!(other.cookie_name, "theme");
    }

    #[test]
    fn test_from_json_rejects_wrong_shape() {
        let result = ThemeSettings::from_json_str(r#"{"available": "light"}"#);
        assert!(matches!(result, Err(SettingsError::Json(_))));
    }

    #[test]
    fn test_from_path_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let json = temp_dir.path().join("themes.json");
        fs::write(&json, r#"{"query_param": "skin"}"#).unwrap();
        let yaml = temp_dir.path().join("themes.yml");
        fs::write(&yaml, "cookie_name: skin\n").unwrap();
        let toml = temp_dir.path().join("themes.toml");
        fs::write(&toml, "").unwrap();

        assert_eq!(ThemeSettings::from_path(&json).unwrap().query_param, "skin");
        assert_eq!(ThemeSettings::from_path(&yaml).unwrap().cookie_name, "skin");
        assert!(matches!(
            ThemeSettings::from_path(&toml),
            Err(SettingsError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ThemeSettings::from_path(temp_dir.path().join("missing.json")),
            Err(SettingsError::Io { .. })
        ));
    }
}
