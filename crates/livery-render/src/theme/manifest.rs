//! The optional per-theme `theme.json` manifest.
//!
//! A manifest is a JSON object. The `parent` key names the parent theme; all
//! keys, known or not, are kept as the theme's config. A manifest that cannot
//! be read or is not a JSON object counts as absent.

use std::io::ErrorKind;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::warn;

/// File name of the manifest inside a theme directory.
pub const MANIFEST_FILE: &str = "theme.json";

/// Parsed manifest contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeManifest {
    /// Parent theme name from the `parent` key.
    pub parent: Option<String>,
    /// The whole manifest object.
    pub config: Map<String, Value>,
}

impl ThemeManifest {
    /// Parses manifest text.
    ///
    /// Returns `None` when the text is not a JSON object. A `parent` that is
    /// not a non-empty string is ignored; the rest of the manifest is kept.
    pub fn parse(content: &str) -> Option<Self> {
        let config = match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(map)) => map,
            _ => return None,
        };

        let parent = match config.get("parent") {
            Some(Value::String(name)) if !name.is_empty() => Some(name.clone()),
            None | Some(Value::Null) => None,
            Some(other) => {
                warn!(parent = %other, "ignoring non-string parent in theme manifest");
                None
            }
        };

        Some(Self { parent, config })
    }

    /// Reads `theme.json` from a theme directory.
    ///
    /// Absent manifests return `None` silently; unreadable or malformed ones
    /// are logged and also return `None`.
    pub fn load(theme_dir: &Path) -> Option<Self> {
        let path = theme_dir.join(MANIFEST_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unreadable theme manifest");
                return None;
            }
        };

        let manifest = Self::parse(&content);
        if manifest.is_none() {
            warn!(path = %path.display(), "theme manifest is not a JSON object, ignoring");
        }
        manifest
    }
}
