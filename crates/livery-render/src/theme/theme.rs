//! The theme entity.

use std::path::{Path, PathBuf};

use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::convention::TemplateLayout;

/// Immutable descriptor of a discovered theme.
///
/// A theme is a directory of templates and assets. It may name a parent
/// theme whose templates are used when its own are missing. The manifest
/// (`theme.json`) contents are kept verbatim as [`config`](Theme::config).
///
/// Themes serialize into the render context under the `theme` key:
///
/// ```rust
/// use livery_render::Theme;
///
/// let theme = Theme::new("dark", "/srv/app/templates/themes/dark").with_parent("base");
/// let value = serde_json::to_value(&theme).unwrap();
///
/// assert_eq!(value["name"], "dark");
/// assert_eq!(value["parent"], "base");
/// assert_eq!(value["assets_path"], "/srv/app/templates/themes/dark/assets");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    name: String,
    root_path: PathBuf,
    is_default: bool,
    parent: Option<String>,
    config: Map<String, Value>,
    layout: TemplateLayout,
}

impl Theme {
    /// Creates a non-default theme with no parent, an empty config and
    /// templates at the theme root.
    pub fn new(name: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root_path: root_path.into(),
            is_default: false,
            parent: None,
            config: Map::new(),
            layout: TemplateLayout::ThemeRoot,
        }
    }

    /// Sets the parent theme name.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Replaces the manifest config.
    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }

    /// Sets where templates live relative to the theme directory.
    pub fn with_layout(mut self, layout: TemplateLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Flags (or unflags) the theme as default.
    ///
    /// Catalogs enforce that exactly one of their themes carries the flag;
    /// the entity itself does not.
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path of the theme directory.
    pub fn path(&self) -> &Path {
        &self.root_path
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Name of the parent theme, if the manifest declares one.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// The full manifest, unknown keys included.
    pub fn config(&self) -> &Map<String, Value> {
        &self.config
    }

    /// Looks up one manifest key.
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    pub fn layout(&self) -> TemplateLayout {
        self.layout
    }

    /// `<theme>/assets`.
    pub fn assets_path(&self) -> PathBuf {
        self.root_path.join("assets")
    }

    /// Directory that template names resolve against.
    pub fn templates_path(&self) -> PathBuf {
        self.layout.templates_path(&self.root_path)
    }
}

#[derive(serde::Serialize)]
struct ThemeView<'a> {
    name: &'a str,
    path: &'a Path,
    assets_path: PathBuf,
    templates_path: PathBuf,
    is_default: bool,
    parent: Option<&'a str>,
    config: &'a Map<String, Value>,
}

impl Serialize for Theme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ThemeView {
            name: &self.name,
            path: &self.root_path,
            assets_path: self.assets_path(),
            templates_path: self.templates_path(),
            is_default: self.is_default,
            parent: self.parent.as_deref(),
            config: &self.config,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derived_paths_follow_layout() {
        let theme = Theme::new("dark", "/themes/dark");
        assert_eq!(theme.templates_path(), PathBuf::from("/themes/dark"));
        assert_eq!(theme.assets_path(), PathBuf::from("/themes/dark/assets"));

        let theme = theme.with_layout(TemplateLayout::TemplatesDir);
        assert_eq!(
            theme.templates_path(),
            PathBuf::from("/themes/dark/templates")
        );
    }

    #[test]
    fn test_defaults() {
        let theme = Theme::new("plain", "/themes/plain");
        assert!(!theme.is_default());
        assert!(theme.parent().is_none());
        assert!(theme.config().is_empty());
    }

    #[test]
    fn test_config_value() {
        let config = json!({"parent": "base", "accent": "#ff0066"});
        let theme = Theme::new("neon", "/themes/neon")
            .with_config(config.as_object().cloned().unwrap_or_default());

        assert_eq!(theme.config_value("accent"), Some(&json!("#ff0066")));
        assert!(theme.config_value("missing").is_none());
    }

    #[test]
    fn test_serialize_shape() {
        let theme = Theme::new("light", "/themes/light")
            .with_default(true)
            .with_layout(TemplateLayout::TemplatesDir);
        let value = serde_json::to_value(&theme).unwrap();

        assert_eq!(value["name"], "light");
        assert_eq!(value["path"], "/themes/light");
        assert_eq!(value["templates_path"], "/themes/light/templates");
        assert_eq!(value["is_default"], true);
        assert!(value["parent"].is_null());
        assert_eq!(value["config"], json!({}));
    }
}
