//! Engine conventions.
//!
//! Template backends disagree on two things only: where a theme keeps its
//! templates, and how the default theme is flagged. An [`EngineConvention`]
//! captures those rules as a value so one catalog and one renderer serve
//! every backend.
//!
//! | Preset | Themes dir | Template root | Default flag |
//! |--------|------------|---------------|--------------|
//! | [`EngineConvention::minijinja`] | `templates/themes` | theme root | `default` setting |
//! | [`EngineConvention::simple`] | `templates/simple` | `<theme>/templates` | setting or `.default` marker |

use std::path::{Path, PathBuf};

/// Name of the marker file that flags a default theme under [`DefaultRule::MarkerFile`].
pub const DEFAULT_MARKER: &str = ".default";

/// Where a theme's templates live relative to its directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateLayout {
    /// Templates sit directly in the theme directory.
    ThemeRoot,
    /// Templates sit in a `templates/` subdirectory.
    TemplatesDir,
}

impl TemplateLayout {
    /// Returns the template root for a theme rooted at `theme_root`.
    pub fn templates_path(&self, theme_root: &Path) -> PathBuf {
        match self {
            TemplateLayout::ThemeRoot => theme_root.to_path_buf(),
            TemplateLayout::TemplatesDir => theme_root.join("templates"),
        }
    }
}

/// How discovery decides which theme is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefaultRule {
    /// The theme named by the `default` setting.
    Setting,
    /// Any theme whose directory contains a `.default` marker file.
    MarkerFile,
    /// Either of the above.
    SettingOrMarker,
}

impl DefaultRule {
    pub(crate) fn uses_setting(&self) -> bool {
        matches!(self, DefaultRule::Setting | DefaultRule::SettingOrMarker)
    }

    pub(crate) fn uses_marker(&self) -> bool {
        matches!(self, DefaultRule::MarkerFile | DefaultRule::SettingOrMarker)
    }
}

/// Path and detection rules for one template backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConvention {
    id: String,
    default_themes_dir: String,
    layout: TemplateLayout,
    default_rule: DefaultRule,
}

impl EngineConvention {
    /// Creates a convention for the engine `id`.
    ///
    /// The `id` keys the `engines` section of the settings. Starts with themes
    /// in `templates/themes`, templates at the theme root and the default
    /// taken from settings.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            default_themes_dir: "templates/themes".to_string(),
            layout: TemplateLayout::ThemeRoot,
            default_rule: DefaultRule::Setting,
        }
    }

    /// Convention used with [`MiniJinjaEngine`](crate::template::MiniJinjaEngine).
    pub fn minijinja() -> Self {
        Self::new("minijinja")
    }

    /// Convention used with [`SimpleEngine`](crate::template::SimpleEngine).
    pub fn simple() -> Self {
        Self::new("simple")
            .with_default_themes_dir("templates/simple")
            .with_layout(TemplateLayout::TemplatesDir)
            .with_default_rule(DefaultRule::SettingOrMarker)
    }

    /// Sets the themes directory used when settings name none.
    pub fn with_default_themes_dir(mut self, dir: impl Into<String>) -> Self {
        self.default_themes_dir = dir.into();
        self
    }

    pub fn with_layout(mut self, layout: TemplateLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_default_rule(mut self, rule: DefaultRule) -> Self {
        self.default_rule = rule;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn default_themes_dir(&self) -> &str {
        &self.default_themes_dir
    }

    pub fn layout(&self) -> TemplateLayout {
        self.layout
    }

    pub fn default_rule(&self) -> DefaultRule {
        self.default_rule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_templates_path() {
        let root = Path::new("/srv/themes/dark");
        assert_eq!(TemplateLayout::ThemeRoot.templates_path(root), root);
        assert_eq!(
            TemplateLayout::TemplatesDir.templates_path(root),
            root.join("templates")
        );
    }

    #[test]
    fn test_presets() {
        let mj = EngineConvention::minijinja();
        assert_eq!(mj.id(), "minijinja");
        assert_eq!(mj.layout(), TemplateLayout::ThemeRoot);
        assert!(mj.default_rule().uses_setting());
        assert!(!mj.default_rule().uses_marker());

        let simple = EngineConvention::simple();
        assert_eq!(simple.default_themes_dir(), "templates/simple");
        assert_eq!(simple.layout(), TemplateLayout::TemplatesDir);
        assert!(simple.default_rule().uses_marker());
        assert!(simple.default_rule().uses_setting());
    }
}
