//! Themed template rendering.
//!
//! [`ThemeRenderer`] is built once at bootstrap and shared. It renders a
//! template for a given theme as a pure function of its inputs. A
//! [`ThemedRenderer`] is a cheap per-request view that remembers the active
//! theme and request-scoped globals.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::lookup::{find_template, validate_template_name};
use super::{ResolvedTemplate, TemplateEngine};
use crate::catalog::ThemeCatalog;
use crate::context::build_context;
use crate::error::RenderError;
use crate::theme::Theme;

/// Shared, engine-agnostic renderer.
///
/// Template lookup walks the active theme's parent chain, so a theme only
/// needs to ship the templates it overrides.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use livery_render::{MiniJinjaEngine, ThemeRenderer};
///
/// let mut renderer = ThemeRenderer::new(Arc::new(catalog), MiniJinjaEngine::new());
/// renderer.add_global("site_name", "Livery")?;
/// let renderer = Arc::new(renderer);
///
/// let theme = renderer.catalog().load("dark")?;
/// let html = renderer.render(&theme, "home.html", &serde_json::json!({"title": "Hi"}))?;
/// ```
pub struct ThemeRenderer {
    catalog: Arc<ThemeCatalog>,
    engine: Arc<dyn TemplateEngine>,
    globals: Map<String, Value>,
}

impl ThemeRenderer {
    /// Creates a renderer over `catalog` using `engine`.
    pub fn new<E>(catalog: Arc<ThemeCatalog>, engine: E) -> Self
    where
        E: TemplateEngine + 'static,
    {
        Self::with_shared_engine(catalog, Arc::new(engine))
    }

    /// Creates a renderer with an engine that is already shared.
    pub fn with_shared_engine(catalog: Arc<ThemeCatalog>, engine: Arc<dyn TemplateEngine>) -> Self {
        Self {
            catalog,
            engine,
            globals: Map::new(),
        }
    }

    /// Registers a value injected into every render.
    pub fn add_global<T>(&mut self, name: impl Into<String>, value: &T) -> Result<(), RenderError>
    where
        T: Serialize + ?Sized,
    {
        self.globals.insert(name.into(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn catalog(&self) -> &Arc<ThemeCatalog> {
        &self.catalog
    }

    pub fn engine(&self) -> &dyn TemplateEngine {
        self.engine.as_ref()
    }

    pub fn globals(&self) -> &Map<String, Value> {
        &self.globals
    }

    /// Returns a per-request view bound to `theme`.
    pub fn view(self: &Arc<Self>, theme: Arc<Theme>) -> ThemedRenderer {
        ThemedRenderer::new(Arc::clone(self), theme)
    }

    /// Whether `theme` itself ships `name`. Parents are not consulted.
    pub fn template_exists(&self, theme: &Theme, name: &str) -> bool {
        validate_template_name(name)
            .map(|path| theme.templates_path().join(path).is_file())
            .unwrap_or(false)
    }

    /// Locates `name` in `theme` or the nearest ancestor that has it.
    pub fn template_path(&self, theme: &Theme, name: &str) -> Result<PathBuf, RenderError> {
        self.resolve(theme, name).map(|resolved| resolved.path)
    }

    /// Locates `name` and captures the search path engines need for includes.
    pub fn resolve(&self, theme: &Theme, name: &str) -> Result<ResolvedTemplate, RenderError> {
        let relative = validate_template_name(name)?;
        let search_path = self.catalog.search_path(theme);
        let path = find_template(&search_path, relative)
            .ok_or_else(|| RenderError::not_found(name, theme.name()))?;

        debug!(
            theme = %theme.name(),
            template = %name,
            path = %path.display(),
            "resolved template"
        );
        Ok(ResolvedTemplate {
            name: name.to_string(),
            path,
            theme: theme.name().to_string(),
            search_path,
        })
    }

    /// Renders `name` for `theme` with renderer globals only.
    pub fn render<T>(&self, theme: &Theme, name: &str, data: &T) -> Result<String, RenderError>
    where
        T: Serialize + ?Sized,
    {
        self.render_layered(theme, name, serde_json::to_value(data)?, None)
    }

    fn render_layered(
        &self,
        theme: &Theme,
        name: &str,
        data: Value,
        view_globals: Option<&Map<String, Value>>,
    ) -> Result<String, RenderError> {
        let template = self.resolve(theme, name)?;
        let context = match view_globals {
            Some(view) => build_context(&[&self.globals, view], data, theme)?,
            None => build_context(&[&self.globals], data, theme)?,
        };
        self.engine.render(&template, &context)
    }
}

impl fmt::Debug for ThemeRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeRenderer")
            .field("catalog", &self.catalog.themes_dir())
            .field("engine", &self.engine.id())
            .field("globals", &self.globals.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A renderer bound to one active theme for the duration of a request.
#[derive(Debug, Clone)]
pub struct ThemedRenderer {
    renderer: Arc<ThemeRenderer>,
    theme: Arc<Theme>,
    globals: Map<String, Value>,
}

impl ThemedRenderer {
    pub fn new(renderer: Arc<ThemeRenderer>, theme: Arc<Theme>) -> Self {
        Self {
            renderer,
            theme,
            globals: Map::new(),
        }
    }

    /// Rebinds the view to `theme`. View-level globals are kept.
    pub fn set_theme(&mut self, theme: Arc<Theme>) {
        self.theme = theme;
    }

    /// The active theme.
    pub fn theme(&self) -> &Arc<Theme> {
        &self.theme
    }

    pub fn renderer(&self) -> &Arc<ThemeRenderer> {
        &self.renderer
    }

    /// Registers a value injected into every render through this view.
    pub fn add_global<T>(&mut self, name: impl Into<String>, value: &T) -> Result<(), RenderError>
    where
        T: Serialize + ?Sized,
    {
        self.globals.insert(name.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Whether the active theme itself ships `name`.
    pub fn template_exists(&self, name: &str) -> bool {
        self.renderer.template_exists(&self.theme, name)
    }

    /// Locates `name` through the active theme's parent chain.
    pub fn template_path(&self, name: &str) -> Result<PathBuf, RenderError> {
        self.renderer.template_path(&self.theme, name)
    }

    /// Renders `name` with the active theme.
    pub fn render<T>(&self, name: &str, data: &T) -> Result<String, RenderError>
    where
        T: Serialize + ?Sized,
    {
        self.renderer.render_layered(
            &self.theme,
            name,
            serde_json::to_value(data)?,
            Some(&self.globals),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convention::EngineConvention;
    use crate::template::{MiniJinjaEngine, SimpleEngine};
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    struct Fixture {
        _temp_dir: TempDir,
        root: PathBuf,
        catalog: Arc<ThemeCatalog>,
    }

    // base <- dark, plus an unrelated "plain" theme.
    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        write(&root, "base/home.txt", "base home {{ theme.name }}");
        write(&root, "base/footer.txt", "base footer");
        write(&root, "dark/home.txt", "dark home {{ title }}");
        write(&root, "plain/home.txt", "plain");

        let catalog = ThemeCatalog::from_themes(
            &root,
            EngineConvention::minijinja(),
            vec![
                Theme::new("base", root.join("base")).with_default(true),
                Theme::new("dark", root.join("dark")).with_parent("base"),
                Theme::new("plain", root.join("plain")),
            ],
        )
        .unwrap();

        Fixture {
            _temp_dir: temp_dir,
            root,
            catalog: Arc::new(catalog),
        }
    }

    #[test]
    fn test_template_path_falls_back_to_parent() {
        let fx = fixture();
        let renderer = ThemeRenderer::new(Arc::clone(&fx.catalog), MiniJinjaEngine::new());
        let dark = fx.catalog.load("dark").unwrap();
        let plain = fx.catalog.load("plain").unwrap();

        assert_eq!(
            renderer.template_path(&dark, "home.txt").unwrap(),
            fx.root.join("dark/home.txt")
        );
        assert_eq!(
            renderer.template_path(&dark, "footer.txt").unwrap(),
            fx.root.join("base/footer.txt")
        );

        let err = renderer.template_path(&plain, "footer.txt").unwrap_err();
        match err {
            RenderError::TemplateNotFound { template, theme } => {
                assert_eq!(template, "footer.txt");
                assert_eq!(theme, "plain");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_template_exists_is_local_only() {
        let fx = fixture();
        let renderer = ThemeRenderer::new(Arc::clone(&fx.catalog), MiniJinjaEngine::new());
        let dark = fx.catalog.load("dark").unwrap();

        assert!(renderer.template_exists(&dark, "home.txt"));
        assert!(!renderer.template_exists(&dark, "footer.txt"));
        assert!(!renderer.template_exists(&dark, "../base/footer.txt"));
    }

    #[test]
    fn test_render_rejects_invalid_names() {
        let fx = fixture();
        let renderer = ThemeRenderer::new(Arc::clone(&fx.catalog), MiniJinjaEngine::new());
        let dark = fx.catalog.load("dark").unwrap();

        let err = renderer.render(&dark, "../base/home.txt", &json!({})).unwrap_err();
        assert!(matches!(err, RenderError::InvalidTemplateName(_)));
    }

    #[test]
    fn test_render_injects_theme_and_globals() {
        let fx = fixture();
        let mut renderer = ThemeRenderer::new(Arc::clone(&fx.catalog), MiniJinjaEngine::new());
        renderer.add_global("title", "global").unwrap();
        let renderer = Arc::new(renderer);

        let base = fx.catalog.load("base").unwrap();
        assert_eq!(
            renderer
                .render(&base, "home.txt", &json!({"theme": "spoofed"}))
                .unwrap(),
            "base home base"
        );

        let mut view = renderer.view(fx.catalog.load("dark").unwrap());
        assert_eq!(view.render("home.txt", &json!({})).unwrap(), "dark home global");

        view.add_global("title", "view").unwrap();
        assert_eq!(view.render("home.txt", &json!({})).unwrap(), "dark home view");
        assert_eq!(
            view.render("home.txt", &json!({"title": "data"})).unwrap(),
            "dark home data"
        );
    }

    #[test]
    fn test_set_theme_rebinds_and_keeps_view_globals() {
        let fx = fixture();
        let renderer = Arc::new(ThemeRenderer::new(
            Arc::clone(&fx.catalog),
            MiniJinjaEngine::new(),
        ));
        let mut view = renderer.view(fx.catalog.load("dark").unwrap());
        view.add_global("title", "view").unwrap();

        view.set_theme(fx.catalog.load("base").unwrap());
        assert_eq!(view.theme().name(), "base");
        assert!(view.template_exists("footer.txt"));
        assert_eq!(view.render("home.txt", &json!({})).unwrap(), "base home base");

        view.set_theme(fx.catalog.load("dark").unwrap());
        assert_eq!(view.render("home.txt", &json!({})).unwrap(), "dark home view");
    }

    #[test]
    fn test_render_missing_template_is_reported() {
        let fx = fixture();
        let renderer = Arc::new(ThemeRenderer::new(
            Arc::clone(&fx.catalog),
            SimpleEngine::new(),
        ));
        let view = renderer.view(fx.catalog.load("plain").unwrap());

        let err = view.render("missing.txt", &json!({})).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_debug_names_engine() {
        let fx = fixture();
        let renderer = ThemeRenderer::new(Arc::clone(&fx.catalog), SimpleEngine::new());
        assert!(format!("{renderer:?}").contains("simple"));
    }
}
