//! Bootstrap of the shared theme services.
//!
//! [`ThemeServices`] wires settings, discovery, the renderer and the
//! middleware layer together once at startup:
//!
//! ```rust,ignore
//! use livery::{MiniJinjaEngine, ThemeServices};
//!
//! let services = ThemeServices::builder("/srv/app")
//!     .settings_file("/srv/app/config/themes.yaml")
//!     .engine(MiniJinjaEngine::new())
//!     .global("site_name", "Livery")
//!     .build()?;
//!
//! let app = tower::ServiceBuilder::new()
//!     .layer(services.layer())
//!     .service(handler);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use livery_render::{
    CatalogError, EffectiveSettings, EngineConvention, MiniJinjaEngine, RenderError,
    SettingsError, TemplateEngine, ThemeCatalog, ThemeRenderer, ThemeSettings,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::middleware::ThemeLayer;
use crate::resolver::ThemeResolver;

/// Error type for bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The settings could not be loaded.
    #[error("theme settings: {0}")]
    Settings(#[from] SettingsError),

    /// Theme discovery failed.
    #[error("theme discovery: {0}")]
    Catalog(#[from] CatalogError),

    /// A global value could not be serialized.
    #[error("theme globals: {0}")]
    Render(#[from] RenderError),
}

/// The shared, immutable theme stack of an application.
#[derive(Debug, Clone)]
pub struct ThemeServices {
    settings: Arc<ThemeSettings>,
    effective: EffectiveSettings,
    renderer: Arc<ThemeRenderer>,
}

impl ThemeServices {
    /// Starts a builder for an application rooted at `root`.
    pub fn builder(root: impl Into<PathBuf>) -> ThemeServicesBuilder {
        ThemeServicesBuilder::new(root)
    }

    pub fn settings(&self) -> &ThemeSettings {
        &self.settings
    }

    /// Settings after the engine's overrides.
    pub fn effective_settings(&self) -> &EffectiveSettings {
        &self.effective
    }

    pub fn catalog(&self) -> &Arc<ThemeCatalog> {
        self.renderer.catalog()
    }

    pub fn renderer(&self) -> &Arc<ThemeRenderer> {
        &self.renderer
    }

    /// A fresh request-scoped resolver.
    pub fn resolver(&self) -> ThemeResolver {
        ThemeResolver::new(Arc::clone(self.catalog()))
    }

    /// The middleware layer, using the configured signal names.
    pub fn layer(&self) -> ThemeLayer {
        ThemeLayer::new(Arc::clone(&self.renderer))
            .with_query_param(self.effective.query_param.clone())
            .with_cookie_name(self.effective.cookie_name.clone())
    }
}

/// Builder for [`ThemeServices`].
pub struct ThemeServicesBuilder {
    root: PathBuf,
    settings: Option<ThemeSettings>,
    settings_file: Option<PathBuf>,
    convention: Option<EngineConvention>,
    engine: Option<Arc<dyn TemplateEngine>>,
    globals: Map<String, Value>,
}

impl ThemeServicesBuilder {
    fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            settings: None,
            settings_file: None,
            convention: None,
            engine: None,
            globals: Map::new(),
        }
    }

    /// Uses `settings` as-is. Takes precedence over [`settings_file`](Self::settings_file).
    pub fn settings(mut self, settings: ThemeSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Loads settings from a JSON or YAML file at build time.
    pub fn settings_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_file = Some(path.into());
        self
    }

    /// Overrides the convention derived from the engine.
    pub fn convention(mut self, convention: EngineConvention) -> Self {
        self.convention = Some(convention);
        self
    }

    /// Sets the template engine. Defaults to [`MiniJinjaEngine`].
    pub fn engine<E>(mut self, engine: E) -> Self
    where
        E: TemplateEngine + 'static,
    {
        self.engine = Some(Arc::new(engine));
        self
    }

    /// Registers a renderer-level global.
    pub fn global(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.globals.insert(name.into(), value.into());
        self
    }

    /// Loads settings, discovers themes and builds the renderer.
    pub fn build(self) -> Result<ThemeServices, SetupError> {
        let settings = match (self.settings, &self.settings_file) {
            (Some(settings), _) => settings,
            (None, Some(path)) => ThemeSettings::from_path(path)?,
            (None, None) => ThemeSettings::default(),
        };

        let engine: Arc<dyn TemplateEngine> = match self.engine {
            Some(engine) => engine,
            None => Arc::new(MiniJinjaEngine::new()),
        };
        let convention = self
            .convention
            .unwrap_or_else(|| convention_for(engine.id()));
        if convention.id() != engine.id() {
            warn!(
                convention = %convention.id(),
                engine = %engine.id(),
                "engine convention does not match the engine"
            );
        }

        let catalog = ThemeCatalog::discover(&self.root, &settings, &convention)?;
        let effective = settings.for_engine(convention.id());

        let mut renderer = ThemeRenderer::with_shared_engine(Arc::new(catalog), engine);
        for (name, value) in self.globals {
            renderer.add_global(name, &value)?;
        }

        debug!(
            root = %self.root.display(),
            engine = %renderer.engine().id(),
            themes = renderer.catalog().len(),
            "theme services ready"
        );
        Ok(ThemeServices {
            settings: Arc::new(settings),
            effective,
            renderer: Arc::new(renderer),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn convention_for(engine_id: &str) -> EngineConvention {
    match engine_id {
        "minijinja" => EngineConvention::minijinja(),
        "simple" => EngineConvention::simple(),
        other => EngineConvention::new(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livery_render::SimpleEngine;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_to_minijinja_convention() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("templates/themes/default")).unwrap();

        let services = ThemeServices::builder(temp_dir.path()).build().unwrap();
        assert_eq!(services.catalog().convention().id(), "minijinja");
        assert_eq!(services.catalog().default_name(), Some("default"));
        assert_eq!(services.effective_settings().cookie_name, "theme");
    }

    #[test]
    fn test_simple_engine_picks_simple_convention() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("templates/simple/plain")).unwrap();

        let services = ThemeServices::builder(temp_dir.path())
            .engine(SimpleEngine::new())
            .build()
            .unwrap();
        assert_eq!(services.catalog().names().collect::<Vec<_>>(), vec!["plain"]);
        assert_eq!(services.renderer().engine().id(), "simple");
    }

    #[test]
    fn test_settings_file_and_globals() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("themes.json");
        fs::write(&config, r#"{"default": "dark", "cookie_name": "skin"}"#).unwrap();
        fs::create_dir_all(temp_dir.path().join("templates/themes/dark")).unwrap();
        fs::create_dir_all(temp_dir.path().join("templates/themes/light")).unwrap();

        let services = ThemeServices::builder(temp_dir.path())
            .settings_file(&config)
            .global("site", "Livery")
            .build()
            .unwrap();

        assert_eq!(services.catalog().default_name(), Some("dark"));
        assert_eq!(services.layer().cookie_name(), "skin");
        assert_eq!(services.renderer().globals()["site"], "Livery");
        assert!(services.resolver().resolved().is_none());
    }

    #[test]
    fn test_errors_are_wrapped() {
        let temp_dir = TempDir::new().unwrap();
        let result = ThemeServices::builder(temp_dir.path())
            .settings_file(temp_dir.path().join("missing.yaml"))
            .build();
        assert!(matches!(result, Err(SetupError::Settings(_))));

        fs::create_dir_all(temp_dir.path().join("templates/themes/only")).unwrap();
        let result = ThemeServices::builder(temp_dir.path())
            .settings(ThemeSettings::new().with_strict_default(true))
            .build();
        assert!(matches!(result, Err(SetupError::Catalog(_))));
    }
}
