//! # Livery Render - Themes and Themed Templates
//!
//! `livery-render` discovers themes on disk and renders templates with
//! parent-theme inheritance, independent of any HTTP framework. It is the
//! rendering foundation of the `livery` crate, which adds per-request theme
//! selection as tower middleware.
//!
//! ## Core Concepts
//!
//! - [`Theme`]: a named directory of templates and assets, optionally with a
//!   parent theme
//! - [`ThemeCatalog`]: the themes discovered in a directory, with exactly one
//!   default
//! - [`EngineConvention`]: where an engine's themes live and how the default
//!   is flagged
//! - [`ThemeSettings`]: serde configuration (JSON or YAML)
//! - [`TemplateEngine`]: the rendering backend ([`MiniJinjaEngine`],
//!   [`SimpleEngine`])
//! - [`ThemeRenderer`]: parent-aware lookup plus context assembly
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use livery_render::{EngineConvention, MiniJinjaEngine, ThemeCatalog, ThemeRenderer, ThemeSettings};
//! use serde_json::json;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let themes = dir.path().join("templates/themes");
//! std::fs::create_dir_all(themes.join("base")).unwrap();
//! std::fs::create_dir_all(themes.join("dark")).unwrap();
//! std::fs::write(themes.join("base/home.html"), "<h1>{{ title }}</h1> ({{ theme.name }})").unwrap();
//! std::fs::write(themes.join("dark/theme.json"), r#"{"parent": "base"}"#).unwrap();
//!
//! let settings = ThemeSettings::new().with_default("base");
//! let catalog = ThemeCatalog::discover(dir.path(), &settings, &EngineConvention::minijinja()).unwrap();
//! let renderer = Arc::new(ThemeRenderer::new(Arc::new(catalog), MiniJinjaEngine::new()));
//!
//! let dark = renderer.catalog().load("dark").unwrap();
//! let html = renderer.view(dark).render("home.html", &json!({"title": "Hello"})).unwrap();
//! assert_eq!(html, "<h1>Hello</h1> (dark)");
//! ```
//!
//! ## Theme Layout
//!
//! ```text
//! templates/themes/
//!   base/
//!     home.html
//!     assets/
//!   dark/
//!     theme.json      {"parent": "base", "accent": "#7f5af0"}
//!     home.html
//! ```
//!
//! Templates receive the active theme as `theme`, including `theme.config`
//! with every manifest key.

pub mod catalog;
pub mod context;
pub mod convention;
mod error;
pub mod prelude;
pub mod settings;
pub mod template;
pub mod theme;

pub use catalog::{CatalogError, ThemeCatalog};
pub use context::{build_context, RequestInfo, REQUEST_KEY, THEME_KEY};
pub use convention::{DefaultRule, EngineConvention, TemplateLayout, DEFAULT_MARKER};
pub use error::{RenderError, ThemeError};
pub use settings::{
    EffectiveSettings, EngineSettings, SettingsError, ThemeSettings, DEFAULT_SIGNAL_NAME,
};
pub use template::{
    MiniJinjaEngine, ResolvedTemplate, SimpleEngine, TemplateEngine, ThemeRenderer,
    ThemedRenderer,
};
pub use theme::{Theme, ThemeManifest, MANIFEST_FILE};
