//! # Livery - Per-Request Themes for HTTP Services
//!
//! Livery picks a theme for every request and renders templates with it. It
//! provides:
//!
//! - Theme discovery with parent themes and a single default
//! - Theme resolution from a query parameter, a cookie, then the default
//! - A tower [`ThemeLayer`] that puts the resolved theme in request
//!   extensions and persists explicit choices in a cookie
//! - Engine-agnostic rendering via MiniJinja or simple `{name}` substitution
//!
//! Rendering, discovery and configuration live in [`livery_render`] and are
//! re-exported here. This crate adds the HTTP side.
//!
//! ## Quick Start
//!
//! ```rust
//! use http::{Request, Response};
//! use livery::{ThemeContext, ThemeServices};
//! use serde_json::json;
//! use tower::{ServiceBuilder, ServiceExt};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let dir = tempfile::tempdir().unwrap();
//! let themes = dir.path().join("templates/themes");
//! for (theme, body) in [("default", "light {{ title }}"), ("dark", "dark {{ title }}")] {
//!     std::fs::create_dir_all(themes.join(theme)).unwrap();
//!     std::fs::write(themes.join(theme).join("home.html"), body).unwrap();
//! }
//!
//! let services = ThemeServices::builder(dir.path())
//!     .settings(livery::ThemeSettings::new().with_default("default"))
//!     .build()
//!     .unwrap();
//!
//! let app = ServiceBuilder::new()
//!     .layer(services.layer())
//!     .service_fn(|req: Request<()>| async move {
//!         let ctx = req.extensions().get::<ThemeContext>().unwrap();
//!         let body = ctx.render("home.html", &json!({"title": "Home"}))?;
//!         Ok::<_, livery::BoxError>(Response::new(body))
//!     });
//!
//! let req = Request::builder().uri("/?theme=dark").body(()).unwrap();
//! let res = app.oneshot(req).await.unwrap();
//! assert_eq!(res.body(), "dark Home");
//! assert_eq!(
//!     res.headers()["set-cookie"],
//!     "theme=dark; Path=/; HttpOnly; SameSite=Lax"
//! );
//! # }
//! ```
//!
//! ## Resolution Order
//!
//! | Source | Example | Persisted |
//! |--------|---------|-----------|
//! | Query parameter | `/?theme=dark` | yes, as a cookie |
//! | Cookie | `Cookie: theme=dark` | already |
//! | Catalog default | | no |
//!
//! Names that are not in the catalog are skipped.

mod cookie;
pub mod middleware;
pub mod resolver;
mod setup;

pub use cookie::{cookie_value, ThemeCookie};
pub use middleware::{ActiveTheme, BoxError, ThemeContext, ThemeLayer, ThemeMiddleware};
pub use resolver::{resolve_theme, RequestSignals, Resolution, ThemeResolver, ThemeSource};
pub use setup::{SetupError, ThemeServices, ThemeServicesBuilder};

pub use livery_render;
pub use livery_render::{
    CatalogError, DefaultRule, EngineConvention, EngineSettings, MiniJinjaEngine, RenderError,
    RequestInfo, SettingsError, SimpleEngine, TemplateEngine, TemplateLayout, Theme, ThemeCatalog,
    ThemeError, ThemeRenderer, ThemeSettings, ThemedRenderer,
};
