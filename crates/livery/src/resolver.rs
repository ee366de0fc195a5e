//! Per-request theme resolution.
//!
//! A request selects its theme from two signals:
//!
//! 1. the query parameter (default `theme`), an explicit choice
//! 2. the cookie (default `theme`), a remembered choice
//!
//! and falls back to the catalog default. A signal naming a theme that is
//! not in the catalog is ignored and the next source is tried, so a stale
//! cookie or a mistyped link never breaks a page.

use std::sync::Arc;

use http::Request;
use livery_render::{Theme, ThemeCatalog, ThemeError};
use tracing::debug;

use crate::cookie::cookie_value;

/// Theme names carried by a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSignals {
    /// Value of the theme query parameter.
    pub query: Option<String>,
    /// Value of the theme cookie.
    pub cookie: Option<String>,
}

impl RequestSignals {
    /// Signals with neither a query value nor a cookie.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, name: impl Into<String>) -> Self {
        self.query = Some(name.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>) -> Self {
        self.cookie = Some(name.into());
        self
    }

    /// Extracts signals from a request.
    ///
    /// The query string is form-urlencoded decoded; the first `query_param`
    /// pair wins. The cookie is read from the `Cookie` headers.
    pub fn from_request<B>(req: &Request<B>, query_param: &str, cookie_name: &str) -> Self {
        let query = req.uri().query().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == query_param)
                .map(|(_, value)| value.into_owned())
        });
        let cookie = cookie_value(req.headers(), cookie_name).map(str::to_string);

        Self { query, cookie }
    }
}

/// Which signal selected the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeSource {
    Query,
    Cookie,
    Default,
}

/// The outcome of resolving a request's theme.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub theme: Arc<Theme>,
    pub source: ThemeSource,
}

/// Resolves a theme from `signals` without caching.
///
/// # Errors
///
/// Returns [`ThemeError::NoDefaultTheme`] if no signal names a catalog theme
/// and the catalog is empty.
pub fn resolve_theme(
    catalog: &ThemeCatalog,
    signals: &RequestSignals,
) -> Result<Resolution, ThemeError> {
    let candidates = [
        (signals.query.as_deref(), ThemeSource::Query),
        (signals.cookie.as_deref(), ThemeSource::Cookie),
    ];

    for (name, source) in candidates {
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            continue;
        };
        match catalog.load(name) {
            Ok(theme) => return Ok(Resolution { theme, source }),
            Err(err) => debug!(theme = %name, source = ?source, error = %err, "ignoring theme signal"),
        }
    }

    let theme = catalog.default_theme()?;
    Ok(Resolution {
        theme,
        source: ThemeSource::Default,
    })
}

/// Request-scoped resolver that caches its result.
///
/// Create one per request; the catalog it reads is shared.
#[derive(Debug, Clone)]
pub struct ThemeResolver {
    catalog: Arc<ThemeCatalog>,
    resolved: Option<Resolution>,
}

impl ThemeResolver {
    pub fn new(catalog: Arc<ThemeCatalog>) -> Self {
        Self {
            catalog,
            resolved: None,
        }
    }

    /// Resolves the theme, or returns the cached result.
    ///
    /// Signals passed after the first successful call are ignored until
    /// [`reset`](Self::reset).
    pub fn resolve(&mut self, signals: &RequestSignals) -> Result<Arc<Theme>, ThemeError> {
        if let Some(resolution) = &self.resolved {
            return Ok(Arc::clone(&resolution.theme));
        }

        let resolution = resolve_theme(&self.catalog, signals)?;
        debug!(
            theme = %resolution.theme.name(),
            source = ?resolution.source,
            "resolved request theme"
        );
        let theme = Arc::clone(&resolution.theme);
        self.resolved = Some(resolution);
        Ok(theme)
    }

    /// The cached theme, if resolution has happened.
    pub fn resolved(&self) -> Option<&Arc<Theme>> {
        self.resolved.as_ref().map(|r| &r.theme)
    }

    /// Which signal chose the cached theme.
    pub fn source(&self) -> Option<ThemeSource> {
        self.resolved.as_ref().map(|r| r.source)
    }

    /// Forgets the cached theme.
    pub fn reset(&mut self) {
        self.resolved = None;
    }

    pub fn catalog(&self) -> &Arc<ThemeCatalog> {
        &self.catalog
    }

    pub fn available_themes(&self) -> &[Arc<Theme>] {
        self.catalog.available_themes()
    }

    pub fn default_theme(&self) -> Result<Arc<Theme>, ThemeError> {
        self.catalog.default_theme()
    }

    /// Whether the cached theme is the catalog default. False before resolution.
    pub fn is_default(&self) -> bool {
        self.resolved().is_some_and(|theme| theme.is_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livery_render::EngineConvention;

    fn catalog(names: &[&str]) -> Arc<ThemeCatalog> {
        let themes = names
            .iter()
            .map(|name| Theme::new(*name, format!("/themes/{name}")))
            .collect();
        Arc::new(ThemeCatalog::from_themes("/themes", EngineConvention::minijinja(), themes).unwrap())
    }

    #[test]
    fn test_query_wins_over_cookie() {
        let catalog = catalog(&["default", "dark", "light"]);
        let signals = RequestSignals::new().with_query("dark").with_cookie("light");

        let resolution = resolve_theme(&catalog, &signals).unwrap();
        assert_eq!(resolution.theme.name(), "dark");
        assert_eq!(resolution.source, ThemeSource::Query);
    }

    #[test]
    fn test_unknown_query_falls_back_to_cookie() {
        let catalog = catalog(&["default", "light"]);
        let signals = RequestSignals::new().with_query("neon").with_cookie("light");

        let resolution = resolve_theme(&catalog, &signals).unwrap();
        assert_eq!(resolution.theme.name(), "light");
        assert_eq!(resolution.source, ThemeSource::Cookie);
    }

    #[test]
    fn test_unknown_signals_fall_back_to_default() {
        let catalog = catalog(&["default", "light"]);
        let signals = RequestSignals::new().with_query("neon").with_cookie("");

        let resolution = resolve_theme(&catalog, &signals).unwrap();
        assert_eq!(resolution.theme.name(), "default");
        assert_eq!(resolution.source, ThemeSource::Default);
    }

    #[test]
    fn test_empty_catalog_has_no_default() {
        let catalog = catalog(&[]);
        let result = resolve_theme(&catalog, &RequestSignals::new().with_query("dark"));
        assert_eq!(result, Err(ThemeError::NoDefaultTheme));
    }

    #[test]
    fn test_resolver_caches_until_reset() {
        let mut resolver = ThemeResolver::new(catalog(&["default", "dark"]));
        assert!(resolver.resolved().is_none());
        assert!(!resolver.is_default());

        let first = resolver.resolve(&RequestSignals::new()).unwrap();
        assert_eq!(first.name(), "default");
        assert!(resolver.is_default());

        let second = resolver
            .resolve(&RequestSignals::new().with_query("dark"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.source(), Some(ThemeSource::Default));

        resolver.reset();
        let third = resolver
            .resolve(&RequestSignals::new().with_query("dark"))
            .unwrap();
        assert_eq!(third.name(), "dark");
        assert!(!resolver.is_default());
    }

    #[test]
    fn test_resolver_accessors() {
        let resolver = ThemeResolver::new(catalog(&["a", "b"]));
        assert_eq!(resolver.available_themes().len(), 2);
        assert_eq!(resolver.default_theme().unwrap().name(), "a");
        assert_eq!(resolver.catalog().len(), 2);
    }

    #[test]
    fn test_signals_from_request() {
        let req = Request::builder()
            .uri("/blog?page=2&theme=dark%20mode&theme=ignored")
            .header("cookie", "sid=1; theme=light")
            .body(())
            .unwrap();

        let signals = RequestSignals::from_request(&req, "theme", "theme");
        assert_eq!(signals.query.as_deref(), Some("dark mode"));
        assert_eq!(signals.cookie.as_deref(), Some("light"));

        let signals = RequestSignals::from_request(&req, "skin", "skin");
        assert_eq!(signals, RequestSignals::new());
    }
}
