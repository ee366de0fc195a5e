//! Theme selection middleware for tower services.
//!
//! This module provides a tower middleware that:
//! - Resolves the request's theme from the query parameter, the cookie, then
//!   the catalog default
//! - Inserts a [`ThemeContext`] and an [`ActiveTheme`] into request extensions
//! - Persists an explicit query choice with a `Set-Cookie` header
//!
//! Only a query value that names a catalog theme is persisted, and the cookie
//! stores that theme's name. Unknown or empty query values leave the existing
//! cookie alone, as do names that are not valid cookie values.
//!
//! Handlers render through the context:
//!
//! ```rust,ignore
//! async fn home(req: Request<Body>) -> Result<Response<Body>, Error> {
//!     let ctx = req.extensions().get::<ThemeContext>().expect("ThemeLayer installed");
//!     let html = ctx.render_response("home.html", &json!({"title": "Home"}))?;
//!     Ok(html.map(Body::from))
//! }
//! ```

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::header::{CONTENT_TYPE, SET_COOKIE};
use http::{HeaderValue, Request, Response};
use livery_render::{
    RenderError, RequestInfo, Theme, ThemeRenderer, ThemeSettings, ThemedRenderer,
    DEFAULT_SIGNAL_NAME, REQUEST_KEY,
};
use serde::Serialize;
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::cookie::ThemeCookie;
use crate::resolver::{RequestSignals, ThemeResolver, ThemeSource};

/// Boxed error returned by [`ThemeMiddleware`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The active theme, inserted into request extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTheme(pub Arc<Theme>);

/// Per-request theme state, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct ThemeContext {
    /// The resolved theme.
    pub theme: Arc<Theme>,
    /// Which signal chose it.
    pub source: ThemeSource,
    /// Renderer bound to `theme`, with `request` registered as a global.
    pub renderer: ThemedRenderer,
    /// Path and query of the request.
    pub request: RequestInfo,
}

impl ThemeContext {
    /// Renders `name` with the request's theme.
    pub fn render<T>(&self, name: &str, data: &T) -> Result<String, RenderError>
    where
        T: Serialize + ?Sized,
    {
        self.renderer.render(name, data)
    }

    /// Renders `name` into a new `200 OK` response.
    ///
    /// `Content-Type` is derived from the template's extension.
    pub fn render_response<T>(&self, name: &str, data: &T) -> Result<Response<String>, RenderError>
    where
        T: Serialize + ?Sized,
    {
        self.fill_response(Response::new(()), name, data)
    }

    /// Renders `name` as the body of `response`, keeping its status and headers.
    ///
    /// A `Content-Type` already set on `response` is left untouched.
    pub fn fill_response<B, T>(
        &self,
        response: Response<B>,
        name: &str,
        data: &T,
    ) -> Result<Response<String>, RenderError>
    where
        T: Serialize + ?Sized,
    {
        let body = self.render(name, data)?;
        let (mut parts, _) = response.into_parts();
        parts
            .headers
            .entry(CONTENT_TYPE)
            .or_insert_with(|| content_type_for(name));
        Ok(Response::from_parts(parts, body))
    }
}

fn content_type_for(template: &str) -> HeaderValue {
    let extension = Path::new(template)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let mime = match extension.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("json") => "application/json",
        Some("xml") => "application/xml; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        _ => "text/plain; charset=utf-8",
    };
    HeaderValue::from_static(mime)
}

#[derive(Debug)]
struct SignalNames {
    query_param: String,
    cookie_name: String,
}

/// Layer for the theme middleware.
#[derive(Debug, Clone)]
pub struct ThemeLayer {
    renderer: Arc<ThemeRenderer>,
    names: Arc<SignalNames>,
}

impl ThemeLayer {
    /// Creates a layer reading the `theme` query parameter and cookie.
    pub fn new(renderer: Arc<ThemeRenderer>) -> Self {
        Self {
            renderer,
            names: Arc::new(SignalNames {
                query_param: DEFAULT_SIGNAL_NAME.to_string(),
                cookie_name: DEFAULT_SIGNAL_NAME.to_string(),
            }),
        }
    }

    /// Creates a layer using the signal names configured for the renderer's engine.
    pub fn from_settings(renderer: Arc<ThemeRenderer>, settings: &ThemeSettings) -> Self {
        let effective = settings.for_engine(renderer.catalog().convention().id());
        Self::new(renderer)
            .with_query_param(effective.query_param)
            .with_cookie_name(effective.cookie_name)
    }

    pub fn with_query_param(mut self, name: impl Into<String>) -> Self {
        self.names = Arc::new(SignalNames {
            query_param: name.into(),
            cookie_name: self.names.cookie_name.clone(),
        });
        self
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.names = Arc::new(SignalNames {
            query_param: self.names.query_param.clone(),
            cookie_name: name.into(),
        });
        self
    }

    pub fn query_param(&self) -> &str {
        &self.names.query_param
    }

    pub fn cookie_name(&self) -> &str {
        &self.names.cookie_name
    }
}

impl<S> Layer<S> for ThemeLayer {
    type Service = ThemeMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        debug!(
            query_param = %self.names.query_param,
            cookie_name = %self.names.cookie_name,
            "installing theme middleware layer"
        );
        ThemeMiddleware {
            inner,
            renderer: Arc::clone(&self.renderer),
            names: Arc::clone(&self.names),
        }
    }
}

/// Theme middleware.
#[derive(Debug, Clone)]
pub struct ThemeMiddleware<S> {
    inner: S,
    renderer: Arc<ThemeRenderer>,
    names: Arc<SignalNames>,
}

impl<S> ThemeMiddleware<S> {
    /// Resolves the theme and builds the request's context.
    fn prepare<B>(&self, req: &Request<B>) -> Result<ThemeContext, BoxError> {
        let signals =
            RequestSignals::from_request(req, &self.names.query_param, &self.names.cookie_name);
        let mut resolver = ThemeResolver::new(Arc::clone(self.renderer.catalog()));
        let theme = resolver.resolve(&signals)?;
        let source = resolver.source().unwrap_or(ThemeSource::Default);

        let request = RequestInfo {
            path: req.uri().path().to_string(),
            query: req.uri().query().map(str::to_string),
        };
        let mut renderer = self.renderer.view(Arc::clone(&theme));
        renderer.add_global(REQUEST_KEY, &request)?;

        Ok(ThemeContext {
            theme,
            source,
            renderer,
            request,
        })
    }
}

impl<S, B, R> Service<Request<B>> for ThemeMiddleware<S>
where
    S: Service<Request<B>, Response = Response<R>>,
    S::Future: Send + 'static,
    S::Error: Into<BoxError>,
    R: 'static,
{
    type Response = Response<R>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let context = match self.prepare(&req) {
            Ok(context) => context,
            Err(err) => return Box::pin(async move { Err(err) }),
        };

        // Only an explicit, valid query choice is remembered.
        let cookie = (context.source == ThemeSource::Query)
            .then(|| ThemeCookie::new(&self.names.cookie_name, context.theme.name()))
            .filter(|cookie| {
                let valid = cookie.is_valid();
                if !valid {
                    warn!(theme = %cookie.value(), "theme choice cannot be stored in a cookie");
                }
                valid
            });

        req.extensions_mut()
            .insert(ActiveTheme(Arc::clone(&context.theme)));
        req.extensions_mut().insert(context);

        let future = self.inner.call(req);
        Box::pin(async move {
            let mut response = future.await.map_err(Into::into)?;

            if let Some(cookie) = cookie {
                match HeaderValue::from_str(&cookie.to_string()) {
                    Ok(value) => {
                        debug!(theme = %cookie.value(), "persisting theme choice");
                        response.headers_mut().append(SET_COOKIE, value);
                    }
                    Err(err) => {
                        warn!(theme = %cookie.value(), error = %err, "theme name is not a valid cookie value");
                    }
                }
            }

            Ok(response)
        })
    }
}
