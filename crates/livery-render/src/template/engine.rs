//! Template engine abstraction.
//!
//! This module defines the [`TemplateEngine`] trait which lets the themed
//! renderer work with different template backends. The default
//! implementation is [`MiniJinjaEngine`], which provides full Jinja syntax
//! with includes and inheritance resolved through the theme chain.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use minijinja::{Environment, Error, ErrorKind, State, Value};

use super::lookup::{find_template, validate_template_name};
use crate::error::RenderError;

/// A template located on disk, ready to hand to an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    /// The name the template was requested by.
    pub name: String,
    /// The file that matched, from the nearest theme in the chain.
    pub path: PathBuf,
    /// Name of the active theme.
    pub theme: String,
    /// Template roots of the active theme's chain, nearest first.
    ///
    /// Engines that support includes resolve them against this list so
    /// partials follow the same inheritance as the top-level template.
    pub search_path: Vec<PathBuf>,
}

/// A template engine that renders theme templates with a context.
///
/// Engines receive a fully built context; merging globals, caller data and
/// the `theme` value happens before the engine is called.
pub trait TemplateEngine: Send + Sync {
    /// Identifier matching the engine's [`EngineConvention`](crate::EngineConvention).
    fn id(&self) -> &str;

    /// Renders a resolved template file.
    fn render(
        &self,
        template: &ResolvedTemplate,
        context: &serde_json::Value,
    ) -> Result<String, RenderError>;

    /// Renders template source that does not live in a theme.
    fn render_str(&self, source: &str, context: &serde_json::Value) -> Result<String, RenderError>;

    /// Whether this engine supports template includes (`{% include %}`).
    fn supports_includes(&self) -> bool;

    /// Whether this engine supports control flow (`{% for %}`, `{% if %}`).
    fn supports_control_flow(&self) -> bool;
}

type Configure = Arc<dyn Fn(&mut Environment<'static>) + Send + Sync>;

/// MiniJinja-based template engine.
///
/// Each render builds an environment whose loader searches the theme chain,
/// so `{% include %}` and `{% extends %}` fall back to parent themes the same
/// way top-level templates do. Templates are re-read from disk on every
/// render unless caching is enabled with [`with_cache`](Self::with_cache).
///
/// Two functions are registered on every environment:
///
/// - `current_url()`: path and query of the current request
/// - `is_current_url(path)`: whether the request path equals `path`
///
/// Both read the `request` value of the render context.
///
/// # Example
///
/// ```rust
/// use livery_render::template::{MiniJinjaEngine, TemplateEngine};
/// use serde_json::json;
///
/// let engine = MiniJinjaEngine::new();
/// let output = engine
///     .render_str("Hello, {{ name }}!", &json!({"name": "World"}))
///     .unwrap();
/// assert_eq!(output, "Hello, World!");
/// ```
pub struct MiniJinjaEngine {
    cache: Option<RwLock<HashMap<Vec<PathBuf>, Arc<Environment<'static>>>>>,
    configure: Option<Configure>,
}

impl MiniJinjaEngine {
    /// Creates an engine without caching.
    pub fn new() -> Self {
        Self {
            cache: None,
            configure: None,
        }
    }

    /// Keeps one compiled environment per search path.
    ///
    /// With caching on, template edits are not picked up until restart.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled.then(|| RwLock::new(HashMap::new()));
        self
    }

    /// Runs `configure` on every environment the engine builds.
    ///
    /// Use this to register custom filters, functions or globals.
    pub fn with_environment<F>(mut self, configure: F) -> Self
    where
        F: Fn(&mut Environment<'static>) + Send + Sync + 'static,
    {
        self.configure = Some(Arc::new(configure));
        self
    }

    fn build_environment(&self, search_path: &[PathBuf]) -> Environment<'static> {
        let mut env = Environment::new();
        register_functions(&mut env);
        let roots = search_path.to_vec();
        env.set_loader(move |name| load_template(&roots, name));
        if let Some(configure) = &self.configure {
            configure(&mut env);
        }
        env
    }

    fn environment(&self, search_path: &[PathBuf]) -> Arc<Environment<'static>> {
        let Some(cache) = &self.cache else {
            return Arc::new(self.build_environment(search_path));
        };

        if let Some(env) = cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(search_path)
        {
            return Arc::clone(env);
        }

        let env = Arc::new(self.build_environment(search_path));
        let mut cache = cache.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(search_path.to_vec()).or_insert(env))
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn id(&self) -> &str {
        "minijinja"
    }

    fn render(
        &self,
        template: &ResolvedTemplate,
        context: &serde_json::Value,
    ) -> Result<String, RenderError> {
        let env = self.environment(&template.search_path);
        let tmpl = env.get_template(&template.name)?;
        Ok(tmpl.render(Value::from_serialize(context))?)
    }

    fn render_str(&self, source: &str, context: &serde_json::Value) -> Result<String, RenderError> {
        let env = self.build_environment(&[]);
        Ok(env.render_str(source, Value::from_serialize(context))?)
    }

    fn supports_includes(&self) -> bool {
        true
    }

    fn supports_control_flow(&self) -> bool {
        true
    }
}

fn load_template(roots: &[PathBuf], name: &str) -> Result<Option<String>, Error> {
    let path = validate_template_name(name).map_err(|err| {
        Error::new(ErrorKind::InvalidOperation, err.to_string())
    })?;
    let Some(file) = find_template(roots, path) else {
        return Ok(None);
    };

    std::fs::read_to_string(&file).map(Some).map_err(|err| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("could not read template {}", file.display()),
        )
        .with_source(err)
    })
}

/// Registers the request URL functions with a MiniJinja environment.
///
/// This is called automatically for every environment [`MiniJinjaEngine`]
/// builds. Call it when rendering with an environment of your own.
pub fn register_functions(env: &mut Environment<'static>) {
    env.add_function("current_url", current_url);
    env.add_function("is_current_url", is_current_url);
}

fn request_field(state: &State, field: &str) -> Option<String> {
    let request = state.lookup("request")?;
    let value = request.get_attr(field).ok()?;
    value.as_str().map(str::to_string)
}

fn current_url(state: &State) -> String {
    let path = request_field(state, "path").unwrap_or_default();
    match request_field(state, "query") {
        Some(query) if !query.is_empty() => format!("{}?{}", path, query),
        _ => path,
    }
}

fn is_current_url(state: &State, path: &str) -> bool {
    request_field(state, "path").as_deref() == Some(path)
}
