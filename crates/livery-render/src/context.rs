//! Render context assembly.
//!
//! Every render merges several sources into one JSON object, in order:
//!
//! 1. renderer-level globals, registered at bootstrap
//! 2. view-level globals, registered per request
//! 3. the caller's data
//! 4. `theme`, the active [`Theme`]
//!
//! Later sources win on key conflicts, so caller data shadows globals and the
//! `theme` key always describes the theme actually rendering.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::RenderError;
use crate::theme::Theme;

/// Context key holding the active theme.
pub const THEME_KEY: &str = "theme";

/// Context key holding [`RequestInfo`], read by the URL template functions.
pub const REQUEST_KEY: &str = "request";

/// The parts of the current request exposed to templates.
///
/// Register it as a view global under [`REQUEST_KEY`] to make
/// `current_url()` and `is_current_url(path)` work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestInfo {
    /// Request path, without the query string.
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
}

impl RequestInfo {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Path plus `?query` when a non-empty query is present.
    pub fn url(&self) -> String {
        match self.query.as_deref() {
            Some(query) if !query.is_empty() => format!("{}?{}", self.path, query),
            _ => self.path.clone(),
        }
    }
}

/// Builds the context handed to an engine.
///
/// `globals` are applied in order, then `data`, then the theme. `data` must
/// serialize to a JSON object or to null.
pub fn build_context(
    globals: &[&Map<String, Value>],
    data: Value,
    theme: &Theme,
) -> Result<Value, RenderError> {
    let mut context = Map::new();
    for layer in globals {
        context.extend(layer.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    match data {
        Value::Object(map) => context.extend(map),
        Value::Null => {}
        other => {
            return Err(RenderError::Serialization(format!(
                "render data must serialize to a map, got {}",
                json_kind(&other)
            )))
        }
    }

    context.insert(THEME_KEY.to_string(), serde_json::to_value(theme)?);
    Ok(Value::Object(context))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a map",
    }
}
