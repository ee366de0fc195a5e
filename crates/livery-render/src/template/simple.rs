//! Simple template engine using format-string style substitution.
//!
//! [`SimpleEngine`] uses `{variable}` syntax for substitution. It suits themes
//! whose templates are plain text or HTML fragments that need no loops,
//! conditionals or includes.
//!
//! # Syntax
//!
//! - `{name}` - Simple variable substitution
//! - `{theme.name}` - Nested property access via dot notation
//! - `{items.0}` - Array index access
//! - `{{` and `}}` - Escaped braces (renders as `{` and `}`)
//!
//! Unknown variables are left in place (`{missing}`) so they show up in the
//! output instead of silently vanishing.
//!
//! # Example
//!
//! ```rust
//! use livery_render::template::{SimpleEngine, TemplateEngine};
//! use serde_json::json;
//!
//! let engine = SimpleEngine::new();
//! let data = json!({"name": "World", "theme": {"name": "dark"}});
//!
//! let output = engine.render_str("Hello, {name}! ({theme.name})", &data).unwrap();
//! assert_eq!(output, "Hello, World! (dark)");
//! ```

use crate::error::RenderError;

use super::{ResolvedTemplate, TemplateEngine};

/// A lightweight template engine using format-string style substitution.
///
/// Templates are read from disk on every render.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleEngine;

impl SimpleEngine {
    /// Creates a new SimpleEngine.
    pub fn new() -> Self {
        Self
    }

    /// Resolves a dotted path in a JSON value.
    fn resolve_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
        let mut current = value;

        for part in path.split('.') {
            current = match current {
                serde_json::Value::Object(map) => map.get(part)?,
                serde_json::Value::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    arr.get(index)?
                }
                _ => return None,
            };
        }

        Some(current)
    }

    /// Formats a JSON value as a string for output.
    fn format_value(value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Null => String::new(),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => value.to_string(),
        }
    }

    fn substitute(template: &str, context: &serde_json::Value) -> Result<String, RenderError> {
        let mut result = String::with_capacity(template.len());
        let mut chars = template.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    result.push('{');
                }
                '{' => {
                    let mut var_name = String::new();
                    let mut found_close = false;

                    for inner_ch in chars.by_ref() {
                        if inner_ch == '}' {
                            found_close = true;
                            break;
                        }
                        var_name.push(inner_ch);
                    }

                    if !found_close {
                        return Err(RenderError::Template(format!(
                            "unclosed variable substitution: {{{}",
                            var_name
                        )));
                    }

                    let var_name = var_name.trim();
                    if var_name.is_empty() {
                        return Err(RenderError::Template(
                            "empty variable name in template".to_string(),
                        ));
                    }

                    match Self::resolve_path(context, var_name) {
                        Some(v) => result.push_str(&Self::format_value(v)),
                        None => {
                            result.push('{');
                            result.push_str(var_name);
                            result.push('}');
                        }
                    }
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    result.push('}');
                }
                _ => result.push(ch),
            }
        }

        Ok(result)
    }
}

impl TemplateEngine for SimpleEngine {
    fn id(&self) -> &str {
        "simple"
    }

    fn render(
        &self,
        template: &ResolvedTemplate,
        context: &serde_json::Value,
    ) -> Result<String, RenderError> {
        let source =
            std::fs::read_to_string(&template.path).map_err(|source| RenderError::Io {
                path: template.path.clone(),
                source,
            })?;
        Self::substitute(&source, context)
    }

    fn render_str(&self, source: &str, context: &serde_json::Value) -> Result<String, RenderError> {
        Self::substitute(source, context)
    }

    fn supports_includes(&self) -> bool {
        false
    }

    fn supports_control_flow(&self) -> bool {
        false
    }
}
