//! Error types for theme lookup and template rendering.
//!
//! This module provides [`RenderError`], the error type for every rendering
//! operation, and [`ThemeError`], the error type for theme lookup in a
//! catalog. Both abstract over the underlying template engine's errors so the
//! public API stays stable when engines change.

use std::fmt;
use std::path::PathBuf;

/// Error type for template rendering operations.
#[derive(Debug)]
pub enum RenderError {
    /// The template is absent from the active theme and its parent chain.
    TemplateNotFound {
        /// The requested template name.
        template: String,
        /// The name of the theme that was active when the lookup failed.
        theme: String,
    },

    /// The template name is not a plain relative path (absolute, or contains `..`).
    InvalidTemplateName(String),

    /// Template syntax error or engine runtime failure, passed through from the engine.
    Template(String),

    /// Data or global value could not be serialized into the render context.
    Serialization(String),

    /// I/O error while reading a template from disk.
    Io {
        /// Path of the template being read.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}

impl RenderError {
    /// Creates a not-found error for `template` in `theme`.
    pub fn not_found(template: impl Into<String>, theme: impl Into<String>) -> Self {
        RenderError::TemplateNotFound {
            template: template.into(),
            theme: theme.into(),
        }
    }

    /// Returns true if this error reports a missing template.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RenderError::TemplateNotFound { .. })
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::TemplateNotFound { template, theme } => {
                write!(f, "template \"{}\" not found in theme \"{}\"", template, theme)
            }
            RenderError::InvalidTemplateName(name) => {
                write!(f, "invalid template name: {}", name)
            }
            RenderError::Template(msg) => write!(f, "template error: {}", msg),
            RenderError::Serialization(msg) => write!(f, "serialization error: {}", msg),
            RenderError::Io { path, source } => {
                write!(f, "failed to read template {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Serialization(err.to_string())
    }
}

// Engine errors keep their message; missing includes surface as template
// errors because the top-level template was already resolved.
impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        match err.kind() {
            ErrorKind::BadSerialization => RenderError::Serialization(err.to_string()),
            _ => RenderError::Template(err.to_string()),
        }
    }
}

/// Error type for theme lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    /// The requested theme name is not in the catalog.
    ThemeNotFound {
        /// The name that was requested.
        name: String,
    },

    /// The catalog is empty, so there is no default theme to fall back to.
    NoDefaultTheme,
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThemeError::ThemeNotFound { name } => write!(f, "theme not found: \"{}\"", name),
            ThemeError::NoDefaultTheme => write!(f, "no default theme available"),
        }
    }
}

impl std::error::Error for ThemeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_not_found_display() {
        let err = RenderError::not_found("home.html", "dark");
        let display = err.to_string();
        assert!(display.contains("home.html"));
        assert!(display.contains("dark"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error;

        let err = RenderError::Io {
            path: PathBuf::from("/themes/dark/home.html"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/themes/dark/home.html"));
    }

    #[test]
    fn test_from_minijinja_syntax_error() {
        let mj_err = minijinja::Error::new(minijinja::ErrorKind::SyntaxError, "unexpected end");
        let err: RenderError = mj_err.into();
        assert!(matches!(err, RenderError::Template(_)));
    }

    #[test]
    fn test_theme_error_display() {
        let err = ThemeError::ThemeNotFound {
            name: "neon".into(),
        };
        assert_eq!(err.to_string(), "theme not found: \"neon\"");
        assert_eq!(
            ThemeError::NoDefaultTheme.to_string(),
            "no default theme available"
        );
    }
}
