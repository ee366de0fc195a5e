//! Template engines and themed rendering.
//!
//! Rendering is split in two layers:
//!
//! - [`TemplateEngine`] turns a located template and a finished context into
//!   text. [`MiniJinjaEngine`] provides Jinja syntax; [`SimpleEngine`]
//!   provides `{name}` substitution.
//! - [`ThemeRenderer`] locates templates through a theme's parent chain,
//!   assembles the context (see [`crate::context`]) and calls the engine.
//!   [`ThemedRenderer`] is its per-request view.
//!
//! ## Template Lookup
//!
//! A template name is a relative path such as `partials/nav.html`. It is
//! looked up in the active theme's template root, then in its parent's, and
//! so on. The first match wins. Names that are absolute or contain `..` are
//! rejected with [`RenderError::InvalidTemplateName`](crate::RenderError).
//!
//! ```text
//! themes/
//!   base/  home.html  footer.html
//!   dark/  home.html               theme.json: {"parent": "base"}
//!
//! dark + home.html   -> themes/dark/home.html
//! dark + footer.html -> themes/base/footer.html
//! ```

mod engine;
mod lookup;
mod renderer;
mod simple;

pub use engine::{register_functions, MiniJinjaEngine, ResolvedTemplate, TemplateEngine};
pub use lookup::{find_template, validate_template_name};
pub use renderer::{ThemeRenderer, ThemedRenderer};
pub use simple::SimpleEngine;
