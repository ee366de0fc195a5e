//! Rendering prelude for convenient imports.
//!
//! ```rust,ignore
//! use livery_render::prelude::*;
//!
//! let catalog = ThemeCatalog::discover(root, &ThemeSettings::default(), &EngineConvention::minijinja())?;
//! let renderer = ThemeRenderer::new(Arc::new(catalog), MiniJinjaEngine::new());
//! ```

pub use crate::{
    EngineConvention, MiniJinjaEngine, RenderError, SimpleEngine, TemplateEngine, Theme,
    ThemeCatalog, ThemeError, ThemeRenderer, ThemeSettings, ThemedRenderer,
};
