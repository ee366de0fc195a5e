//! Themes and their manifests.
//!
//! A [`Theme`] is a named directory of templates and assets, discovered by the
//! [`ThemeCatalog`](crate::catalog::ThemeCatalog). Each theme may carry a
//! `theme.json` [`ThemeManifest`]:
//!
//! ```json
//! { "parent": "base", "label": "Midnight", "accent": "#7f5af0" }
//! ```
//!
//! `parent` names the theme consulted for templates this theme does not
//! override. Every key, `parent` included, is kept as the theme's config so
//! templates can read `theme.config.accent`.

mod manifest;
#[allow(clippy::module_inception)]
mod theme;

pub use manifest::{ThemeManifest, MANIFEST_FILE};
pub use theme::Theme;
