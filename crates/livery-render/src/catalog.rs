//! Theme discovery.
//!
//! [`ThemeCatalog`] scans a themes directory once at bootstrap and owns the
//! resulting name → [`Theme`] mapping. It is read-only afterwards and meant
//! to be shared behind an `Arc` by every request.
//!
//! # Discovery
//!
//! 1. The themes directory is `root / templates_path`, where `templates_path`
//!    comes from the engine's settings override, then the global setting, then
//!    the convention's default segment.
//! 2. Every immediate subdirectory is a candidate named after its basename.
//!    Hidden directories are skipped and candidates are sorted by name.
//! 3. A non-empty `available` setting filters candidates.
//! 4. `theme.json` supplies the parent and config (see [`ThemeManifest`]).
//! 5. The convention's [`DefaultRule`](crate::convention::DefaultRule) flags
//!    the default.
//!
//! # Default Invariant
//!
//! A non-empty catalog has exactly one default theme. When several themes
//! qualify, the first in name order wins. When none does, the first theme is
//! promoted, unless `strict_default` is set, in which case discovery fails.
//!
//! # Example
//!
//! ```rust,ignore
//! use livery_render::{EngineConvention, ThemeCatalog, ThemeSettings};
//!
//! let settings = ThemeSettings::new().with_default("light");
//! let catalog = ThemeCatalog::discover("/srv/app", &settings, &EngineConvention::minijinja())?;
//! let theme = catalog.load("dark")?;
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::convention::{EngineConvention, DEFAULT_MARKER};
use crate::error::ThemeError;
use crate::settings::ThemeSettings;
use crate::theme::{Theme, ThemeManifest};

/// Errors raised while building a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The themes directory exists but could not be listed.
    #[error("failed to list themes in {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Strict mode is on and no theme is flagged default.
    #[error("no default theme flagged in {themes_dir} (strict_default is enabled)")]
    NoDefaultFlagged { themes_dir: PathBuf },

    /// Two themes share a name.
    #[error("duplicate theme name: {name}")]
    DuplicateTheme { name: String },
}

/// The immutable set of discovered themes plus the chosen default.
#[derive(Debug, Clone)]
pub struct ThemeCatalog {
    themes_dir: PathBuf,
    convention: EngineConvention,
    themes: Vec<Arc<Theme>>,
    index: HashMap<String, usize>,
    default_index: Option<usize>,
}

impl ThemeCatalog {
    /// Scans the themes directory under `root` and builds the catalog.
    ///
    /// A missing themes directory yields an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the directory exists but cannot be
    /// listed, and [`CatalogError::NoDefaultFlagged`] in strict mode when no
    /// theme qualifies as default.
    pub fn discover(
        root: impl AsRef<Path>,
        settings: &ThemeSettings,
        convention: &EngineConvention,
    ) -> Result<Self, CatalogError> {
        let effective = settings.for_engine(convention.id());
        let segment = effective
            .templates_path
            .as_deref()
            .unwrap_or(convention.default_themes_dir());
        // An absolute segment replaces the root.
        let themes_dir = root.as_ref().join(segment);

        let rule = convention.default_rule();
        let mut themes = Vec::new();
        for (name, dir) in list_theme_dirs(&themes_dir)? {
            if !settings.is_available(&name) {
                debug!(theme = %name, "skipping theme not listed in available themes");
                continue;
            }

            let manifest = ThemeManifest::load(&dir).unwrap_or_default();
            let flagged = (rule.uses_setting() && settings.default.as_deref() == Some(name.as_str()))
                || (rule.uses_marker() && dir.join(DEFAULT_MARKER).is_file());

            let mut theme = Theme::new(name, dir)
                .with_layout(convention.layout())
                .with_config(manifest.config)
                .with_default(flagged);
            if let Some(parent) = manifest.parent {
                theme = theme.with_parent(parent);
            }
            themes.push(theme);
        }

        let catalog = Self::assemble(
            themes_dir,
            convention.clone(),
            themes,
            settings.strict_default,
        )?;

        if rule.uses_setting() {
            if let Some(name) = settings.default.as_deref() {
                if !catalog.contains(name) {
                    warn!(theme = %name, "configured default theme was not discovered");
                }
            }
        }
        for theme in &catalog.themes {
            if let Some(parent) = theme.parent() {
                if !catalog.contains(parent) {
                    warn!(theme = %theme.name(), parent = %parent, "parent theme is not in the catalog");
                }
            }
        }

        debug!(
            themes_dir = %catalog.themes_dir.display(),
            count = catalog.len(),
            default = ?catalog.default_name(),
            "theme catalog ready"
        );
        Ok(catalog)
    }

    /// Builds a catalog from themes constructed in code.
    ///
    /// Themes keep the given order. The default invariant is enforced the
    /// same way as during discovery (first flagged wins, else the first theme
    /// is promoted).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateTheme`] if two themes share a name.
    pub fn from_themes(
        themes_dir: impl Into<PathBuf>,
        convention: EngineConvention,
        themes: Vec<Theme>,
    ) -> Result<Self, CatalogError> {
        Self::assemble(themes_dir.into(), convention, themes, false)
    }

    fn assemble(
        themes_dir: PathBuf,
        convention: EngineConvention,
        themes: Vec<Theme>,
        strict_default: bool,
    ) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(themes.len());
        let mut default_index = None;
        let mut ordered = Vec::with_capacity(themes.len());

        for (i, mut theme) in themes.into_iter().enumerate() {
            if index.insert(theme.name().to_string(), i).is_some() {
                return Err(CatalogError::DuplicateTheme {
                    name: theme.name().to_string(),
                });
            }
            if theme.is_default() {
                match default_index {
                    None => default_index = Some(i),
                    Some(winner) => {
                        let winner: &Theme = &ordered[winner];
                        warn!(
                            theme = %theme.name(),
                            default = %winner.name(),
                            "more than one theme flagged default, keeping the first"
                        );
                        theme = theme.with_default(false);
                    }
                }
            }
            ordered.push(theme);
        }

        if default_index.is_none() && !ordered.is_empty() {
            if strict_default {
                return Err(CatalogError::NoDefaultFlagged { themes_dir });
            }
            warn!(
                theme = %ordered[0].name(),
                "no theme flagged default, promoting the first theme"
            );
            let first = ordered.remove(0).with_default(true);
            ordered.insert(0, first);
            default_index = Some(0);
        }

        Ok(Self {
            themes_dir,
            convention,
            themes: ordered.into_iter().map(Arc::new).collect(),
            index,
            default_index,
        })
    }

    /// Returns the theme called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::ThemeNotFound`] if there is no such theme.
    pub fn load(&self, name: &str) -> Result<Arc<Theme>, ThemeError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| ThemeError::ThemeNotFound {
                name: name.to_string(),
            })
    }

    /// Returns the theme called `name`, if present.
    pub fn get(&self, name: &str) -> Option<&Arc<Theme>> {
        self.index.get(name).map(|&i| &self.themes[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the default theme.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::NoDefaultTheme`] if the catalog is empty.
    pub fn default_theme(&self) -> Result<Arc<Theme>, ThemeError> {
        self.default_index
            .map(|i| Arc::clone(&self.themes[i]))
            .ok_or(ThemeError::NoDefaultTheme)
    }

    /// Name of the default theme, if the catalog is non-empty.
    pub fn default_name(&self) -> Option<&str> {
        self.default_index.map(|i| self.themes[i].name())
    }

    /// Every theme, in discovery order.
    pub fn available_themes(&self) -> &[Arc<Theme>] {
        &self.themes
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.themes.iter().map(|t| t.name())
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// The directory that was scanned.
    pub fn themes_dir(&self) -> &Path {
        &self.themes_dir
    }

    pub fn convention(&self) -> &EngineConvention {
        &self.convention
    }

    /// Returns `theme` followed by its ancestors.
    ///
    /// The walk follows `parent` names through this catalog and stops at the
    /// first parent that is missing or already visited. A cycle is logged.
    pub fn parent_chain<'a>(&'a self, theme: &'a Theme) -> Vec<&'a Theme> {
        let mut chain = vec![theme];
        let mut seen = HashSet::from([theme.name()]);
        let mut current = theme;

        while let Some(parent_name) = current.parent() {
            let Some(parent) = self.get(parent_name).map(Arc::as_ref) else {
                break;
            };
            if !seen.insert(parent.name()) {
                warn!(
                    theme = %theme.name(),
                    parent = %parent_name,
                    "parent theme cycle detected, stopping inheritance walk"
                );
                break;
            }
            chain.push(parent);
            current = parent;
        }

        chain
    }

    /// Template roots of `theme`'s inheritance chain, nearest first.
    pub fn search_path(&self, theme: &Theme) -> Vec<PathBuf> {
        self.parent_chain(theme)
            .into_iter()
            .map(Theme::templates_path)
            .collect()
    }
}

/// Lists candidate theme directories, sorted by name.
fn list_theme_dirs(themes_dir: &Path) -> Result<Vec<(String, PathBuf)>, CatalogError> {
    if !themes_dir.is_dir() {
        debug!(themes_dir = %themes_dir.display(), "themes directory not found, catalog is empty");
        return Ok(Vec::new());
    }

    let io_err = |source| CatalogError::Io {
        path: themes_dir.to_path_buf(),
        source,
    };

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(themes_dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            debug!(path = %path.display(), "skipping theme directory with non UTF-8 name");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        dirs.push((name, path));
    }

    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dirs)
}
