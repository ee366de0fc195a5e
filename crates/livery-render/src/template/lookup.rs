//! Template name validation and search-path lookup.

use std::path::{Component, Path, PathBuf};

use crate::error::RenderError;

/// Checks that `name` is a plain relative path.
///
/// Absolute paths, drive prefixes and `..` components are rejected so a
/// template name can never escape its theme's template root.
pub fn validate_template_name(name: &str) -> Result<&Path, RenderError> {
    let path = Path::new(name);
    if name.is_empty() {
        return Err(RenderError::InvalidTemplateName(name.to_string()));
    }

    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(RenderError::InvalidTemplateName(name.to_string()));
            }
        }
    }

    Ok(path)
}

/// Returns the first `root/name` that is a file, in search-path order.
pub fn find_template(search_path: &[PathBuf], name: &Path) -> Option<PathBuf> {
    search_path
        .iter()
        .map(|root| root.join(name))
        .find(|candidate| candidate.is_file())
}
