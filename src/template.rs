//! Unit template rendering.
//!
//! Templates are ordinary unit files carrying a small fixed set of
//! placeholder tokens that are substituted at install time. Rendering is
//! validated up front: a token that occurs in the template without a
//! non-empty value to fill it is an error, rather than being skipped.

use std::{fs, path::Path};

use crate::{
    constants::{APP_TOKEN, INSTALL_DIR_TOKEN},
    error::TemplateError,
};

/// Named fields available to unit templates.
#[derive(Debug, Default, Clone)]
pub struct TemplateVars {
    /// Application installation directory, filling [`INSTALL_DIR_TOKEN`].
    pub install_dir: Option<String>,
    /// Application identifier, filling [`APP_TOKEN`].
    pub app: Option<String>,
}

/// Reads the template at `path` and renders it with `vars`.
pub fn render_file(path: &Path, vars: &TemplateVars) -> Result<String, TemplateError> {
    let content = fs::read_to_string(path)?;
    render(&content, vars)
}

/// Substitutes every placeholder token occurring in `template`.
///
/// Fields whose token never occurs are accepted silently; a token whose
/// field is missing or empty fails the render.
pub fn render(template: &str, vars: &TemplateVars) -> Result<String, TemplateError> {
    let mut rendered = template.to_string();

    let fields = [
        (INSTALL_DIR_TOKEN, "install-dir", vars.install_dir.as_deref()),
        (APP_TOKEN, "app", vars.app.as_deref()),
    ];

    for (token, field, value) in fields {
        if !rendered.contains(token) {
            continue;
        }

        match value {
            Some(value) if !value.is_empty() => {
                rendered = rendered.replace(token, value);
            }
            _ => return Err(TemplateError::MissingField { token, field }),
        }
    }

    Ok(rendered)
}
