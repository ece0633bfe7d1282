//! # Plantillas HTML
//! src/app/views.rs
//!
//! Reemplazo de texto simple sobre archivos del directorio de vistas:
//!
//! - `{{=clave}}` inserta el valor tal cual (HTML ya armado)
//! - `{{clave}}` inserta el valor escapado
//!
//! Las claves se reemplazan de la más larga a la más corta para que
//! `{{song}}` no pise parte de `{{song_count}}`. Las plantillas se leen del
//! disco en cada render.

use crate::http::response::escape_html;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Plantilla que debe existir para que el directorio se considere válido
pub const INDEX_TEMPLATE: &str = "index.html";

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("views directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("template '{template}' not found in {dir}")]
    MissingTemplate { template: String, dir: PathBuf },
}

#[derive(Debug, Clone)]
pub struct ViewRenderer {
    dir: PathBuf,
}

impl ViewRenderer {
    /// Falla si el directorio no existe o no tiene `index.html`
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, ViewError> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(ViewError::MissingDirectory(dir));
        }
        if !dir.join(INDEX_TEMPLATE).is_file() {
            return Err(ViewError::MissingTemplate {
                template: INDEX_TEMPLATE.to_string(),
                dir,
            });
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Renderiza `name` con el modelo dado
    ///
    /// Si la plantilla no se puede leer retorna un HTML de error en vez de
    /// fallar, así el handler siempre tiene algo que responder.
    pub fn render(&self, name: &str, model: &HashMap<&str, String>) -> String {
        let path = self.dir.join(name);
        let mut html = match fs::read_to_string(&path) {
            Ok(html) => html,
            Err(e) => {
                warn!(template = name, error = %e, "template not available");
                return format!("<h1>Template '{}' not found</h1>", escape_html(name));
            }
        };

        let mut keys: Vec<&&str> = model.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        for key in &keys {
            html = html.replace(&format!("{{{{={}}}}}", key), &model[**key]);
        }
        for key in &keys {
            html = html.replace(&format!("{{{{{}}}}}", key), &escape_html(&model[**key]));
        }
        html
    }
}
