//! Loading of the base Swagger definition that annotations are merged into.

use crate::error::{Error, Result};
use crate::openapi_builder::SwaggerDocument;
use log::debug;
use std::fs;
use std::path::Path;

/// Reads a base definition from a `.yaml`, `.yml` or `.json` file.
///
/// Missing sections fall back to their defaults, so a file holding only
/// `info` is enough.
pub fn load_definition(path: &Path) -> Result<SwaggerDocument> {
    debug!("Loading base definition: {}", path.display());

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    let content = fs::read_to_string(path)?;
    let document = match extension.as_deref() {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&content).map_err(|e| Error::DefinitionError {
                file: path.to_path_buf(),
                message: e.to_string(),
            })?
        }
        Some("json") => serde_json::from_str(&content).map_err(|e| Error::DefinitionError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?,
        _ => return Err(Error::UnsupportedFormat(path.to_path_buf())),
    };

    Ok(document)
}
