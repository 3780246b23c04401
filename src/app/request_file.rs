use std::path::Path;

use tracing::debug;

use crate::domain::RequestTemplate;
use crate::error::{AppError, AppResult, ValidationError};

/// Loads a saved request. Placeholders are left for the caller to render.
///
/// # Errors
///
/// Returns an error when the path is not a `.json` file, cannot be read, or
/// does not decode as a request.
pub fn load_request_file(path: &Path) -> AppResult<RequestTemplate> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err(AppError::validation(ValidationError::RequestFileNotJson {
            path: path.display().to_string(),
        }));
    }
    let content = std::fs::read_to_string(path)?;
    let template: RequestTemplate = serde_json::from_str(&content)?;
    debug!(
        "Loaded request {} {} from {}",
        template.method,
        template.target_url(),
        path.display()
    );
    Ok(template)
}

/// Shape written by `--save`.
///
/// A body that came from a file is dropped (the file path is kept); a body
/// read from stdin or the editor is stored inline. The URL's query string is
/// moved into `query_params`.
#[must_use]
pub fn template_for_save(
    template: &RequestTemplate,
    interactive_body: Option<&[u8]>,
) -> RequestTemplate {
    let mut saved = template.clone();
    if !saved.body_file.is_empty() {
        saved.body.clear();
    } else if let Some(body) = interactive_body {
        saved.body = String::from_utf8_lossy(body).into_owned();
    }
    saved.body_stdin = false;

    if let Some((base, query)) = template.url.split_once('?') {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            saved
                .query_params
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        saved.url = base.to_owned();
    }
    saved
}

/// Writes a request as pretty JSON, creating the parent directory.
///
/// # Errors
///
/// Returns an error when the directory or file cannot be written.
pub fn save_request_file(template: &RequestTemplate, path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let encoded = serde_json::to_string_pretty(template)?;
    std::fs::write(path, encoded)?;
    Ok(())
}
