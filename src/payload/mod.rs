//! Request body resolution: inline data, a data file, or stdin, plus optional editing.
mod editor;


use std::io::Read;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::PayloadError;

pub use editor::{Editor, ExternalEditor};

/// Where the body may come from. At most one source may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadSources {
    pub data: String,
    pub data_file: String,
    pub stdin: bool,
    pub edit: bool,
}

impl PayloadSources {
    fn configured_count(&self) -> usize {
        [
            !self.data.is_empty(),
            !self.data_file.is_empty(),
            self.stdin,
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}

/// Resolves the body bytes from the configured source.
///
/// An editor failure is logged and the unedited bytes are used.
///
/// # Errors
///
/// Returns [`PayloadError::AmbiguousSource`] when more than one source is set,
/// or a read error when the file or stdin cannot be read.
pub fn resolve(
    sources: &PayloadSources,
    stdin: &mut dyn Read,
    editor: &dyn Editor,
) -> Result<Vec<u8>, PayloadError> {
    if sources.configured_count() > 1 {
        return Err(PayloadError::AmbiguousSource);
    }

    let body = if !sources.data.is_empty() {
        sources.data.as_bytes().to_vec()
    } else if !sources.data_file.is_empty() {
        let path = PathBuf::from(&sources.data_file);
        std::fs::read(&path).map_err(|source| PayloadError::ReadFile { path, source })?
    } else if sources.stdin {
        let mut buffer = Vec::new();
        stdin
            .read_to_end(&mut buffer)
            .map_err(|source| PayloadError::ReadStdin { source })?;
        buffer
    } else {
        Vec::new()
    };
    debug!("Resolved request body ({} bytes)", body.len());

    if !sources.edit {
        return Ok(body);
    }
    match editor.edit(&body) {
        Ok(edited) => Ok(edited),
        Err(err) => {
            warn!("Editor failed, sending the unedited body: {}", err);
            Ok(body)
        }
    }
}
