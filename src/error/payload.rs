use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Only one of --data, --data-file, or --data-stdin may be set.")]
    AmbiguousSource,
    #[error("Failed to read data file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read from stdin: {source}")]
    ReadStdin {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to prepare editor buffer: {source}")]
    EditorBuffer {
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to open terminal '{device}' for editor: {source}")]
    EditorTerminal {
        device: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to launch editor '{editor}': {source}")]
    EditorLaunch {
        editor: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Editor '{editor}' exited with {status}.")]
    EditorExit { editor: String, status: ExitStatus },
    #[error("Failed to read edited buffer: {source}")]
    EditorRead {
        #[source]
        source: std::io::Error,
    },
}
