use std::fs::File;
use std::io::{IsTerminal, Write};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::PayloadError;

/// Interactive editing of a request body.
pub trait Editor {
    /// Opens `initial` for editing and returns the edited bytes.
    ///
    /// # Errors
    ///
    /// Returns an error when the editing session cannot run or its result cannot be read.
    fn edit(&self, initial: &[u8]) -> Result<Vec<u8>, PayloadError>;
}

/// Runs `$EDITOR` (or a platform default) on a temporary file.
#[derive(Debug, Clone, Default)]
pub struct ExternalEditor {
    command: Option<String>,
}

impl ExternalEditor {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            command: std::env::var("EDITOR")
                .ok()
                .filter(|value| !value.trim().is_empty()),
        }
    }

    fn command(&self) -> &str {
        match self.command.as_deref() {
            Some(command) => command,
            None if cfg!(windows) => "notepad",
            None => "vim",
        }
    }
}

impl Editor for ExternalEditor {
    fn edit(&self, initial: &[u8]) -> Result<Vec<u8>, PayloadError> {
        let mut buffer = tempfile::Builder::new()
            .prefix("poke_edit_")
            .suffix(".tmp")
            .tempfile()
            .map_err(|source| PayloadError::EditorBuffer { source })?;
        buffer
            .write_all(initial)
            .and_then(|()| buffer.flush())
            .map_err(|source| PayloadError::EditorBuffer { source })?;

        let editor = self.command().to_owned();
        let mut command = Command::new(&editor);
        command.arg(buffer.path());
        if std::io::stdin().is_terminal() {
            command
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        } else {
            let (input, output) = open_terminal()?;
            let errors = output
                .try_clone()
                .map_err(|source| PayloadError::EditorTerminal {
                    device: TERMINAL_OUT,
                    source,
                })?;
            command
                .stdin(Stdio::from(input))
                .stdout(Stdio::from(output))
                .stderr(Stdio::from(errors));
        }

        debug!("Launching editor {} on {}", editor, buffer.path().display());
        let status = command
            .status()
            .map_err(|source| PayloadError::EditorLaunch {
                editor: editor.clone(),
                source,
            })?;
        if !status.success() {
            return Err(PayloadError::EditorExit { editor, status });
        }

        let edited = std::fs::read_to_string(buffer.path())
            .map_err(|source| PayloadError::EditorRead { source })?;
        Ok(edited.trim().as_bytes().to_vec())
    }
}

#[cfg(windows)]
const TERMINAL_IN: &str = "CONIN$";
#[cfg(windows)]
const TERMINAL_OUT: &str = "CONOUT$";
#[cfg(not(windows))]
const TERMINAL_IN: &str = "/dev/tty";
#[cfg(not(windows))]
const TERMINAL_OUT: &str = "/dev/tty";

/// Stdin is a pipe (the body may have come from it), so the editor talks to the terminal directly.
fn open_terminal() -> Result<(File, File), PayloadError> {
    let open = |device: &'static str| {
        File::options()
            .read(true)
            .write(true)
            .open(device)
            .map_err(|source| PayloadError::EditorTerminal { device, source })
    };
    Ok((open(TERMINAL_IN)?, open(TERMINAL_OUT)?))
}
