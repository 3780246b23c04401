use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;

/// Reads a dotenv file. A missing file is an empty mapping.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or contains a
/// line that is not `KEY=VALUE`.
pub fn load_dotenv(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(ConfigError::ReadEnvFile {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    parse_dotenv(&content, path)
}

/// Parses `KEY=VALUE` lines. Blank lines and `#` comments are skipped, an
/// `export ` prefix is ignored and one pair of matching quotes around the
/// value is stripped. Later keys override earlier ones.
///
/// # Errors
///
/// Returns an error naming the first malformed line.
pub fn parse_dotenv(content: &str, path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut values = BTreeMap::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").map_or(line, str::trim_start);
        let Some((key, value)) = line.split_once('=') else {
            return Err(invalid_line(path, index));
        };
        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(invalid_line(path, index));
        }
        values.insert(key.to_owned(), unquote(value.trim()).to_owned());
    }
    Ok(values)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn invalid_line(path: &Path, index: usize) -> ConfigError {
    ConfigError::InvalidEnvLine {
        path: path.to_path_buf(),
        line: index.saturating_add(1),
    }
}
