//! Persistence of the most recent response, read back as `{{history.*}}`.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::domain::{Multimap, Response};
use crate::error::HistoryError;
use crate::template::TemplateValue;

/// On-disk shape of the last response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub status: u16,
    pub headers: Multimap,
    pub body: String,
    pub content_type: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub duration_ms: u64,
}

impl From<&Response> for ResponseSnapshot {
    fn from(response: &Response) -> Self {
        Self {
            status: response.status,
            headers: response.headers.clone(),
            body: response.body_text().into_owned(),
            content_type: response.content_type.clone(),
            timestamp: response.timestamp.to_rfc3339(),
            duration_ms: u64::try_from(response.duration.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Loads the last snapshot as a template value tree, `None` when there is none yet.
    async fn load(&self) -> Result<Option<TemplateValue>, HistoryError>;

    /// Replaces the stored snapshot with `response`.
    async fn save(&self, response: &Response) -> Result<(), HistoryError>;
}

/// JSON file store. Writes are serialized so concurrent workers never
/// interleave partial files; the last save wins.
#[derive(Debug)]
pub struct FileHistoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileHistoryStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    async fn load(&self) -> Result<Option<TemplateValue>, HistoryError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(HistoryError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|source| HistoryError::Decode {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(TemplateValue::from_snapshot(value)))
    }

    async fn save(&self, response: &Response) -> Result<(), HistoryError> {
        let snapshot = ResponseSnapshot::from(response);
        let encoded = serde_json::to_vec_pretty(&snapshot)
            .map_err(|source| HistoryError::Encode { source })?;

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| HistoryError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&self.path, encoded)
            .await
            .map_err(|source| HistoryError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn run_async_test<F>(future: F) -> Result<(), String>
    where
        F: std::future::Future<Output = Result<(), String>>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| format!("Failed to build runtime: {}", err))?;
        runtime.block_on(future)
    }

    fn json_response() -> Response {
        let mut headers = Multimap::new();
        headers.insert(
            "Content-Type".to_owned(),
            vec!["application/json".to_owned()],
        );
        Response::new(
            201,
            headers,
            br#"{"token":"abc","user":{"id":7}}"#.to_vec(),
            Duration::from_millis(42),
        )
    }

    #[test]
    fn missing_file_loads_as_no_history() -> Result<(), String> {
        run_async_test(async {
            let dir = tempfile::tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
            let store = FileHistoryStore::new(dir.path().join("absent.json"));
            let loaded = store.load().await.map_err(|err| err.to_string())?;
            if loaded.is_some() {
                return Err("Expected no history".to_owned());
            }
            Ok(())
        })
    }

    #[test]
    fn empty_file_loads_as_no_history() -> Result<(), String> {
        run_async_test(async {
            let dir = tempfile::tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
            let path = dir.path().join("latest.json");
            std::fs::write(&path, "\n").map_err(|err| format!("write failed: {}", err))?;
            let loaded = FileHistoryStore::new(path)
                .load()
                .await
                .map_err(|err| err.to_string())?;
            if loaded.is_some() {
                return Err("Expected no history".to_owned());
            }
            Ok(())
        })
    }

    #[test]
    fn save_then_load_exposes_parsed_body() -> Result<(), String> {
        run_async_test(async {
            let dir = tempfile::tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
            let store = FileHistoryStore::new(dir.path().join("nested").join("latest.json"));
            store
                .save(&json_response())
                .await
                .map_err(|err| err.to_string())?;

            let loaded = store
                .load()
                .await
                .map_err(|err| err.to_string())?
                .ok_or_else(|| "Expected history".to_owned())?;
            let token = loaded
                .lookup(&["body", "token"])
                .map(TemplateValue::render);
            if token.as_deref() != Some("abc") {
                return Err(format!("Unexpected token: {:?}", token));
            }
            let status = loaded.lookup(&["status"]).map(TemplateValue::render);
            if status.as_deref() != Some("201") {
                return Err(format!("Unexpected status: {:?}", status));
            }
            Ok(())
        })
    }

    #[test]
    fn snapshot_records_duration_and_content_type() -> Result<(), String> {
        let snapshot = ResponseSnapshot::from(&json_response());
        if snapshot.duration_ms != 42 {
            return Err(format!("Unexpected duration: {}", snapshot.duration_ms));
        }
        if snapshot.content_type != "application/json" {
            return Err(format!("Unexpected content type: {}", snapshot.content_type));
        }
        if chrono::DateTime::parse_from_rfc3339(&snapshot.timestamp).is_err() {
            return Err(format!("Timestamp is not RFC 3339: {}", snapshot.timestamp));
        }
        Ok(())
    }

    #[test]
    fn corrupt_file_is_a_decode_error() -> Result<(), String> {
        run_async_test(async {
            let dir = tempfile::tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
            let path = dir.path().join("latest.json");
            std::fs::write(&path, "{not json").map_err(|err| format!("write failed: {}", err))?;
            match FileHistoryStore::new(path).load().await {
                Err(HistoryError::Decode { .. }) => Ok(()),
                other => Err(format!("Expected decode error, got {:?}", other)),
            }
        })
    }
}
