///! Static target catalog, re-read from disk on every request.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;

use crate::error::{LookupError, LookupResult};
use crate::pool::TaskPool;

pub struct CatalogProvider {
    path: PathBuf,
    pool: TaskPool,
}

impl CatalogProvider {
    pub fn new<P: AsRef<Path>>(path: P, pool: TaskPool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pool,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current catalog records. Edits to the file show up on the next call.
    pub async fn load(&self) -> LookupResult<Vec<Value>> {
        let content = self
            .pool
            .run("catalog", async {
                fs::read_to_string(&self.path).await.map_err(|e| {
                    LookupError::CatalogUnavailable(format!(
                        "failed to read {}: {}",
                        self.path.display(),
                        e
                    ))
                })
            })
            .await
            .map_err(|e| match e {
                LookupError::Timeout { seconds, .. } => LookupError::CatalogUnavailable(format!(
                    "reading {} took longer than {}s",
                    self.path.display(),
                    seconds
                )),
                other => other,
            })?;

        let records = parse_catalog(&content)?;
        tracing::debug!("Loaded {} catalog records from {:?}", records.len(), self.path);
        Ok(records)
    }
}

/// Accepts a top-level array (returned as is), an object wrapping a `data`
/// object, or a plain object; for the object forms the values are returned
/// sorted by key.
pub fn parse_catalog(content: &str) -> LookupResult<Vec<Value>> {
    let document: Value = serde_json::from_str(content)
        .map_err(|e| LookupError::CatalogUnavailable(format!("invalid catalog JSON: {}", e)))?;

    match document {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Object(data)) => Ok(data.into_iter().map(|(_, v)| v).collect()),
            Some(data) => {
                map.insert("data".to_string(), data);
                Ok(map.into_iter().map(|(_, v)| v).collect())
            }
            None => Ok(map.into_iter().map(|(_, v)| v).collect()),
        },
        other => Err(LookupError::CatalogUnavailable(format!(
            "catalog must be an array or object, found {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
