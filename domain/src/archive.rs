//! Raw message archive: one pretty-printed JSON array per ingested call.

use crate::error::Error;
use crate::message::RawMessage;
use log::*;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RawArchive {
    dir: PathBuf,
}

impl RawArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, call_id: &str) -> PathBuf {
        self.dir.join(format!("{call_id}.json"))
    }

    /// Writes `<dir>/<call_id>.json`, creating the directory when needed and
    /// replacing any earlier archive of the same call.
    pub async fn store(&self, call_id: &str, messages: &[RawMessage]) -> Result<PathBuf, Error> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(call_id);
        let body = serde_json::to_vec_pretty(messages)?;
        tokio::fs::write(&path, body).await.map_err(|err| {
            error!("Failed to archive raw messages to {}: {err}", path.display());
            Error::from(err)
        })?;

        debug!("Archived {} messages to {}", messages.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::tests::message;

    #[tokio::test]
    async fn store_writes_a_json_array_named_after_the_call() {
        let dir = tempfile::tempdir().unwrap();
        let archive = RawArchive::new(dir.path().join("raw"));
        let messages = vec![
            message("1", "C", true, None),
            message("2", "A", false, Some("1")),
        ];

        let path = archive.store("2", &messages).await.unwrap();

        assert_eq!(path, dir.path().join("raw").join("2.json"));
        let stored: Vec<RawMessage> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(stored, messages);
    }
}
