//! Local draft snapshots, one JSON file per session.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use sessioncraft_domain::{DraftPayload, SessionId};

use crate::ports::{ClientError, SnapshotStore};

pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: SessionId) -> PathBuf {
        self.dir.join(format!("{}.json", session_id))
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn save(&self, session_id: SessionId, payload: &DraftPayload) -> Result<(), ClientError> {
        let json = serde_json::to_vec_pretty(payload)
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(io)?;

        // Write-then-rename so a crash never leaves a truncated snapshot.
        let path = self.path_for(session_id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io)?;
        tokio::fs::rename(&tmp, &path).await.map_err(io)?;

        tracing::debug!(session_id = %session_id, path = %path.display(), "Wrote local draft snapshot");
        Ok(())
    }

    async fn load(&self, session_id: SessionId) -> Result<Option<DraftPayload>, ClientError> {
        let path = self.path_for(session_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io(e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ClientError::Decode(format!("{}: {}", path.display(), e)))
    }
}

fn io(e: std::io::Error) -> ClientError {
    ClientError::Io(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessioncraft_domain::DraftMetadata;

    #[tokio::test]
    async fn round_trips_a_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("nested/drafts"));
        let session_id = SessionId::new();
        let payload = DraftPayload {
            metadata: DraftMetadata {
                title: "Onboarding".into(),
                ..Default::default()
            },
            ai_prompt_text: "keep it short".into(),
            ..Default::default()
        };

        store.save(session_id, &payload).await.unwrap();
        let loaded = store.load(session_id).await.unwrap();

        assert_eq!(loaded, Some(payload));
    }

    #[tokio::test]
    async fn later_save_replaces_earlier_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        let session_id = SessionId::new();

        for text in ["first", "second"] {
            let payload = DraftPayload {
                ai_prompt_text: text.into(),
                ..Default::default()
            };
            store.save(session_id, &payload).await.unwrap();
        }

        let loaded = store.load(session_id).await.unwrap().unwrap();
        assert_eq!(loaded.ai_prompt_text, "second");
    }

    #[tokio::test]
    async fn missing_snapshot_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());

        assert!(store.load(SessionId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_snapshot_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        let session_id = SessionId::new();
        std::fs::write(dir.path().join(format!("{}.json", session_id)), b"{not json").unwrap();

        let err = store.load(session_id).await.unwrap_err();

        assert!(matches!(err, ClientError::Decode(_)));
    }
}
