//! Local JSON-file profile store, one `<uid>.json` per user.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use studyquiz_core::profile::UserProfile;
use studyquiz_core::traits::ProfileStore;

use crate::error::{validate_key, StoreError};

pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, uid: &str) -> Result<PathBuf, StoreError> {
        validate_key(uid)?;
        Ok(self.dir.join(format!("{uid}.json")))
    }
}

#[async_trait]
impl ProfileStore for JsonFileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, uid: &str) -> anyhow::Result<Option<UserProfile>> {
        let path = self.path_for(uid)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read profile: {}", path.display()))
            }
        };
        let profile = serde_json::from_str(&content)
            .map_err(|e| StoreError::Decode(format!("{}: {e}", path.display())))?;
        Ok(Some(profile))
    }

    async fn put(&self, profile: &UserProfile) -> anyhow::Result<()> {
        let path = self.path_for(&profile.uid)?;
        let json = serde_json::to_string_pretty(profile).context("failed to serialize profile")?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create store directory: {}", self.dir.display()))?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("failed to write profile to {}", path.display()))?;
        tracing::debug!(path = %path.display(), "profile saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use studyquiz_core::profile::increment_pdf_count;
    use studyquiz_core::session::UserContext;

    #[tokio::test]
    async fn missing_profile_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.get("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("profiles"));
        let profile = UserProfile::new_for(&UserContext::new("uid-1", "t"), Utc::now());

        store.put(&profile).await.unwrap();
        assert!(dir.path().join("profiles/uid-1.json").exists());
        assert_eq!(store.get("uid-1").await.unwrap(), Some(profile));
    }

    #[tokio::test]
    async fn counters_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let profile = UserProfile::new_for(&UserContext::new("uid-1", "t"), Utc::now());
        JsonFileStore::new(dir.path()).put(&profile).await.unwrap();

        increment_pdf_count(&JsonFileStore::new(dir.path()), "uid-1")
            .await
            .unwrap();
        let reloaded = JsonFileStore::new(dir.path())
            .get("uid-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.pdf_count, 1);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("uid-1.json"), "{ nope").unwrap();
        let err = JsonFileStore::new(dir.path()).get("uid-1").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn path_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.get("../etc/passwd").await.is_err());
    }
}
