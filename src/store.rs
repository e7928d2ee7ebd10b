// Per-guild configuration store
// One pretty-printed JSON document per guild under <data>/servers/<id>/

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::guild::GuildConfig;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no configuration stored for guild {0}")]
    NotFound(u64),
    #[error("guild {0} already has a configuration")]
    AlreadyExists(u64),
    #[error("configuration for guild {guild_id} is corrupt: {source}")]
    Corrupt {
        guild_id: u64,
        source: serde_json::Error,
    },
    #[error("storage i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// File-backed per-guild configuration store.
///
/// Every mutation of a guild's document goes through that guild's own
/// mutex, so concurrent handlers can never interleave a read-modify-write.
/// Writes land in a temp file first and are renamed into place, so an
/// interrupted process never leaves a half-written document behind.
pub struct ConfigStore {
    root: PathBuf,
    locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl ConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: DashMap::new(),
        }
    }

    /// Directory holding a guild's files (config, custom background)
    pub fn guild_dir(&self, guild_id: u64) -> PathBuf {
        self.root.join(guild_id.to_string())
    }

    fn config_path(&self, guild_id: u64) -> PathBuf {
        self.guild_dir(guild_id).join(CONFIG_FILE)
    }

    fn lock_for(&self, guild_id: u64) -> Arc<Mutex<()>> {
        self.locks
            .entry(guild_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Load a guild's document
    pub async fn load(&self, guild_id: u64) -> Result<GuildConfig, StoreError> {
        let lock = self.lock_for(guild_id);
        let _guard = lock.lock().await;
        self.read_unlocked(guild_id).await
    }

    /// Overwrite a guild's whole document
    pub async fn save(&self, guild_id: u64, config: &GuildConfig) -> Result<(), StoreError> {
        let lock = self.lock_for(guild_id);
        let _guard = lock.lock().await;
        self.write_unlocked(guild_id, config).await
    }

    /// Read-modify-write under the guild's lock. The closure's error short
    /// circuits without touching the file.
    pub async fn update<F, T>(&self, guild_id: u64, mutate: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut GuildConfig) -> Result<T, StoreError>,
    {
        let lock = self.lock_for(guild_id);
        let _guard = lock.lock().await;

        let mut config = self.read_unlocked(guild_id).await?;
        let value = mutate(&mut config)?;
        self.write_unlocked(guild_id, &config).await?;
        Ok(value)
    }

    /// Create a fresh slot for a newly joined guild
    pub async fn create_default(&self, guild_id: u64) -> Result<(), StoreError> {
        let lock = self.lock_for(guild_id);
        let _guard = lock.lock().await;

        if tokio::fs::try_exists(self.config_path(guild_id)).await? {
            return Err(StoreError::AlreadyExists(guild_id));
        }
        debug!("creating default config for guild {}", guild_id);
        self.write_unlocked(guild_id, &GuildConfig::default()).await
    }

    /// Remove a guild's whole storage slot. Absence is an error, matching
    /// how the bot only ever deletes slots it created on guild join.
    pub async fn delete(&self, guild_id: u64) -> Result<(), StoreError> {
        let lock = self.lock_for(guild_id);
        let _guard = lock.lock().await;

        let dir = self.guild_dir(guild_id);
        if !tokio::fs::try_exists(&dir).await? {
            return Err(StoreError::NotFound(guild_id));
        }
        tokio::fs::remove_dir_all(&dir).await?;
        self.locks.remove(&guild_id);
        Ok(())
    }

    /// Every guild id with a storage slot
    pub async fn guild_ids(&self) -> Result<Vec<u64>, StoreError> {
        let mut ids = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if let Some(id) = entry.file_name().to_str().and_then(|n| n.parse().ok()) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    async fn read_unlocked(&self, guild_id: u64) -> Result<GuildConfig, StoreError> {
        let bytes = match tokio::fs::read(self.config_path(guild_id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(guild_id))
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt { guild_id, source })
    }

    async fn write_unlocked(&self, guild_id: u64, config: &GuildConfig) -> Result<(), StoreError> {
        let dir = self.guild_dir(guild_id);
        tokio::fs::create_dir_all(&dir).await?;

        // serializing GuildConfig cannot fail, but don't assume it
        let json = serde_json::to_vec_pretty(config)
            .map_err(|source| StoreError::Corrupt { guild_id, source })?;

        let path = self.config_path(guild_id);
        let tmp = dir.join(format!("{CONFIG_FILE}.tmp"));
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TEST_DIR_SEQ: AtomicUsize = AtomicUsize::new(0);

    fn test_store() -> ConfigStore {
        let seq = TEST_DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let root = std::env::temp_dir().join(format!(
            "tyr-store-test-{}-{}",
            std::process::id(),
            seq
        ));
        ConfigStore::new(root)
    }

    #[tokio::test]
    async fn load_before_create_is_not_found() {
        let store = test_store();
        assert!(matches!(store.load(1).await, Err(StoreError::NotFound(1))));
    }

    #[tokio::test]
    async fn create_then_load_round_trips() {
        let store = test_store();
        store.create_default(1).await.unwrap();

        let mut config = store.load(1).await.unwrap();
        config.logs_channel_id = Some("1234".to_string());
        config.add_role_react("55", "🔥", "77");
        store.save(1, &config).await.unwrap();

        let reloaded = store.load(1).await.unwrap();
        assert_eq!(reloaded.logs_channel_id.as_deref(), Some("1234"));
        assert_eq!(reloaded.role_for("55", "🔥"), Some("77"));
        // save(load(g)) leaves the document semantically unchanged
        store.save(1, &reloaded).await.unwrap();
        let again = store.load(1).await.unwrap();
        assert_eq!(
            serde_json::to_value(&reloaded).unwrap(),
            serde_json::to_value(&again).unwrap()
        );
    }

    #[tokio::test]
    async fn double_create_is_already_exists() {
        let store = test_store();
        store.create_default(2).await.unwrap();
        assert!(matches!(
            store.create_default(2).await,
            Err(StoreError::AlreadyExists(2))
        ));
    }

    #[tokio::test]
    async fn corrupt_document_is_reported() {
        let store = test_store();
        store.create_default(3).await.unwrap();
        std::fs::write(store.config_path(3), b"{ not json").unwrap();
        assert!(matches!(
            store.load(3).await,
            Err(StoreError::Corrupt { guild_id: 3, .. })
        ));
    }

    #[tokio::test]
    async fn delete_removes_slot_and_errors_on_absent() {
        let store = test_store();
        store.create_default(4).await.unwrap();
        store.delete(4).await.unwrap();
        assert!(matches!(store.load(4).await, Err(StoreError::NotFound(4))));
        assert!(matches!(store.delete(4).await, Err(StoreError::NotFound(4))));
    }

    #[tokio::test]
    async fn guild_ids_lists_created_slots() {
        let store = test_store();
        store.create_default(10).await.unwrap();
        store.create_default(11).await.unwrap();
        let mut ids = store.guild_ids().await.unwrap();
        ids.sort_unstable();
        assert_eq!(ids, vec![10, 11]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_updates_both_land() {
        let store = Arc::new(test_store());
        store.create_default(5).await.unwrap();

        let a = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .update(5, |config| {
                        config.add_role_react("900", "🔥", "901");
                        Ok(())
                    })
                    .await
            })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .update(5, |config| {
                        config.welcome_system.active = true;
                        Ok(())
                    })
                    .await
            })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let config = store.load(5).await.unwrap();
        assert_eq!(config.role_for("900", "🔥"), Some("901"));
        assert!(config.welcome_system.active);
    }
}
