use directories::ProjectDirs;
use placement_core::PersistenceBoundary;
use placement_model::{ConfirmedPlacement, SignatureAsset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const STORE_SCHEMA_VERSION: u32 = 1;

/// Key the signature capture step writes its data URL under.
pub const SIGNATURE_KEY: &str = "signature";

/// Key the confirmed placement is handed off under.
pub const PLACEMENT_KEY: &str = "signature-placement";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unsupported store version {0}")]
    UnsupportedVersion(u32),
}

/// String key-value store persisted under a data directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreEnvelope {
    version: u32,
    items: BTreeMap<String, String>,
}

impl LocalStore {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "signplace", "signplace")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.items.remove(key))
    }

    pub fn set_item(&self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        let mut envelope = self.load()?;
        envelope.items.insert(key.to_owned(), value.into());
        self.save(&envelope)
    }

    /// Returns whether the key was present.
    pub fn remove_item(&self, key: &str) -> Result<bool, StorageError> {
        let mut envelope = self.load()?;
        let removed = envelope.items.remove(key).is_some();
        if removed {
            self.save(&envelope)?;
        }
        Ok(removed)
    }

    fn load(&self) -> Result<StoreEnvelope, StorageError> {
        let path = self.store_path();
        if !path.exists() {
            return Ok(StoreEnvelope { version: STORE_SCHEMA_VERSION, items: BTreeMap::new() });
        }

        let bytes = fs::read(path)?;
        let envelope: StoreEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version != STORE_SCHEMA_VERSION {
            return Err(StorageError::UnsupportedVersion(envelope.version));
        }

        Ok(envelope)
    }

    fn save(&self, envelope: &StoreEnvelope) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let bytes = serde_json::to_vec_pretty(envelope)?;
        fs::write(self.store_path(), bytes)?;
        Ok(())
    }

    fn store_path(&self) -> PathBuf {
        self.root.join("local-storage.json")
    }
}

/// Signature lookup and placement hand-off on top of a [`LocalStore`].
#[derive(Debug, Clone)]
pub struct SignatureStore {
    store: LocalStore,
}

impl SignatureStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub fn local_store(&self) -> &LocalStore {
        &self.store
    }

    pub fn save_signature(&self, asset: &SignatureAsset) -> Result<(), StorageError> {
        self.store.set_item(SIGNATURE_KEY, asset.to_data_url())
    }

    pub fn clear_signature(&self) -> Result<bool, StorageError> {
        self.store.remove_item(SIGNATURE_KEY)
    }

    /// Last placement handed off, if any.
    pub fn load_placement(&self) -> Result<Option<ConfirmedPlacement>, StorageError> {
        let Some(raw) = self.store.get_item(PLACEMENT_KEY)? else {
            return Ok(None);
        };

        Ok(Some(serde_json::from_str(&raw)?))
    }
}

impl PersistenceBoundary for SignatureStore {
    type Error = StorageError;

    /// A stored value that is not a usable data URL counts as no signature.
    fn load_signature(&self) -> Result<Option<SignatureAsset>, StorageError> {
        let Some(raw) = self.store.get_item(SIGNATURE_KEY)? else {
            return Ok(None);
        };

        match SignatureAsset::from_data_url(&raw) {
            Ok(asset) => Ok(Some(asset)),
            Err(err) => {
                log::warn!("ignoring stored signature: {err}");
                Ok(None)
            }
        }
    }

    fn hand_off(&mut self, placement: &ConfirmedPlacement) -> Result<(), StorageError> {
        let json = serde_json::to_string(placement)?;
        self.store.set_item(PLACEMENT_KEY, json)
    }
}
