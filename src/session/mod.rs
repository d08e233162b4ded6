use log::{debug, info};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::AppError;

/// Storage key the admin token lives under.
pub const TOKEN_KEY: &str = "adminToken";

/// Client-persistent key/value storage.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// Keeps values in a small JSON object on disk.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Map<String, Value>, AppError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(AppError::Session(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                // A corrupt file is treated as empty storage
                log::warn!("Ignoring unreadable session file {}", self.path.display());
                Ok(Map::new())
            }
        }
    }

    fn save(&self, map: &Map<String, Value>) -> Result<(), AppError> {
        let raw = serde_json::to_string_pretty(map)
            .map_err(|e| AppError::Session(format!("Failed to encode session: {}", e)))?;
        fs::write(&self.path, raw).map_err(|e| {
            AppError::Session(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .load()?
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut map = self.load()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.save(&map)
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryTokenStore {
    values: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let values = self
            .values
            .lock()
            .map_err(|_| AppError::Session("token store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.values
            .lock()
            .map_err(|_| AppError::Session("token store lock poisoned".to_string()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.values
            .lock()
            .map_err(|_| AppError::Session("token store lock poisoned".to_string()))?
            .remove(key);
        Ok(())
    }
}

/// Admin session handle. Built once at start-up and cloned into the flows
/// that need authenticated access. Token expiry is left to the backend.
#[derive(Clone)]
pub struct AdminSession {
    store: Arc<dyn TokenStore>,
}

impl AdminSession {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::default()))
    }

    /// The stored token, if any. Storage failures read as "no token".
    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                log::error!("Failed to read admin token: {}", e);
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn sign_in(&self, token: &str) -> Result<(), AppError> {
        self.store.set(TOKEN_KEY, token)?;
        info!("Admin token stored");
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), AppError> {
        self.store.remove(TOKEN_KEY)?;
        debug!("Admin token removed");
        Ok(())
    }
}
