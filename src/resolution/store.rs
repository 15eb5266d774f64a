//! In-memory parameter version store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::ParameterVersion;
use crate::error::{EngineError, EngineResult};

use super::ParameterProvider;

/// Holds every loaded parameter version and tracks which one is active.
///
/// Versions are immutable once loaded; only the active pointer can move.
/// A computation that pins a version id therefore always sees the same
/// parameters, whatever happens to the active version afterwards.
#[derive(Debug)]
pub struct ParameterStore {
    versions: BTreeMap<String, Arc<ParameterVersion>>,
    active: RwLock<Option<String>>,
}

impl ParameterStore {
    /// Builds a store from validated versions.
    ///
    /// Fails when a version is invalid, when two versions share an id, or
    /// when `active_id` names a version that is not in `versions`.
    pub fn new(versions: Vec<ParameterVersion>, active_id: Option<String>) -> EngineResult<Self> {
        let mut by_id = BTreeMap::new();
        for version in versions {
            version.validate()?;
            if by_id.contains_key(&version.id) {
                return Err(EngineError::InvalidParameters {
                    version_id: version.id.clone(),
                    message: "duplicate version id".to_string(),
                });
            }
            by_id.insert(version.id.clone(), Arc::new(version));
        }

        if let Some(id) = &active_id {
            if !by_id.contains_key(id) {
                return Err(EngineError::ParameterVersionNotFound { id: id.clone() });
            }
        }

        Ok(Self {
            versions: by_id,
            active: RwLock::new(active_id),
        })
    }

    /// Makes `id` the active version.
    pub async fn activate(&self, id: &str) -> EngineResult<()> {
        if !self.versions.contains_key(id) {
            return Err(EngineError::ParameterVersionNotFound { id: id.to_string() });
        }
        let mut active = self.active.write().await;
        info!(previous = ?*active, version_id = id, "Activating parameter version");
        *active = Some(id.to_string());
        Ok(())
    }

    /// Returns the id of the active version, if any.
    pub async fn active_id(&self) -> Option<String> {
        self.active.read().await.clone()
    }

    /// Returns every version id, sorted.
    pub fn version_ids(&self) -> Vec<&str> {
        self.versions.keys().map(String::as_str).collect()
    }

    /// Returns a version by id without going through the async trait.
    pub fn get(&self, id: &str) -> Option<Arc<ParameterVersion>> {
        self.versions.get(id).cloned()
    }
}

#[async_trait]
impl ParameterProvider for ParameterStore {
    async fn load_active_parameters(&self) -> EngineResult<Arc<ParameterVersion>> {
        let active = self.active.read().await;
        let id = active.as_deref().ok_or(EngineError::NoActiveParameterVersion)?;
        debug!(version_id = id, "Resolved active parameter version");
        self.get(id)
            .ok_or_else(|| EngineError::ParameterVersionNotFound { id: id.to_string() })
    }

    async fn load_parameters_by_id(&self, id: &str) -> EngineResult<Arc<ParameterVersion>> {
        debug!(version_id = id, "Resolving pinned parameter version");
        self.get(id)
            .ok_or_else(|| EngineError::ParameterVersionNotFound { id: id.to_string() })
    }
}
