//! Marker-invalidated registry cache.
//!
//! `RegistryCache` owns a [`KeywordSource`] and at most one published
//! [`KeywordRegistry`]. Publishing is guarded by a single mutex that covers
//! "read marker → rebuild if stale → swap in the new instance". Callers get an
//! `Arc` to the published registry and read it without further locking.
//!
//! A failed rebuild leaves the previously published registry in place and
//! returns the error; a broken source never replaces a good registry with a
//! partial one.

use super::index::KeywordRegistry;
use crate::error::Result;
use crate::loader::load_registry;
use crate::source::{KeywordSource, SourceMarker};
use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

#[derive(Debug)]
struct Published {
    marker: SourceMarker,
    registry: Arc<KeywordRegistry>,
    loaded_at: DateTime<Local>,
}

pub struct RegistryCache {
    source: Box<dyn KeywordSource>,
    state: Mutex<Option<Published>>,
}

impl RegistryCache {
    pub fn new(source: impl KeywordSource + 'static) -> Self {
        Self { source: Box::new(source), state: Mutex::new(None) }
    }

    pub fn source(&self) -> &dyn KeywordSource {
        self.source.as_ref()
    }

    /// Return the published registry, rebuilding first if the source marker
    /// moved since the last build (or nothing was built yet).
    pub fn get_or_rebuild(&self) -> Result<Arc<KeywordRegistry>> {
        self.refresh(false)
    }

    /// Rebuild unconditionally and publish the result.
    pub fn force_reload(&self) -> Result<Arc<KeywordRegistry>> {
        self.refresh(true)
    }

    /// The published registry, without touching the source.
    pub fn current(&self) -> Option<Arc<KeywordRegistry>> {
        self.lock().as_ref().map(|p| Arc::clone(&p.registry))
    }

    /// When the published registry was built.
    pub fn loaded_at(&self) -> Option<DateTime<Local>> {
        self.lock().as_ref().map(|p| p.loaded_at)
    }

    fn refresh(&self, force: bool) -> Result<Arc<KeywordRegistry>> {
        let mut state = self.lock();
        let marker = self.source.marker()?;

        if let Some(published) = state.as_ref() {
            if !force && published.marker == marker {
                debug!(source = %self.source.describe(), "keyword registry cache hit");
                return Ok(Arc::clone(&published.registry));
            }
        }

        let registry = Arc::new(load_registry(self.source.as_ref())?);
        info!(
            source = %self.source.describe(),
            entries = registry.len(),
            forced = force,
            replaced = state.is_some(),
            "keyword registry published"
        );
        *state = Some(Published { marker, registry: Arc::clone(&registry), loaded_at: Local::now() });
        Ok(registry)
    }

    // The guarded value is only ever replaced wholesale, so a poisoned lock
    // still holds a consistent state.
    fn lock(&self) -> MutexGuard<'_, Option<Published>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RegistryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryCache")
            .field("source", &self.source.describe())
            .field("loaded", &self.lock().is_some())
            .finish()
    }
}
