//! In-memory guard against concurrent runs for the same site name.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

/// Set of site names with a run in flight. Cloning shares the set.
#[derive(Clone, Debug, Default)]
pub struct SiteLocks {
    inner: Arc<Mutex<HashSet<String>>>,
}

/// Releases the site name when dropped.
#[derive(Debug)]
pub struct SitePermit {
    site_name: String,
    inner: Arc<Mutex<HashSet<String>>>,
}

impl SiteLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `site_name`, or return `None` if another run already holds it.
    #[must_use]
    pub fn try_acquire(&self, site_name: &str) -> Option<SitePermit> {
        let mut held = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if !held.insert(site_name.to_string()) {
            return None;
        }
        Some(SitePermit {
            site_name: site_name.to_string(),
            inner: Arc::clone(&self.inner),
        })
    }

    #[must_use]
    pub fn is_held(&self, site_name: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(site_name)
    }
}

impl Drop for SitePermit {
    fn drop(&mut self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.site_name);
    }
}
