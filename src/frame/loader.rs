//! Site loaders: resolving a location to HTML.

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// SiteLoader
// ============================================================================

/// Resolves a navigation target to the HTML the guest frame should render.
///
/// A loader failure is reported through the frame's navigation signal and
/// surfaces as a navigation error from the creation call.
#[async_trait]
pub trait SiteLoader: Send + Sync {
    /// Loads the HTML for `location`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NavigationFailed`] (or any other error) when the
    /// location cannot be resolved.
    async fn load(&self, location: &str) -> Result<String>;
}

// ============================================================================
// StaticSiteLoader
// ============================================================================

/// In-memory loader mapping locations to fixture HTML.
///
/// The usual choice for test suites: register each fixture page up front and
/// navigate to it by name.
#[derive(Debug, Clone, Default)]
pub struct StaticSiteLoader {
    sites: FxHashMap<String, String>,
}

impl StaticSiteLoader {
    /// Creates an empty loader.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fixture page under `location`.
    #[must_use]
    pub fn with_site(mut self, location: impl Into<String>, html: impl Into<String>) -> Self {
        self.sites.insert(location.into(), html.into());
        self
    }
}

#[async_trait]
impl SiteLoader for StaticSiteLoader {
    async fn load(&self, location: &str) -> Result<String> {
        self.sites
            .get(location)
            .cloned()
            .ok_or_else(|| Error::navigation_failed(location, "no site registered for location"))
    }
}

// ============================================================================
// FileSiteLoader
// ============================================================================

/// Loader reading fixture pages from a directory.
#[derive(Debug, Clone)]
pub struct FileSiteLoader {
    root: PathBuf,
}

impl FileSiteLoader {
    /// Creates a loader rooted at `root`.
    #[inline]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SiteLoader for FileSiteLoader {
    async fn load(&self, location: &str) -> Result<String> {
        let path = self.root.join(location);
        debug!(path = %path.display(), "Loading site from file");

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::navigation_failed(location, e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
