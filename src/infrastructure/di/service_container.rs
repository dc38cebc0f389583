//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::PortfolioService;
use crate::config::Settings;
use crate::infrastructure::traits::{
    BoundarySource, FileBoundarySource, FileSystem, HttpBoundarySource, OfflineBoundarySource,
    RealFileSystem,
};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Where map boundaries come from
    pub boundary: Arc<dyn BoundarySource>,
}

impl ServiceContainer {
    /// Create a service container with real implementations.
    ///
    /// `offline` replaces the network with a source that always fails, so maps
    /// draw without land. A `file://` boundary URL is read from disk.
    pub fn new(settings: Settings, offline: bool) -> Self {
        let boundary: Arc<dyn BoundarySource> = if offline {
            Arc::new(OfflineBoundarySource)
        } else if settings.map.boundary_url.starts_with("file://") {
            Arc::new(FileBoundarySource::new(RealFileSystem))
        } else {
            Arc::new(HttpBoundarySource::new(Duration::from_secs(
                settings.map.fetch_timeout_secs,
            )))
        };
        Self::with_deps(settings, Arc::new(RealFileSystem), boundary)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        boundary: Arc<dyn BoundarySource>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            boundary,
        }
    }

    pub fn portfolio(&self) -> PortfolioService {
        PortfolioService::new(
            Arc::clone(&self.settings),
            Arc::clone(&self.fs),
            Arc::clone(&self.boundary),
        )
    }
}
