//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with in-memory implementations.

use std::io;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::infrastructure::{InfraError, InfraResult};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Source of the country boundary GeoJSON.
pub trait BoundarySource: Send + Sync {
    /// Fetch the raw document. One attempt, no retry, no cache.
    fn fetch(&self, url: &str) -> InfraResult<String>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// Blocking HTTP fetch with a request timeout.
#[derive(Debug)]
pub struct HttpBoundarySource {
    timeout: Duration,
}

impl HttpBoundarySource {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl BoundarySource for HttpBoundarySource {
    #[instrument(level = "debug", skip(self))]
    fn fetch(&self, url: &str) -> InfraResult<String> {
        let fetch_err = |message: String| InfraError::Fetch {
            url: url.to_string(),
            message,
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| fetch_err(e.to_string()))?;
        let response = client
            .get(url)
            .send()
            .map_err(|e| fetch_err(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {status}")));
        }
        let body = response.text().map_err(|e| fetch_err(e.to_string()))?;
        debug!(bytes = body.len(), "boundary data fetched");
        Ok(body)
    }
}

/// Reads boundary data from a local GeoJSON file instead of the network.
#[derive(Debug)]
pub struct FileBoundarySource<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> FileBoundarySource<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }
}

impl<F: FileSystem> BoundarySource for FileBoundarySource<F> {
    fn fetch(&self, url: &str) -> InfraResult<String> {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        self.fs.read_to_string(path).map_err(|e| InfraError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Never reaches the network; every fetch fails.
#[derive(Debug, Default)]
pub struct OfflineBoundarySource;

impl BoundarySource for OfflineBoundarySource {
    fn fetch(&self, url: &str) -> InfraResult<String> {
        Err(InfraError::Fetch {
            url: url.to_string(),
            message: "offline mode".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_offline_source_always_fails() {
        let result = OfflineBoundarySource.fetch("https://example.invalid/world.geojson");
        assert!(matches!(result, Err(InfraError::Fetch { .. })));
    }

    #[test]
    fn test_file_source_reads_local_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("world.geojson");
        std::fs::write(&path, "{}").unwrap();

        let source = FileBoundarySource::new(RealFileSystem);
        let url = format!("file://{}", path.display());
        assert_eq!(source.fetch(&url).unwrap(), "{}");
        assert!(source.fetch("/no/such/file.geojson").is_err());
    }

    #[test]
    fn test_ensure_parent_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a/b/out.svg");
        RealFileSystem.ensure_parent(&target).unwrap();
        assert!(dir.path().join("a/b").is_dir());
    }
}
