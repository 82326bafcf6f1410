//! Per-compilation file cache.
//!
//! Every branch of one compilation shares a single [`FileCache`]. A location
//! is read at most once: the first request installs an initialization cell
//! and performs the read; concurrent requests for the same location wait on
//! that cell instead of issuing their own read.
//!
//! The cache lives for one top-level compilation and is dropped with it, so
//! file changes are always picked up by the next compilation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::host::{IncludeHost, context_of};

/// A file's text together with its resolution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Canonical location
    pub location: PathBuf,
    /// Directory used to resolve references inside this file
    pub context: PathBuf,
    /// Full text
    pub text: String,
}

impl SourceFile {
    pub fn new(location: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let location = location.into();
        Self {
            context: context_of(&location),
            location,
            text: text.into(),
        }
    }
}

/// Read-through cache keyed by canonical location.
#[derive(Debug, Default)]
pub struct FileCache {
    entries: DashMap<PathBuf, Arc<OnceCell<Arc<SourceFile>>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl FileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached file at `location`, reading it through `host` on first use.
    ///
    /// The dependency is registered with the host immediately before the
    /// single read of each location.
    pub async fn get_or_read<H: IncludeHost>(
        &self,
        host: &H,
        location: &Path,
    ) -> std::io::Result<Arc<SourceFile>> {
        // Clone the cell out so the map guard is released before awaiting.
        let cell = self.entries.entry(location.to_path_buf()).or_default().clone();

        if let Some(file) = cell.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("File {} was already read, using cached data", location.display());
            return Ok(Arc::clone(file));
        }

        let file = cell
            .get_or_try_init(move || async move {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("Reading {}", location.display());
                host.register_dependency(location);
                let text = host.read(location).await?;
                Ok::<_, std::io::Error>(Arc::new(SourceFile::new(location, text)))
            })
            .await?;

        Ok(Arc::clone(file))
    }

    /// Number of distinct locations in the cache.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.value().initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(hits, misses)` so far. Requests that waited on an in-flight read count as neither.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use std::time::Duration;

    #[tokio::test]
    async fn test_second_request_is_a_hit() {
        let host = MemoryHost::new().with_file("/p/a.tpl", "A");
        let cache = FileCache::new();

        let first = cache.get_or_read(&host, Path::new("/p/a.tpl")).await.unwrap();
        let second = cache.get_or_read(&host, Path::new("/p/a.tpl")).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.text, "A");
        assert_eq!(first.context, PathBuf::from("/p"));
        assert_eq!(host.read_count("/p/a.tpl"), 1);
        assert_eq!(host.dependencies(), vec![PathBuf::from("/p/a.tpl")]);
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_coalesce() {
        let host = MemoryHost::new().with_file("/p/a.tpl", "A").with_read_delay(Duration::from_millis(20));
        let cache = FileCache::new();
        let location = Path::new("/p/a.tpl");

        let results = futures::future::join_all(
            (0..8).map(|_| cache.get_or_read(&host, location)),
        )
        .await;

        assert!(results.iter().all(|r| r.as_ref().is_ok_and(|f| f.text == "A")));
        assert_eq!(host.read_count(location), 1);
        assert_eq!(host.dependencies().len(), 1);
    }

    #[tokio::test]
    async fn test_read_error_is_not_cached_as_success() {
        let host = MemoryHost::new().with_unreadable("/p/locked.tpl");
        let cache = FileCache::new();

        assert!(cache.get_or_read(&host, Path::new("/p/locked.tpl")).await.is_err());
        assert!(cache.is_empty());
    }
}
