//! In-memory [`IncludeHost`] for tests and embedders.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;

use super::{IncludeHost, normalize};

/// A host whose files live in a map keyed by absolute path.
///
/// References resolve lexically against the context directory (`.` and `..`
/// are collapsed). Every read is counted so tests can assert that concurrent
/// requests for one location were coalesced.
#[derive(Debug, Default)]
pub struct MemoryHost {
    files: HashMap<PathBuf, String>,
    unreadable: Vec<PathBuf>,
    read_delay: Option<Duration>,
    reads: DashMap<PathBuf, usize>,
    dependencies: Mutex<Vec<PathBuf>>,
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.files.insert(normalize(path.as_ref()), content.into());
        self
    }

    /// Add a location that resolves but fails to read.
    #[must_use]
    pub fn with_unreadable(mut self, path: impl AsRef<Path>) -> Self {
        self.unreadable.push(normalize(path.as_ref()));
        self
    }

    /// Suspend every read for `delay`, so concurrent reads overlap.
    #[must_use]
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// How many times `location` was read.
    pub fn read_count(&self, location: impl AsRef<Path>) -> usize {
        self.reads.get(location.as_ref()).map_or(0, |count| *count)
    }

    /// Total reads across all locations.
    pub fn total_reads(&self) -> usize {
        self.reads.iter().map(|entry| *entry.value()).sum()
    }

    /// Every registered dependency, in registration order (duplicates kept).
    pub fn dependencies(&self) -> Vec<PathBuf> {
        self.dependencies.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl IncludeHost for MemoryHost {
    async fn resolve(&self, context: &Path, reference: &str) -> Option<PathBuf> {
        let location = normalize(&context.join(reference));
        (self.files.contains_key(&location) || self.unreadable.contains(&location))
            .then_some(location)
    }

    async fn read(&self, location: &Path) -> io::Result<String> {
        *self.reads.entry(location.to_path_buf()).or_insert(0) += 1;

        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }

        if self.unreadable.iter().any(|p| p == location) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "unreadable"));
        }

        self.files
            .get(location)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn register_dependency(&self, location: &Path) {
        self.dependencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location.to_path_buf());
    }

    async fn suggest(&self, context: &Path, reference: &str) -> Vec<String> {
        let wanted = normalize(&context.join(reference));
        let mut scored: Vec<_> = self
            .files
            .keys()
            .filter(|path| path.parent() == wanted.parent())
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?;
                let distance = strsim::levenshtein(reference, name);
                (distance <= crate::constants::SUGGESTION_MAX_DISTANCE)
                    .then(|| (distance, name.to_string()))
            })
            .collect();
        scored.sort();
        scored.into_iter().map(|(_, name)| name).take(crate::constants::MAX_SUGGESTIONS).collect()
    }
}
