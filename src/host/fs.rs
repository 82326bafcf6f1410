//! Filesystem-backed [`IncludeHost`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::{IncludeHost, is_explicitly_relative};
use crate::constants::{MAX_SUGGESTIONS, SUGGESTION_MAX_DISTANCE};

/// Resolves references against real directories and reads with `tokio::fs`.
///
/// Resolution order for a reference written in a file under `context`:
///
/// 1. absolute references are used as-is;
/// 2. otherwise `context/<reference>`;
/// 3. plain names (not starting with `./` or `../`) then fall back to each
///    configured search path in order.
///
/// For each candidate the exact path is tried first, then each configured
/// extension appended. The first regular file wins and is canonicalized.
#[derive(Debug, Default)]
pub struct FsHost {
    search_paths: Vec<PathBuf>,
    extensions: Vec<String>,
    dependencies: Mutex<Vec<PathBuf>>,
}

impl FsHost {
    /// A host with no search paths and no extension fallback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add fallback roots for plain references.
    #[must_use]
    pub fn with_search_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_paths.extend(paths);
        self
    }

    /// Add extensions tried when the exact reference does not exist.
    ///
    /// A missing leading dot is added, so `tpl` and `.tpl` are equivalent.
    #[must_use]
    pub fn with_extensions<S: AsRef<str>>(mut self, extensions: impl IntoIterator<Item = S>) -> Self {
        self.extensions.extend(extensions.into_iter().map(|ext| {
            let ext = ext.as_ref();
            if ext.starts_with('.') { ext.to_string() } else { format!(".{ext}") }
        }));
        self
    }

    /// Every location registered so far, in registration order.
    pub fn dependencies(&self) -> Vec<PathBuf> {
        self.dependencies.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn candidate_bases(&self, context: &Path, reference: &str) -> Vec<PathBuf> {
        let path = Path::new(reference);
        if path.is_absolute() {
            return vec![path.to_path_buf()];
        }

        let mut bases = vec![context.join(path)];
        if !is_explicitly_relative(reference) {
            bases.extend(self.search_paths.iter().map(|root| root.join(path)));
        }
        bases
    }

    fn with_extension_variants(&self, base: PathBuf) -> Vec<PathBuf> {
        let appended: Vec<PathBuf> = self
            .extensions
            .iter()
            .map(|ext| {
                let mut name = OsString::from(base.as_os_str());
                name.push(ext);
                PathBuf::from(name)
            })
            .collect();
        std::iter::once(base).chain(appended).collect()
    }
}

async fn is_regular_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

impl IncludeHost for FsHost {
    async fn resolve(&self, context: &Path, reference: &str) -> Option<PathBuf> {
        for base in self.candidate_bases(context, reference) {
            for candidate in self.with_extension_variants(base) {
                if !is_regular_file(&candidate).await {
                    continue;
                }
                match tokio::fs::canonicalize(&candidate).await {
                    Ok(location) => {
                        tracing::trace!("Resolved '{}' to {}", reference, location.display());
                        return Some(location);
                    }
                    Err(e) => {
                        tracing::debug!("Failed to canonicalize {}: {}", candidate.display(), e);
                    }
                }
            }
        }
        None
    }

    async fn read(&self, location: &Path) -> std::io::Result<String> {
        tokio::fs::read_to_string(location).await
    }

    fn register_dependency(&self, location: &Path) {
        let mut dependencies = self.dependencies.lock().unwrap_or_else(PoisonError::into_inner);
        if !dependencies.iter().any(|d| d == location) {
            dependencies.push(location.to_path_buf());
        }
    }

    async fn suggest(&self, context: &Path, reference: &str) -> Vec<String> {
        let reference_path = Path::new(reference);
        let Some(wanted) = reference_path.file_name().and_then(|n| n.to_str()) else {
            return Vec::new();
        };
        let parent = reference_path.parent().unwrap_or_else(|| Path::new(""));
        let directory = if parent.is_absolute() { parent.to_path_buf() } else { context.join(parent) };

        let Ok(mut entries) = tokio::fs::read_dir(&directory).await else {
            return Vec::new();
        };

        let mut scored = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !entry.file_type().await.is_ok_and(|t| t.is_file()) {
                continue;
            }
            let distance = strsim::levenshtein(wanted, &name);
            if distance <= SUGGESTION_MAX_DISTANCE {
                scored.push((distance, name));
            }
        }

        scored.sort();
        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, name)| parent.join(name).display().to_string())
            .collect()
    }
}
