//! The environment a compilation runs in.
//!
//! The compiler never touches the filesystem directly. Mapping a reference to
//! a canonical location, reading text, and recording build dependencies are
//! delegated to an [`IncludeHost`], which lets the same core run against real
//! files ([`FsHost`]), an in-memory map ([`MemoryHost`]), or a build tool that
//! owns its own resolution rules.

pub mod fs;
pub mod memory;

pub use fs::FsHost;
pub use memory::MemoryHost;

use std::future::Future;
use std::path::{Component, Path, PathBuf};

/// Collaborator that resolves references and supplies file contents.
///
/// Implementations must be shareable across the concurrent branches of one
/// compilation, so every method takes `&self` and returns a `Send` future.
pub trait IncludeHost: Send + Sync {
    /// Map `reference`, as written in a file whose directory is `context`, to
    /// a canonical location. `None` means the reference does not name a file.
    fn resolve(
        &self,
        context: &Path,
        reference: &str,
    ) -> impl Future<Output = Option<PathBuf>> + Send;

    /// Read the full text at a location previously returned by [`resolve`].
    ///
    /// [`resolve`]: IncludeHost::resolve
    fn read(&self, location: &Path) -> impl Future<Output = std::io::Result<String>> + Send;

    /// Record that the compilation output depends on `location`.
    ///
    /// Called exactly once per distinct location that is read.
    fn register_dependency(&self, location: &Path);

    /// Names close to an unresolved `reference`, best match first.
    fn suggest(
        &self,
        _context: &Path,
        _reference: &str,
    ) -> impl Future<Output = Vec<String>> + Send {
        async { Vec::new() }
    }
}

/// The resolution context for a canonical location: its parent directory.
pub fn context_of(location: &Path) -> PathBuf {
    location.parent().map_or_else(|| PathBuf::from("/"), Path::to_path_buf)
}

/// Lexically normalize a path, collapsing `.` and `..` without touching the filesystem.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

/// Whether a reference is explicitly relative to the including file.
pub(crate) fn is_explicitly_relative(reference: &str) -> bool {
    reference.starts_with("./") || reference.starts_with("../")
}
