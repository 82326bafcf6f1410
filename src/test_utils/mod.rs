//! Test utilities for tplinc.
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration suite.
//!
//! # Example
//!
//! ```rust,no_run
//! use tplinc_cli::test_utils::TemplateProject;
//!
//! let project = TemplateProject::new()
//!     .file("index.tpl", "#include header.tpl\n")
//!     .file("header.tpl", "<h1/>\n");
//! assert!(project.path("index.tpl").exists());
//! ```

use std::path::{Path, PathBuf};
use std::sync::Once;

use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging
/// stays off.
///
/// ```bash
/// RUST_LOG=tplinc_cli=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// A throwaway directory of template files.
///
/// The directory is removed when the project is dropped.
pub struct TemplateProject {
    dir: TempDir,
}

impl TemplateProject {
    /// Create an empty project.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap_or_else(|e| panic!("Failed to create temp dir: {e}"));
        Self {
            dir,
        }
    }

    /// Write `content` to `relative`, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn file(self, relative: impl AsRef<Path>, content: &str) -> Self {
        self.write(relative, content);
        self
    }

    /// Write a file in place; for changing a project mid-test.
    pub fn write(&self, relative: impl AsRef<Path>, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("Failed to create {}: {e}", parent.display()));
        }
        std::fs::write(&path, content)
            .unwrap_or_else(|e| panic!("Failed to write {}: {e}", path.display()));
    }

    /// The project directory.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// `relative` joined onto the project directory, as given.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// `relative` joined onto the canonical project directory, matching the
    /// locations the resolver reports.
    pub fn canonical(&self, relative: impl AsRef<Path>) -> PathBuf {
        let root = self
            .dir
            .path()
            .canonicalize()
            .unwrap_or_else(|e| panic!("Failed to canonicalize project dir: {e}"));
        root.join(relative)
    }

    /// Contents of a file in the project.
    pub fn read(&self, relative: impl AsRef<Path>) -> String {
        let path = self.path(relative);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()))
    }
}

impl Default for TemplateProject {
    fn default() -> Self {
        Self::new()
    }
}
