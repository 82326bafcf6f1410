//! Structured file system error handling for tplinc
//!
//! File operations capture their context (what was being done, to which path,
//! and on behalf of which template) at the operation site, so errors can be
//! reported without parsing I/O error messages afterwards.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Types of file operations performed while compiling templates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    /// Reading a template completely
    Read,
    /// Writing compiled output or a dep-file
    Write,
    /// Canonicalizing a resolved path
    Canonicalize,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "reading"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::Canonicalize => write!(f, "resolving path"),
        }
    }
}

/// Detailed file operation context for better error messages
#[derive(Debug, Clone)]
pub struct FileOperationContext {
    /// The type of operation being performed
    pub operation: FileOperation,
    /// The file path being accessed
    pub file_path: PathBuf,
    /// Why the file is being accessed
    pub purpose: String,
    /// Optional related paths (e.g. the including template)
    pub related_paths: Vec<PathBuf>,
}

impl FileOperationContext {
    /// Create a new file operation context
    pub fn new(
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            file_path: file_path.into(),
            purpose: purpose.into(),
            related_paths: Vec::new(),
        }
    }

    /// Add a related path for context
    pub fn with_related_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.related_paths.push(path.into());
        self
    }
}

/// File operation error with full context
#[derive(Error, Debug)]
#[error("Failed {operation} '{}' for {purpose}", file_path.display())]
pub struct FileOperationError {
    /// The type of operation that failed
    pub operation: FileOperation,
    /// The file path that was being accessed
    pub file_path: PathBuf,
    /// Why the file was being accessed
    pub purpose: String,
    /// The underlying IO error
    #[source]
    pub source: std::io::Error,
    /// Related paths for additional context
    pub related_paths: Vec<PathBuf>,
}

impl FileOperationError {
    /// Create a new file operation error from context and IO error
    pub fn new(context: FileOperationContext, source: std::io::Error) -> Self {
        Self {
            operation: context.operation,
            file_path: context.file_path,
            purpose: context.purpose,
            source,
            related_paths: context.related_paths,
        }
    }

    /// Attach the template that caused this operation.
    #[must_use]
    pub fn with_related_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.related_paths.push(path.into());
        self
    }

    /// Get a user-friendly error message with context
    pub fn user_message(&self) -> String {
        let mut message = format!(
            "Failed {} file '{}' for {}",
            self.operation,
            self.file_path.display(),
            self.purpose
        );

        match self.source.kind() {
            std::io::ErrorKind::NotFound => {
                message.push_str("\n\nThe file does not exist at the specified path.");
            }
            std::io::ErrorKind::PermissionDenied => {
                message.push_str(&format!(
                    "\n\nPermission denied. Check file/directory permissions for: {}",
                    self.file_path.display()
                ));
            }
            std::io::ErrorKind::InvalidData => {
                message.push_str("\n\nThe file contains invalid data or encoding.");
                message.push_str("\nTemplates must be valid UTF-8 text.");
            }
            _ => {
                message.push_str(&format!("\n\nError details: {}", self.source));
            }
        }

        if !self.related_paths.is_empty() {
            message.push_str("\n\nRelated paths:");
            for path in &self.related_paths {
                message.push_str(&format!("\n  - {}", path.display()));
            }
        }

        message
    }
}

/// Extension trait for Result types to add file operation context
pub trait FileResultExt<T> {
    /// Add file operation context to a Result
    fn with_file_context(
        self,
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
    ) -> Result<T, FileOperationError>;
}

impl<T> FileResultExt<T> for Result<T, std::io::Error> {
    fn with_file_context(
        self,
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
    ) -> Result<T, FileOperationError> {
        self.map_err(|io_error| {
            let context = FileOperationContext::new(operation, file_path, purpose);
            FileOperationError::new(context, io_error)
        })
    }
}

/// Convenience functions for common file operations with context
pub struct FileOps;

impl FileOps {
    /// Read a file with full context
    pub async fn read_with_context(path: &Path, purpose: &str) -> Result<String, FileOperationError> {
        tokio::fs::read_to_string(path).await.with_file_context(FileOperation::Read, path, purpose)
    }

    /// Write a file with full context, creating parent directories as needed
    pub async fn write_with_context(
        path: &Path,
        contents: &str,
        purpose: &str,
    ) -> Result<(), FileOperationError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.with_file_context(
                FileOperation::Write,
                parent,
                purpose,
            )?;
        }
        tokio::fs::write(path, contents).await.with_file_context(FileOperation::Write, path, purpose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_file_operation_context_creation() {
        let context = FileOperationContext::new(
            FileOperation::Read,
            "/templates/header.tpl",
            "template inclusion",
        );

        assert_eq!(context.operation, FileOperation::Read);
        assert_eq!(context.file_path, PathBuf::from("/templates/header.tpl"));
        assert_eq!(context.purpose, "template inclusion");
        assert!(context.related_paths.is_empty());
    }

    #[test]
    fn test_file_operation_error_user_message() {
        let io_error = Error::new(ErrorKind::NotFound, "file not found");
        let context =
            FileOperationContext::new(FileOperation::Read, "partials/nav.tpl", "template inclusion")
                .with_related_path("/project/index.tpl");

        let message = FileOperationError::new(context, io_error).user_message();

        assert!(message.contains("Failed reading file"));
        assert!(message.contains("partials/nav.tpl"));
        assert!(message.contains("does not exist"));
        assert!(message.contains("Related paths"));
        assert!(message.contains("/project/index.tpl"));
    }

    #[test]
    fn test_file_operation_display() {
        assert_eq!(FileOperation::Read.to_string(), "reading");
        assert_eq!(FileOperation::Write.to_string(), "writing");
        assert_eq!(FileOperation::Canonicalize.to_string(), "resolving path");
    }

    #[test]
    fn test_file_result_ext() {
        let result: Result<String, std::io::Error> =
            Err(Error::new(ErrorKind::PermissionDenied, "access denied"));

        let error = result
            .with_file_context(FileOperation::Write, "/tmp/out.js", "writing compiled module")
            .unwrap_err();

        assert_eq!(error.operation, FileOperation::Write);
        assert_eq!(error.purpose, "writing compiled module");
        assert!(error.user_message().contains("Permission denied"));
    }

    #[tokio::test]
    async fn test_file_ops_roundtrip() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("nested").join("out.js");

        FileOps::write_with_context(&path, "module.exports = 1", "test").await.unwrap();
        let read = FileOps::read_with_context(&path, "test").await.unwrap();
        assert_eq!(read, "module.exports = 1");

        let missing = FileOps::read_with_context(&temp.path().join("nope.tpl"), "test").await;
        assert!(matches!(missing, Err(e) if e.source.kind() == ErrorKind::NotFound));
    }
}
