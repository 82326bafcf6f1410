//! Core error types for tplinc
//!
//! # Modules
//!
//! ## `error`
//! - [`CompileError`] and [`CompileErrorKind`] - the typed failure of one compilation
//! - [`TplincError`] - failures surfaced by the command-line layer
//! - [`ErrorContext`] - user-facing wrapper with details and suggestions
//! - [`user_friendly_error`] - convert any [`anyhow::Error`] for colored display
//!
//! ## `file_error`
//! - [`FileOperationError`] - I/O failures annotated with the operation, path, and purpose
//! - [`FileResultExt`] - attach that context to a `std::io::Result`

pub mod error;
pub mod file_error;

pub use error::{CompileError, CompileErrorKind, ErrorContext, TplincError, user_friendly_error};
pub use file_error::{
    FileOperation, FileOperationContext, FileOperationError, FileOps, FileResultExt,
};
