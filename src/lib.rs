//! tplinc - a text-inclusion preprocessor for templates
//!
//! Template sources may contain directive lines of the form
//!
//! ```text
//! #include <reference>
//! #include <reference> if <condition>
//! ```
//!
//! tplinc resolves every directive recursively, splices the referenced files
//! in place of their directive lines, and emits a single function of an
//! options record. Conditional directives become guards evaluated when that
//! function runs, so one compiled artifact serves every combination of
//! options:
//!
//! ```text
//! module.exports = (options) => `<nav>${options.user?`<a>profile</a>`:""}</nav>`
//! ```
//!
//! # Pipeline
//!
//! 1. [`directive`] scans a buffer for directive lines and records their spans
//! 2. [`condition`] parses each guard into an expression tree
//! 3. [`tree`] resolves references through an [`host::IncludeHost`], reading
//!    each file once per compilation and rejecting cycles
//! 4. [`flatten`] substitutes every directive span with its expansion
//! 5. [`output`] wraps the body in the requested module format
//!
//! [`compiler::Compiler`] drives the whole pipeline.
//!
//! # Core Modules
//!
//! - [`cli`] - Command-line interface (`compile`, `render`, `tree`)
//! - [`compiler`] - Compilation entry point
//! - [`condition`] - Condition parser, serializer and evaluator
//! - [`config`] - Project configuration (`tplinc.toml`)
//! - [`core`] - Error types and file operation context
//! - [`directive`] - Directive scanning
//! - [`flatten`] - Span substitution and guard emission
//! - [`host`] - Reference resolution and file access
//! - [`output`] - Output formats
//! - [`tree`] - Include tree construction and the per-compilation file cache
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tplinc_cli::compiler::{Compiler, load_root};
//! use tplinc_cli::host::FsHost;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let root = load_root(Path::new("site/index.tpl")).await?;
//! let module = Compiler::new(FsHost::new())
//!     .compile(&root.text, &root.context, &root.location)
//!     .await?;
//! println!("{module}");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod compiler;
pub mod condition;
pub mod config;
pub mod constants;
pub mod core;
pub mod directive;
pub mod flatten;
pub mod host;
pub mod output;
pub mod tree;

// test_utils is available for tests and when the test-utils feature is enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
