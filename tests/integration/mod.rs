//! Integration test suite for tplinc
//!
//! End-to-end tests of the library pipeline against real files and of the
//! `tplinc` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **compile**: Splicing, diamonds and request coalescing on disk
//! - **cycles**: Circular dependency detection
//! - **conditions**: Guards, truth tables and condition errors
//! - **cli**: The `compile`, `render` and `tree` commands

mod cli;
mod compile;
mod conditions;
mod cycles;

use std::path::Path;

use tplinc_cli::compiler::{Compiler, load_root};
use tplinc_cli::core::CompileError;
use tplinc_cli::flatten::Expansion;
use tplinc_cli::host::FsHost;

/// Compile `file` with a default filesystem host.
pub async fn compile_file(file: &Path) -> Result<String, CompileError> {
    tplinc_cli::test_utils::init_test_logging(None);
    let root = load_root(file).await.unwrap();
    Compiler::new(FsHost::new()).compile(&root.text, &root.context, &root.location).await
}

/// Expand `file` with a default filesystem host.
pub async fn expand_file(file: &Path) -> Result<Expansion, CompileError> {
    tplinc_cli::test_utils::init_test_logging(None);
    let root = load_root(file).await.unwrap();
    Compiler::new(FsHost::new()).expand(&root.text, &root.context, &root.location).await
}
