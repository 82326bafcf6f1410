//! Compilation entry point.
//!
//! [`Compiler::compile`] runs the whole pipeline for one root buffer:
//! build the include tree, flatten it, and wrap the result in the configured
//! output format. Every call gets a fresh file cache, so compilations are
//! independent of each other.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tplinc_cli::compiler::Compiler;
//! use tplinc_cli::host::FsHost;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let compiler = Compiler::new(FsHost::new());
//! let module = compiler
//!     .compile("#include header.tpl if showHeader\n", Path::new("/site"), Path::new("/site/index.tpl"))
//!     .await?;
//! assert!(module.starts_with("module.exports = (options) => `"));
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use crate::constants::DEFAULT_OPTIONS_IDENT;
use crate::core::{CompileError, FileOperation, FileOperationError, FileOps, FileResultExt};
use crate::flatten::{Expansion, flatten};
use crate::host::IncludeHost;
use crate::output::OutputFormat;
use crate::tree::{IncludeTree, SourceFile, TreeBuilder};

/// Compiles templates against one [`IncludeHost`].
#[derive(Debug)]
pub struct Compiler<H> {
    host: H,
    format: OutputFormat,
    options_ident: String,
}

impl<H: IncludeHost> Compiler<H> {
    /// A compiler emitting CommonJS with an `options` parameter.
    pub fn new(host: H) -> Self {
        Self {
            host,
            format: OutputFormat::default(),
            options_ident: DEFAULT_OPTIONS_IDENT.to_string(),
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Name of the options parameter and of the record conditions read from.
    #[must_use]
    pub fn with_options_ident(mut self, ident: impl Into<String>) -> Self {
        self.options_ident = ident.into();
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn options_ident(&self) -> &str {
        &self.options_ident
    }

    /// Resolve every directive reachable from the root buffer.
    pub async fn build_tree(
        &self,
        root_text: &str,
        root_context: &Path,
        root_location: &Path,
    ) -> Result<IncludeTree, CompileError> {
        TreeBuilder::new(&self.host).build(root_text, root_context, root_location).await
    }

    /// Resolve and flatten the root buffer.
    pub async fn expand(
        &self,
        root_text: &str,
        root_context: &Path,
        root_location: &Path,
    ) -> Result<Expansion, CompileError> {
        let tree = self.build_tree(root_text, root_context, root_location).await?;
        Ok(flatten(&tree))
    }

    /// Compile the root buffer into the configured output format.
    ///
    /// # Errors
    ///
    /// Returns the first [`CompileError`] raised while resolving the tree. No
    /// partial output is produced.
    pub async fn compile(
        &self,
        root_text: &str,
        root_context: &Path,
        root_location: &Path,
    ) -> Result<String, CompileError> {
        tracing::debug!("Compiling {}", root_location.display());
        let expansion = self.expand(root_text, root_context, root_location).await?;
        let body = expansion.to_template_body(&self.options_ident);
        Ok(self.format.assemble(&body, &self.options_ident))
    }
}

/// Canonicalize and read a root template from disk.
pub async fn load_root(path: &Path) -> Result<SourceFile, FileOperationError> {
    let location = tokio::fs::canonicalize(path).await.with_file_context(
        FileOperation::Canonicalize,
        path,
        "locating the root template",
    )?;
    let text = FileOps::read_with_context(&location, "reading the root template").await?;
    Ok(SourceFile::new(location, text))
}
