//! Setup shared by the commands.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::compiler::{Compiler, load_root};
use crate::config::ProjectConfig;
use crate::core::{FileOps, TplincError};
use crate::host::FsHost;
use crate::output::{OutputFormat, is_valid_identifier};
use crate::tree::SourceFile;

/// Output settings given on the command line.
#[derive(Debug, Default)]
pub(crate) struct OutputOverrides {
    pub format: Option<OutputFormat>,
    pub options_ident: Option<String>,
}

/// A root template together with the compiler configured for it.
pub(crate) struct Session {
    pub root: SourceFile,
    pub compiler: Compiler<FsHost>,
}

impl Session {
    /// Load the root template and the configuration nearest to it.
    pub async fn open(
        file: &Path,
        config_path: Option<&Path>,
        overrides: OutputOverrides,
    ) -> Result<Self> {
        let root = load_root(file).await?;
        let config = ProjectConfig::discover(config_path, &root.context).await?;

        let format = overrides.format.unwrap_or(config.output.format);
        let options_ident = overrides.options_ident.unwrap_or_else(|| config.output.options_ident.clone());
        if !is_valid_identifier(&options_ident) {
            bail!(TplincError::InvalidOptions {
                reason: format!("'{options_ident}' is not a valid identifier for the options parameter"),
            });
        }

        tracing::debug!(
            "Using {} output with options parameter '{}'",
            format,
            options_ident
        );

        let compiler = Compiler::new(config.build_host())
            .with_format(format)
            .with_options_ident(options_ident);

        Ok(Self {
            root,
            compiler,
        })
    }

    /// Every file the compilation read, root first.
    pub fn dependencies(&self) -> Vec<PathBuf> {
        let mut deps = vec![self.root.location.clone()];
        deps.extend(
            self.compiler
                .host()
                .dependencies()
                .into_iter()
                .filter(|d| *d != self.root.location),
        );
        deps
    }
}

/// Write `content` to `path`, or to stdout when no path is given.
pub(crate) async fn emit(content: &str, path: Option<&Path>, purpose: &str) -> Result<()> {
    match path {
        Some(path) => {
            FileOps::write_with_context(path, content, purpose).await?;
            tracing::debug!("Wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}
