//! Compile a template into a parameterized module.
//!
//! # Examples
//!
//! ```bash
//! # Print a CommonJS module to stdout
//! tplinc compile src/index.tpl
//!
//! # Write an ES module plus a Makefile dependency rule
//! tplinc compile src/index.tpl -o dist/index.js --format esm --dep-file dist/index.d
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use super::common::{OutputOverrides, Session, emit};
use crate::output::OutputFormat;

/// Command to compile a root template.
#[derive(Args, Debug)]
pub struct CompileCommand {
    /// Root template to compile
    file: PathBuf,

    /// Write the module here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (overrides tplinc.toml)
    #[arg(short = 'f', long, value_enum)]
    format: Option<OutputFormat>,

    /// Name of the options parameter (overrides tplinc.toml)
    #[arg(long)]
    options_ident: Option<String>,

    /// Write a Makefile rule listing every file the output depends on
    #[arg(long, requires = "output")]
    dep_file: Option<PathBuf>,
}

impl CompileCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let session = Session::open(
            &self.file,
            config_path,
            OutputOverrides {
                format: self.format,
                options_ident: self.options_ident.clone(),
            },
        )
        .await?;

        let root = &session.root;
        let module = session.compiler.compile(&root.text, &root.context, &root.location).await?;
        emit(&module, self.output.as_deref(), "writing the compiled module").await?;

        if let (Some(dep_file), Some(output)) = (&self.dep_file, &self.output) {
            let rule = makefile_rule(output, &session.dependencies());
            emit(&rule, Some(dep_file), "writing the dependency file").await?;
        }

        tracing::info!("Compiled {}", root.location.display());
        Ok(())
    }
}

/// A `target: deps...` rule with spaces escaped the way make expects.
fn makefile_rule(target: &Path, deps: &[PathBuf]) -> String {
    let escape = |p: &Path| p.display().to_string().replace(' ', "\\ ");

    let mut rule = format!("{}:", escape(target));
    for dep in deps {
        rule.push(' ');
        rule.push_str(&escape(dep));
    }
    rule.push('\n');
    rule
}
