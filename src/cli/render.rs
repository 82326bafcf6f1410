//! Compile a template and evaluate its conditions in-process.
//!
//! Useful for previewing what the emitted module would produce for a given
//! options record without running it.
//!
//! ```bash
//! tplinc render src/index.tpl --options '{"user": true, "admin": false}'
//! tplinc render src/index.tpl --options-file prod.json -o build/index.html
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use serde_json::Value;

use super::common::{OutputOverrides, Session, emit};
use crate::core::{FileOps, TplincError};

/// Command to render a template with concrete options.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Root template to render
    file: PathBuf,

    /// Options record as a JSON object
    #[arg(long, conflicts_with = "options_file")]
    options: Option<String>,

    /// Read the options record from a JSON file
    #[arg(long)]
    options_file: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RenderCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let options = self.load_options().await?;
        let session = Session::open(&self.file, config_path, OutputOverrides::default()).await?;

        let root = &session.root;
        let expansion = session.compiler.expand(&root.text, &root.context, &root.location).await?;
        emit(&expansion.render(&options), self.output.as_deref(), "writing the rendered template").await
    }

    async fn load_options(&self) -> Result<Value> {
        let text = match (&self.options, &self.options_file) {
            (Some(inline), _) => inline.clone(),
            (None, Some(path)) => FileOps::read_with_context(path, "reading render options").await?,
            (None, None) => return Ok(Value::Object(serde_json::Map::new())),
        };
        Ok(parse_options(&text)?)
    }
}

/// Parse an options record. Anything but a JSON object is rejected.
fn parse_options(text: &str) -> Result<Value, TplincError> {
    let value: Value = serde_json::from_str(text).map_err(|e| TplincError::InvalidOptions {
        reason: e.to_string(),
    })?;

    if !value.is_object() {
        return Err(TplincError::InvalidOptions {
            reason: format!("expected a JSON object, got {value}"),
        });
    }
    Ok(value)
}
