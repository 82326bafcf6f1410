//! Display the include tree of a template.
//!
//! Resolves every directive without emitting output, then prints the
//! structure the way `cargo tree` does.
//!
//! # Examples
//!
//! ```bash
//! tplinc tree src/index.tpl
//! tplinc tree src/index.tpl --depth 1
//! tplinc tree src/index.tpl --format json
//! ```
//!
//! # Output Format
//!
//! ```text
//! src/index.tpl
//! ├── header.tpl
//! │   └── nav.tpl if user
//! ├── body.tpl
//! │   └── header.tpl (*)
//! └── footer.tpl if !embedded
//!
//! (*) = included above
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::common::{OutputOverrides, Session};
use crate::tree::{IncludeNode, IncludeTree};

/// Command to display the include tree.
#[derive(Args, Debug)]
pub struct TreeCommand {
    /// Root template
    file: PathBuf,

    /// Maximum depth to display (unlimited if not specified)
    #[arg(short = 'd', long)]
    depth: Option<usize>,

    /// Output format (tree, json)
    #[arg(short = 'f', long, default_value = "tree")]
    format: String,

    /// Expand repeated includes every time instead of marking them with (*)
    #[arg(long)]
    no_dedupe: bool,
}

/// JSON shape of one include.
#[derive(Debug, Serialize)]
struct JsonNode {
    reference: String,
    location: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<String>,
    includes: Vec<JsonNode>,
}

impl TreeCommand {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        self.validate_arguments()?;

        let session = Session::open(&self.file, config_path, OutputOverrides::default()).await?;
        let root = &session.root;
        let tree = session.compiler.build_tree(&root.text, &root.context, &root.location).await?;

        let label = self.file.display().to_string();
        let rendered = match self.format.as_str() {
            "json" => self.render_json(&tree)?,
            _ => self.render_tree(&label, &tree),
        };
        print!("{rendered}");
        Ok(())
    }

    fn validate_arguments(&self) -> Result<()> {
        if !matches!(self.format.as_str(), "tree" | "json") {
            bail!("Invalid format '{}'. Valid formats are: tree, json", self.format);
        }
        if self.depth == Some(0) {
            bail!("Depth must be at least 1");
        }
        Ok(())
    }

    fn render_tree(&self, label: &str, tree: &IncludeTree) -> String {
        let mut out = format!("{}\n", label.cyan().bold());
        let mut displayed = HashSet::new();
        let mut has_duplicates = false;

        for (i, node) in tree.children.iter().enumerate() {
            let is_last = i == tree.children.len() - 1;
            self.render_node(node, "", is_last, 0, &mut displayed, &mut has_duplicates, &mut out);
        }

        if has_duplicates {
            out.push('\n');
            out.push_str(&format!("{}\n", "(*) = included above".bright_black()));
        }
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn render_node<'t>(
        &self,
        node: &'t IncludeNode,
        prefix: &str,
        is_last: bool,
        current_depth: usize,
        displayed: &mut HashSet<&'t Path>,
        has_duplicates: &mut bool,
        out: &mut String,
    ) {
        if let Some(max_depth) = self.depth
            && current_depth >= max_depth
        {
            return;
        }

        let is_duplicate = !self.no_dedupe && displayed.contains(node.location());
        let connector = if is_last { "└── " } else { "├── " };
        let condition = node
            .condition
            .as_ref()
            .map(|c| format!(" {} {}", "if".bright_black(), c.source().yellow()))
            .unwrap_or_default();
        let dup_marker = if is_duplicate {
            *has_duplicates = true;
            format!(" {}", "(*)".bright_black())
        } else {
            String::new()
        };

        out.push_str(&format!(
            "{prefix}{connector}{}{condition}{dup_marker}\n",
            node.directive.reference
        ));

        if is_duplicate {
            return;
        }
        displayed.insert(node.location());

        let child_prefix = if is_last { format!("{prefix}    ") } else { format!("{prefix}│   ") };
        for (i, child) in node.children.iter().enumerate() {
            let is_last_child = i == node.children.len() - 1;
            self.render_node(
                child,
                &child_prefix,
                is_last_child,
                current_depth + 1,
                displayed,
                has_duplicates,
                out,
            );
        }
    }

    fn render_json(&self, tree: &IncludeTree) -> Result<String> {
        let json = serde_json::json!({
            "root": tree.root.location,
            "includes": tree.children.iter().map(|n| self.node_to_json(n, 0)).collect::<Vec<_>>(),
        });
        Ok(format!("{}\n", serde_json::to_string_pretty(&json)?))
    }

    fn node_to_json(&self, node: &IncludeNode, depth: usize) -> JsonNode {
        let includes = if self.depth.is_some_and(|max| depth + 1 >= max) {
            Vec::new()
        } else {
            node.children.iter().map(|child| self.node_to_json(child, depth + 1)).collect()
        };

        JsonNode {
            reference: node.directive.reference.clone(),
            location: node.location().to_path_buf(),
            condition: node.condition.as_ref().map(|c| c.source().to_string()),
            includes,
        }
    }
}
