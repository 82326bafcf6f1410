//! Dependency tree construction.
//!
//! Starting from a root buffer, every directive is resolved through the
//! [`IncludeHost`], its file is read through the shared [`FileCache`], and
//! the file is scanned recursively. The result is an [`IncludeTree`] whose
//! nodes mirror the directives in source order.
//!
//! # Cycle detection
//!
//! Each branch carries the canonical locations on its own path from the root
//! (the root location included). Reaching a location already on that path is
//! a [`CompileError::CircularDependency`]. The path is per branch, so a file
//! reached through two unrelated branches (diamond inclusion) is legal: it is
//! read once and expanded at both sites.
//!
//! # Concurrency
//!
//! Sibling directives resolve concurrently with [`try_join_all`], which keeps
//! results in source order. The first error drops every other in-flight
//! branch of the compilation.

pub mod cache;

pub use cache::{FileCache, SourceFile};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::{BoxFuture, try_join_all};

use crate::condition::Condition;
use crate::core::{CompileError, FileOperation, FileResultExt};
use crate::directive::{self, RawDirective};
use crate::host::IncludeHost;

/// A resolved directive and everything it includes.
#[derive(Debug, Clone)]
pub struct IncludeNode {
    /// The directive as scanned from the parent's text
    pub directive: RawDirective,
    /// The compiled guard, if the directive had one
    pub condition: Option<Condition>,
    /// The included file
    pub file: Arc<SourceFile>,
    /// Directives found in `file`, in source order
    pub children: Vec<IncludeNode>,
}

impl IncludeNode {
    /// Canonical location of the included file.
    pub fn location(&self) -> &Path {
        &self.file.location
    }
}

/// The fully resolved tree for one root buffer.
#[derive(Debug, Clone)]
pub struct IncludeTree {
    /// The root buffer
    pub root: SourceFile,
    /// Directives found in the root, in source order
    pub children: Vec<IncludeNode>,
}

impl IncludeTree {
    /// Every node in depth-first pre-order.
    pub fn nodes(&self) -> Vec<&IncludeNode> {
        fn walk<'a>(nodes: &'a [IncludeNode], out: &mut Vec<&'a IncludeNode>) {
            for node in nodes {
                out.push(node);
                walk(&node.children, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.children, &mut out);
        out
    }

    /// Distinct included locations, in first-seen depth-first order.
    pub fn locations(&self) -> Vec<PathBuf> {
        let mut seen = Vec::new();
        for node in self.nodes() {
            if !seen.iter().any(|l: &PathBuf| l == node.location()) {
                seen.push(node.location().to_path_buf());
            }
        }
        seen
    }
}

/// Builds [`IncludeTree`]s for one compilation.
///
/// The builder owns the compilation's [`FileCache`]; create a new builder for
/// each top-level compilation.
pub struct TreeBuilder<'h, H> {
    host: &'h H,
    cache: FileCache,
}

impl<'h, H: IncludeHost> TreeBuilder<'h, H> {
    pub fn new(host: &'h H) -> Self {
        Self {
            host,
            cache: FileCache::new(),
        }
    }

    /// The cache shared by every branch built so far.
    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    /// Resolve every directive reachable from `root_text`.
    ///
    /// `root_location` seeds the ancestor path, so a file that includes the
    /// root is reported as circular.
    ///
    /// # Errors
    ///
    /// Returns the first [`CompileError`] raised anywhere in the tree.
    pub async fn build(
        &self,
        root_text: &str,
        root_context: &Path,
        root_location: &Path,
    ) -> Result<IncludeTree, CompileError> {
        let ancestors = vec![root_location.to_path_buf()];
        let children =
            self.build_children(root_text, root_context, root_location, ancestors).await?;

        let (hits, misses) = self.cache.stats();
        tracing::debug!(
            "Resolved {} includes from {} ({} files read, {} cache hits)",
            children.len(),
            root_location.display(),
            misses,
            hits
        );

        Ok(IncludeTree {
            root: SourceFile {
                location: root_location.to_path_buf(),
                context: root_context.to_path_buf(),
                text: root_text.to_string(),
            },
            children,
        })
    }

    fn build_children<'a>(
        &'a self,
        text: &'a str,
        context: &'a Path,
        referrer: &'a Path,
        ancestors: Vec<PathBuf>,
    ) -> BoxFuture<'a, Result<Vec<IncludeNode>, CompileError>> {
        Box::pin(async move {
            tracing::debug!("Dependency walk: {}", referrer.display());
            let branches = directive::scan(text)
                .into_iter()
                .map(|directive| self.build_node(directive, context, referrer, &ancestors));
            try_join_all(branches).await
        })
    }

    async fn build_node(
        &self,
        directive: RawDirective,
        context: &Path,
        referrer: &Path,
        ancestors: &[PathBuf],
    ) -> Result<IncludeNode, CompileError> {
        // Conditions are validated before any I/O so their errors name the directive's file.
        let condition = directive
            .condition
            .as_deref()
            .map(|expression| {
                Condition::compile(expression).map_err(|source| CompileError::ConditionParse {
                    expression: expression.to_string(),
                    reference: directive.reference.clone(),
                    referrer: referrer.to_path_buf(),
                    source,
                })
            })
            .transpose()?;

        let Some(location) = self.host.resolve(context, &directive.reference).await else {
            let suggestions = self.host.suggest(context, &directive.reference).await;
            return Err(CompileError::UnresolvedReference {
                reference: directive.reference,
                referrer: referrer.to_path_buf(),
                suggestions,
            });
        };

        if ancestors.contains(&location) {
            let mut chain = ancestors.to_vec();
            chain.push(location.clone());
            return Err(CompileError::CircularDependency {
                reference: directive.reference,
                referrer: referrer.to_path_buf(),
                location,
                chain,
            });
        }

        let file = self
            .cache
            .get_or_read(self.host, &location)
            .await
            .with_file_context(FileOperation::Read, &location, "template inclusion")
            .map_err(|source| CompileError::ReadFailure {
                location: location.clone(),
                referrer: referrer.to_path_buf(),
                source: source.with_related_path(referrer),
            })?;

        let mut branch = ancestors.to_vec();
        branch.push(location);
        let children =
            self.build_children(&file.text, &file.context, &file.location, branch).await?;

        Ok(IncludeNode {
            directive,
            condition,
            file,
            children,
        })
    }
}
