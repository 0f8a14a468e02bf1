//! Project setup and the three commands.

use anyhow::{Context, Result};
use globset::GlobSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use tspreview_checker::{CompilerOptions, FsReader};
use tspreview_crawler::{Analyzer, AnalyzerConfig, PreviewableSet};

use crate::args::ProjectArgs;
use crate::discover::{build_exclude, discover_files};
use crate::report::PropsReport;

pub struct Project {
    root: PathBuf,
    exclude: GlobSet,
    analyzer: Analyzer,
}

/// `<root>/tsconfig.json` unless one was given explicitly.
pub(crate) fn resolve_tsconfig_path(root: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let candidate = root.join("tsconfig.json");
            candidate.is_file().then_some(candidate)
        }
    }
}

impl Project {
    pub fn open(args: &ProjectArgs) -> Result<Self> {
        let root = std::fs::canonicalize(&args.root)
            .with_context(|| format!("project root {} is not accessible", args.root.display()))?;
        let compiler_options = match resolve_tsconfig_path(&root, args.tsconfig.as_deref()) {
            Some(path) => CompilerOptions::from_tsconfig(&path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => CompilerOptions::default(),
        };
        let config = AnalyzerConfig::new(&root)
            .with_framework(args.framework)
            .with_compiler_options(compiler_options)
            .with_policy(args.policy());
        let exclude = build_exclude(&args.exclude)?;
        info!(root = %root.display(), framework = %args.framework, "opened project");
        Ok(Project {
            analyzer: Analyzer::new(config, Arc::new(FsReader)),
            root,
            exclude,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn files(&self) -> Vec<PathBuf> {
        discover_files(&self.root, &self.exclude)
    }

    /// Crawl `files`, or every discovered file when none are given.
    pub async fn crawl(&self, files: &[PathBuf]) -> Result<PreviewableSet> {
        let files = if files.is_empty() {
            self.files()
        } else {
            files
                .iter()
                .map(|file| {
                    std::path::absolute(file)
                        .with_context(|| format!("cannot resolve {}", file.display()))
                })
                .collect::<Result<Vec<_>>>()?
        };
        Ok(self.analyzer.analyze(&files).await)
    }

    /// Props report for the previewable `id`. Only the file named by the
    /// id, and whatever it links to, is crawled.
    pub async fn props(&self, id: &str) -> Result<PropsReport> {
        let (file, _) = id
            .rsplit_once(':')
            .with_context(|| format!("`{id}` is not a previewable id (expected `<path>:<name>`)"))?;
        let set = self.analyzer.analyze(&[self.root.join(file)]).await;
        let previewable = set
            .find(id)
            .with_context(|| format!("no component or story with id `{id}`"))?;
        PropsReport::collect(&previewable, self.analyzer.config().policy)
            .await
            .with_context(|| format!("failed to resolve `{id}`"))
    }

    /// Crawl the whole root, then again after every settled burst of file
    /// changes. Returns only when `on_crawl` fails.
    pub async fn watch(
        &self,
        debounce: Duration,
        mut on_crawl: impl FnMut(&PreviewableSet) -> Result<()>,
    ) -> Result<()> {
        let _watcher = self
            .analyzer
            .watch()
            .with_context(|| format!("failed to watch {}", self.root.display()))?;
        loop {
            let set = self.analyzer.analyze(&self.files()).await;
            on_crawl(&set)?;
            self.analyzer.changed().await;
            tokio::time::sleep(debounce).await;
            info!(
                changed = self.analyzer.pending_invalidations().len(),
                "files changed, crawling again"
            );
        }
    }
}

#[cfg(test)]
#[path = "../tests/driver_tests.rs"]
mod driver_tests;
