//! The analyzer: one workspace, one program, serialized access.
//!
//! [`Program`] is stateful, so every operation against it runs under a
//! single async mutex: concurrent `extract_props` calls queue rather than
//! race. Invalidations never wait for that lock. They are queued and applied
//! at the start of the next locked operation, so an in-flight resolution
//! finishes on the state it started with and later calls see the change.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashSet;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, info, warn};
use tspreview_checker::reader::normalize_path;
use tspreview_checker::{CompilerOptions, Program, ProgramError, Reader};
use tspreview_resolver::{
    Framework, PropsError, SpecialTypeOverrides, extract_component_props, extract_svelte_props,
    extract_vue_props,
};
use tspreview_synth::SynthesisPolicy;

use crate::crawler::{
    ComponentInfo, ComponentKind, CrawlCache, FileCrawl, PreviewableCrawler, StoryArgs, StoryInfo,
};
use crate::dependency_graph::DependencyGraph;
use crate::previewable::{Component, ComponentProps, PreviewableSet, Story};
use crate::sfc::SfcScriptExtractor;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error("cannot extract props of `{id}`: {source}")]
    Props {
        id: String,
        #[source]
        source: PropsError,
    },

    #[error("previewable `{id}` no longer exists")]
    Vanished { id: String },

    #[error("file watcher failed: {0}")]
    Watch(#[from] notify::Error),
}

#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    /// Previewable ids and collected type names are relative to this.
    pub root_dir: PathBuf,
    pub framework: Framework,
    pub compiler_options: CompilerOptions,
    pub policy: SynthesisPolicy,
}

impl AnalyzerConfig {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        AnalyzerConfig {
            root_dir: root_dir.into(),
            framework: Framework::default(),
            compiler_options: CompilerOptions::default(),
            policy: SynthesisPolicy::default(),
        }
    }

    pub fn with_framework(mut self, framework: Framework) -> Self {
        self.framework = framework;
        self
    }

    pub fn with_compiler_options(mut self, options: CompilerOptions) -> Self {
        self.compiler_options = options;
        self
    }

    pub fn with_policy(mut self, policy: SynthesisPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// State shared by an analyzer and the previewables it hands out.
pub(crate) struct Workspace {
    config: AnalyzerConfig,
    overrides: SpecialTypeOverrides,
    state: Mutex<WorkspaceState>,
    /// Paths changed since the last locked operation.
    pending: DashSet<PathBuf>,
    changed: Notify,
}

struct WorkspaceState {
    program: Program,
    crawls: CrawlCache,
    graph: DependencyGraph,
}

impl WorkspaceState {
    fn crawl(&mut self, path: &Path) -> Arc<FileCrawl> {
        let mut crawler = PreviewableCrawler::new(&self.program, &mut self.crawls);
        let crawl = crawler.crawl(path);
        for crawled in crawler.crawled_paths() {
            self.graph
                .update_file(crawled, &self.program.dependencies(crawled));
        }
        crawl
    }

    fn invalidate(&mut self, path: &Path) {
        self.program.invalidate(path);
        let mut stale = self.graph.affected_files(path);
        stale.push(path.to_path_buf());
        for file in &stale {
            self.crawls.remove(file);
        }
        self.graph.remove_file(path);
        debug!(path = %path.display(), dependents = stale.len() - 1, "invalidated");
    }
}

impl Workspace {
    pub(crate) fn policy(&self) -> SynthesisPolicy {
        self.config.policy
    }

    fn queue_invalidation(&self, path: &Path) {
        self.pending.insert(normalize_path(path));
        self.changed.notify_one();
    }

    async fn lock(&self) -> tokio::sync::MutexGuard<'_, WorkspaceState> {
        let mut state = self.state.lock().await;
        if !self.pending.is_empty() {
            let paths: Vec<PathBuf> = self.pending.iter().map(|path| path.key().clone()).collect();
            for path in paths {
                self.pending.remove(&path);
                state.invalidate(&path);
            }
        }
        state
    }

    async fn crawl(&self, path: &Path) -> Arc<FileCrawl> {
        self.lock().await.crawl(path)
    }

    pub(crate) async fn component_props(
        &self,
        info: &ComponentInfo,
    ) -> Result<ComponentProps, AnalyzerError> {
        let mut state = self.lock().await;
        let crawl = state.crawl(&info.path);
        let current = crawl.component(&info.id).ok_or_else(|| AnalyzerError::Vanished {
            id: info.id.clone(),
        })?;
        let file = state.program.load(&current.path)?;
        let overrides = &self.overrides;
        let resolved = match current.kind {
            ComponentKind::Vue => extract_vue_props(&state.program, overrides, &file),
            ComponentKind::Svelte => extract_svelte_props(&state.program, overrides, &file),
            ComponentKind::Script => {
                extract_component_props(&state.program, overrides, &file, &current.lookup_name)
            }
        }
        .map_err(|source| AnalyzerError::Props {
            id: info.id.clone(),
            source,
        })?;
        Ok(ComponentProps {
            props: resolved.ty,
            types: resolved.collected,
            warnings: resolved.warnings,
        })
    }

    pub(crate) async fn story_args(&self, info: &StoryInfo) -> Result<Option<StoryArgs>, AnalyzerError> {
        let mut state = self.lock().await;
        let crawl = state.crawl(&info.path);
        let story = crawl.story(&info.id).ok_or_else(|| AnalyzerError::Vanished {
            id: info.id.clone(),
        })?;
        Ok(story.args.clone())
    }
}

pub struct Analyzer {
    workspace: Arc<Workspace>,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig, reader: Arc<dyn Reader>) -> Self {
        let mut options = config.compiler_options.clone();
        if options.jsx_import_source.is_none() {
            options.jsx_import_source = config.framework.jsx_module().map(str::to_string);
        }
        let program = Program::new(config.root_dir.clone(), options, reader)
            .with_script_extractor(Arc::new(SfcScriptExtractor));
        Analyzer {
            workspace: Arc::new(Workspace {
                overrides: config.framework.overrides(),
                config,
                state: Mutex::new(WorkspaceState {
                    program,
                    crawls: CrawlCache::default(),
                    graph: DependencyGraph::new(),
                }),
                pending: DashSet::new(),
                changed: Notify::new(),
            }),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.workspace.config
    }

    /// Crawl `files` and collect their previewables. Files that cannot be
    /// read or parsed contribute nothing.
    #[tracing::instrument(level = "debug", skip_all, fields(files = files.len()))]
    pub async fn analyze(&self, files: &[PathBuf]) -> PreviewableSet {
        let mut set = PreviewableSet::default();
        for (index, path) in files.iter().enumerate() {
            if index > 0 {
                tokio::task::yield_now().await;
            }
            let crawl = self.workspace.crawl(path).await;
            set.components.extend(
                crawl
                    .components
                    .iter()
                    .map(|info| Component::new(info.clone(), self.workspace.clone())),
            );
            set.stories.extend(
                crawl
                    .stories
                    .iter()
                    .map(|info| Story::new(info.clone(), self.workspace.clone())),
            );
        }
        info!(
            components = set.components.len(),
            stories = set.stories.len(),
            "analysis finished"
        );
        set
    }

    /// Mark `path` as changed. Takes effect at the start of the next
    /// operation; never waits for one in flight.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn invalidate(&self, path: &Path) {
        self.workspace.queue_invalidation(path);
    }

    /// Watch the root directory and invalidate changed files. Watching stops
    /// when the returned handle is dropped.
    #[tracing::instrument(level = "debug", skip_all, fields(root = %self.workspace.config.root_dir.display()))]
    pub fn watch(&self) -> Result<AnalyzerWatcher, AnalyzerError> {
        let workspace = self.workspace.clone();
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
            match event {
                Ok(event) => {
                    if matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) {
                        for path in &event.paths {
                            workspace.queue_invalidation(path);
                        }
                    }
                }
                Err(error) => warn!(%error, "file watcher error"),
            }
        })?;
        watcher.watch(&self.workspace.config.root_dir, RecursiveMode::Recursive)?;
        Ok(AnalyzerWatcher { _watcher: watcher })
    }

    /// Wait until at least one invalidation has been queued since the last
    /// call.
    pub async fn changed(&self) {
        self.workspace.changed.notified().await;
    }

    /// Paths queued for invalidation and not yet applied, sorted.
    pub fn pending_invalidations(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .workspace
            .pending
            .iter()
            .map(|path| path.key().clone())
            .collect();
        paths.sort();
        paths
    }
}

/// Keeps a file watcher alive.
pub struct AnalyzerWatcher {
    _watcher: RecommendedWatcher,
}

#[cfg(test)]
#[path = "../tests/analyzer_tests.rs"]
mod analyzer_tests;
