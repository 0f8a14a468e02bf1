//! Previewable discovery for tspreview.
//!
//! - `crawler`: [`PreviewableCrawler`], components and stories per file
//! - `sfc`: script blocks of `.vue` and `.svelte` files
//! - `analyzer`: [`Analyzer`], the shared workspace with single-flight
//!   access, invalidation and file watching
//! - `previewable`: the [`Component`] / [`Story`] handles with lazy props
//!   and args extraction

pub mod analyzer;
pub mod crawler;
pub mod dependency_graph;
pub mod previewable;
pub mod sfc;

pub use analyzer::{Analyzer, AnalyzerConfig, AnalyzerError, AnalyzerWatcher};
pub use crawler::{
    ComponentInfo, ComponentKind, CrawlCache, FileCrawl, PreviewableCrawler, StoryArgs,
    StoryDeclaration, StoryInfo,
};
pub use dependency_graph::DependencyGraph;
pub use previewable::{Component, ComponentProps, Previewable, PreviewableSet, Story};
pub use sfc::SfcScriptExtractor;
