//! tspreview: find previewable UI components and stories in a TypeScript
//! project, resolve their props into a finite type graph and synthesize
//! example values for them.
//!
//! This crate re-exports the workspace crates:
//!
//! - [`syntax`]: scanner and parser for TypeScript, TSX and JavaScript
//! - [`checker`]: binding, module resolution and `tsconfig.json` loading
//! - [`resolver`]: props extraction and the type graph resolver
//! - [`synth`]: example values and their JavaScript source
//! - [`crawler`]: previewable discovery and the [`Analyzer`]

pub use tspreview_checker as checker;
pub use tspreview_common as common;
pub use tspreview_crawler as crawler;
pub use tspreview_resolver as resolver;
pub use tspreview_synth as synth;
pub use tspreview_syntax as syntax;
pub use tspreview_types as types;

pub use tspreview_checker::{CompilerOptions, FsReader, MemoryReader, Reader, StackedReader};
pub use tspreview_crawler::{
    Analyzer, AnalyzerConfig, AnalyzerError, Component, ComponentProps, Previewable,
    PreviewableSet, Story, StoryArgs, StoryDeclaration,
};
pub use tspreview_resolver::{Framework, SpecialTypeOverrides};
pub use tspreview_synth::{
    SynthesisPolicy, ValueSynthesizer, generate, generate_props_assignment,
    parse_serializable_value, to_source,
};
pub use tspreview_types::{CollectedTypes, SerializableValue, ValueType};

// Tracing configuration (TSPREVIEW_LOG / TSPREVIEW_LOG_FORMAT)
pub mod tracing_config;
