use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use tspreview_resolver::Framework;
use tspreview_synth::{OptionalFieldPolicy, SynthesisPolicy, UnionPolicy};

/// CLI arguments for the tspreview binary.
#[derive(Parser, Debug)]
#[command(
    name = "tspreview",
    version,
    about = "Find previewable components and stories and synthesize their props"
)]
pub struct CliArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the components and stories found under the root.
    Crawl {
        /// Files to crawl instead of walking the root.
        files: Vec<PathBuf>,
    },

    /// Resolve the props of a component or the args of a story.
    Props {
        /// Previewable id, e.g. `src/Button.tsx:Button`.
        id: String,
    },

    /// Crawl, then crawl again whenever files under the root change.
    Watch {
        /// Milliseconds to wait for a burst of changes to settle.
        #[arg(long, default_value_t = 100)]
        debounce: u64,
    },
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project root. Previewable ids are relative to it.
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// UI framework whose component conventions apply.
    #[arg(long, global = true, default_value = "react")]
    pub framework: Framework,

    /// Path to tsconfig.json. Defaults to `<root>/tsconfig.json` when present.
    #[arg(long, global = true)]
    pub tsconfig: Option<PathBuf>,

    /// Glob of root-relative paths to skip; may be repeated.
    #[arg(long, global = true)]
    pub exclude: Vec<String>,

    /// Which union member example values are built from.
    #[arg(long, global = true, default_value = "first-member")]
    pub union: UnionPolicy,

    /// Which optional fields receive example values.
    #[arg(long = "optional-fields", global = true, default_value = "cheap-only")]
    pub optional_fields: OptionalFieldPolicy,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

impl ProjectArgs {
    pub fn policy(&self) -> SynthesisPolicy {
        SynthesisPolicy::default()
            .with_union(self.union)
            .with_optional_fields(self.optional_fields)
    }
}

#[cfg(test)]
#[path = "../tests/args_tests.rs"]
mod args_tests;
