//! Tracing configuration.
//!
//! Supports three output formats controlled by `TSPREVIEW_LOG_FORMAT`:
//!
//! - `text` (default): Standard `tracing-subscriber` flat output
//! - `tree`: Hierarchical indented output via `tracing-tree`, grouping the
//!   resolution steps under the crawl or extraction that caused them
//! - `json`: One JSON object per span/event, for tooling
//!
//! ## Quick start
//!
//! ```bash
//! # Why did a prop resolve to `unknown`?
//! TSPREVIEW_LOG=tspreview_resolver=trace TSPREVIEW_LOG_FORMAT=tree tspreview props src/Button.tsx:Button
//!
//! # Per-file crawl progress
//! TSPREVIEW_LOG=tspreview_crawler=debug tspreview crawl
//!
//! # JSON (for tooling or sharing full traces)
//! TSPREVIEW_LOG=debug TSPREVIEW_LOG_FORMAT=json tspreview crawl
//! ```
//!
//! The subscriber is only initialised when `TSPREVIEW_LOG` (or `RUST_LOG`)
//! is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse a `TSPREVIEW_LOG_FORMAT` value. Unrecognized values select
    /// [`LogFormat::Text`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("TSPREVIEW_LOG_FORMAT").unwrap_or_default())
    }
}

/// Build an `EnvFilter` from `TSPREVIEW_LOG`, falling back to `RUST_LOG`.
///
/// `TSPREVIEW_LOG` takes precedence when both are set.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("TSPREVIEW_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `TSPREVIEW_LOG` nor `RUST_LOG` is set. All
/// output goes to stderr so it never mixes with JSON printed on stdout.
/// Calling it again after a subscriber is installed is a no-op.
pub fn init_tracing() {
    let has_own_log = std::env::var("TSPREVIEW_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_own_log && !has_rust_log {
        return;
    }

    let filter = build_filter();

    // `try_init` so a second call (tests, embedders) keeps the first subscriber.
    let _ = match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_writer(std::io::stderr)
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).try_init()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).try_init()
        }
        LogFormat::Text => {
            let text_layer = fmt::layer().with_writer(std::io::stderr);

            Registry::default().with(filter).with(text_layer).try_init()
        }
    };
}
