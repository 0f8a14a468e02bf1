//! Common types and utilities for the tspreview analyzer.
//!
//! This crate provides foundational types used across all tspreview crates:
//! - Source spans (`ByteSpan`)
//! - Position/Range types for editor "jump to source"
//! - Content hashing for the per-file cache
//! - Analyzer limits and thresholds
//! - The `RecursionGuard` cycle/depth guard shared by resolution and synthesis
//! - Diagnostics reported by the parser and the resolver

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::ByteSpan;

// Position types for line/column source locations
pub mod position;
pub use position::{LineMap, Position, Range};

// Content hashing for cache keys
pub mod hash;
pub use hash::content_hash;

// Centralized limits and thresholds
pub mod limits;

// Cycle detection and depth limiting
pub mod recursion;
pub use recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};

// Parser and resolver diagnostics
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};
