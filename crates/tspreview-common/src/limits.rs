//! Centralized limits and thresholds for the analyzer.
//!
//! Recursion limits for type resolution and value synthesis live in
//! [`crate::recursion::RecursionProfile`]; this module holds the remaining
//! bounds used by the parser, the binder and the crawler.

// =============================================================================
// Parser
// =============================================================================

/// Maximum nesting depth of expressions and type annotations in the parser.
///
/// Each nested parenthesis, object literal, generic argument list or JSX
/// element adds a frame. Past this depth the parser reports a diagnostic and
/// skips the rest of the construct instead of overflowing the stack.
///
/// ```typescript
/// type Deep = Array<Array<Array<Array</* ... 256 levels ... */>>>>;
/// ```
pub const MAX_PARSER_NESTING: u32 = 256;

// =============================================================================
// Symbol resolution
// =============================================================================

/// Maximum number of re-export hops followed when resolving an imported name.
///
/// ```typescript
/// // index.ts
/// export * from "./a";
/// // a.ts
/// export { Button } from "./b";
/// // b.ts
/// export { Button } from "./index"; // cycle: bounded by this limit
/// ```
pub const MAX_EXPORT_CHAIN_HOPS: u32 = 32;

/// Maximum `extends` chain length when loading `tsconfig.json`.
pub const MAX_TSCONFIG_EXTENDS_DEPTH: u32 = 16;

// =============================================================================
// Crawler
// =============================================================================

/// Maximum depth of recursive crawls triggered by story files whose
/// component lives in another file.
pub const MAX_CRAWL_DEPTH: u32 = 8;

/// Maximum size of a source file the crawler will parse (16 MiB).
///
/// Larger files are almost always generated bundles and contribute no
/// previewables.
pub const MAX_SOURCE_FILE_BYTES: usize = 16 * 1024 * 1024;
