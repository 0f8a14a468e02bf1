//! Declaration-level TypeScript parser.
//!
//! Produces the `ast` module's tree: every declaration, type annotation and
//! top-level expression is parsed in full; function bodies and JSX are
//! skipped with balanced-token scanning.

mod state;
mod state_expressions;
mod state_statements;
mod state_types;

pub use state::{ParserState, file_allows_jsx};
pub use state_types::type_reference;

#[cfg(test)]
#[path = "../../tests/parser_tests.rs"]
mod parser_tests;
