//! Declaration-level type oracle for tspreview.
//!
//! - `reader`: file access (disk, in-memory overlays)
//! - `options`: `tsconfig.json` loading and compiler options
//! - `module_resolver`: module specifier resolution
//! - `binder`: scopes, declarations, imports and exports per file
//! - `oracle`: the [`TypeOracle`] trait and name resolution on top of it
//! - `program`: the file cache implementing [`TypeOracle`]

pub mod binder;
pub mod module_resolver;
pub mod options;
pub mod oracle;
pub mod program;
pub mod reader;

pub use binder::{BoundFile, DeclRef, DeclView, ScopeId};
pub use module_resolver::{ModuleExtension, ModuleResolver, ResolutionFailure, ResolvedModule};
pub use options::{CompilerOptions, ConfigError, JsxMode, ModuleResolutionKind};
pub use oracle::{Binding, ModuleRef, Resolution, Symbol, TypeOracle};
pub use program::{EmbeddedScript, Program, ProgramError, ScriptExtractor};
pub use reader::{FsReader, MemoryReader, Reader, StackedReader};
