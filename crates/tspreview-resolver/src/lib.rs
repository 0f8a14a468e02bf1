//! Type-graph resolution for tspreview.
//!
//! - `resolver`: [`TypeGraphResolver`], from type annotations to
//!   [`ValueType`](tspreview_types::ValueType) graphs
//! - `builtins`: the builtin library types modelled without `lib.d.ts`
//! - `overrides` / `frameworks`: hand-authored shapes for library types
//! - `props`: props extraction for components

pub mod builtins;
pub mod frameworks;
pub mod overrides;
pub mod props;
pub mod resolver;

pub use frameworks::Framework;
pub use overrides::{OverrideEntry, SpecialTypeOverrides};
pub use props::{PropsError, extract_component_props, extract_svelte_props, extract_vue_props};
pub use resolver::{ResolvedType, TypeEnv, TypeGraphResolver, TypeHandle};
