//! Per-framework override tables.
//!
//! Each UI framework gets its own registry of [`SpecialTypeOverrides`]. The
//! tables below are plain data: a fully-qualified name and the [`Shape`] it
//! stands for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tspreview_types::{Fields, ValueType};

use crate::overrides::SpecialTypeOverrides;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    #[default]
    React,
    Preact,
    Solid,
    Vue,
    Svelte,
}

#[derive(Debug, Error)]
#[error("unknown framework `{0}` (expected react, preact, solid, vue or svelte)")]
pub struct UnknownFramework(pub String);

impl Framework {
    pub const ALL: [Framework; 5] = [
        Framework::React,
        Framework::Preact,
        Framework::Solid,
        Framework::Vue,
        Framework::Svelte,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Framework::React => "react",
            Framework::Preact => "preact",
            Framework::Solid => "solid",
            Framework::Vue => "vue",
            Framework::Svelte => "svelte",
        }
    }

    /// Module providing the framework's `JSX` namespace, when it has one.
    pub fn jsx_module(self) -> Option<&'static str> {
        match self {
            Framework::React => Some("react"),
            Framework::Preact => Some("preact"),
            Framework::Solid => Some("solid-js"),
            Framework::Vue | Framework::Svelte => None,
        }
    }

    /// A fresh registry with this framework's overrides.
    pub fn overrides(self) -> SpecialTypeOverrides {
        let table: &[(&str, Shape)] = match self {
            Framework::React => REACT,
            Framework::Preact => PREACT,
            Framework::Solid => SOLID,
            Framework::Vue => VUE,
            Framework::Svelte => SVELTE,
        };
        let mut overrides = SpecialTypeOverrides::new();
        for (name, shape) in table {
            shape.register(&mut overrides, name);
        }
        overrides
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Framework {
    type Err = UnknownFramework;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Framework::ALL
            .into_iter()
            .find(|framework| framework.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFramework(s.to_string()))
    }
}

/// Reusable override shapes.
#[derive(Clone, Copy, Debug)]
enum Shape {
    /// Anything renderable as a child: `string | number | boolean | null | undefined`.
    Node,
    /// A rendered element; `null` renders nothing in every framework.
    Element,
    Callable,
    EmptyObject,
    Opaque,
    Null,
    String,
    /// `{ current: null }`.
    RefObject,
    /// The first type argument itself.
    FirstArg,
    /// `P & { children?: <node> }`.
    WithChildren,
    /// `{ value: T }`.
    ValueBox,
}

impl Shape {
    fn register(self, overrides: &mut SpecialTypeOverrides, name: &str) {
        match self {
            Shape::Node => overrides.insert_fixed(name, renderable_node()),
            Shape::Element | Shape::Null => overrides.insert_fixed(name, ValueType::Null),
            Shape::Callable => overrides.insert_fixed(name, ValueType::Function),
            Shape::EmptyObject => overrides.insert_fixed(name, ValueType::empty_object()),
            Shape::Opaque => overrides.insert_fixed(name, ValueType::Unknown),
            Shape::String => overrides.insert_fixed(name, ValueType::String),
            Shape::RefObject => overrides.insert_fixed(name, single_field("current", ValueType::Null)),
            Shape::FirstArg => overrides.insert_generic(name, first_arg),
            Shape::WithChildren => overrides.insert_generic(name, |args| {
                ValueType::intersection([
                    first_arg(args),
                    single_field("children", ValueType::optional(renderable_node())),
                ])
            }),
            Shape::ValueBox => {
                overrides.insert_generic(name, |args| single_field("value", first_arg(args)))
            }
        };
    }
}

fn renderable_node() -> ValueType {
    ValueType::union([
        ValueType::String,
        ValueType::Number,
        ValueType::Boolean,
        ValueType::Null,
        ValueType::Undefined,
    ])
}

fn first_arg(args: &[ValueType]) -> ValueType {
    args.first().cloned().unwrap_or_else(ValueType::empty_object)
}

fn single_field(name: &str, ty: ValueType) -> ValueType {
    let mut fields = Fields::new();
    fields.insert(name.to_string(), ty);
    ValueType::object(fields)
}

const REACT: &[(&str, Shape)] = &[
    ("react.ReactNode", Shape::Node),
    ("react.ReactChild", Shape::Node),
    ("react.ReactFragment", Shape::Node),
    ("react.ReactText", Shape::String),
    ("react.Key", Shape::String),
    ("react.ReactElement", Shape::Element),
    ("react.ReactPortal", Shape::Element),
    ("react.JSX.Element", Shape::Element),
    ("JSX.Element", Shape::Element),
    ("react.CSSProperties", Shape::EmptyObject),
    ("react.HTMLAttributes", Shape::EmptyObject),
    ("react.AllHTMLAttributes", Shape::EmptyObject),
    ("react.ButtonHTMLAttributes", Shape::EmptyObject),
    ("react.InputHTMLAttributes", Shape::EmptyObject),
    ("react.AnchorHTMLAttributes", Shape::EmptyObject),
    ("react.ImgHTMLAttributes", Shape::EmptyObject),
    ("react.DetailedHTMLProps", Shape::EmptyObject),
    ("react.SVGProps", Shape::EmptyObject),
    ("react.AriaAttributes", Shape::EmptyObject),
    ("react.DOMAttributes", Shape::EmptyObject),
    ("react.Ref", Shape::Null),
    ("react.ForwardedRef", Shape::Null),
    ("react.LegacyRef", Shape::Null),
    ("react.RefObject", Shape::RefObject),
    ("react.MutableRefObject", Shape::RefObject),
    ("react.RefCallback", Shape::Callable),
    ("react.FC", Shape::Callable),
    ("react.FunctionComponent", Shape::Callable),
    ("react.VFC", Shape::Callable),
    ("react.ComponentType", Shape::Callable),
    ("react.ComponentClass", Shape::Callable),
    ("react.ElementType", Shape::Callable),
    ("react.ExoticComponent", Shape::Callable),
    ("react.JSXElementConstructor", Shape::Callable),
    ("react.Dispatch", Shape::Callable),
    ("react.SetStateAction", Shape::FirstArg),
    ("react.PropsWithChildren", Shape::WithChildren),
    ("react.PropsWithRef", Shape::FirstArg),
    ("react.PropsWithoutRef", Shape::FirstArg),
    ("react.SyntheticEvent", Shape::Opaque),
    ("react.MouseEvent", Shape::Opaque),
    ("react.ChangeEvent", Shape::Opaque),
    ("react.KeyboardEvent", Shape::Opaque),
    ("react.FormEvent", Shape::Opaque),
    ("react.FocusEvent", Shape::Opaque),
];

const PREACT: &[(&str, Shape)] = &[
    ("preact.ComponentChildren", Shape::Node),
    ("preact.ComponentChild", Shape::Node),
    ("preact.VNode", Shape::Element),
    ("preact.JSX.Element", Shape::Element),
    ("JSX.Element", Shape::Element),
    ("preact.FunctionComponent", Shape::Callable),
    ("preact.FunctionalComponent", Shape::Callable),
    ("preact.ComponentType", Shape::Callable),
    ("preact.AnyComponent", Shape::Callable),
    ("preact.RenderableProps", Shape::WithChildren),
    ("preact.JSX.CSSProperties", Shape::EmptyObject),
    ("preact.JSX.HTMLAttributes", Shape::EmptyObject),
    ("preact.Ref", Shape::Null),
    ("preact.RefObject", Shape::RefObject),
    ("preact.JSX.TargetedEvent", Shape::Opaque),
];

const SOLID: &[(&str, Shape)] = &[
    ("solid-js.JSX.Element", Shape::Node),
    ("JSX.Element", Shape::Node),
    ("solid-js.Component", Shape::Callable),
    ("solid-js.ParentComponent", Shape::Callable),
    ("solid-js.VoidComponent", Shape::Callable),
    ("solid-js.FlowComponent", Shape::Callable),
    ("solid-js.ValidComponent", Shape::Callable),
    ("solid-js.ParentProps", Shape::WithChildren),
    ("solid-js.Accessor", Shape::Callable),
    ("solid-js.Setter", Shape::Callable),
    ("solid-js.JSX.CSSProperties", Shape::EmptyObject),
    ("solid-js.JSX.HTMLAttributes", Shape::EmptyObject),
    ("solid-js.JSX.EventHandler", Shape::Callable),
];

const VUE: &[(&str, Shape)] = &[
    ("vue.VNode", Shape::Element),
    ("vue.VNodeChild", Shape::Node),
    ("vue.Component", Shape::Callable),
    ("vue.DefineComponent", Shape::Callable),
    ("vue.FunctionalComponent", Shape::Callable),
    ("vue.Slot", Shape::Callable),
    ("vue.Ref", Shape::ValueBox),
    ("vue.ComputedRef", Shape::ValueBox),
    ("vue.PropType", Shape::FirstArg),
    ("vue.CSSProperties", Shape::EmptyObject),
    ("vue.HTMLAttributes", Shape::EmptyObject),
];

const SVELTE: &[(&str, Shape)] = &[
    ("svelte.Snippet", Shape::Callable),
    ("svelte.Component", Shape::Callable),
    ("svelte.ComponentType", Shape::Callable),
    ("svelte.SvelteComponent", Shape::Callable),
    ("svelte/elements.HTMLAttributes", Shape::EmptyObject),
    ("svelte/elements.HTMLButtonAttributes", Shape::EmptyObject),
    ("svelte/elements.HTMLInputAttributes", Shape::EmptyObject),
    ("svelte/elements.HTMLAnchorAttributes", Shape::EmptyObject),
    ("svelte/elements.SVGAttributes", Shape::EmptyObject),
    ("svelte/store.Writable", Shape::Opaque),
    ("svelte/store.Readable", Shape::Opaque),
];

#[cfg(test)]
#[path = "../tests/frameworks_tests.rs"]
mod frameworks_tests;
