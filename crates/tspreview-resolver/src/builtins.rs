//! Builtin library types.
//!
//! `lib.d.ts` is never loaded. The global types previews meet in props are
//! modelled directly from this table and applied by the resolver.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `Array<T>`, `ReadonlyArray<T>`, `Iterable<T>`, `ArrayLike<T>`.
    Array,
    Set,
    Map,
    Promise,
    Record,
    Partial,
    Required,
    Readonly,
    Pick,
    Omit,
    Exclude,
    Extract,
    NonNullable,
    Awaited,
    ReturnType,
    Parameters,
    InstanceType,
    Uppercase,
    Lowercase,
    Capitalize,
    Uncapitalize,
    /// Boxed primitives.
    String,
    Number,
    Boolean,
    Object,
    Function,
    /// Types previews never construct: `Date`, `RegExp`, `Error`, DOM nodes.
    Opaque,
    /// `ComponentProps<typeof X>` and friends: the props of a component.
    ComponentProps,
}

impl Builtin {
    /// Whether the builtin reads its type arguments as syntax rather than
    /// as resolved types.
    pub fn takes_syntax(self) -> bool {
        matches!(
            self,
            Builtin::ReturnType | Builtin::Parameters | Builtin::InstanceType | Builtin::ComponentProps
        )
    }
}

static BUILTINS: Lazy<FxHashMap<&'static str, Builtin>> = Lazy::new(|| {
    [
        ("Array", Builtin::Array),
        ("ReadonlyArray", Builtin::Array),
        ("Iterable", Builtin::Array),
        ("ArrayLike", Builtin::Array),
        ("Set", Builtin::Set),
        ("ReadonlySet", Builtin::Set),
        ("WeakSet", Builtin::Set),
        ("Map", Builtin::Map),
        ("ReadonlyMap", Builtin::Map),
        ("WeakMap", Builtin::Map),
        ("Promise", Builtin::Promise),
        ("PromiseLike", Builtin::Promise),
        ("Record", Builtin::Record),
        ("Partial", Builtin::Partial),
        ("Required", Builtin::Required),
        ("Readonly", Builtin::Readonly),
        ("Pick", Builtin::Pick),
        ("Omit", Builtin::Omit),
        ("Exclude", Builtin::Exclude),
        ("Extract", Builtin::Extract),
        ("NonNullable", Builtin::NonNullable),
        ("Awaited", Builtin::Awaited),
        ("ReturnType", Builtin::ReturnType),
        ("Parameters", Builtin::Parameters),
        ("InstanceType", Builtin::InstanceType),
        ("Uppercase", Builtin::Uppercase),
        ("Lowercase", Builtin::Lowercase),
        ("Capitalize", Builtin::Capitalize),
        ("Uncapitalize", Builtin::Uncapitalize),
        ("String", Builtin::String),
        ("Number", Builtin::Number),
        ("Boolean", Builtin::Boolean),
        ("Object", Builtin::Object),
        ("Function", Builtin::Function),
        ("CallableFunction", Builtin::Function),
        ("Date", Builtin::Opaque),
        ("RegExp", Builtin::Opaque),
        ("Error", Builtin::Opaque),
        ("Symbol", Builtin::Opaque),
        ("BigInt", Builtin::Opaque),
        ("File", Builtin::Opaque),
        ("Blob", Builtin::Opaque),
        ("Event", Builtin::Opaque),
        ("Element", Builtin::Opaque),
        ("HTMLElement", Builtin::Opaque),
        ("Node", Builtin::Opaque),
        ("Window", Builtin::Opaque),
        ("Document", Builtin::Opaque),
        ("ComponentProps", Builtin::ComponentProps),
        ("ComponentPropsWithRef", Builtin::ComponentProps),
        ("ComponentPropsWithoutRef", Builtin::ComponentProps),
    ]
    .into_iter()
    .collect()
});

/// Builtin modelled for a global type name.
pub fn lookup(name: &str) -> Option<Builtin> {
    if let Some(builtin) = BUILTINS.get(name) {
        return Some(*builtin);
    }
    // DOM element and event interfaces (`HTMLDivElement`, `MouseEvent`).
    let element = (name.starts_with("HTML") || name.starts_with("SVG")) && name.ends_with("Element");
    let event = name.ends_with("Event") && name.len() > "Event".len();
    let dom_type = element || event;
    dom_type.then_some(Builtin::Opaque)
}

/// Builtins that exist on library namespaces as well (`React.ComponentProps`).
pub fn lookup_library(qualified_name: &str) -> Option<Builtin> {
    let last = qualified_name.rsplit('.').next()?;
    match lookup(last) {
        Some(Builtin::ComponentProps) => Some(Builtin::ComponentProps),
        _ => None,
    }
}

/// Apply a string intrinsic to a literal.
pub fn apply_string_intrinsic(builtin: Builtin, value: &str) -> String {
    match builtin {
        Builtin::Uppercase => value.to_uppercase(),
        Builtin::Lowercase => value.to_lowercase(),
        Builtin::Capitalize | Builtin::Uncapitalize => {
            let mut chars = value.chars();
            match chars.next() {
                Some(first) => {
                    let head: String = if builtin == Builtin::Capitalize {
                        first.to_uppercase().collect()
                    } else {
                        first.to_lowercase().collect()
                    };
                    head + chars.as_str()
                }
                None => String::new(),
            }
        }
        _ => value.to_string(),
    }
}

#[cfg(test)]
#[path = "../tests/builtins_tests.rs"]
mod builtins_tests;
