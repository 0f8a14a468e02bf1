//! Object shapes from interface, type-literal and class members.

use tspreview_checker::oracle::{Binding, resolve_entity};
use tspreview_checker::{BoundFile, ModuleExtension};
use tspreview_syntax::ast::{
    ClassDecl, ClassMemberKind, HeritageClause, IndexSignature, InterfaceDecl, Modifiers,
    PropertyName, TypeMember, TypeMemberKind,
};
use tspreview_types::{Fields, ValueType};

use super::queries::Inference;
use super::{Context, TypeGraphResolver};

/// Accumulates the members of one object type. Later members replace
/// earlier ones of the same name, so bases are added before own members.
#[derive(Default)]
pub(crate) struct ObjectBuilder {
    fields: Fields,
    index: Vec<(ValueType, ValueType)>,
    callable: bool,
}

impl ObjectBuilder {
    pub(crate) fn field(&mut self, name: String, ty: ValueType, optional: bool) {
        let ty = if optional {
            ValueType::optional(ty)
        } else {
            ty
        };
        self.fields.insert(name, ty);
    }

    /// Accessors never replace a property or the other accessor.
    fn accessor(&mut self, name: String, ty: ValueType) {
        self.fields.entry(name).or_insert(ty);
    }

    /// Merge an already-resolved base type.
    pub(crate) fn base(&mut self, base: ValueType) {
        match base {
            ValueType::Object { fields } => self.fields.extend(fields),
            ValueType::Record { key, value } => self.index.push((*key, *value)),
            ValueType::Function => self.callable = true,
            ValueType::Intersection { types } => {
                for ty in types {
                    self.base(ty);
                }
            }
            _ => {}
        }
    }

    pub(crate) fn finish(self) -> ValueType {
        if self.fields.is_empty() {
            if !self.index.is_empty() {
                let (keys, values): (Vec<_>, Vec<_>) = self.index.into_iter().unzip();
                return ValueType::record(ValueType::union(keys), ValueType::union(values));
            }
            if self.callable {
                return ValueType::Function;
            }
        }
        ValueType::object(self.fields)
    }
}

impl TypeGraphResolver<'_> {
    pub(crate) fn object_from_members(&mut self, cx: &Context, members: &[TypeMember]) -> ValueType {
        let mut builder = ObjectBuilder::default();
        self.add_members(cx, &mut builder, members);
        builder.finish()
    }

    /// Interface declarations of one symbol: every base of every
    /// declaration first, then the members in declaration order.
    pub(crate) fn add_interfaces(
        &mut self,
        cx: &Context,
        builder: &mut ObjectBuilder,
        interfaces: &[&InterfaceDecl],
    ) {
        for decl in interfaces {
            for base in &decl.extends {
                let resolved = self.resolve_node(cx, base);
                builder.base(self.dereference(&resolved));
            }
        }
        for decl in interfaces {
            self.add_members(cx, builder, &decl.members);
        }
    }

    fn add_members(&mut self, cx: &Context, builder: &mut ObjectBuilder, members: &[TypeMember]) {
        for member in members {
            match &member.kind {
                TypeMemberKind::Property {
                    name, optional, ty, ..
                } => {
                    let Some(name) = self.member_name(cx, name) else {
                        continue;
                    };
                    let ty = match ty {
                        Some(ty) => self.resolve_node(cx, ty),
                        None => ValueType::Any,
                    };
                    builder.field(name, ty, *optional);
                }
                TypeMemberKind::Method { name, optional, .. } => {
                    if let Some(name) = self.member_name(cx, name) {
                        builder.field(name, ValueType::Function, *optional);
                    }
                }
                TypeMemberKind::Call(_) | TypeMemberKind::Construct(_) => builder.callable = true,
                TypeMemberKind::Index(signature) => self.add_index(cx, builder, signature),
                TypeMemberKind::GetAccessor { name, ty } | TypeMemberKind::SetAccessor { name, ty } => {
                    let Some(name) = self.member_name(cx, name) else {
                        continue;
                    };
                    let ty = match ty {
                        Some(ty) => self.resolve_node(cx, ty),
                        None => ValueType::Any,
                    };
                    builder.accessor(name, ty);
                }
            }
        }
    }

    fn add_index(&mut self, cx: &Context, builder: &mut ObjectBuilder, signature: &IndexSignature) {
        let key = self.resolve_node(cx, &signature.key_type);
        let value = match &signature.ty {
            Some(ty) => self.resolve_node(cx, ty),
            None => ValueType::Any,
        };
        builder.index.push((key, value));
    }

    /// Public instance members of a class, including parameter properties
    /// and the members of a project-local base class.
    pub(crate) fn add_class_members(
        &mut self,
        cx: &Context,
        builder: &mut ObjectBuilder,
        class: &ClassDecl,
    ) {
        if let Some(heritage) = &class.extends {
            self.add_class_base(cx, builder, heritage);
        }

        for member in &class.members {
            if member.modifiers.is_hidden() {
                continue;
            }
            match &member.kind {
                ClassMemberKind::Property {
                    name,
                    optional,
                    type_ann,
                    init,
                } => {
                    let Some(name) = self.member_name(cx, name) else {
                        continue;
                    };
                    let ty = match (type_ann, init) {
                        (Some(ty), _) => self.resolve_node(cx, ty),
                        (None, Some(init)) => self.infer_expression(cx, init, Inference::Widened),
                        (None, None) => ValueType::Any,
                    };
                    builder.field(name, ty, *optional);
                }
                ClassMemberKind::Method { name, optional, .. } => {
                    if let Some(name) = self.member_name(cx, name) {
                        builder.field(name, ValueType::Function, *optional);
                    }
                }
                ClassMemberKind::Constructor(constructor) => {
                    for param in &constructor.params {
                        let is_property = param
                            .modifiers
                            .intersects(Modifiers::PUBLIC | Modifiers::READONLY)
                            && !param.modifiers.is_hidden();
                        let Some(ident) = param.pattern.as_identifier().filter(|_| is_property)
                        else {
                            continue;
                        };
                        let ty = match &param.type_ann {
                            Some(ty) => self.resolve_node(cx, ty),
                            None => ValueType::Any,
                        };
                        let optional = param.optional || param.default.is_some();
                        builder.field(ident.name.clone(), ty, optional);
                    }
                }
                ClassMemberKind::GetAccessor { name, return_type: ty }
                | ClassMemberKind::SetAccessor {
                    name,
                    param_type: ty,
                } => {
                    let Some(name) = self.member_name(cx, name) else {
                        continue;
                    };
                    let ty = match ty {
                        Some(ty) => self.resolve_node(cx, ty),
                        None => ValueType::Any,
                    };
                    builder.accessor(name, ty);
                }
                ClassMemberKind::Index(signature) => self.add_index(cx, builder, signature),
                ClassMemberKind::StaticBlock => {}
            }
        }
    }

    /// Library base classes (`React.Component`) contribute nothing a preview
    /// needs; project classes are expanded.
    fn add_class_base(&mut self, cx: &Context, builder: &mut ObjectBuilder, heritage: &HeritageClause) {
        let Some(text) = heritage.expression.skip_outer().entity_text() else {
            return;
        };
        let segments: Vec<&str> = text.split('.').collect();
        let Some(resolution) = resolve_entity(self.oracle, &cx.file, cx.scope, &segments) else {
            return;
        };
        let Binding::Symbol(symbol) = resolution.binding else {
            return;
        };
        // Script files give their own classes global names, so a name alone
        // does not mark a library class.
        if resolution.fully_qualified_name.is_some() && is_library_file(&symbol.file) {
            return;
        }
        let args: Vec<ValueType> = heritage
            .type_args
            .iter()
            .map(|arg| self.resolve_node(cx, arg))
            .collect();
        if let Some(base) = self.resolve_symbol_type(&symbol, args) {
            builder.base(self.dereference(&base));
        }
    }

    fn member_name(&mut self, cx: &Context, name: &PropertyName) -> Option<String> {
        let text = name.as_text();
        if text.is_none() && !matches!(name, PropertyName::PrivateName(_)) {
            self.warn(cx, "computed member name skipped");
        }
        text
    }
}

/// Declaration files and installed packages.
fn is_library_file(file: &BoundFile) -> bool {
    file.package_name.is_some() || ModuleExtension::from_path(&file.path).is_declaration()
}
