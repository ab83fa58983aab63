//! Type name formatting for [`TypeStore`].
//!
//! Produces the [`TypeName`] forms override matching looks at. Rendering is
//! natively recursive over type arguments and object members, so it runs
//! under a `RecursionGuard`; anything past the guard's limits, and any type
//! nested inside itself, renders as `...`.

use crate::recursion::{RecursionGuard, RecursionProfile};
use crate::store::{ObjectShape, TypeData, TypeStore};
use crate::type_name::TypeName;
use crate::types::{ObjectKind, TypeId, TypeRef};

const ELIDED: &str = "...";

/// Renders types of one [`TypeStore`] to text.
pub struct TypeFormatter<'a> {
    store: &'a TypeStore,
    guard: RecursionGuard<TypeId>,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(store: &'a TypeStore) -> Self {
        Self {
            store,
            guard: RecursionGuard::with_profile(RecursionProfile::TypeName),
        }
    }

    /// All textual forms of `ty`.
    pub fn type_name(&mut self, ty: TypeRef) -> TypeName {
        let mut name = self.names(ty.id);
        name.written = ty.node.and_then(|node| self.store.written_text(node));
        name
    }

    /// The evaluated rendering of `ty`.
    pub fn format(&mut self, ty: TypeId) -> String {
        if !self.guard.enter(ty).is_entered() {
            return ELIDED.to_string();
        }
        let text = self.format_inner(ty);
        self.guard.leave(ty);
        text
    }

    fn names(&mut self, ty: TypeId) -> TypeName {
        let mut name = self.declared_names(ty);
        name.evaluated = self.format(ty);
        name
    }

    /// Every form except `evaluated` and `written`.
    fn declared_names(&mut self, ty: TypeId) -> TypeName {
        let data = self.store.lookup(ty);
        let (name, arguments) = match data.as_deref() {
            Some(TypeData::Intrinsic(kind)) => (Some(kind.name().to_string()), Vec::new()),
            Some(TypeData::TypeParameter(symbol)) => (self.store.symbol_name(*symbol), Vec::new()),
            Some(TypeData::Object(shape)) => (
                shape.symbol.and_then(|symbol| self.store.symbol_name(symbol)),
                shape.type_arguments.to_vec(),
            ),
            _ => (None, Vec::new()),
        };
        let name_with_arguments = match &name {
            Some(name) if !arguments.is_empty() => {
                Some(self.with_arguments(name, &arguments, ty))
            }
            _ => None,
        };

        let alias_info = self.store.alias(ty);
        let alias = alias_info
            .as_ref()
            .and_then(|info| self.store.symbol_name(info.symbol));
        let alias_with_arguments = match (&alias, &alias_info) {
            (Some(alias), Some(info)) if !info.type_arguments.is_empty() => {
                Some(self.with_arguments(alias, &info.type_arguments, ty))
            }
            _ => None,
        };

        TypeName {
            name,
            name_with_arguments,
            alias,
            alias_with_arguments,
            evaluated: String::new(),
            written: None,
        }
    }

    /// `Name<A, B>`, where an argument equal to `owner` renders as `name`.
    fn with_arguments(&mut self, name: &str, arguments: &[TypeId], owner: TypeId) -> String {
        let rendered: Vec<String> = arguments
            .iter()
            .map(|argument| {
                if *argument == owner {
                    name.to_string()
                } else {
                    self.argument(*argument)
                }
            })
            .collect();
        format!("{name}<{}>", rendered.join(", "))
    }

    fn argument(&mut self, ty: TypeId) -> String {
        if !self.guard.enter(ty).is_entered() {
            return ELIDED.to_string();
        }
        let mut name = self.declared_names(ty);
        name.evaluated = self.format_inner(ty);
        self.guard.leave(ty);
        name.as_argument().to_string()
    }

    fn format_inner(&mut self, ty: TypeId) -> String {
        if let Some(alias) = self.store.alias(ty)
            && let Some(name) = self.store.symbol_name(alias.symbol)
        {
            if alias.type_arguments.is_empty() {
                return name;
            }
            let arguments: Vec<String> = alias
                .type_arguments
                .iter()
                .map(|argument| self.format(*argument))
                .collect();
            return format!("{name}<{}>", arguments.join(", "));
        }

        let Some(data) = self.store.lookup(ty) else {
            return "error".to_string();
        };
        match data.as_ref() {
            TypeData::Pending | TypeData::Error => "error".to_string(),
            TypeData::Intrinsic(kind) => kind.name().to_string(),
            TypeData::Literal(text) => text.clone(),
            TypeData::TypeParameter(symbol) => self
                .store
                .symbol_name(*symbol)
                .unwrap_or_else(|| "T".to_string()),
            TypeData::Union(members) => self.join(members, " | "),
            TypeData::Intersection(members) => self.join(members, " & "),
            TypeData::Conditional(conditional) => format!(
                "{} extends {} ? {} : {}",
                self.format(conditional.check_type),
                self.format(conditional.extends_type),
                self.format(conditional.true_type.id),
                self.format(conditional.false_type.id),
            ),
            TypeData::Object(shape) => self.format_object(shape),
        }
    }

    fn join(&mut self, members: &[TypeId], separator: &str) -> String {
        let parts: Vec<String> = members
            .iter()
            .map(|member| self.format_operand(*member))
            .collect();
        parts.join(separator)
    }

    /// Formats `ty` where it is an operand of `|`, `&` or `[]`.
    fn format_operand(&mut self, ty: TypeId) -> String {
        let text = self.format(ty);
        let needs_parens = self.store.alias(ty).is_none()
            && match self.store.lookup(ty).as_deref() {
                Some(TypeData::Union(_) | TypeData::Intersection(_) | TypeData::Conditional(_)) => {
                    true
                }
                Some(TypeData::Object(shape)) => {
                    shape.callable && shape.properties.is_empty() && shape.symbol.is_none()
                }
                _ => false,
            };
        if needs_parens {
            format!("({text})")
        } else {
            text
        }
    }

    fn format_object(&mut self, shape: &ObjectShape) -> String {
        let symbol_name = shape
            .symbol
            .and_then(|symbol| self.store.symbol_name(symbol));
        match shape.kind {
            ObjectKind::Array => {
                let element = shape.type_arguments.first().copied().unwrap_or(TypeId::UNKNOWN);
                let element = self.format_operand(element);
                if symbol_name.as_deref() == Some("ReadonlyArray") {
                    format!("readonly {element}[]")
                } else {
                    format!("{element}[]")
                }
            }
            ObjectKind::Tuple { readonly } => {
                let elements: Vec<String> = shape
                    .type_arguments
                    .iter()
                    .map(|element| self.format(*element))
                    .collect();
                let prefix = if readonly { "readonly " } else { "" };
                format!("{prefix}[{}]", elements.join(", "))
            }
            ObjectKind::Plain => match symbol_name {
                Some(name) if shape.type_arguments.is_empty() => name,
                Some(name) => {
                    let arguments: Vec<String> = shape
                        .type_arguments
                        .iter()
                        .map(|argument| self.format(*argument))
                        .collect();
                    format!("{name}<{}>", arguments.join(", "))
                }
                None => self.format_literal(shape),
            },
        }
    }

    fn format_literal(&mut self, shape: &ObjectShape) -> String {
        if shape.callable
            && shape.properties.is_empty()
            && shape.string_index.is_none()
            && shape.number_index.is_none()
        {
            return "() => unknown".to_string();
        }

        let mut members = Vec::new();
        if shape.callable {
            members.push("(): unknown;".to_string());
        }
        for (key, signature) in [("string", shape.string_index), ("number", shape.number_index)] {
            if let Some(signature) = signature {
                let prefix = if signature.readonly { "readonly " } else { "" };
                let value = self.format(signature.value_type);
                members.push(format!("{prefix}[key: {key}]: {value};"));
            }
        }
        for property in &shape.properties {
            let prefix = if property.is_readonly() { "readonly " } else { "" };
            let value = self.format(property.type_id);
            members.push(format!("{prefix}{}: {value};", property.name));
        }

        if members.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", members.join(" "))
        }
    }
}
