//! Signature Generator
//!
//! Every caster describes its shape as a [`Descr`] tree. Rendering walks that
//! tree against the type registry and produces the host-facing type string;
//! a bound function's [`Signature`] is rendered once when its module is
//! built.
//!
//! Rendering rules:
//! - registered class → its display name, unbound class → its Rust type name
//! - `Option<T>` → `Optional[T]`
//! - `UnionN<..>` → `Union[A, B, ...]`, with `()` alternatives as `None`
//! - an optional union in return position flattens to `Union[None, A, ...]`
//! - `Vec<T>` → `list[T]`, tuples → `tuple[A, B]`, maps → `dict[K, V]`
//! - `Function<(A, B), R>` → `Callable[[A, B], R]`

use std::any::TypeId;

use crate::registry::TypeRegistry;

/// Shape of a caster, as far as signatures are concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descr {
    /// A fixed host type name (`int`, `str`, `None`, `list`, ...).
    Name(&'static str),
    /// A native class; its name comes from the registry.
    Class {
        type_id: TypeId,
        rust_name: &'static str,
    },
    Optional(Box<Descr>),
    Union(Vec<Descr>),
    List(Box<Descr>),
    Tuple(Vec<Descr>),
    Dict(Box<Descr>, Box<Descr>),
    Callable {
        params: Vec<Descr>,
        ret: Box<Descr>,
    },
}

/// Which side of a call a type appears on.
///
/// Arguments flow host → native, returns native → host. Parameters of a
/// callable parameter flow the other way, so nested callables flip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Argument,
    Return,
}

impl Position {
    fn flip(self) -> Self {
        match self {
            Position::Argument => Position::Return,
            Position::Return => Position::Argument,
        }
    }
}

impl Descr {
    pub fn class<T: 'static>() -> Self {
        Descr::Class {
            type_id: TypeId::of::<T>(),
            rust_name: std::any::type_name::<T>(),
        }
    }

    pub fn optional(inner: Descr) -> Self {
        Descr::Optional(Box::new(inner))
    }

    pub fn list(element: Descr) -> Self {
        Descr::List(Box::new(element))
    }

    pub fn dict(key: Descr, value: Descr) -> Self {
        Descr::Dict(Box::new(key), Box::new(value))
    }

    pub fn callable(params: Vec<Descr>, ret: Descr) -> Self {
        Descr::Callable {
            params,
            ret: Box::new(ret),
        }
    }

    fn is_none(&self) -> bool {
        matches!(self, Descr::Name("None"))
    }

    /// Render this shape as a host type string.
    pub fn render(&self, registry: &TypeRegistry, position: Position) -> String {
        let mut out = String::new();
        self.render_into(&mut out, registry, position);
        out
    }

    fn render_into(&self, out: &mut String, registry: &TypeRegistry, position: Position) {
        match self {
            Descr::Name(name) => out.push_str(name),
            Descr::Class { type_id, rust_name } => {
                out.push_str(registry.display_name(*type_id).unwrap_or(*rust_name))
            }
            Descr::Optional(inner) => match (&**inner, position) {
                (Descr::Union(alts), Position::Return) => {
                    out.push_str("Union[None");
                    for alt in alts.iter().filter(|a| !a.is_none()) {
                        out.push_str(", ");
                        alt.render_into(out, registry, position);
                    }
                    out.push(']');
                }
                (inner, _) if inner.is_none() => out.push_str("None"),
                (inner, _) => {
                    out.push_str("Optional[");
                    inner.render_into(out, registry, position);
                    out.push(']');
                }
            },
            Descr::Union(alts) => {
                out.push_str("Union[");
                render_list(out, alts, registry, position);
                out.push(']');
            }
            Descr::List(element) => {
                out.push_str("list[");
                element.render_into(out, registry, position);
                out.push(']');
            }
            Descr::Tuple(items) if items.is_empty() => out.push_str("tuple[()]"),
            Descr::Tuple(items) => {
                out.push_str("tuple[");
                render_list(out, items, registry, position);
                out.push(']');
            }
            Descr::Dict(key, value) => {
                out.push_str("dict[");
                key.render_into(out, registry, position);
                out.push_str(", ");
                value.render_into(out, registry, position);
                out.push(']');
            }
            Descr::Callable { params, ret } => {
                out.push_str("Callable[[");
                render_list(out, params, registry, position.flip());
                out.push_str("], ");
                ret.render_into(out, registry, position.flip());
                out.push(']');
            }
        }
    }
}

fn render_list(out: &mut String, items: &[Descr], registry: &TypeRegistry, position: Position) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.render_into(out, registry, position);
    }
}

// ============================================================================
// Function signatures
// ============================================================================

/// One parameter of a bound function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSig {
    /// `None` for positional-only parameters bound without names.
    pub name: Option<String>,
    pub descr: Descr,
    /// Host repr of the default value.
    pub default: Option<String>,
}

/// The complete signature of a bound function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub params: Vec<ParamSig>,
    pub ret: Descr,
}

impl Signature {
    /// Host name of parameter `index` for a function with `count` unnamed
    /// parameters.
    pub fn positional_name(index: usize, count: usize) -> String {
        if count == 1 {
            "arg".to_string()
        } else {
            format!("arg{index}")
        }
    }

    /// `name(x: T = d, ...) -> R`
    pub fn render(&self, registry: &TypeRegistry) -> String {
        let mut out = String::new();
        out.push_str(&self.name);
        out.push('(');
        let count = self.params.len();
        let mut positional_only = false;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match &param.name {
                Some(name) => out.push_str(name),
                None => {
                    positional_only = true;
                    out.push_str(&Self::positional_name(i, count));
                }
            }
            out.push_str(": ");
            param.descr.render_into(&mut out, registry, Position::Argument);
            if let Some(default) = &param.default {
                out.push_str(" = ");
                out.push_str(default);
            }
        }
        if positional_only {
            out.push_str(", /");
        }
        out.push_str(") -> ");
        self.ret.render_into(&mut out, registry, Position::Return);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register::<Widget>("ui.Widget").unwrap();
        registry
    }

    #[test]
    fn optional_union_flattens_only_on_return() {
        let registry = registry();
        let d = Descr::optional(Descr::Union(vec![
            Descr::Name("list"),
            Descr::Name("tuple"),
            Descr::Name("int"),
        ]));
        assert_eq!(
            d.render(&registry, Position::Argument),
            "Optional[Union[list, tuple, int]]"
        );
        assert_eq!(
            d.render(&registry, Position::Return),
            "Union[None, list, tuple, int]"
        );
    }

    #[test]
    fn unbound_class_falls_back_to_rust_name() {
        struct Hidden;
        let registry = registry();
        assert_eq!(
            Descr::class::<Widget>().render(&registry, Position::Argument),
            "ui.Widget"
        );
        let hidden = Descr::class::<Hidden>().render(&registry, Position::Argument);
        assert!(hidden.ends_with("Hidden"), "{hidden}");
    }

    #[test]
    fn nested_shapes() {
        let registry = registry();
        let d = Descr::dict(
            Descr::Name("str"),
            Descr::list(Descr::Tuple(vec![Descr::class::<Widget>(), Descr::Name("float")])),
        );
        assert_eq!(
            d.render(&registry, Position::Return),
            "dict[str, list[tuple[ui.Widget, float]]]"
        );
        let f = Descr::callable(vec![Descr::Name("int")], Descr::Name("int"));
        assert_eq!(f.render(&registry, Position::Argument), "Callable[[int], int]");
    }

    #[test]
    fn renders_full_signature() {
        let registry = registry();
        let named = Signature {
            name: "f".into(),
            params: vec![ParamSig {
                name: Some("x".into()),
                descr: Descr::optional(Descr::Name("int")),
                default: Some("None".into()),
            }],
            ret: Descr::optional(Descr::Name("int")),
        };
        assert_eq!(
            named.render(&registry),
            "f(x: Optional[int] = None) -> Optional[int]"
        );

        let unnamed = Signature {
            name: "g".into(),
            params: vec![
                ParamSig { name: None, descr: Descr::Name("int"), default: None },
                ParamSig { name: None, descr: Descr::class::<Widget>(), default: None },
            ],
            ret: Descr::Name("None"),
        };
        assert_eq!(
            unnamed.render(&registry),
            "g(arg0: int, arg1: ui.Widget, /) -> None"
        );
        // Rendering is pure.
        assert_eq!(unnamed.render(&registry), unnamed.render(&registry));
    }
}
