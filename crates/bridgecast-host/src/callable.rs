//! Host callables and argument binding
//!
//! [`bind_arguments`] matches positional and keyword arguments against a
//! parameter list the way the host does, producing the host's TypeError
//! messages on arity mismatches. Both [`Lambda`] and natively bound functions
//! go through it.

use std::fmt;

use crate::error::HostError;
use crate::object::Object;

/// Anything the host can call.
pub trait Callable {
    fn name(&self) -> &str;

    fn call(&self, args: &[Object], kwargs: &[(&str, Object)]) -> Result<Object, HostError>;

    fn doc(&self) -> Option<&str> {
        None
    }
}

/// A formal parameter of a host callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// Whether the parameter may be passed by keyword.
    pub keyword: bool,
    pub default: Option<Object>,
}

impl Parameter {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyword: true,
            default: None,
        }
    }

    pub fn positional_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyword: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Object) -> Self {
        self.default = Some(default);
        self
    }
}

/// Resolve call arguments to exactly one object per parameter.
pub fn bind_arguments(
    function: &str,
    params: &[Parameter],
    args: &[Object],
    kwargs: &[(&str, Object)],
) -> Result<Vec<Object>, HostError> {
    if args.len() > params.len() {
        return Err(too_many_positional(function, params.len(), args.len()));
    }

    let mut slots: Vec<Option<Object>> = vec![None; params.len()];
    for (slot, arg) in slots.iter_mut().zip(args) {
        *slot = Some(arg.clone());
    }

    for (key, value) in kwargs {
        let index = params
            .iter()
            .position(|p| p.keyword && p.name == *key)
            .ok_or_else(|| unexpected_keyword(function, key))?;
        if slots[index].is_some() {
            return Err(multiple_values(function, key));
        }
        slots[index] = Some(value.clone());
    }

    let mut missing = Vec::new();
    let mut bound = Vec::with_capacity(params.len());
    for (slot, param) in slots.into_iter().zip(params) {
        match slot.or_else(|| param.default.clone()) {
            Some(value) => bound.push(value),
            None => missing.push(param.name.as_str()),
        }
    }
    if !missing.is_empty() {
        return Err(missing_arguments(function, &missing));
    }
    Ok(bound)
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// `f() missing 2 required positional arguments: 'x' and 'y'`
pub fn missing_arguments(function: &str, names: &[&str]) -> HostError {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    let list = match quoted.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{a} and {b}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    };
    HostError::type_error(format!(
        "{function}() missing {} required positional argument{}: {list}",
        names.len(),
        plural(names.len())
    ))
}

pub fn too_many_positional(function: &str, takes: usize, given: usize) -> HostError {
    HostError::type_error(format!(
        "{function}() takes {takes} positional argument{} but {given} {} given",
        plural(takes),
        if given == 1 { "was" } else { "were" }
    ))
}

pub fn unexpected_keyword(function: &str, key: &str) -> HostError {
    HostError::type_error(format!(
        "{function}() got an unexpected keyword argument '{key}'"
    ))
}

pub fn multiple_values(function: &str, key: &str) -> HostError {
    HostError::type_error(format!(
        "{function}() got multiple values for argument '{key}'"
    ))
}

/// Raised when arguments bind but do not convert to any supported signature.
pub fn incompatible_arguments(
    function: &str,
    signature: &str,
    args: &[Object],
    kwargs: &[(&str, Object)],
) -> HostError {
    let mut invoked: Vec<String> = args.iter().map(|a| a.type_name().to_string()).collect();
    invoked.extend(kwargs.iter().map(|(k, v)| format!("{k}={}", v.type_name())));
    HostError::type_error(format!(
        "{function}(): incompatible function arguments. The following argument types are supported:\n    1. {signature}\n\nInvoked with types: {}",
        invoked.join(", ")
    ))
}

type Body = Box<dyn Fn(&[Object]) -> Result<Object, HostError>>;

/// A host-side function with required positional parameters.
pub struct Lambda {
    name: String,
    params: Vec<Parameter>,
    body: Body,
}

impl Lambda {
    pub fn new<F>(params: &[&str], body: F) -> Self
    where
        F: Fn(&[Object]) -> Result<Object, HostError> + 'static,
    {
        Self::named("<lambda>", params, body)
    }

    pub fn named<F>(name: &str, params: &[&str], body: F) -> Self
    where
        F: Fn(&[Object]) -> Result<Object, HostError> + 'static,
    {
        Self {
            name: name.to_string(),
            params: params.iter().map(|p| Parameter::required(*p)).collect(),
            body: Box::new(body),
        }
    }

    pub fn into_object(self) -> Object {
        Object::function(self)
    }
}

impl Callable for Lambda {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: &[Object], kwargs: &[(&str, Object)]) -> Result<Object, HostError> {
        let bound = bind_arguments(&self.name, &self.params, args, kwargs)?;
        (self.body)(&bound)
    }
}

impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lambda")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add() -> Object {
        Lambda::new(&["x", "y"], |args| match (&args[0], &args[1]) {
            (Object::Int(a), Object::Int(b)) => Ok(Object::Int(a + b)),
            _ => Err(HostError::type_error("unsupported operand")),
        })
        .into_object()
    }

    #[test]
    fn calls_with_positional_and_keyword() {
        let f = add();
        assert_eq!(f.call(&[Object::Int(1), Object::Int(2)], &[]).unwrap(), Object::Int(3));
        assert_eq!(
            f.call(&[Object::Int(1)], &[("y", Object::Int(5))]).unwrap(),
            Object::Int(6)
        );
    }

    #[test]
    fn missing_arguments_are_pluralized() {
        let f = add();
        let one = f.call(&[Object::Int(1)], &[]).unwrap_err();
        assert_eq!(
            one.message,
            "<lambda>() missing 1 required positional argument: 'y'"
        );
        let two = f.call(&[], &[]).unwrap_err();
        assert_eq!(
            two.message,
            "<lambda>() missing 2 required positional arguments: 'x' and 'y'"
        );
        let three = missing_arguments("g", &["a", "b", "c"]);
        assert_eq!(
            three.message,
            "g() missing 3 required positional arguments: 'a', 'b', and 'c'"
        );
    }

    #[test]
    fn too_many_and_bad_keywords() {
        let f = add();
        let err = f
            .call(&[Object::Int(1), Object::Int(2), Object::Int(3)], &[])
            .unwrap_err();
        assert_eq!(
            err.message,
            "<lambda>() takes 2 positional arguments but 3 were given"
        );
        let err = f
            .call(&[Object::Int(1)], &[("x", Object::Int(2))])
            .unwrap_err();
        assert_eq!(err.message, "<lambda>() got multiple values for argument 'x'");
        let err = f.call(&[], &[("z", Object::Int(2))]).unwrap_err();
        assert_eq!(err.message, "<lambda>() got an unexpected keyword argument 'z'");
    }

    #[test]
    fn positional_only_parameters_reject_keywords() {
        let params = [Parameter::positional_only("arg")];
        let err = bind_arguments("f", &params, &[], &[("arg", Object::None)]).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn defaults_fill_omitted_arguments() {
        let params = [Parameter::required("x").with_default(Object::None)];
        let bound = bind_arguments("f", &params, &[], &[]).unwrap();
        assert_eq!(bound, vec![Object::None]);
    }

    #[test]
    fn incompatible_lists_invoked_types() {
        let err = incompatible_arguments(
            "f",
            "f(x: int) -> None",
            &[Object::str("a")],
            &[("k", Object::None)],
        );
        assert!(err.is_type_error());
        assert_eq!(
            err.message,
            "f(): incompatible function arguments. The following argument types are supported:\n    1. f(x: int) -> None\n\nInvoked with types: str, k=NoneType"
        );
    }
}
