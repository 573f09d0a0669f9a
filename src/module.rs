//! Function Binding
//!
//! A [`ModuleBuilder`] collects native classes and functions under a module
//! name; [`ModuleBuilder::build`] freezes the type registry, renders every
//! signature once and returns a [`Module`] whose functions are host
//! callables.
//!
//! # Example
//!
//! ```ignore
//! let mut builder = ModuleBuilder::new("geometry");
//! builder
//!     .class::<Point>("Point")?
//!     .def("origin", || Point::default())?
//!     .def_with("scale", Params::new().arg("p").arg("k").default(2.0), |p: Ref<Point>, k: f64| {
//!         p.get_mut().scale(k)
//!     })?;
//! let module = builder.build();
//! module.call("origin", &[])?;
//! ```
//!
//! A call binds the host arguments to parameters, loads every argument,
//! materializes them, invokes the native function and converts its result.
//! Conversion failures raise a TypeError listing the supported signature;
//! failures after the native call has run only affect the returned value.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::cast::{CastError, Context, IntoHost, IntoReturn, Limits, NativeArgs, NativeFn};
use crate::host::callable::{bind_arguments, incompatible_arguments, Parameter};
use crate::host::{Callable, HostError, Object};
use crate::registry::{RegistryError, TypeRegistry};
use crate::signature::{Descr, ParamSig, Signature};

/// Message raised when a native return value cannot be converted.
pub const RETURN_CONVERSION_FAILED: &str = "Unable to convert function return value to a host type";

// ============================================================================
// Error Handling Infrastructure
// ============================================================================

/// Errors detected while defining a module.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("{function}: {given} parameter names given for a function of {arity} parameters")]
    ParamCount {
        function: String,
        given: usize,
        arity: usize,
    },

    #[error("{function}: parameter '{param}' without a default follows a parameter with one")]
    DefaultOrder { function: String, param: String },

    #[error("{function}: default value given before any parameter name")]
    DanglingDefault { function: String },

    #[error("function {0} is already defined")]
    DuplicateFunction(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A failed call, as seen by the module's error handler.
#[derive(Debug, Clone)]
pub struct FunctionError {
    pub module: String,
    pub function: String,
    pub kind: FunctionErrorKind,
}

impl fmt::Display for FunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call to {}.{} failed: {}", self.module, self.function, self.kind)
    }
}

impl std::error::Error for FunctionError {}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionErrorKind {
    /// Host arguments did not fit the parameter list.
    Binding(HostError),
    /// An argument could not be converted.
    Argument(CastError),
    /// The native function raised.
    Raised(HostError),
    /// The return value could not be converted.
    Return(CastError),
}

impl fmt::Display for FunctionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binding(e) => write!(f, "argument binding failed: {}", e),
            Self::Argument(e) => write!(f, "argument conversion failed: {}", e),
            Self::Raised(e) => write!(f, "raised {}", e),
            Self::Return(e) => write!(f, "return conversion failed: {}", e),
        }
    }
}

/// Observer for failed calls.
pub type ErrorHandler = Rc<dyn Fn(&FunctionError)>;

fn default_error_handler(err: &FunctionError) {
    tracing::debug!(module = %err.module, function = %err.function, "{}", err.kind);
}

/// Where a call failed.
enum CallError {
    Argument(CastError),
    Raised(CastError),
    Return(CastError),
}

type Invoker = Rc<dyn Fn(&[Object], &Context) -> Result<Object, CallError>>;

fn invoker<Args, F>(f: F) -> Invoker
where
    Args: NativeArgs + 'static,
    F: NativeFn<Args>,
{
    Rc::new(move |args: &[Object], cx: &Context| {
        let slots = Args::load(args, cx).map_err(CallError::Argument)?;
        let output = NativeFn::call(&f, Args::take(slots));
        let value = output.into_value().map_err(CallError::Raised)?;
        value.into_host(cx).map_err(CallError::Return)
    })
}

// ============================================================================
// Parameters
// ============================================================================

/// Names and defaults for a function's parameters.
///
/// Either every parameter is named or none is; unnamed parameters are
/// positional-only.
#[derive(Debug, Clone, Default)]
pub struct Params {
    entries: Vec<(String, Option<Object>)>,
    dangling_default: bool,
}

impl Params {
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    pub fn arg(mut self, name: impl Into<String>) -> Self {
        self.entries.push((name.into(), None));
        self
    }

    /// Default value of the most recently added parameter.
    pub fn default(mut self, value: impl Into<Object>) -> Self {
        match self.entries.last_mut() {
            Some(entry) => entry.1 = Some(value.into()),
            None => self.dangling_default = true,
        }
        self
    }
}

// ============================================================================
// Module builder
// ============================================================================

struct PendingFunction {
    name: String,
    params: Vec<ParamSig>,
    defaults: Vec<Option<Object>>,
    ret: Descr,
    invoke: Invoker,
}

/// Builder for a [`Module`].
pub struct ModuleBuilder {
    name: String,
    registry: TypeRegistry,
    limits: Limits,
    functions: Vec<PendingFunction>,
    error_handler: Option<ErrorHandler>,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: TypeRegistry::new(),
            limits: Limits::default(),
            functions: Vec::new(),
            error_handler: None,
        }
    }

    /// Register a native class under `<module>.<name>`.
    pub fn class<T: 'static>(&mut self, name: &str) -> Result<&mut Self, BindingError> {
        self.registry.register::<T>(format!("{}.{}", self.name, name))?;
        Ok(self)
    }

    pub fn with_limits(&mut self, limits: Limits) -> &mut Self {
        self.limits = limits;
        self
    }

    /// Set a handler observing every failed call.
    ///
    /// Without one, failures are logged at debug level.
    pub fn on_error<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&FunctionError) + 'static,
    {
        self.error_handler = Some(Rc::new(handler));
        self
    }

    /// Bind a native function with positional-only parameters.
    pub fn def<Args, F>(&mut self, name: &str, f: F) -> Result<&mut Self, BindingError>
    where
        Args: NativeArgs + 'static,
        F: NativeFn<Args>,
    {
        let params = Args::descrs()
            .into_iter()
            .map(|descr| ParamSig {
                name: None,
                descr,
                default: None,
            })
            .collect();
        let defaults = vec![None; Args::ARITY];
        self.push::<Args, F>(name, params, defaults, f)
    }

    /// Bind a native function with named parameters and defaults.
    pub fn def_with<Args, F>(&mut self, name: &str, params: Params, f: F) -> Result<&mut Self, BindingError>
    where
        Args: NativeArgs + 'static,
        F: NativeFn<Args>,
    {
        if params.dangling_default {
            return Err(BindingError::DanglingDefault {
                function: name.to_string(),
            });
        }
        if params.entries.len() != Args::ARITY {
            return Err(BindingError::ParamCount {
                function: name.to_string(),
                given: params.entries.len(),
                arity: Args::ARITY,
            });
        }
        let mut seen_default = false;
        for (param, default) in &params.entries {
            match default {
                Some(_) => seen_default = true,
                None if seen_default => {
                    return Err(BindingError::DefaultOrder {
                        function: name.to_string(),
                        param: param.clone(),
                    })
                }
                None => {}
            }
        }

        let (sigs, defaults) = params
            .entries
            .into_iter()
            .zip(Args::descrs())
            .map(|((param, default), descr)| {
                let sig = ParamSig {
                    name: Some(param),
                    descr,
                    default: default.as_ref().map(Object::to_string),
                };
                (sig, default)
            })
            .unzip();
        self.push::<Args, F>(name, sigs, defaults, f)
    }

    fn push<Args, F>(
        &mut self,
        name: &str,
        params: Vec<ParamSig>,
        defaults: Vec<Option<Object>>,
        f: F,
    ) -> Result<&mut Self, BindingError>
    where
        Args: NativeArgs + 'static,
        F: NativeFn<Args>,
    {
        if self.functions.iter().any(|p| p.name == name) {
            return Err(BindingError::DuplicateFunction(format!("{}.{}", self.name, name)));
        }
        tracing::debug!(module = %self.name, function = name, arity = Args::ARITY, "bound function");
        self.functions.push(PendingFunction {
            name: name.to_string(),
            params,
            defaults,
            ret: <<F::Output as IntoReturn>::Value as crate::cast::HostType>::descr(),
            invoke: invoker::<Args, F>(f),
        });
        Ok(self)
    }

    /// Freeze the registry and render every signature.
    pub fn build(self) -> Module {
        let module: Rc<str> = Rc::from(self.name);
        let cx = Context::new(Rc::new(self.registry), self.limits);
        let error_handler: ErrorHandler = match self.error_handler {
            Some(handler) => handler,
            None => Rc::new(default_error_handler),
        };

        let mut index = HashMap::new();
        let mut functions = Vec::with_capacity(self.functions.len());
        for pending in self.functions {
            let signature = Signature {
                name: pending.name.clone(),
                params: pending.params,
                ret: pending.ret,
            };
            let count = signature.params.len();
            let params = signature
                .params
                .iter()
                .zip(pending.defaults)
                .enumerate()
                .map(|(i, (sig, default))| {
                    let param = match &sig.name {
                        Some(name) => Parameter::required(name.clone()),
                        None => Parameter::positional_only(Signature::positional_name(i, count)),
                    };
                    Parameter { default, ..param }
                })
                .collect();
            let rendered = signature.render(cx.registry());
            tracing::trace!(signature = %rendered, "rendered signature");

            index.insert(pending.name.clone(), functions.len());
            functions.push(Rc::new(BoundFunction {
                module: Rc::clone(&module),
                name: pending.name,
                params,
                signature,
                doc: rendered,
                invoke: pending.invoke,
                cx: cx.clone(),
                error_handler: Rc::clone(&error_handler),
            }));
        }

        Module {
            name: module,
            cx,
            functions,
            index,
        }
    }
}

// ============================================================================
// Bound functions
// ============================================================================

/// A native function exposed to the host.
pub struct BoundFunction {
    module: Rc<str>,
    name: String,
    params: Vec<Parameter>,
    signature: Signature,
    doc: String,
    invoke: Invoker,
    cx: Context,
    error_handler: ErrorHandler,
}

impl BoundFunction {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Rendered signature, memoized when the module was built.
    pub fn doc(&self) -> &str {
        &self.doc
    }

    fn report(&self, kind: FunctionErrorKind) {
        let error = FunctionError {
            module: self.module.to_string(),
            function: self.name.clone(),
            kind,
        };
        (self.error_handler)(&error);
    }

    fn incompatible(&self, args: &[Object], kwargs: &[(&str, Object)]) -> HostError {
        incompatible_arguments(&self.name, &self.doc, args, kwargs)
    }

    /// Call from the host with positional and keyword arguments.
    pub fn invoke(&self, args: &[Object], kwargs: &[(&str, Object)]) -> Result<Object, HostError> {
        let bound = match bind_arguments(&self.name, &self.params, args, kwargs) {
            Ok(bound) => bound,
            Err(e) => {
                self.report(FunctionErrorKind::Binding(e.clone()));
                return Err(e);
            }
        };
        tracing::trace!(module = %self.module, function = %self.name, args = bound.len(), "call");

        match (self.invoke)(&bound, &self.cx) {
            Ok(value) => Ok(value),
            Err(CallError::Argument(e)) => {
                self.report(FunctionErrorKind::Argument(e));
                Err(self.incompatible(args, kwargs))
            }
            Err(CallError::Raised(e)) => {
                let raised = HostError::from(e);
                self.report(FunctionErrorKind::Raised(raised.clone()));
                Err(raised)
            }
            Err(CallError::Return(e)) => {
                self.report(FunctionErrorKind::Return(e));
                Err(HostError::type_error(RETURN_CONVERSION_FAILED))
            }
        }
    }
}

impl Callable for BoundFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, args: &[Object], kwargs: &[(&str, Object)]) -> Result<Object, HostError> {
        self.invoke(args, kwargs)
    }

    fn doc(&self) -> Option<&str> {
        Some(&self.doc)
    }
}

impl fmt::Debug for BoundFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundFunction")
            .field("module", &self.module)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Module
// ============================================================================

/// A built module: a frozen type registry and its bound functions.
pub struct Module {
    name: Rc<str>,
    cx: Context,
    functions: Vec<Rc<BoundFunction>>,
    index: HashMap<String, usize>,
}

impl Module {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &Context {
        &self.cx
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.cx.registry()
    }

    pub fn function(&self, name: &str) -> Option<&BoundFunction> {
        self.index.get(name).map(|&i| &*self.functions[i])
    }

    /// Bound functions in definition order.
    pub fn functions(&self) -> impl Iterator<Item = &BoundFunction> {
        self.functions.iter().map(|f| &**f)
    }

    /// The function as a host object.
    pub fn get(&self, name: &str) -> Option<Object> {
        self.index.get(name).map(|&i| {
            let callable: Rc<dyn Callable> = self.functions[i].clone();
            Object::Function(callable)
        })
    }

    pub fn doc(&self, name: &str) -> Option<&str> {
        self.function(name).map(BoundFunction::doc)
    }

    pub fn call(&self, name: &str, args: &[Object]) -> Result<Object, HostError> {
        self.call_kw(name, args, &[])
    }

    pub fn call_kw(&self, name: &str, args: &[Object], kwargs: &[(&str, Object)]) -> Result<Object, HostError> {
        let function = self.function(name).ok_or_else(|| {
            HostError::attribute_error(format!("module '{}' has no attribute '{}'", self.name, name))
        })?;
        function.invoke(args, kwargs)
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("functions", &self.functions.len())
            .finish()
    }
}
