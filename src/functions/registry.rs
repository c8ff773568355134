use crate::ast::FunctionResult;
use crate::error::EvalError;
use crate::kernel::{Number, Precision};
use log::trace;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type ScalarFunction =
    Arc<dyn Fn(Precision, &[Number]) -> Result<Number, EvalError> + Send + Sync>;
pub type MultiFunction =
    Arc<dyn Fn(Precision, &[Number]) -> Result<Vec<Number>, EvalError> + Send + Sync>;

/// A registered callable. Scalar functions may appear inside expressions;
/// multi-valued actions are only reachable through [`Registry::call_action`]
/// and [`Registry::invoke`].
#[derive(Clone)]
pub enum NativeFunction {
    Scalar(ScalarFunction),
    Multi(MultiFunction),
}

impl NativeFunction {
    pub fn kind(&self) -> &'static str {
        match self {
            NativeFunction::Scalar(_) => "scalar",
            NativeFunction::Multi(_) => "multi",
        }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction::{}", self.kind())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    functions: HashMap<String, NativeFunction>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in function.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::register_functions(&mut registry);
        registry
    }

    /// Registers a scalar function, replacing any previous entry of that name.
    pub fn register_function<F>(&mut self, name: &str, function: F)
    where
        F: Fn(Precision, &[Number]) -> Result<Number, EvalError> + Send + Sync + 'static,
    {
        self.functions
            .insert(name.to_string(), NativeFunction::Scalar(Arc::new(function)));
    }

    /// Registers a multi-valued action, replacing any previous entry of that
    /// name.
    pub fn register_action<F>(&mut self, name: &str, action: F)
    where
        F: Fn(Precision, &[Number]) -> Result<Vec<Number>, EvalError> + Send + Sync + 'static,
    {
        self.functions
            .insert(name.to_string(), NativeFunction::Multi(Arc::new(action)));
    }

    pub fn get(&self, name: &str) -> Option<&NativeFunction> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    fn lookup(&self, name: &str) -> Result<&NativeFunction, EvalError> {
        self.functions
            .get(name)
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))
    }

    /// Calls `name` where exactly one value is expected.
    pub fn call(
        &self,
        name: &str,
        precision: Precision,
        args: &[Number],
    ) -> Result<Number, EvalError> {
        trace!("Calling {} with {} arguments", name, args.len());
        match self.lookup(name)? {
            NativeFunction::Scalar(function) => function(precision, args),
            other => Err(EvalError::SignatureMismatch {
                name: name.to_string(),
                expected: "scalar",
                found: other.kind(),
            }),
        }
    }

    /// Calls `name` where a list of values is expected.
    pub fn call_action(
        &self,
        name: &str,
        precision: Precision,
        args: &[Number],
    ) -> Result<Vec<Number>, EvalError> {
        trace!("Calling action {} with {} arguments", name, args.len());
        match self.lookup(name)? {
            NativeFunction::Multi(action) => action(precision, args),
            other => Err(EvalError::SignatureMismatch {
                name: name.to_string(),
                expected: "multi",
                found: other.kind(),
            }),
        }
    }

    /// Calls `name` whatever its shape.
    pub fn invoke(
        &self,
        name: &str,
        precision: Precision,
        args: &[Number],
    ) -> Result<FunctionResult, EvalError> {
        match self.lookup(name)? {
            NativeFunction::Scalar(function) => function(precision, args).map(FunctionResult::Single),
            NativeFunction::Multi(action) => action(precision, args).map(FunctionResult::Multiple),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn precision() -> Precision {
        Precision::new(128)
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register_function("double", |p, args| {
            Ok(args[0].mul(&Number::from_i64(2, p), p))
        });
        registry.register_action("twice", |_, args| Ok(vec![args[0].clone(), args[0].clone()]));
        registry
    }

    #[test]
    fn test_call_scalar() {
        let p = precision();
        let result = registry().call("double", p, &[Number::from_i64(21, p)]);
        assert_eq!(result, Ok(Number::from_i64(42, p)));
    }

    #[test]
    fn test_call_action() {
        let p = precision();
        let values = registry()
            .call_action("twice", p, &[Number::one(p)])
            .unwrap();
        assert_eq!(values, vec![Number::one(p), Number::one(p)]);
    }

    #[test]
    fn test_signature_mismatch() {
        let p = precision();
        let registry = registry();
        assert_eq!(
            registry.call("twice", p, &[Number::one(p)]),
            Err(EvalError::SignatureMismatch {
                name: "twice".to_string(),
                expected: "scalar",
                found: "multi",
            })
        );
        assert!(matches!(
            registry.call_action("double", p, &[Number::one(p)]),
            Err(EvalError::SignatureMismatch { found: "scalar", .. })
        ));
    }

    #[test]
    fn test_unknown_function() {
        let p = precision();
        assert_eq!(
            registry().call("missing", p, &[]),
            Err(EvalError::UnknownFunction("missing".to_string()))
        );
    }

    #[test]
    fn test_invoke_either_shape() {
        let p = precision();
        let registry = registry();
        let single = registry.invoke("double", p, &[Number::one(p)]).unwrap();
        assert_eq!(single.as_number(), Some(&Number::from_i64(2, p)));
        let multiple = registry.invoke("twice", p, &[Number::one(p)]).unwrap();
        assert_eq!(multiple.as_list().map(<[Number]>::len), Some(2));
    }

    #[test]
    fn test_builtins_registered() {
        let registry = Registry::with_builtins();
        let names = [
            "sin", "cos", "tan", "asin", "acos", "atan", "exp", "ln", "log", "sqrt", "pow",
            "gamma", "mean", "sort",
        ];
        for name in names {
            assert!(registry.contains(name), "{} is missing", name);
        }
        assert!(matches!(registry.get("sort"), Some(NativeFunction::Multi(_))));
    }
}
