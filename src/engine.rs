use crate::ast::{ASTNode, Evaluator, FunctionResult, Parser, Scope};
use crate::config::EngineConfig;
use crate::error::{EvalError, Error, ParseError};
use crate::functions::Registry;
use crate::kernel::{self, Number, Precision};
use log::{debug, trace};
use lru::LruCache;
use rayon::prelude::*;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Words the lexer reads as keywords; never substituted.
const RESERVED: [&str; 3] = ["from", "to", "infinity"];

/// Second half of the `sum of` keyword, exactly as the lexer matches it.
const SUM_OF_TAIL: &str = " of";

/// Parses and evaluates expressions against one function registry at one
/// precision.
///
/// The engine is `Sync`: every evaluation gets its own [`Scope`], and the
/// parse cache sits behind a mutex.
pub struct Engine {
    registry: Registry,
    config: EngineConfig,
    constants: Vec<(&'static str, Number)>,
    cache: Option<Mutex<LruCache<String, Arc<ASTNode>>>>,
}

impl Engine {
    /// An engine with the built-in functions and the default configuration.
    pub fn new() -> Self {
        Self::build(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let precision = config.precision();
        let constants = vec![("pi", kernel::pi(precision)), ("e", kernel::euler(precision))];
        let cache = NonZeroUsize::new(config.cache_size).map(|size| Mutex::new(LruCache::new(size)));
        debug!(
            "Engine ready at {} bits, parse cache of {}",
            config.precision, config.cache_size
        );
        Self {
            registry: Registry::with_builtins(),
            config,
            constants,
            cache,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn precision(&self) -> Precision {
        self.config.precision()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn register_function<F>(&mut self, name: &str, function: F)
    where
        F: Fn(Precision, &[Number]) -> Result<Number, EvalError> + Send + Sync + 'static,
    {
        self.registry.register_function(name, function);
    }

    pub fn register_action<F>(&mut self, name: &str, action: F)
    where
        F: Fn(Precision, &[Number]) -> Result<Vec<Number>, EvalError> + Send + Sync + 'static,
    {
        self.registry.register_action(name, action);
    }

    /// A fresh binding context holding the constants `pi` and `e`.
    pub fn new_scope(&self) -> Scope {
        let mut scope = Scope::new();
        for (name, value) in &self.constants {
            scope.set(*name, value.clone());
        }
        scope
    }

    /// Parses `expression`, reusing the tree of an earlier identical text.
    pub fn parse(&self, expression: &str) -> Result<Arc<ASTNode>, ParseError> {
        let Some(cache) = &self.cache else {
            return Parser::parse_expression(expression).map(Arc::new);
        };

        if let Ok(mut cache) = cache.lock() {
            if let Some(ast) = cache.get(expression) {
                trace!("Parse cache hit: {}", expression);
                return Ok(Arc::clone(ast));
            }
        }

        let ast = Arc::new(Parser::parse_expression(expression)?);
        if let Ok(mut cache) = cache.lock() {
            cache.put(expression.to_string(), Arc::clone(&ast));
        }
        Ok(ast)
    }

    pub fn evaluate(&self, ast: &ASTNode, scope: &mut Scope) -> Result<Number, EvalError> {
        Evaluator::with_config(&self.registry, &self.config).evaluate(ast, scope)
    }

    /// Parses and evaluates with only the constants bound.
    pub fn evaluate_str(&self, expression: &str) -> Result<Number, Error> {
        let ast = self.parse(expression)?;
        let mut scope = self.new_scope();
        Ok(self.evaluate(&ast, &mut scope)?)
    }

    /// Decimal rendering of the value of `expression`.
    pub fn parse_and_evaluate(&self, expression: &str) -> Result<String, Error> {
        self.evaluate_str(expression).map(|value| value.to_string())
    }

    /// Replaces every variable named in `variables` by its value before
    /// parsing, then evaluates.
    pub fn parse_and_evaluate_with_variables(
        &self,
        expression: &str,
        variables: &HashMap<String, f64>,
    ) -> Result<String, Error> {
        let substituted = substitute(expression, variables)?;
        debug!("Substituted expression: {}", substituted);
        self.parse_and_evaluate(&substituted)
    }

    /// Binds `variables` in a fresh scope instead of rewriting the text.
    pub fn evaluate_with_bindings(
        &self,
        ast: &ASTNode,
        variables: &HashMap<String, f64>,
    ) -> Result<Number, Error> {
        let mut scope = self.bind(variables)?;
        Ok(self.evaluate(ast, &mut scope)?)
    }

    /// Evaluates one tree once per binding map, in parallel.
    pub fn evaluate_batch(
        &self,
        ast: &ASTNode,
        bindings: &[HashMap<String, f64>],
    ) -> Vec<Result<Number, Error>> {
        debug!("Evaluating batch of {}", bindings.len());
        bindings
            .par_iter()
            .map(|variables| self.evaluate_with_bindings(ast, variables))
            .collect()
    }

    /// Calls a registered function directly, whatever its shape.
    pub fn invoke(&self, name: &str, args: &[Number]) -> Result<FunctionResult, EvalError> {
        self.registry.invoke(name, self.precision(), args)
    }

    fn bind(&self, variables: &HashMap<String, f64>) -> Result<Scope, Error> {
        let precision = self.precision();
        let mut scope = self.new_scope();
        for (name, value) in variables {
            let number = Number::from_f64(*value, precision).ok_or_else(|| {
                Error::InvalidVariable {
                    name: name.clone(),
                    value: *value,
                }
            })?;
            scope.set(name.as_str(), number);
        }
        Ok(scope)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrites every whole identifier found in `variables` to its parenthesized
/// value. Longer names are tried first, so `xy` never matches `x`.
fn substitute(expression: &str, variables: &HashMap<String, f64>) -> Result<String, Error> {
    let mut names: Vec<(&String, &f64)> = variables.iter().collect();
    names.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
    for (name, value) in &names {
        if !value.is_finite() {
            return Err(Error::InvalidVariable {
                name: name.to_string(),
                value: **value,
            });
        }
    }

    let chars: Vec<char> = expression.chars().collect();
    let mut output = String::with_capacity(expression.len());
    let mut cursor = 0;
    while cursor < chars.len() {
        let c = chars[cursor];
        if !(c.is_alphabetic() || c == '_') {
            // Digits glued to letters, as in "2x", stay a number.
            output.push(c);
            cursor += 1;
            if c.is_ascii_digit() || c == '.' {
                while cursor < chars.len()
                    && (chars[cursor].is_ascii_digit() || chars[cursor] == '.')
                {
                    output.push(chars[cursor]);
                    cursor += 1;
                }
            }
            continue;
        }

        let start = cursor;
        while cursor < chars.len() && (chars[cursor].is_alphanumeric() || chars[cursor] == '_') {
            cursor += 1;
        }
        let word: String = chars[start..cursor].iter().collect();
        if word == "sum" && followed_by(&chars, cursor, SUM_OF_TAIL) {
            output.push_str(&word);
            output.push_str(SUM_OF_TAIL);
            cursor += SUM_OF_TAIL.len();
            continue;
        }
        let replacement = names
            .iter()
            .find(|(name, _)| **name == word && !RESERVED.contains(&word.as_str()));
        match replacement {
            Some((_, value)) => output.push_str(&format!("({})", value)),
            None => output.push_str(&word),
        }
    }
    Ok(output)
}

fn followed_by(chars: &[char], cursor: usize, text: &str) -> bool {
    text.chars()
        .enumerate()
        .all(|(offset, c)| chars.get(cursor + offset) == Some(&c))
}
