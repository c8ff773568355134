pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod functions;
pub mod kernel;

pub use ast::{ASTNode, Evaluator, Parser, Scope};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Error, EvalError, ParseError};
pub use kernel::{Number, Precision};

use once_cell::sync::Lazy;
use std::collections::HashMap;

static DEFAULT_ENGINE: Lazy<Engine> = Lazy::new(Engine::new);

/// Evaluates `expression` at the default precision and renders the result in
/// decimal.
pub fn parse_and_evaluate(expression: &str) -> Result<String, Error> {
    DEFAULT_ENGINE.parse_and_evaluate(expression)
}

/// Like [`parse_and_evaluate`], with every variable in `variables` replaced by
/// its value before parsing.
pub fn parse_and_evaluate_with_variables(
    expression: &str,
    variables: &HashMap<String, f64>,
) -> Result<String, Error> {
    DEFAULT_ENGINE.parse_and_evaluate_with_variables(expression, variables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_expression() {
        assert_eq!(parse_and_evaluate("2+3*4").unwrap(), "14");
        assert_eq!(parse_and_evaluate("5!").unwrap(), "120");
        assert_eq!(
            parse_and_evaluate("x"),
            Err(Error::Eval(EvalError::UndefinedVariable("x".to_string())))
        );
    }

    #[test]
    fn test_evaluate_with_variables() {
        let variables = HashMap::from([("rate".to_string(), 0.5), ("n".to_string(), 4.0)]);
        assert_eq!(
            parse_and_evaluate_with_variables("n * rate + n^2", &variables).unwrap(),
            "18"
        );
    }
}
