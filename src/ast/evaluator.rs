use crate::ast::{ASTNode, Scope};
use crate::config::EngineConfig;
use crate::error::EvalError;
use crate::functions::Registry;
use crate::kernel::{self, Number, Precision};
use log::{debug, trace};

/// Tree-walking interpreter.
///
/// Holds no state of its own beyond its settings; every variable binding
/// lives in the [`Scope`] passed to [`Evaluator::evaluate`], so one evaluator
/// can serve concurrent evaluations that each own a scope.
pub struct Evaluator<'a> {
    registry: &'a Registry,
    precision: Precision,
    tolerance: Number,
    max_terms: Option<u64>,
}

impl<'a> Evaluator<'a> {
    /// An evaluator whose infinite summations stop below `2^-bits`.
    pub fn new(registry: &'a Registry, precision: Precision) -> Self {
        Self {
            registry,
            precision,
            tolerance: precision.epsilon(),
            max_terms: None,
        }
    }

    pub fn with_config(registry: &'a Registry, config: &EngineConfig) -> Self {
        Self {
            registry,
            precision: config.precision(),
            tolerance: config.series_tolerance(),
            max_terms: config.max_series_terms,
        }
    }

    pub fn evaluate(&self, node: &ASTNode, scope: &mut Scope) -> Result<Number, EvalError> {
        match node {
            ASTNode::Constant(literal) => literal.to_number(self.precision),

            ASTNode::Variable(name) => scope
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),

            ASTNode::UnaryOperation { operator, operand } => {
                let value = self.evaluate(operand, scope)?;
                Ok(operator.apply(&value))
            }

            ASTNode::BinaryOperation {
                left,
                operator,
                right,
            } => {
                let left_value = self.evaluate(left, scope)?;
                let right_value = self.evaluate(right, scope)?;
                operator.apply(&left_value, &right_value, self.precision)
            }

            ASTNode::FunctionCall { name, args } => {
                let values = args
                    .iter()
                    .map(|arg| self.evaluate(arg, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                self.registry.call(name, self.precision, &values)
            }

            ASTNode::Factorial(operand) => {
                let value = self.evaluate(operand, scope)?;
                kernel::factorial(&value, self.precision)
            }

            ASTNode::Summation {
                variable,
                start,
                end,
                body,
            } => self.summation(variable, start, end, body, scope),

            ASTNode::Infinity => Err(EvalError::MisplacedInfinity),
        }
    }

    /// Bounds are evaluated before the loop variable is bound. Whatever the
    /// loop variable meant before is restored afterward, also on failure.
    fn summation(
        &self,
        variable: &str,
        start: &ASTNode,
        end: &ASTNode,
        body: &ASTNode,
        scope: &mut Scope,
    ) -> Result<Number, EvalError> {
        let start = self.evaluate(start, scope)?;
        let end = match end {
            ASTNode::Infinity => None,
            bound => Some(self.evaluate(bound, scope)?),
        };

        let previous = scope.set(variable, start.clone());
        let result = self.accumulate(variable, start, end.as_ref(), body, scope);
        scope.restore(variable, previous);
        result
    }

    fn accumulate(
        &self,
        variable: &str,
        start: Number,
        end: Option<&Number>,
        body: &ASTNode,
        scope: &mut Scope,
    ) -> Result<Number, EvalError> {
        let p = self.precision;
        let one = Number::one(p);
        let mut sum = Number::zero(p);
        let mut index = start;
        let mut terms = 0u64;

        loop {
            if end.is_some_and(|end| index > *end) {
                break;
            }
            if let Some(limit) = self.max_terms {
                if terms >= limit {
                    return Err(EvalError::IterationLimit {
                        variable: variable.to_string(),
                        limit,
                    });
                }
            }

            scope.set(variable, index.clone());
            let term = self.evaluate(body, scope)?;
            trace!("{} = {}: term {}", variable, index, term);
            sum = sum.add(&term, p);
            terms += 1;

            // The first term never ends a series, so one starting at zero
            // still runs.
            if end.is_none() && terms > 1 && term.abs() < self.tolerance {
                debug!("Series over {} converged after {} terms", variable, terms);
                return Ok(sum);
            }
            index = index.add(&one, p);
        }

        debug!("Summation over {} added {} terms", variable, terms);
        Ok(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Literal, Parser};

    fn precision() -> Precision {
        Precision::new(256)
    }

    fn evaluate_in(input: &str, scope: &mut Scope) -> Result<Number, EvalError> {
        let registry = Registry::with_builtins();
        let evaluator = Evaluator::new(&registry, precision());
        let ast = Parser::parse_expression(input).unwrap();
        evaluator.evaluate(&ast, scope)
    }

    fn evaluate(input: &str) -> Result<Number, EvalError> {
        evaluate_in(input, &mut Scope::new())
    }

    fn value(input: &str) -> f64 {
        evaluate(input).unwrap().to_f64()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(value("2+3*4"), 14.0);
        assert_eq!(value("(2+3)*4"), 20.0);
        assert_eq!(value("10 - 4 - 3"), 3.0);
        assert_eq!(value("2^3^2"), 512.0);
        assert_eq!(value("2^-1"), 0.5);
    }

    #[test]
    fn test_implicit_multiplication() {
        let mut scope = Scope::new();
        scope.set("x", Number::from_i64(5, precision()));
        assert_eq!(evaluate_in("2x", &mut scope).unwrap().to_f64(), 10.0);
        assert_eq!(value("2(3+1)"), 8.0);
        assert_eq!(value("2(3)(4)"), 24.0);
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(value("-3+4"), 1.0);
        assert_eq!(value("3*-4"), -12.0);
        assert_eq!(value("(-4)^2"), 16.0);
        assert_eq!(value("-2^2"), -4.0);
        assert_eq!(value("--5"), 5.0);
    }

    #[test]
    fn test_factorial() {
        assert_eq!(value("5!"), 120.0);
        assert_eq!(value("0!"), 1.0);
        assert_eq!(value("2.0!"), 2.0);
        assert_eq!(value("3!!"), 720.0);
        assert!(matches!(
            evaluate("(-1)!"),
            Err(EvalError::DomainError { .. })
        ));
        assert!(matches!(
            evaluate("2.5!"),
            Err(EvalError::DomainError { .. })
        ));
    }

    #[test]
    fn test_finite_summation() {
        assert_eq!(value("sum of k from k=1 to 5"), 15.0);
        assert_eq!(value("sum of k^2 from k=1 to 3"), 14.0);
        assert_eq!(value("sum of k from k=5 to 1"), 0.0);
        assert_eq!(value("sum of 1 from k=0.5 to 3"), 3.0);
    }

    #[test]
    fn test_infinite_summation_converges() {
        let result = evaluate("sum of (1/(2^k)) from k=0 to infinity").unwrap();
        let two = Number::from_i64(2, precision());
        assert!(result.sub(&two, precision()).abs() < precision().power_of_two(-250));
    }

    #[test]
    fn test_series_starting_with_zero_term() {
        let result = evaluate("sum of k/2^k from k=0 to infinity").unwrap();
        assert!((result.to_f64() - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_nested_summation_restores_bindings() {
        assert_eq!(
            value("sum of (sum of k from k=1 to k) from k=1 to 3"),
            10.0
        );
        assert_eq!(
            value("sum of (sum of j*k from j=1 to 2) from k=1 to 2"),
            9.0
        );
    }

    #[test]
    fn test_summation_restores_previous_binding() {
        let p = precision();
        let mut scope = Scope::new();
        scope.set("x", Number::from_i64(7, p));
        assert_eq!(
            evaluate_in("sum of x from x=1 to 3", &mut scope).unwrap().to_f64(),
            6.0
        );
        assert_eq!(scope.get("x"), Some(&Number::from_i64(7, p)));

        let mut scope = Scope::new();
        assert_eq!(
            evaluate_in("sum of 1/(k-2) from k=1 to 3", &mut scope),
            Err(EvalError::DivisionByZero)
        );
        assert!(!scope.contains("k"));
    }

    #[test]
    fn test_iteration_limit() {
        let registry = Registry::with_builtins();
        let config = EngineConfig::default()
            .with_precision(256)
            .with_max_series_terms(10);
        let evaluator = Evaluator::with_config(&registry, &config);
        let ast = Parser::parse_expression("sum of 1 from k=1 to infinity").unwrap();
        let mut scope = Scope::new();
        assert_eq!(
            evaluator.evaluate(&ast, &mut scope),
            Err(EvalError::IterationLimit {
                variable: "k".to_string(),
                limit: 10,
            })
        );
        assert!(scope.is_empty());
    }

    #[test]
    fn test_errors() {
        assert_eq!(evaluate("1/0"), Err(EvalError::DivisionByZero));
        assert_eq!(
            evaluate("x + 1"),
            Err(EvalError::UndefinedVariable("x".to_string()))
        );
        assert_eq!(
            evaluate("nope(1)"),
            Err(EvalError::UnknownFunction("nope".to_string()))
        );
        assert!(matches!(
            evaluate("sort(3, 1, 2)"),
            Err(EvalError::SignatureMismatch { expected: "scalar", found: "multi", .. })
        ));
        assert!(matches!(
            evaluate("sin(1, 2)"),
            Err(EvalError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn test_misplaced_infinity() {
        let registry = Registry::with_builtins();
        let evaluator = Evaluator::new(&registry, precision());
        let ast = ASTNode::binary(
            ASTNode::Constant(Literal::new("1").unwrap()),
            crate::ast::Operator::Add,
            ASTNode::Infinity,
        );
        assert_eq!(
            evaluator.evaluate(&ast, &mut Scope::new()),
            Err(EvalError::MisplacedInfinity)
        );
    }

    #[test]
    fn test_constant_is_idempotent() {
        let registry = Registry::with_builtins();
        let evaluator = Evaluator::new(&registry, precision());
        let node = ASTNode::Constant(Literal::new("0.1").unwrap());
        let mut scope = Scope::new();
        let first = evaluator.evaluate(&node, &mut scope).unwrap();
        let second = evaluator.evaluate(&node, &mut scope).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.precision(), second.precision());
        assert_eq!(first.to_decimal_string(100), second.to_decimal_string(100));
    }

    #[test]
    fn test_trigonometric_identities() {
        let p = precision();
        let mut scope = Scope::new();
        scope.set("pi", kernel::pi(p));
        let one = Number::one(p);
        let tolerance = p.power_of_two(-240);
        for input in ["sin(pi/2)", "cos(0)", "tan(pi/4)"] {
            let result = evaluate_in(input, &mut scope).unwrap();
            assert!(result.sub(&one, p).abs() < tolerance, "{} = {}", input, result);
        }
    }

    #[test]
    fn test_left_operand_evaluated_first() {
        assert_eq!(
            evaluate("x + (sum of x from x=1 to 2)"),
            Err(EvalError::UndefinedVariable("x".to_string()))
        );
    }
}
