use crate::error::{EvalError, ParseError};
use crate::kernel::{self, Number, Precision};
use std::fmt;

mod evaluator;
mod function_result;
mod lexer;
mod parser;
mod scope;

pub use evaluator::Evaluator;
pub use function_result::*;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use scope::Scope;

#[derive(Debug, Clone, PartialEq)]
pub enum ASTNode {
    Constant(Literal),
    Variable(String),
    UnaryOperation {
        operator: UnaryOperator,
        operand: Box<ASTNode>,
    },
    BinaryOperation {
        left: Box<ASTNode>,
        operator: Operator,
        right: Box<ASTNode>,
    },
    FunctionCall {
        name: String,
        args: Vec<ASTNode>,
    },
    Factorial(Box<ASTNode>),
    Summation {
        variable: String,
        start: Box<ASTNode>,
        /// Either a bound expression or [`ASTNode::Infinity`].
        end: Box<ASTNode>,
        body: Box<ASTNode>,
    },
    /// Only valid as the upper bound of a summation.
    Infinity,
}

impl ASTNode {
    pub fn binary(left: ASTNode, operator: Operator, right: ASTNode) -> Self {
        ASTNode::BinaryOperation {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    pub fn negate(operand: ASTNode) -> Self {
        ASTNode::UnaryOperation {
            operator: UnaryOperator::Negate,
            operand: Box::new(operand),
        }
    }
}

/// Fully parenthesized rendering that parses back to the same tree.
impl fmt::Display for ASTNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ASTNode::Constant(literal) => write!(f, "{}", literal),
            ASTNode::Variable(name) => write!(f, "{}", name),
            ASTNode::UnaryOperation { operator, operand } => {
                write!(f, "({}{})", operator, operand)
            }
            ASTNode::BinaryOperation {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            ASTNode::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            ASTNode::Factorial(operand) => write!(f, "({})!", operand),
            ASTNode::Summation {
                variable,
                start,
                end,
                body,
            } => write!(
                f,
                "(sum of {} from {} = {} to {})",
                body, variable, start, end
            ),
            ASTNode::Infinity => write!(f, "infinity"),
        }
    }
}

/// Decimal text of a numeric literal.
///
/// The value is kept as text so that it can be converted at whatever
/// precision the evaluation runs with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(String);

impl Literal {
    /// Accepts digits with at most one decimal point, `".5"` and `"3."`
    /// included.
    pub fn new(text: &str) -> Result<Self, ParseError> {
        let mut parts = text.split('.');
        let integer = parts.next().unwrap_or_default();
        let fraction = parts.next();
        let well_formed = parts.next().is_none()
            && integer.chars().all(|c| c.is_ascii_digit())
            && fraction.map_or(true, |f| f.chars().all(|c| c.is_ascii_digit()))
            && !(integer.is_empty() && fraction.map_or(true, str::is_empty));
        if !well_formed {
            return Err(ParseError::InvalidNumber(text.to_string()));
        }

        let integer = if integer.is_empty() { "0" } else { integer };
        let normalized = match fraction {
            Some(fraction) if !fraction.is_empty() => format!("{}.{}", integer, fraction),
            _ => integer.to_string(),
        };
        Ok(Literal(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_number(&self, precision: Precision) -> Result<Number, EvalError> {
        Number::from_decimal(&self.0, precision)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Negate,
}

impl UnaryOperator {
    pub fn apply(&self, operand: &Number) -> Number {
        match self {
            UnaryOperator::Negate => operand.neg(),
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "-"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operator {
    pub fn apply(
        &self,
        left: &Number,
        right: &Number,
        precision: Precision,
    ) -> Result<Number, EvalError> {
        match self {
            Operator::Add => Ok(left.add(right, precision)),
            Operator::Subtract => Ok(left.sub(right, precision)),
            Operator::Multiply => Ok(left.mul(right, precision)),
            Operator::Divide => left.div(right, precision),
            Operator::Power => kernel::power(left, right, precision),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Power => "^",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_normalization() {
        assert_eq!(Literal::new("12").unwrap().as_str(), "12");
        assert_eq!(Literal::new(".5").unwrap().as_str(), "0.5");
        assert_eq!(Literal::new("3.").unwrap().as_str(), "3");
        assert_eq!(Literal::new("0.25").unwrap().as_str(), "0.25");
    }

    #[test]
    fn test_literal_rejects_malformed_text() {
        for text in ["", ".", "1.2.3", "1e5", "-1"] {
            assert_eq!(
                Literal::new(text),
                Err(ParseError::InvalidNumber(text.to_string()))
            );
        }
    }

    #[test]
    fn test_operator_apply() {
        let p = Precision::new(128);
        let six = Number::from_i64(6, p);
        let three = Number::from_i64(3, p);
        assert_eq!(
            Operator::Subtract.apply(&six, &three, p).unwrap(),
            three
        );
        assert_eq!(
            Operator::Power.apply(&six, &Number::from_i64(2, p), p).unwrap(),
            Number::from_i64(36, p)
        );
        assert_eq!(
            Operator::Divide.apply(&six, &Number::zero(p), p),
            Err(EvalError::DivisionByZero)
        );
        assert_eq!(UnaryOperator::Negate.apply(&six), Number::from_i64(-6, p));
    }

    #[test]
    fn test_display() {
        let node = ASTNode::Summation {
            variable: "k".to_string(),
            start: Box::new(ASTNode::Constant(Literal::new("1").unwrap())),
            end: Box::new(ASTNode::Infinity),
            body: Box::new(ASTNode::binary(
                ASTNode::Constant(Literal::new("1").unwrap()),
                Operator::Divide,
                ASTNode::Factorial(Box::new(ASTNode::Variable("k".to_string()))),
            )),
        };
        assert_eq!(
            node.to_string(),
            "(sum of (1 / (k)!) from k = 1 to infinity)"
        );
        let call = ASTNode::FunctionCall {
            name: "pow".to_string(),
            args: vec![
                ASTNode::negate(ASTNode::Variable("x".to_string())),
                ASTNode::Constant(Literal::new("2").unwrap()),
            ],
        };
        assert_eq!(call.to_string(), "pow((-x), 2)");
    }
}
