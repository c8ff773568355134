use std::fmt;
use thiserror::Error;

/// Failures produced while scanning source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("malformed number '{lexeme}' at position {position}")]
    MalformedNumber { lexeme: String, position: usize },
}

/// Failures produced while building the AST.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected token {found} at position {position}")]
    UnexpectedToken { found: String, position: usize },

    #[error("expected {expected}, found {found} at position {position}")]
    Expected {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("unbalanced parentheses at position {position}")]
    UnbalancedParentheses { position: usize },

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("empty expression")]
    EmptyExpression,
}

/// Number of arguments a native function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(1) => write!(f, "exactly 1 argument"),
            Arity::Exact(n) => write!(f, "exactly {} arguments", n),
            Arity::AtLeast(1) => write!(f, "at least 1 argument"),
            Arity::AtLeast(n) => write!(f, "at least {} arguments", n),
        }
    }
}

/// Failures produced while evaluating an AST.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("{function} requires {expected}, got {found}")]
    ArityMismatch {
        function: String,
        expected: Arity,
        found: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("{function}: {reason}")]
    DomainError { function: String, reason: String },

    #[error("'{name}' is registered as a {found} function, expected a {expected} function")]
    SignatureMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("summation over '{variable}' reached the limit of {limit} terms")]
    IterationLimit { variable: String, limit: u64 },

    #[error("'infinity' is only valid as the upper bound of a summation")]
    MisplacedInfinity,

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),
}

impl EvalError {
    pub(crate) fn domain(function: &str, reason: impl Into<String>) -> Self {
        EvalError::DomainError {
            function: function.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("precision of {0} bits is below the minimum of {min} bits", min = crate::config::MIN_PRECISION)]
    PrecisionTooLow(usize),

    #[error("default precision is already fixed at {0} bits")]
    PrecisionAlreadySet(usize),
}

/// Top-level error returned by the engine entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("variable '{name}' has non-finite value {value}")]
    InvalidVariable { name: String, value: f64 },
}

impl From<LexError> for Error {
    fn from(value: LexError) -> Self {
        Error::Parse(ParseError::Lex(value))
    }
}
