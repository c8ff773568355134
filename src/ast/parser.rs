use crate::ast::lexer::{Lexer, Token, TokenKind};
use crate::ast::{ASTNode, Literal, Operator};
use crate::error::{LexError, ParseError};
use log::debug;

/// Recursive-descent parser.
///
/// ```text
/// expression     := summation | additive
/// summation      := "sum of" expression "from" identifier "=" expression
///                   "to" (expression | "infinity")
/// additive       := multiplicative (("+" | "-") multiplicative)*
/// multiplicative := unary (("*" | "/") unary | power)*
/// unary          := "-" unary | power
/// power          := postfix ("^" unary)?
/// postfix        := primary "!"*
/// primary        := number | identifier | identifier "(" arguments? ")"
///                 | "(" expression ")"
/// ```
///
/// The bare `power` alternative in `multiplicative` is implicit
/// multiplication and only applies when the next token is an identifier or
/// `(`.
pub struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    pub fn parse_expression(input: &str) -> Result<ASTNode, ParseError> {
        debug!("Parsing expression: {}", input);
        let mut parser = Parser::new(input)?;
        let node = parser.parse()?;
        debug!("Parsed AST: {}", node);
        Ok(node)
    }

    fn new(input: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let current = checked(lexer.next_token())?;
        Ok(Self { lexer, current })
    }

    fn parse(&mut self) -> Result<ASTNode, ParseError> {
        if self.current.is(TokenKind::Eof) {
            return Err(ParseError::EmptyExpression);
        }
        let node = self.expression()?;
        match self.current.kind {
            TokenKind::Eof => Ok(node),
            TokenKind::RParen => Err(ParseError::UnbalancedParentheses {
                position: self.current.position,
            }),
            _ => Err(self.unexpected()),
        }
    }

    /// Consumes the current token and returns it.
    fn advance(&mut self) -> Result<Token, ParseError> {
        let next = checked(self.lexer.next_token())?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.current.is(kind) {
            self.advance()
        } else {
            Err(self.expected(expected))
        }
    }

    fn expected(&self, expected: &str) -> ParseError {
        ParseError::Expected {
            expected: expected.to_string(),
            found: self.current.to_string(),
            position: self.current.position,
        }
    }

    fn unexpected(&self) -> ParseError {
        ParseError::UnexpectedToken {
            found: self.current.to_string(),
            position: self.current.position,
        }
    }

    fn expression(&mut self) -> Result<ASTNode, ParseError> {
        if self.current.is(TokenKind::SumOf) {
            self.summation()
        } else {
            self.additive()
        }
    }

    fn summation(&mut self) -> Result<ASTNode, ParseError> {
        self.expect(TokenKind::SumOf, "'sum of'")?;
        let body = self.expression()?;
        self.expect(TokenKind::From, "'from'")?;
        let variable = self.expect(TokenKind::Identifier, "summation variable")?;
        self.expect(TokenKind::Equals, "'='")?;
        let start = self.expression()?;
        self.expect(TokenKind::To, "'to'")?;
        let end = if self.current.is(TokenKind::Infinity) {
            self.advance()?;
            ASTNode::Infinity
        } else {
            self.expression()?
        };

        Ok(ASTNode::Summation {
            variable: variable.lexeme,
            start: Box::new(start),
            end: Box::new(end),
            body: Box::new(body),
        })
    }

    fn additive(&mut self) -> Result<ASTNode, ParseError> {
        let mut node = self.multiplicative()?;
        loop {
            let operator = match self.current.kind {
                TokenKind::Plus => Operator::Add,
                TokenKind::Minus => Operator::Subtract,
                _ => break,
            };
            self.advance()?;
            let right = self.multiplicative()?;
            node = ASTNode::binary(node, operator, right);
        }
        Ok(node)
    }

    fn multiplicative(&mut self) -> Result<ASTNode, ParseError> {
        let mut node = self.unary()?;
        loop {
            match self.current.kind {
                TokenKind::Asterisk | TokenKind::Slash => {
                    let operator = if self.current.is(TokenKind::Asterisk) {
                        Operator::Multiply
                    } else {
                        Operator::Divide
                    };
                    self.advance()?;
                    let right = self.unary()?;
                    node = ASTNode::binary(node, operator, right);
                }
                // implicit multiplication
                TokenKind::Identifier | TokenKind::LParen => {
                    let right = self.power()?;
                    node = ASTNode::binary(node, Operator::Multiply, right);
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn unary(&mut self) -> Result<ASTNode, ParseError> {
        if self.current.is(TokenKind::Minus) {
            self.advance()?;
            return Ok(ASTNode::negate(self.unary()?));
        }
        self.power()
    }

    fn power(&mut self) -> Result<ASTNode, ParseError> {
        let base = self.postfix()?;
        if self.current.is(TokenKind::Caret) {
            self.advance()?;
            let exponent = self.unary()?;
            return Ok(ASTNode::binary(base, Operator::Power, exponent));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Result<ASTNode, ParseError> {
        let mut node = self.primary()?;
        while self.current.is(TokenKind::Factorial) {
            self.advance()?;
            node = ASTNode::Factorial(Box::new(node));
        }
        Ok(node)
    }

    fn primary(&mut self) -> Result<ASTNode, ParseError> {
        match self.current.kind {
            TokenKind::Number => {
                let token = self.advance()?;
                Ok(ASTNode::Constant(Literal::new(&token.lexeme)?))
            }
            TokenKind::Identifier => {
                let token = self.advance()?;
                if self.current.is(TokenKind::LParen) {
                    let args = self.arguments()?;
                    Ok(ASTNode::FunctionCall {
                        name: token.lexeme,
                        args,
                    })
                } else {
                    Ok(ASTNode::Variable(token.lexeme))
                }
            }
            TokenKind::LParen => {
                let open = self.advance()?;
                let inner = self.expression()?;
                self.close_parenthesis(&open)?;
                Ok(inner)
            }
            TokenKind::Eof | TokenKind::RParen => Err(self.expected("an operand")),
            _ => Err(self.unexpected()),
        }
    }

    /// Parses `( expression ("," expression)* )` or `()`.
    fn arguments(&mut self) -> Result<Vec<ASTNode>, ParseError> {
        let open = self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if self.current.is(TokenKind::RParen) {
            self.advance()?;
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if self.current.is(TokenKind::Comma) {
                self.advance()?;
                continue;
            }
            self.close_parenthesis(&open)?;
            return Ok(args);
        }
    }

    fn close_parenthesis(&mut self, open: &Token) -> Result<(), ParseError> {
        match self.current.kind {
            TokenKind::RParen => {
                self.advance()?;
                Ok(())
            }
            TokenKind::Eof => Err(ParseError::UnbalancedParentheses {
                position: open.position,
            }),
            _ => Err(self.expected("')'")),
        }
    }
}

fn checked(token: Token) -> Result<Token, ParseError> {
    if token.is(TokenKind::Error) {
        return Err(LexError::MalformedNumber {
            lexeme: token.lexeme,
            position: token.position,
        }
        .into());
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::UnaryOperator;

    fn parse(input: &str) -> ASTNode {
        Parser::parse_expression(input).unwrap()
    }

    fn num(text: &str) -> ASTNode {
        ASTNode::Constant(Literal::new(text).unwrap())
    }

    fn var(name: &str) -> ASTNode {
        ASTNode::Variable(name.to_string())
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse("2 + 3 * 4"),
            ASTNode::binary(
                num("2"),
                Operator::Add,
                ASTNode::binary(num("3"), Operator::Multiply, num("4"))
            )
        );
        assert_eq!(
            parse("8 - 2 - 1"),
            ASTNode::binary(
                ASTNode::binary(num("8"), Operator::Subtract, num("2")),
                Operator::Subtract,
                num("1")
            )
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(
            parse("2^3^2"),
            ASTNode::binary(
                num("2"),
                Operator::Power,
                ASTNode::binary(num("3"), Operator::Power, num("2"))
            )
        );
        assert_eq!(
            parse("2^-1"),
            ASTNode::binary(num("2"), Operator::Power, ASTNode::negate(num("1")))
        );
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(
            parse("-2^2"),
            ASTNode::negate(ASTNode::binary(num("2"), Operator::Power, num("2")))
        );
        assert_eq!(
            parse("3*-4"),
            ASTNode::binary(num("3"), Operator::Multiply, ASTNode::negate(num("4")))
        );
        assert_eq!(
            parse("--x"),
            ASTNode::UnaryOperation {
                operator: UnaryOperator::Negate,
                operand: Box::new(ASTNode::negate(var("x"))),
            }
        );
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(
            parse("2x"),
            ASTNode::binary(num("2"), Operator::Multiply, var("x"))
        );
        assert_eq!(
            parse("2(x)(y)"),
            ASTNode::binary(
                ASTNode::binary(num("2"), Operator::Multiply, var("x")),
                Operator::Multiply,
                var("y")
            )
        );
        assert_eq!(
            parse("2x^2"),
            ASTNode::binary(
                num("2"),
                Operator::Multiply,
                ASTNode::binary(var("x"), Operator::Power, num("2"))
            )
        );
    }

    #[test]
    fn test_factorial_postfix() {
        assert_eq!(parse("5!"), ASTNode::Factorial(Box::new(num("5"))));
        assert_eq!(
            parse("3!!"),
            ASTNode::Factorial(Box::new(ASTNode::Factorial(Box::new(num("3")))))
        );
        assert_eq!(
            parse("(k!)^3"),
            ASTNode::binary(
                ASTNode::Factorial(Box::new(var("k"))),
                Operator::Power,
                num("3")
            )
        );
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(
            parse("pow(2, x + 1)"),
            ASTNode::FunctionCall {
                name: "pow".to_string(),
                args: vec![
                    num("2"),
                    ASTNode::binary(var("x"), Operator::Add, num("1"))
                ],
            }
        );
        assert_eq!(
            parse("f()"),
            ASTNode::FunctionCall {
                name: "f".to_string(),
                args: vec![],
            }
        );
    }

    #[test]
    fn test_summation() {
        assert_eq!(
            parse("sum of k from k=1 to 5"),
            ASTNode::Summation {
                variable: "k".to_string(),
                start: Box::new(num("1")),
                end: Box::new(num("5")),
                body: Box::new(var("k")),
            }
        );
        let node = parse("sum of 1/2^k from k = 0 to infinity");
        match node {
            ASTNode::Summation { end, .. } => assert_eq!(*end, ASTNode::Infinity),
            other => panic!("expected summation, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_summation() {
        let node = parse("sum of (sum of j from j=1 to k) from k=1 to 3");
        match node {
            ASTNode::Summation { variable, body, .. } => {
                assert_eq!(variable, "k");
                assert!(matches!(*body, ASTNode::Summation { .. }));
            }
            other => panic!("expected summation, got {:?}", other),
        }
    }

    #[test]
    fn test_chudnovsky_parses() {
        let input = "1 / (12 * (sum of ((-1)^k * (6k)! * (545140134k + 13591409) / \
                     ((3k)! * (k!)^3 * 640320^(3k + 1.5))) from k=0 to infinity))";
        assert!(Parser::parse_expression(input).is_ok());
    }

    #[test]
    fn test_missing_keyword() {
        assert_eq!(
            Parser::parse_expression("sum of k = 1 to 5"),
            Err(ParseError::Expected {
                expected: "'from'".to_string(),
                found: "'='".to_string(),
                position: 9,
            })
        );
        assert!(matches!(
            Parser::parse_expression("sum of k from k=1"),
            Err(ParseError::Expected { expected, .. }) if expected == "'to'"
        ));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(
            Parser::parse_expression("(1 + 2"),
            Err(ParseError::UnbalancedParentheses { position: 0 })
        );
        assert_eq!(
            Parser::parse_expression("1 + 2)"),
            Err(ParseError::UnbalancedParentheses { position: 5 })
        );
        assert!(matches!(
            Parser::parse_expression("max(1, 2"),
            Err(ParseError::UnbalancedParentheses { position: 3 })
        ));
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(
            Parser::parse_expression("   "),
            Err(ParseError::EmptyExpression)
        );
        assert_eq!(
            Parser::parse_expression("1.2.3 + 1"),
            Err(ParseError::Lex(LexError::MalformedNumber {
                lexeme: "1.2.3".to_string(),
                position: 0,
            }))
        );
        assert!(matches!(
            Parser::parse_expression("2 +"),
            Err(ParseError::Expected { expected, .. }) if expected == "an operand"
        ));
        assert!(matches!(
            Parser::parse_expression("* 3"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            Parser::parse_expression("2 3"),
            Err(ParseError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            Parser::parse_expression("infinity"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_display_round_trip() {
        for input in [
            "2 + 3 * 4",
            "-2^2 + 2x(y - 1)",
            "sum of k^2 / 3! from k = -1 to n + 1",
            "sum of (sum of j from j=1 to k) from k=1 to infinity",
            "f(1, -x, g())!",
        ] {
            let ast = parse(input);
            assert_eq!(parse(&ast.to_string()), ast, "round trip of {}", input);
        }
    }
}
