use log::trace;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    SumOf,
    From,
    To,
    Infinity,
    Identifier,
    LParen,
    RParen,
    Comma,
    Number,
    Minus,
    Plus,
    Asterisk,
    Slash,
    Caret,
    Equals,
    Factorial,
    Eof,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    /// Character offset of the first character of the lexeme.
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of input"),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}

/// Keywords are matched as plain prefixes before identifiers are scanned, so
/// an identifier can never start with one of them.
const KEYWORDS: [(&str, TokenKind); 4] = [
    ("sum of", TokenKind::SumOf),
    ("from", TokenKind::From),
    ("to", TokenKind::To),
    ("infinity", TokenKind::Infinity),
];

/// On-demand tokenizer. Unrecognized characters are skipped.
#[derive(Debug, Clone)]
pub struct Lexer {
    chars: Vec<char>,
    cursor: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            cursor: 0,
        }
    }

    pub fn next_token(&mut self) -> Token {
        while let Some(&c) = self.chars.get(self.cursor) {
            let start = self.cursor;

            if c.is_whitespace() {
                self.cursor += 1;
                continue;
            }

            if let Some((keyword, kind)) = KEYWORDS.iter().find(|(k, _)| self.starts_with(k)) {
                self.cursor += keyword.chars().count();
                return emit(Token::new(*kind, *keyword, start));
            }

            let single = match c {
                '(' => Some(TokenKind::LParen),
                ')' => Some(TokenKind::RParen),
                ',' => Some(TokenKind::Comma),
                '+' => Some(TokenKind::Plus),
                '-' => Some(TokenKind::Minus),
                '*' => Some(TokenKind::Asterisk),
                '/' => Some(TokenKind::Slash),
                '^' => Some(TokenKind::Caret),
                '=' => Some(TokenKind::Equals),
                '!' => Some(TokenKind::Factorial),
                _ => None,
            };
            if let Some(kind) = single {
                self.cursor += 1;
                return emit(Token::new(kind, c, start));
            }

            if c.is_ascii_digit() || (c == '.' && self.digit_at(self.cursor + 1)) {
                let token = self.read_number();
                return emit(token);
            }

            if c.is_alphabetic() || c == '_' {
                let token = self.read_identifier();
                return emit(token);
            }

            trace!("Skipping unrecognized character {:?} at {}", c, start);
            self.cursor += 1;
        }
        Token::new(TokenKind::Eof, "", self.cursor)
    }

    fn starts_with(&self, keyword: &str) -> bool {
        let mut offset = self.cursor;
        for expected in keyword.chars() {
            if self.chars.get(offset) != Some(&expected) {
                return false;
            }
            offset += 1;
        }
        true
    }

    fn digit_at(&self, index: usize) -> bool {
        self.chars.get(index).is_some_and(|c| c.is_ascii_digit())
    }

    /// Scans a run of digits and dots; more than one dot yields an `Error`
    /// token carrying the whole run.
    fn read_number(&mut self) -> Token {
        let start = self.cursor;
        while self
            .chars
            .get(self.cursor)
            .is_some_and(|c| c.is_ascii_digit() || *c == '.')
        {
            self.cursor += 1;
        }
        let lexeme: String = self.chars[start..self.cursor].iter().collect();
        let kind = if lexeme.matches('.').count() > 1 {
            TokenKind::Error
        } else {
            TokenKind::Number
        };
        Token::new(kind, lexeme, start)
    }

    fn read_identifier(&mut self) -> Token {
        let start = self.cursor;
        while self
            .chars
            .get(self.cursor)
            .is_some_and(|c| c.is_alphanumeric() || *c == '_')
        {
            self.cursor += 1;
        }
        let lexeme: String = self.chars[start..self.cursor].iter().collect();
        Token::new(TokenKind::Identifier, lexeme, start)
    }
}

fn emit(token: Token) -> Token {
    trace!("Token: {:?}", token);
    token
}
