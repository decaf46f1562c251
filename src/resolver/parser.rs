//! Evaluator for the fingerprint DSL
//!
//! Only the declarative fingerprint form is understood:
//!
//! ```text
//! fingerprint {
//!     accessFlags(AccessFlags.PUBLIC, AccessFlags.FINAL)
//!     returns("V")
//!     parameters("I")
//!     strings("a")
//!     invokes("Lcom/Foo;->bar()V")
//!     literals(42)
//!     opcodes(Opcode.CONST_STRING, null, Opcode.RETURN_VOID)
//! }
//! ```
//!
//! Clauses may come in any order, each at most once. `//` starts a line
//! comment.

use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::constants::access_flags::FLAG_NAMES;
use crate::errors::EvalError;
use crate::resolver::predicate::{Predicate, PredicateEvaluator};

/// Access flag names accepted after `AccessFlags.`
static FLAG_VALUES: Lazy<HashMap<&'static str, u32>> =
    Lazy::new(|| FLAG_NAMES.iter().map(|&(bit, name)| (name, bit)).collect());

/// Evaluator for rendered and hand-written fingerprints
#[derive(Debug, Clone, Copy, Default)]
pub struct DslEvaluator;

impl DslEvaluator {
    /// Create a new evaluator
    pub fn new() -> Self {
        Self
    }
}

impl PredicateEvaluator for DslEvaluator {
    fn evaluate(&self, source: &str) -> Result<Predicate, EvalError> {
        let tokens = Lexer::new(source).tokenize()?;
        let predicate = Parser { tokens, pos: 0 }.fingerprint()?;
        debug!("Compiled predicate: {:?}", predicate);
        Ok(predicate)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("'{}'", name),
            Token::Str(_) => "string literal".to_string(),
            Token::Int(_) => "number".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: usize,
    column: usize,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> EvalError {
        EvalError::new(self.line, self.column, message)
    }

    fn tokenize(mut self) -> Result<Vec<Spanned>, EvalError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let (line, column) = (self.line, self.column);
            let Some(c) = self.peek() else {
                tokens.push(Spanned { token: Token::Eof, line, column });
                return Ok(tokens);
            };

            let token = match c {
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                '{' => self.single(Token::LBrace),
                '}' => self.single(Token::RBrace),
                ',' => self.single(Token::Comma),
                '.' => self.single(Token::Dot),
                '"' => self.string()?,
                c if c.is_ascii_digit() || (c == '-' && self.peek_next().map_or(false, |n| n.is_ascii_digit())) => {
                    self.number()?
                }
                c if c.is_ascii_alphabetic() || c == '_' => self.ident(),
                other => return Err(self.error(format!("unexpected character '{}'", other))),
            };
            tokens.push(Spanned { token, line, column });
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '/' && self.peek_next() == Some('/') {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.bump();
        token
    }

    fn ident(&mut self) -> Token {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Token::Ident(name)
    }

    fn number(&mut self) -> Result<Token, EvalError> {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        if self.peek() == Some('-') {
            text.push('-');
            self.bump();
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        // Kotlin long suffix
        if self.peek() == Some('L') {
            self.bump();
        }
        text.parse::<i64>()
            .map(Token::Int)
            .map_err(|_| EvalError::new(line, column, format!("number {} is out of range", text)))
    }

    fn string(&mut self) -> Result<Token, EvalError> {
        let (line, column) = (self.line, self.column);
        self.bump();
        let mut value = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(EvalError::new(line, column, "unterminated string literal"));
            };
            match c {
                '"' => return Ok(Token::Str(value)),
                '\n' => return Err(EvalError::new(line, column, "unterminated string literal")),
                '\\' => {
                    let escaped = self.bump().ok_or_else(|| self.error("unterminated escape sequence"))?;
                    match escaped {
                        '\\' => value.push('\\'),
                        '"' => value.push('"'),
                        '\'' => value.push('\''),
                        'n' => value.push('\n'),
                        'r' => value.push('\r'),
                        't' => value.push('\t'),
                        'b' => value.push('\u{8}'),
                        '$' => value.push('$'),
                        'u' => value.push(self.unicode_escape()?),
                        other => return Err(self.error(format!("unknown escape sequence '\\{}'", other))),
                    }
                }
                c => value.push(c),
            }
        }
    }

    fn unicode_escape(&mut self) -> Result<char, EvalError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("expected four hex digits after '\\u'"))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| self.error(format!("'\\u{:04x}' is not a character", code)))
    }
}

/// Argument of a clause
enum Arg {
    Str(String),
    Int(i64),
    Qualified { owner: String, name: String },
    Null,
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn current(&self) -> &Spanned {
        // The lexer always ends the stream with Eof and the parser never
        // advances past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Spanned {
        let token = self.current().clone();
        if token.token != Token::Eof {
            self.pos += 1;
        }
        token
    }

    fn error_at(spanned: &Spanned, message: impl Into<String>) -> EvalError {
        EvalError::new(spanned.line, spanned.column, message)
    }

    fn expect(&mut self, expected: Token) -> Result<Spanned, EvalError> {
        let token = self.advance();
        if token.token == expected {
            Ok(token)
        } else {
            Err(Self::error_at(
                &token,
                format!("expected {}, found {}", expected.describe(), token.token.describe()),
            ))
        }
    }

    fn fingerprint(mut self) -> Result<Predicate, EvalError> {
        let head = self.advance();
        if head.token != Token::Ident("fingerprint".to_string()) {
            return Err(Self::error_at(
                &head,
                format!("expected 'fingerprint', found {}", head.token.describe()),
            ));
        }
        self.expect(Token::LBrace)?;

        let mut predicate = Predicate::default();
        let mut seen: Vec<String> = Vec::new();
        loop {
            let head = self.advance();
            let name = match &head.token {
                Token::RBrace => break,
                Token::Ident(name) => name.clone(),
                other => {
                    return Err(Self::error_at(&head, format!("expected a clause, found {}", other.describe())))
                }
            };
            if seen.contains(&name) {
                return Err(Self::error_at(&head, format!("clause '{}' given more than once", name)));
            }
            let args = self.arguments()?;
            apply_clause(&mut predicate, &head, &name, args)?;
            seen.push(name);
        }

        let tail = self.advance();
        if tail.token != Token::Eof {
            return Err(Self::error_at(&tail, format!("unexpected {} after fingerprint", tail.token.describe())));
        }
        Ok(predicate)
    }

    fn arguments(&mut self) -> Result<Vec<(Spanned, Arg)>, EvalError> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        loop {
            if self.current().token == Token::RParen {
                self.advance();
                return Ok(args);
            }
            args.push(self.argument()?);

            let sep = self.advance();
            match &sep.token {
                Token::Comma => continue,
                Token::RParen => return Ok(args),
                other => {
                    return Err(Self::error_at(&sep, format!("expected ',' or ')', found {}", other.describe())))
                }
            }
        }
    }

    fn argument(&mut self) -> Result<(Spanned, Arg), EvalError> {
        let start = self.advance();
        let arg = match &start.token {
            Token::Str(value) => Arg::Str(value.clone()),
            Token::Int(value) => Arg::Int(*value),
            Token::Ident(name) if name == "null" => Arg::Null,
            Token::Ident(owner) => {
                self.expect(Token::Dot)?;
                let member = self.advance();
                match &member.token {
                    Token::Ident(name) => Arg::Qualified { owner: owner.clone(), name: name.clone() },
                    other => {
                        return Err(Self::error_at(&member, format!("expected a name, found {}", other.describe())))
                    }
                }
            }
            other => return Err(Self::error_at(&start, format!("expected an argument, found {}", other.describe()))),
        };
        Ok((start, arg))
    }
}

fn apply_clause(
    predicate: &mut Predicate,
    head: &Spanned,
    name: &str,
    args: Vec<(Spanned, Arg)>,
) -> Result<(), EvalError> {
    match name {
        "accessFlags" => {
            let mut flags = 0;
            for (at, arg) in args {
                match arg {
                    Arg::Qualified { owner, name } if owner == "AccessFlags" => {
                        let bit = FLAG_VALUES
                            .get(name.as_str())
                            .ok_or_else(|| Parser::error_at(&at, format!("unknown access flag '{}'", name)))?;
                        flags |= bit;
                    }
                    _ => return Err(Parser::error_at(&at, "accessFlags expects AccessFlags.NAME arguments")),
                }
            }
            predicate.access_flags = Some(flags);
        }
        "returns" => {
            let mut values = strings(args, name)?;
            if values.len() != 1 {
                return Err(Parser::error_at(head, "returns expects exactly one type descriptor"));
            }
            predicate.return_type = values.pop();
        }
        "parameters" => predicate.parameters = Some(strings(args, name)?),
        "strings" => predicate.strings = strings(args, name)?,
        "invokes" => predicate.invokes = strings(args, name)?,
        "literals" => {
            let mut values = Vec::new();
            for (at, arg) in args {
                match arg {
                    Arg::Int(value) => values.push(value),
                    _ => return Err(Parser::error_at(&at, "literals expects numbers")),
                }
            }
            predicate.literals = values;
        }
        "opcodes" => {
            let mut pattern = Vec::new();
            for (at, arg) in args {
                match arg {
                    Arg::Null => pattern.push(None),
                    Arg::Qualified { owner, name } if owner == "Opcode" => pattern.push(Some(name)),
                    _ => return Err(Parser::error_at(&at, "opcodes expects Opcode.NAME or null")),
                }
            }
            predicate.opcodes = pattern;
        }
        other => return Err(Parser::error_at(head, format!("unknown clause '{}'", other))),
    }
    Ok(())
}

fn strings(args: Vec<(Spanned, Arg)>, clause: &str) -> Result<Vec<String>, EvalError> {
    args.into_iter()
        .map(|(at, arg)| match arg {
            Arg::Str(value) => Ok(value),
            _ => Err(Parser::error_at(&at, format!("{} expects string arguments", clause))),
        })
        .collect()
}
