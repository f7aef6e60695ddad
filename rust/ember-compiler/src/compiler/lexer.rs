//! On-demand lexer for Ember source code.

use crate::compiler::tokens::{Span, Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unexpected character '{ch}'.")]
    UnexpectedChar { ch: char, line: usize, col: usize },
    #[error("Unterminated string.")]
    UnterminatedString { line: usize, col: usize },
    #[error("Integer literal out of range.")]
    IntegerOutOfRange { line: usize, col: usize },
    #[error("Invalid number literal.")]
    InvalidNumber { line: usize, col: usize },
}

impl LexError {
    pub fn line(&self) -> usize {
        match self {
            LexError::UnexpectedChar { line, .. }
            | LexError::UnterminatedString { line, .. }
            | LexError::IntegerOutOfRange { line, .. }
            | LexError::InvalidNumber { line, .. } => *line,
        }
    }
}

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    byte_offset: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            byte_offset: 0,
        }
    }

    fn current(&self) -> Option<char> { self.source.get(self.pos).copied() }
    fn peek(&self) -> Option<char> { self.source.get(self.pos + 1).copied() }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        self.byte_offset += ch.len_utf8();
        if ch == '\n' { self.line += 1; self.col = 1; }
        else { self.col += 1; }
        Some(ch)
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn span_from(&self, so: usize, sl: usize, sc: usize) -> Span {
        Span::new(so, self.byte_offset, sl, sc)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            match ch {
                ' ' | '\r' | '\t' | '\n' => { self.advance(); }
                '/' if self.peek() == Some('/') => {
                    while !matches!(self.current(), None | Some('\n')) { self.advance(); }
                }
                _ => break,
            }
        }
    }

    fn read_string(&mut self) -> Result<Token, LexError> {
        let (so, sl, sc) = (self.byte_offset, self.line, self.col);
        self.advance(); // opening quote
        let mut s = String::new();
        loop {
            match self.current() {
                None => return Err(LexError::UnterminatedString { line: self.line, col: sc }),
                Some('"') => { self.advance(); break; }
                Some(c) => { s.push(c); self.advance(); }
            }
        }
        Ok(Token::new(TokenKind::StringLit(s), self.span_from(so, sl, sc)))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let (so, sl, sc) = (self.byte_offset, self.line, self.col);
        let mut ns = String::new();
        let mut is_double = false;
        while let Some(ch) = self.current() {
            if ch.is_ascii_digit() { ns.push(ch); self.advance(); }
            else if ch == '.' && !is_double && matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                is_double = true; ns.push(ch); self.advance();
            }
            else { break; }
        }
        let span = self.span_from(so, sl, sc);
        if is_double {
            ns.parse::<f64>().map(|d| Token::new(TokenKind::DoubleLit(d), span))
                .map_err(|_| LexError::InvalidNumber { line: sl, col: sc })
        } else {
            ns.parse::<i64>().map(|n| Token::new(TokenKind::IntLit(n), span))
                .map_err(|_| LexError::IntegerOutOfRange { line: sl, col: sc })
        }
    }

    fn read_ident(&mut self) -> Token {
        let (so, sl, sc) = (self.byte_offset, self.line, self.col);
        let mut id = String::new();
        while let Some(ch) = self.current() {
            if ch.is_ascii_alphanumeric() || ch == '_' { id.push(ch); self.advance(); } else { break; }
        }
        let span = self.span_from(so, sl, sc);
        let kind = TokenKind::keyword(&id).unwrap_or(TokenKind::Ident(id));
        Token::new(kind, span)
    }

    /// Scan the next token. After an error the lexer has already moved past
    /// the offending input, so scanning can resume.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let (so, sl, sc) = (self.byte_offset, self.line, self.col);

        let Some(ch) = self.current() else {
            return Ok(Token::new(TokenKind::Eof, self.span_from(so, sl, sc)));
        };
        if ch == '"' {
            return self.read_string();
        }
        if ch.is_ascii_digit() {
            return self.read_number();
        }
        if ch.is_ascii_alphabetic() || ch == '_' {
            return Ok(self.read_ident());
        }

        self.advance();
        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '!' => if self.matches('=') { TokenKind::BangEq } else { TokenKind::Bang },
            '=' => if self.matches('=') { TokenKind::Eq } else { TokenKind::Assign },
            '>' => if self.matches('=') { TokenKind::GtEq } else { TokenKind::Gt },
            '<' => if self.matches('=') { TokenKind::LtEq } else { TokenKind::Lt },
            other => return Err(LexError::UnexpectedChar { ch: other, line: sl, col: sc }),
        };
        Ok(Token::new(kind, self.span_from(so, sl, sc)))
    }

    /// Scan the whole input, stopping at the first error.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                return Ok(tokens);
            }
        }
    }
}
