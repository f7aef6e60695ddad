//! Single-pass Pratt compiler: parses Ember source and emits bytecode
//! directly into a [`Chunk`], without building an AST.

use std::collections::HashMap;

use ember_core::{Chunk, Heap, OpCode, StringId, Value};

use crate::compiler::lexer::{LexError, Lexer};
use crate::compiler::tokens::{Span, Token, TokenKind};
use crate::{Diagnostic, ErrorLocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    Assignment, // =
    Equality,   // == !=
    Comparison, // < > <= >=
    Term,       // + -
    Factor,     // * /
    Unary,      // ! -
    Primary,
}

impl Precedence {
    fn next(self) -> Self {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary | Precedence::Primary => Precedence::Primary,
        }
    }

    fn of(kind: &TokenKind) -> Self {
        match kind {
            TokenKind::BangEq | TokenKind::Eq => Precedence::Equality,
            TokenKind::Gt | TokenKind::GtEq | TokenKind::Lt | TokenKind::LtEq => {
                Precedence::Comparison
            }
            TokenKind::Plus | TokenKind::Minus => Precedence::Term,
            TokenKind::Star | TokenKind::Slash => Precedence::Factor,
            _ => Precedence::None,
        }
    }
}

pub struct Parser<'src, 'heap> {
    source: &'src str,
    lexer: Lexer,
    heap: &'heap mut Heap,
    chunk: Chunk,
    current: Token,
    previous: Token,
    diagnostics: Vec<Diagnostic>,
    panic_mode: bool,
    /// Constant slot already holding each identifier name.
    names: HashMap<StringId, u8>,
}

impl<'src, 'heap> Parser<'src, 'heap> {
    pub fn new(source: &'src str, heap: &'heap mut Heap) -> Self {
        let eof = Token::new(TokenKind::Eof, Span::dummy());
        Self {
            source,
            lexer: Lexer::new(source),
            heap,
            chunk: Chunk::new(),
            current: eof.clone(),
            previous: eof,
            diagnostics: Vec::new(),
            panic_mode: false,
            names: HashMap::new(),
        }
    }

    /// Compile the whole program. On failure every diagnostic collected
    /// during the pass is returned.
    pub fn compile(mut self) -> Result<Chunk, Vec<Diagnostic>> {
        self.advance();
        while !self.check(&TokenKind::Eof) {
            self.declaration();
        }
        let line = self.current.span.line;
        self.emit_op_at(OpCode::Return, line);

        if self.diagnostics.is_empty() {
            Ok(self.chunk)
        } else {
            Err(self.diagnostics)
        }
    }

    // ── Token plumbing ──

    fn advance(&mut self) {
        self.previous = self.current.clone();
        loop {
            match self.lexer.next_token() {
                Ok(tok) => {
                    self.current = tok;
                    return;
                }
                Err(err) => self.lex_error(err),
            }
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    fn consume(&mut self, kind: &TokenKind, message: &str) {
        if self.check(kind) {
            self.advance();
        } else {
            self.error_at_current(message);
        }
    }

    fn lexeme(&self, token: &Token) -> &'src str {
        self.source.get(token.span.start..token.span.end).unwrap_or("")
    }

    // ── Diagnostics ──

    fn lex_error(&mut self, err: LexError) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.diagnostics.push(Diagnostic {
            line: err.line(),
            location: ErrorLocation::None,
            message: err.to_string(),
        });
    }

    fn error_at(&mut self, token: &Token, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        let location = if token.kind == TokenKind::Eof {
            ErrorLocation::End
        } else {
            ErrorLocation::At(self.lexeme(token).to_string())
        };
        self.diagnostics.push(Diagnostic {
            line: token.span.line,
            location,
            message: message.to_string(),
        });
    }

    fn error(&mut self, message: &str) {
        let token = self.previous.clone();
        self.error_at(&token, message);
    }

    fn error_at_current(&mut self, message: &str) {
        let token = self.current.clone();
        self.error_at(&token, message);
    }

    /// Skip to the next statement boundary after an error.
    fn synchronize(&mut self) {
        self.panic_mode = false;
        while !self.check(&TokenKind::Eof) {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            match self.current.kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => self.advance(),
            }
        }
    }

    // ── Emission ──

    fn emit_op_at(&mut self, op: OpCode, line: usize) {
        self.chunk.write_op(op, line);
    }

    fn emit_op(&mut self, op: OpCode) {
        let line = self.previous.span.line;
        self.chunk.write_op(op, line);
    }

    fn emit_ops(&mut self, first: OpCode, second: OpCode) {
        self.emit_op(first);
        self.emit_op(second);
    }

    fn emit_with_operand(&mut self, op: OpCode, operand: u8) {
        let line = self.previous.span.line;
        self.chunk.write_op(op, line);
        self.chunk.write(operand, line);
    }

    fn make_constant(&mut self, value: Value) -> u8 {
        match self.chunk.add_constant(value) {
            Ok(idx) => idx,
            Err(err) => {
                self.error(&err.to_string());
                0
            }
        }
    }

    fn emit_constant(&mut self, value: Value) {
        let idx = self.make_constant(value);
        self.emit_with_operand(OpCode::Constant, idx);
    }

    fn identifier_constant(&mut self, name: &str) -> u8 {
        let id = self.heap.intern(name);
        if let Some(&idx) = self.names.get(&id) {
            return idx;
        }
        let idx = self.make_constant(Value::string(id));
        self.names.insert(id, idx);
        idx
    }

    // ── Declarations and statements ──

    fn declaration(&mut self) {
        if self.matches(&TokenKind::Var) {
            self.var_declaration();
        } else {
            self.statement();
        }
        if self.panic_mode {
            self.synchronize();
        }
    }

    fn var_declaration(&mut self) {
        let global = match &self.current.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                self.identifier_constant(&name)
            }
            _ => {
                self.error_at_current("Expect variable name.");
                return;
            }
        };

        if self.matches(&TokenKind::Assign) {
            self.expression();
        } else {
            self.emit_op(OpCode::Nil);
        }
        self.consume(&TokenKind::Semicolon, "Expect ';' after variable declaration.");
        self.emit_with_operand(OpCode::DefineGlobal, global);
    }

    fn statement(&mut self) {
        if self.matches(&TokenKind::Print) {
            self.expression();
            self.consume(&TokenKind::Semicolon, "Expect ';' after value.");
            self.emit_op(OpCode::Print);
        } else {
            self.expression();
            self.consume(&TokenKind::Semicolon, "Expect ';' after expression.");
            self.emit_op(OpCode::Pop);
        }
    }

    // ── Expressions ──

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();
        let can_assign = precedence <= Precedence::Assignment;
        if !self.prefix(can_assign) {
            self.error("Expect expression.");
            return;
        }

        while precedence <= Precedence::of(&self.current.kind) {
            self.advance();
            self.binary();
        }

        if can_assign && self.matches(&TokenKind::Assign) {
            self.error("Invalid assignment target.");
        }
    }

    /// Compile the prefix expression starting at `previous`. Returns `false`
    /// when the token cannot start an expression.
    fn prefix(&mut self, can_assign: bool) -> bool {
        match self.previous.kind.clone() {
            TokenKind::IntLit(n) => self.emit_constant(Value::Int(n)),
            TokenKind::DoubleLit(d) => self.emit_constant(Value::Double(d)),
            TokenKind::StringLit(s) => {
                let id = self.heap.intern_owned(s);
                self.emit_constant(Value::string(id));
            }
            TokenKind::True => self.emit_op(OpCode::True),
            TokenKind::False => self.emit_op(OpCode::False),
            TokenKind::Nil => self.emit_op(OpCode::Nil),
            TokenKind::Ident(name) => self.variable(&name, can_assign),
            TokenKind::LParen => {
                self.expression();
                self.consume(&TokenKind::RParen, "Expect ')' after expression.");
            }
            TokenKind::Minus => {
                self.parse_precedence(Precedence::Unary);
                self.emit_op(OpCode::Negate);
            }
            TokenKind::Bang => {
                self.parse_precedence(Precedence::Unary);
                self.emit_op(OpCode::Not);
            }
            _ => return false,
        }
        true
    }

    fn variable(&mut self, name: &str, can_assign: bool) {
        let arg = self.identifier_constant(name);
        if can_assign && self.matches(&TokenKind::Assign) {
            self.expression();
            self.emit_with_operand(OpCode::SetGlobal, arg);
        } else {
            self.emit_with_operand(OpCode::GetGlobal, arg);
        }
    }

    fn binary(&mut self) {
        let operator = self.previous.clone();
        self.parse_precedence(Precedence::of(&operator.kind).next());

        // Operators are attributed to the operator token's line.
        let line = operator.span.line;
        let ops: &[OpCode] = match operator.kind {
            TokenKind::Plus => &[OpCode::Add],
            TokenKind::Minus => &[OpCode::Subtract],
            TokenKind::Star => &[OpCode::Multiply],
            TokenKind::Slash => &[OpCode::Divide],
            TokenKind::Eq => &[OpCode::Equal],
            TokenKind::BangEq => &[OpCode::Equal, OpCode::Not],
            TokenKind::Gt => &[OpCode::Greater],
            TokenKind::GtEq => &[OpCode::Less, OpCode::Not],
            TokenKind::Lt => &[OpCode::Less],
            TokenKind::LtEq => &[OpCode::Greater, OpCode::Not],
            _ => &[],
        };
        for &op in ops {
            self.emit_op_at(op, line);
        }
    }
}
