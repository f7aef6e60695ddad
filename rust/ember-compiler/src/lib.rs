//! Ember Compiler
//!
//! Turns Ember source text into a bytecode [`Chunk`]. String literals and
//! global names are interned into the caller's [`Heap`], which must be the
//! heap of the VM that will run the chunk.

pub mod compiler;

use std::fmt;

use ember_core::{Chunk, Heap};
use thiserror::Error;

use compiler::parser::Parser;

/// Where in the source a diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorLocation {
    /// At a specific token, carrying its lexeme
    At(String),
    /// At end of input
    End,
    /// Lexical errors carry no token
    None,
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorLocation::At(lexeme) => write!(f, " at '{}'", lexeme),
            ErrorLocation::End => write!(f, " at end"),
            ErrorLocation::None => Ok(()),
        }
    }
}

/// One compile error, rendered as `[line N] Error at 'x': message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}] Error{location}: {message}")]
pub struct Diagnostic {
    pub line: usize,
    pub location: ErrorLocation,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_diagnostics(.diagnostics))]
pub struct CompileError {
    pub diagnostics: Vec<Diagnostic>,
}

fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compile a program into a chunk ending in `RETURN`.
pub fn compile(source: &str, heap: &mut Heap) -> Result<Chunk, CompileError> {
    match Parser::new(source, heap).compile() {
        Ok(chunk) => {
            tracing::debug!(
                bytes = chunk.len(),
                constants = chunk.constants.len(),
                "compiled chunk"
            );
            Ok(chunk)
        }
        Err(diagnostics) => {
            tracing::debug!(errors = diagnostics.len(), "compilation failed");
            Err(CompileError { diagnostics })
        }
    }
}
