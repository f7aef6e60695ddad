//! Runtime error model.
//!
//! Errors are structured values; the text shown to users comes from their
//! `Display` impls.

use ember_compiler::CompileError;
use thiserror::Error;

/// Which operand typing rule was violated. Carries the offending type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Mismatch {
    #[error("Operands must be either both integer or both double numbers.")]
    Operands {
        left: &'static str,
        right: &'static str,
    },
    #[error("Operand must be a number (int/double).")]
    Operand { found: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeErrorKind {
    #[error("{0}")]
    TypeMismatch(Mismatch),
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),
    #[error("Stack overflow: capacity of {capacity} values exceeded.")]
    StackOverflow { capacity: usize },
    #[error("Stack underflow.")]
    StackUnderflow,
    #[error("Division by zero.")]
    DivisionByZero,
    #[error("Integer overflow.")]
    IntegerOverflow,
    #[error("Unknown opcode {0}.")]
    InvalidOpcode(u8),
    #[error("Invalid constant index {0}.")]
    InvalidConstant(u8),
    #[error("Dangling object reference.")]
    InvalidObject,
    #[error("Unexpected end of bytecode.")]
    UnexpectedEndOfCode,
    #[error("Output error: {0}")]
    Io(String),
}

/// A runtime failure attributed to the source line of the faulting
/// instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}\n[line {line}] in script")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub line: usize,
}

#[derive(Debug, Error)]
pub enum InterpretError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Coarse outcome of [`crate::VM::interpret`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretResult {
    Ok,
    CompileError,
    RuntimeError,
}

impl InterpretError {
    pub fn result(&self) -> InterpretResult {
        match self {
            InterpretError::Compile(_) => InterpretResult::CompileError,
            InterpretError::Runtime(_) => InterpretResult::RuntimeError,
        }
    }

    pub fn runtime_kind(&self) -> Option<&RuntimeErrorKind> {
        match self {
            InterpretError::Runtime(err) => Some(&err.kind),
            InterpretError::Compile(_) => None,
        }
    }
}

impl From<Result<(), InterpretError>> for InterpretResult {
    fn from(result: Result<(), InterpretError>) -> Self {
        match result {
            Ok(()) => InterpretResult::Ok,
            Err(err) => err.result(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_error_rendering() {
        let err = RuntimeError {
            kind: RuntimeErrorKind::TypeMismatch(Mismatch::Operands {
                left: "int",
                right: "double",
            }),
            line: 7,
        };
        assert_eq!(
            err.to_string(),
            "Operands must be either both integer or both double numbers.\n[line 7] in script"
        );

        let err = RuntimeError {
            kind: RuntimeErrorKind::UndefinedVariable("y".into()),
            line: 1,
        };
        assert_eq!(err.to_string(), "Undefined variable 'y'.\n[line 1] in script");
    }

    #[test]
    fn test_interpret_result_mapping() {
        let runtime: InterpretError = RuntimeError {
            kind: RuntimeErrorKind::StackUnderflow,
            line: 1,
        }
        .into();
        assert_eq!(runtime.result(), InterpretResult::RuntimeError);
        assert_eq!(runtime.runtime_kind(), Some(&RuntimeErrorKind::StackUnderflow));

        let compile: InterpretError = CompileError { diagnostics: vec![] }.into();
        assert_eq!(compile.result(), InterpretResult::CompileError);
        assert_eq!(InterpretResult::from(Ok(())), InterpretResult::Ok);
    }
}
