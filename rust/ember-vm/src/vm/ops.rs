//! Arithmetic, comparison, and negation for the VM.

use ember_core::Value;

use crate::error::{Mismatch, RuntimeErrorKind};
use crate::vm::VM;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Greater,
    Less,
}

fn operands_mismatch(a: &Value, b: &Value) -> RuntimeErrorKind {
    RuntimeErrorKind::TypeMismatch(Mismatch::Operands {
        left: a.type_name(),
        right: b.type_name(),
    })
}

/// Numeric binary operation. Both operands must be `Int` or both `Double`;
/// the result has the same variant.
pub fn arithmetic(op: BinaryOp, a: Value, b: Value) -> Result<Value, RuntimeErrorKind> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => {
            let result = match op {
                BinaryOp::Add => x.checked_add(y),
                BinaryOp::Sub => x.checked_sub(y),
                BinaryOp::Mul => x.checked_mul(y),
                BinaryOp::Div => {
                    if y == 0 {
                        return Err(RuntimeErrorKind::DivisionByZero);
                    }
                    x.checked_div(y)
                }
            };
            result
                .map(Value::Int)
                .ok_or(RuntimeErrorKind::IntegerOverflow)
        }
        (Value::Double(x), Value::Double(y)) => Ok(Value::Double(match op {
            BinaryOp::Add => x + y,
            BinaryOp::Sub => x - y,
            BinaryOp::Mul => x * y,
            BinaryOp::Div => x / y,
        })),
        _ => Err(operands_mismatch(&a, &b)),
    }
}

/// Numeric ordering under the same typing rule as [`arithmetic`].
pub fn compare(op: CompareOp, a: Value, b: Value) -> Result<bool, RuntimeErrorKind> {
    let ordering = match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.partial_cmp(&y),
        (Value::Double(x), Value::Double(y)) => x.partial_cmp(&y),
        _ => return Err(operands_mismatch(&a, &b)),
    };
    // NaN compares false both ways.
    Ok(match (op, ordering) {
        (CompareOp::Greater, Some(std::cmp::Ordering::Greater)) => true,
        (CompareOp::Less, Some(std::cmp::Ordering::Less)) => true,
        _ => false,
    })
}

pub fn negate(v: Value) -> Result<Value, RuntimeErrorKind> {
    match v {
        Value::Int(n) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or(RuntimeErrorKind::IntegerOverflow),
        Value::Double(d) => Ok(Value::Double(-d)),
        other => Err(RuntimeErrorKind::TypeMismatch(Mismatch::Operand {
            found: other.type_name(),
        })),
    }
}

impl VM {
    pub(crate) fn binary_arith(&mut self, op: BinaryOp) -> Result<(), RuntimeErrorKind> {
        let b = self.stack.pop()?;
        let a = self.stack.pop()?;
        let result = arithmetic(op, a, b)?;
        self.stack.push(result)
    }

    pub(crate) fn binary_compare(&mut self, op: CompareOp) -> Result<(), RuntimeErrorKind> {
        let b = self.stack.pop()?;
        let a = self.stack.pop()?;
        let result = compare(op, a, b)?;
        self.stack.push(Value::Bool(result))
    }

    /// `ADD`: concatenation when both operands are strings, numeric
    /// addition otherwise.
    pub(crate) fn add(&mut self) -> Result<(), RuntimeErrorKind> {
        match (self.stack.peek(1)?.as_string(), self.stack.peek(0)?.as_string()) {
            (Some(a), Some(b)) => {
                self.stack.pop()?;
                self.stack.pop()?;
                let joined = self
                    .heap
                    .concat(a, b)
                    .ok_or(RuntimeErrorKind::InvalidObject)?;
                self.stack.push(Value::string(joined))
            }
            _ => self.binary_arith(BinaryOp::Add),
        }
    }
}
