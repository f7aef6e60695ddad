//! Capacity-checked operand stack.

use ember_core::Value;

use crate::error::RuntimeErrorKind;

/// `capacity` is the overflow limit only; storage grows on demand.
#[derive(Debug)]
pub struct Stack {
    values: Vec<Value>,
    capacity: usize,
}

impl Stack {
    pub fn new(capacity: usize) -> Self {
        Stack {
            values: Vec::new(),
            capacity,
        }
    }

    pub fn push(&mut self, value: Value) -> Result<(), RuntimeErrorKind> {
        if self.values.len() >= self.capacity {
            return Err(RuntimeErrorKind::StackOverflow {
                capacity: self.capacity,
            });
        }
        self.values.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Value, RuntimeErrorKind> {
        self.values.pop().ok_or(RuntimeErrorKind::StackUnderflow)
    }

    /// Look `distance` slots below the top without removing anything.
    pub fn peek(&self, distance: usize) -> Result<Value, RuntimeErrorKind> {
        self.values
            .len()
            .checked_sub(distance + 1)
            .and_then(|idx| self.values.get(idx))
            .copied()
            .ok_or(RuntimeErrorKind::StackUnderflow)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bottom-to-top view of the stack.
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
