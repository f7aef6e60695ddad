//! Runtime limits for the VM.

/// Default operand stack capacity.
pub const DEFAULT_STACK_CAPACITY: usize = 256;

/// Largest stack capacity accepted from configuration files.
pub const MAX_STACK_CAPACITY: usize = 1 << 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    /// Maximum number of values on the operand stack
    pub stack_capacity: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            stack_capacity: DEFAULT_STACK_CAPACITY,
        }
    }
}

impl VmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stack_capacity(mut self, capacity: usize) -> Self {
        self.stack_capacity = capacity;
        self
    }
}
