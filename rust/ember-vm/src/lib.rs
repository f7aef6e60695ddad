//! Stack-based virtual machine for executing Ember bytecode.

pub mod config;
pub mod error;
pub mod stack;
pub mod vm;

pub use config::VmConfig;
pub use error::{InterpretError, InterpretResult, Mismatch, RuntimeError, RuntimeErrorKind};
pub use vm::VM;
