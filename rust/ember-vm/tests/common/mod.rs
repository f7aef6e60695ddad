//! Shared helpers for VM integration tests.
#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use ember_core::{Chunk, OpCode, Value};
use ember_vm::{VmConfig, VM};

/// Cloneable in-memory writer so tests can read back what the VM wrote.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8(bytes).expect("utf-8 output")
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("capture lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A VM whose stdout and stderr are captured.
pub fn capturing_vm(config: VmConfig) -> (VM, Capture, Capture) {
    let out = Capture::default();
    let err = Capture::default();
    let vm = VM::new(config).with_output(Box::new(out.clone()), Box::new(err.clone()));
    (vm, out, err)
}

/// Small assembler for hand-written chunks. Every instruction gets the
/// line given to `line`.
pub struct Asm {
    pub chunk: Chunk,
    line: usize,
}

impl Asm {
    pub fn new() -> Self {
        Self { chunk: Chunk::new(), line: 1 }
    }

    pub fn line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn op(mut self, op: OpCode) -> Self {
        self.chunk.write_op(op, self.line);
        self
    }

    pub fn op_with(mut self, op: OpCode, value: Value) -> Self {
        let idx = self.chunk.add_constant(value).expect("constant pool space");
        self.chunk.write_op(op, self.line);
        self.chunk.write(idx, self.line);
        self
    }

    pub fn constant(self, value: Value) -> Self {
        self.op_with(OpCode::Constant, value)
    }

    pub fn finish(self) -> Chunk {
        self.chunk
    }
}
