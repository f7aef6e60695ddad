//! Stack VM dispatch loop for executing Ember bytecode.

mod ops;

pub use ops::{arithmetic, compare, negate, BinaryOp, CompareOp};

use std::io::{self, Write};

use ember_core::debug::disassemble_instruction;
use ember_core::{Chunk, Globals, Heap, OpCode, StringId, Value};
use tracing::Level;

use crate::config::VmConfig;
use crate::error::{InterpretError, InterpretResult, RuntimeError, RuntimeErrorKind};
use crate::stack::Stack;

/// Output stream used for `print` and for diagnostics.
pub type Sink = Box<dyn Write + Send>;

/// The Ember stack VM.
///
/// One instance owns its stack, globals, and string heap. Globals and heap
/// survive across [`VM::interpret`] calls until [`VM::teardown`].
pub struct VM {
    config: VmConfig,
    pub(crate) stack: Stack,
    globals: Globals,
    pub(crate) heap: Heap,
    /// Offset of the next byte to fetch
    ip: usize,
    /// Offset of the opcode currently executing
    instruction_start: usize,
    out: Sink,
    diagnostics: Sink,
}

impl Default for VM {
    fn default() -> Self {
        Self::new(VmConfig::default())
    }
}

impl VM {
    pub fn new(config: VmConfig) -> Self {
        Self {
            stack: Stack::new(config.stack_capacity),
            globals: Globals::new(),
            heap: Heap::new(),
            ip: 0,
            instruction_start: 0,
            out: Box::new(io::stdout()),
            diagnostics: Box::new(io::stderr()),
            config,
        }
    }

    /// Redirect program output and diagnostics.
    pub fn with_output(mut self, out: Sink, diagnostics: Sink) -> Self {
        self.out = out;
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Bottom-to-top view of the operand stack.
    pub fn stack_values(&self) -> &[Value] {
        self.stack.as_slice()
    }

    /// Release every global and heap object and empty the stack.
    ///
    /// String handles and chunks compiled before the call belong to the old
    /// heap generation: their strings resolve to `None` afterwards and must
    /// not be run again.
    pub fn teardown(&mut self) {
        tracing::debug!(
            globals = self.globals.len(),
            objects = self.heap.len(),
            "tearing down vm"
        );
        self.stack.clear();
        self.globals.clear();
        self.heap.clear();
        self.ip = 0;
        self.instruction_start = 0;
    }

    /// Compile and run `source`. Diagnostics have been written by the time
    /// this returns.
    pub fn interpret(&mut self, source: &str) -> InterpretResult {
        self.run_source(source).into()
    }

    /// Same pipeline as [`VM::interpret`], returning the structured error.
    pub fn run_source(&mut self, source: &str) -> Result<(), InterpretError> {
        let chunk = match ember_compiler::compile(source, &mut self.heap) {
            Ok(chunk) => chunk,
            Err(err) => {
                for diagnostic in &err.diagnostics {
                    let _ = writeln!(self.diagnostics, "{}", diagnostic);
                }
                let _ = self.diagnostics.flush();
                return Err(err.into());
            }
        };
        self.run_chunk(&chunk)?;
        Ok(())
    }

    /// Execute a compiled chunk from offset 0 until `RETURN`.
    ///
    /// On failure the error is reported to the diagnostic stream and the
    /// stack is emptied.
    pub fn run_chunk(&mut self, chunk: &Chunk) -> Result<(), RuntimeError> {
        self.ip = 0;
        self.instruction_start = 0;
        let mut result = self.run(chunk);
        if let Err(e) = self.out.flush() {
            result = result.and(Err(RuntimeErrorKind::Io(e.to_string())));
        }
        result.map_err(|kind| self.runtime_error(chunk, kind))
    }

    /// Build the error for the faulting instruction, report it, and reset
    /// the stack.
    fn runtime_error(&mut self, chunk: &Chunk, kind: RuntimeErrorKind) -> RuntimeError {
        // Running off the end has no byte of its own; blame the last line.
        let line = chunk
            .line_at(self.instruction_start)
            .or_else(|| chunk.lines.last().copied())
            .unwrap_or(0);
        let err = RuntimeError { kind, line };
        tracing::debug!(line, offset = self.instruction_start, error = %err.kind, "runtime error");
        let _ = writeln!(self.diagnostics, "{}", err);
        let _ = self.diagnostics.flush();
        self.stack.clear();
        err
    }

    fn read_byte(&mut self, chunk: &Chunk) -> Result<u8, RuntimeErrorKind> {
        let byte = chunk
            .opcode_at(self.ip)
            .ok_or(RuntimeErrorKind::UnexpectedEndOfCode)?;
        self.ip += 1;
        Ok(byte)
    }

    fn read_constant(&mut self, chunk: &Chunk) -> Result<Value, RuntimeErrorKind> {
        let index = self.read_byte(chunk)?;
        chunk
            .constant_at(index)
            .ok_or(RuntimeErrorKind::InvalidConstant(index))
    }

    /// Read a constant operand that must name a global.
    fn read_name(&mut self, chunk: &Chunk) -> Result<StringId, RuntimeErrorKind> {
        let index = self.read_byte(chunk)?;
        chunk
            .constant_at(index)
            .and_then(|v| v.as_string())
            .ok_or(RuntimeErrorKind::InvalidConstant(index))
    }

    fn name_of(&self, id: StringId) -> String {
        match self.heap.resolve(id) {
            Some(s) => s.as_str().to_string(),
            None => format!("<string #{}>", id.index()),
        }
    }

    fn trace_instruction(&self, chunk: &Chunk) {
        let stack: String = self
            .stack
            .as_slice()
            .iter()
            .map(|v| format!("[ {} ]", v.display(&self.heap)))
            .collect();
        let (instruction, _) = disassemble_instruction(chunk, &self.heap, self.ip);
        tracing::trace!(stack = %stack, "{}", instruction);
    }

    fn run(&mut self, chunk: &Chunk) -> Result<(), RuntimeErrorKind> {
        loop {
            if tracing::enabled!(Level::TRACE) {
                self.trace_instruction(chunk);
            }

            self.instruction_start = self.ip;
            let byte = self.read_byte(chunk)?;
            let op = OpCode::from_byte(byte).ok_or(RuntimeErrorKind::InvalidOpcode(byte))?;
            let depth = self.stack.len();

            match op {
                OpCode::Constant => {
                    let value = self.read_constant(chunk)?;
                    self.stack.push(value)?;
                }
                OpCode::Nil => self.stack.push(Value::Nil)?,
                OpCode::True => self.stack.push(Value::Bool(true))?,
                OpCode::False => self.stack.push(Value::Bool(false))?,
                OpCode::Pop => {
                    self.stack.pop()?;
                }
                OpCode::GetGlobal => {
                    let name = self.read_name(chunk)?;
                    let value = self
                        .globals
                        .get(name)
                        .ok_or_else(|| RuntimeErrorKind::UndefinedVariable(self.name_of(name)))?;
                    self.stack.push(value)?;
                }
                OpCode::DefineGlobal => {
                    let name = self.read_name(chunk)?;
                    let value = self.stack.peek(0)?;
                    self.globals.set(name, value);
                    self.stack.pop()?;
                }
                OpCode::SetGlobal => {
                    let name = self.read_name(chunk)?;
                    let value = self.stack.peek(0)?;
                    if self.globals.set(name, value) {
                        // Assignment never creates a binding.
                        self.globals.delete(name);
                        return Err(RuntimeErrorKind::UndefinedVariable(self.name_of(name)));
                    }
                }
                OpCode::Equal => {
                    let b = self.stack.pop()?;
                    let a = self.stack.pop()?;
                    self.stack.push(Value::Bool(a == b))?;
                }
                OpCode::Greater => self.binary_compare(CompareOp::Greater)?,
                OpCode::Less => self.binary_compare(CompareOp::Less)?,
                OpCode::Add => self.add()?,
                OpCode::Subtract => self.binary_arith(BinaryOp::Sub)?,
                OpCode::Multiply => self.binary_arith(BinaryOp::Mul)?,
                OpCode::Divide => self.binary_arith(BinaryOp::Div)?,
                OpCode::Not => {
                    let v = self.stack.pop()?;
                    self.stack.push(Value::Bool(v.is_falsey()))?;
                }
                OpCode::Negate => {
                    let v = self.stack.pop()?;
                    self.stack.push(negate(v)?)?;
                }
                OpCode::Print => {
                    let v = self.stack.pop()?;
                    writeln!(self.out, "{}", v.display(&self.heap))
                        .map_err(|e| RuntimeErrorKind::Io(e.to_string()))?;
                }
                OpCode::Return => return Ok(()),
            }

            debug_assert_eq!(
                self.stack.len() as isize - depth as isize,
                op.stack_effect(),
                "stack effect of {} violated",
                op.name()
            );
        }
    }
}
