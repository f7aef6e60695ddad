//! Bytecode chunk: instruction stream, constant pool, and line table.

use thiserror::Error;

use crate::value::Value;

/// Opcodes for the Ember stack VM.
///
/// Stack effects are written `[before] -> [after]`, top of stack rightmost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    Constant = 0,     // idx: [] -> [k]
    Nil = 1,          // [] -> [nil]
    True = 2,         // [] -> [true]
    False = 3,        // [] -> [false]
    Pop = 4,          // [v] -> []
    GetGlobal = 5,    // idx: [] -> [v]
    DefineGlobal = 6, // idx: [v] -> []
    SetGlobal = 7,    // idx: [v] -> [v]
    Equal = 8,        // [a, b] -> [a == b]
    Greater = 9,      // [a, b] -> [a > b]
    Less = 10,        // [a, b] -> [a < b]
    Add = 11,         // [a, b] -> [a + b]
    Subtract = 12,    // [a, b] -> [a - b]
    Multiply = 13,    // [a, b] -> [a * b]
    Divide = 14,      // [a, b] -> [a / b]
    Not = 15,         // [v] -> [!v]
    Negate = 16,      // [v] -> [-v]
    Print = 17,       // [v] -> []
    Return = 18,      // [] -> []
}

impl OpCode {
    pub const ALL: [OpCode; 19] = [
        OpCode::Constant,
        OpCode::Nil,
        OpCode::True,
        OpCode::False,
        OpCode::Pop,
        OpCode::GetGlobal,
        OpCode::DefineGlobal,
        OpCode::SetGlobal,
        OpCode::Equal,
        OpCode::Greater,
        OpCode::Less,
        OpCode::Add,
        OpCode::Subtract,
        OpCode::Multiply,
        OpCode::Divide,
        OpCode::Not,
        OpCode::Negate,
        OpCode::Print,
        OpCode::Return,
    ];

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }

    /// Number of operand bytes following the opcode.
    pub fn operand_len(self) -> usize {
        match self {
            OpCode::Constant | OpCode::GetGlobal | OpCode::DefineGlobal | OpCode::SetGlobal => 1,
            _ => 0,
        }
    }

    /// Net change in stack depth after a successful execution.
    pub fn stack_effect(self) -> isize {
        match self {
            OpCode::Constant | OpCode::Nil | OpCode::True | OpCode::False | OpCode::GetGlobal => 1,
            OpCode::Pop | OpCode::DefineGlobal | OpCode::Print => -1,
            OpCode::Equal
            | OpCode::Greater
            | OpCode::Less
            | OpCode::Add
            | OpCode::Subtract
            | OpCode::Multiply
            | OpCode::Divide => -1,
            OpCode::SetGlobal | OpCode::Not | OpCode::Negate | OpCode::Return => 0,
        }
    }

    /// Minimum stack depth the instruction needs before it runs.
    pub fn stack_inputs(self) -> usize {
        match self {
            OpCode::Pop
            | OpCode::DefineGlobal
            | OpCode::SetGlobal
            | OpCode::Not
            | OpCode::Negate
            | OpCode::Print => 1,
            OpCode::Equal
            | OpCode::Greater
            | OpCode::Less
            | OpCode::Add
            | OpCode::Subtract
            | OpCode::Multiply
            | OpCode::Divide => 2,
            _ => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OpCode::Constant => "OP_CONSTANT",
            OpCode::Nil => "OP_NIL",
            OpCode::True => "OP_TRUE",
            OpCode::False => "OP_FALSE",
            OpCode::Pop => "OP_POP",
            OpCode::GetGlobal => "OP_GET_GLOBAL",
            OpCode::DefineGlobal => "OP_DEFINE_GLOBAL",
            OpCode::SetGlobal => "OP_SET_GLOBAL",
            OpCode::Equal => "OP_EQUAL",
            OpCode::Greater => "OP_GREATER",
            OpCode::Less => "OP_LESS",
            OpCode::Add => "OP_ADD",
            OpCode::Subtract => "OP_SUBTRACT",
            OpCode::Multiply => "OP_MULTIPLY",
            OpCode::Divide => "OP_DIVIDE",
            OpCode::Not => "OP_NOT",
            OpCode::Negate => "OP_NEGATE",
            OpCode::Print => "OP_PRINT",
            OpCode::Return => "OP_RETURN",
        }
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> u8 {
        op as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("Too many constants in one chunk.")]
    TooManyConstants,
}

/// A compiled unit of bytecode.
///
/// `lines` runs parallel to `code`: every byte, opcode or operand, records the
/// source line that produced it.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    pub code: Vec<u8>,
    pub constants: Vec<Value>,
    pub lines: Vec<usize>,
}

impl Chunk {
    /// Largest constant pool addressable by a one-byte operand.
    pub const MAX_CONSTANTS: usize = u8::MAX as usize + 1;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, byte: u8, line: usize) {
        self.code.push(byte);
        self.lines.push(line);
    }

    pub fn write_op(&mut self, op: OpCode, line: usize) {
        self.write(op.into(), line);
    }

    pub fn add_constant(&mut self, value: Value) -> Result<u8, ChunkError> {
        if self.constants.len() >= Self::MAX_CONSTANTS {
            return Err(ChunkError::TooManyConstants);
        }
        self.constants.push(value);
        Ok((self.constants.len() - 1) as u8)
    }

    pub fn opcode_at(&self, offset: usize) -> Option<u8> {
        self.code.get(offset).copied()
    }

    pub fn constant_at(&self, index: u8) -> Option<Value> {
        self.constants.get(index as usize).copied()
    }

    pub fn line_at(&self, offset: usize) -> Option<usize> {
        self.lines.get(offset).copied()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}
