//! Human-readable disassembly of chunks.

use std::fmt::Write;

use crate::chunk::{Chunk, OpCode};
use crate::strings::Heap;

/// Disassemble a whole chunk under a `== name ==` header.
pub fn disassemble_chunk(chunk: &Chunk, heap: &Heap, name: &str) -> String {
    let mut out = format!("== {} ==\n", name);
    let mut offset = 0;
    while offset < chunk.len() {
        let (text, next) = disassemble_instruction(chunk, heap, offset);
        out.push_str(&text);
        out.push('\n');
        offset = next;
    }
    out
}

/// Disassemble the instruction at `offset`, returning its text and the
/// offset of the following instruction.
pub fn disassemble_instruction(chunk: &Chunk, heap: &Heap, offset: usize) -> (String, usize) {
    let mut out = format!("{:04} ", offset);
    let line = chunk.line_at(offset).unwrap_or(0);
    if offset > 0 && chunk.line_at(offset - 1) == Some(line) {
        out.push_str("   | ");
    } else {
        let _ = write!(out, "{:4} ", line);
    }

    let byte = match chunk.opcode_at(offset) {
        Some(b) => b,
        None => {
            out.push_str("<end of code>");
            return (out, offset + 1);
        }
    };
    let Some(op) = OpCode::from_byte(byte) else {
        let _ = write!(out, "Unknown opcode {}", byte);
        return (out, offset + 1);
    };

    if op.operand_len() == 0 {
        out.push_str(op.name());
        return (out, offset + 1);
    }

    match chunk.opcode_at(offset + 1) {
        Some(index) => {
            let _ = write!(out, "{:<16} {:4} '", op.name(), index);
            match chunk.constant_at(index) {
                Some(value) => {
                    let _ = write!(out, "{}", value.display(heap));
                }
                None => out.push_str("<invalid constant>"),
            }
            out.push('\'');
        }
        None => {
            let _ = write!(out, "{:<16} <missing operand>", op.name());
        }
    }
    (out, offset + 1 + op.operand_len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_disassemble_constant_and_return() {
        let mut heap = Heap::new();
        let name = heap.intern("answer");
        let mut chunk = Chunk::new();
        let k = chunk.add_constant(Value::Int(42)).unwrap();
        let n = chunk.add_constant(Value::string(name)).unwrap();
        chunk.write_op(OpCode::Constant, 1);
        chunk.write(k, 1);
        chunk.write_op(OpCode::DefineGlobal, 1);
        chunk.write(n, 1);
        chunk.write_op(OpCode::Return, 2);

        let text = disassemble_chunk(&chunk, &heap, "test");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "== test ==");
        assert_eq!(lines[1], "0000    1 OP_CONSTANT         0 '42'");
        assert_eq!(lines[2], "0002    | OP_DEFINE_GLOBAL    1 'answer'");
        assert_eq!(lines[3], "0004    2 OP_RETURN");
    }

    #[test]
    fn test_disassemble_unknown_opcode() {
        let heap = Heap::new();
        let mut chunk = Chunk::new();
        chunk.write(200, 1);
        let (text, next) = disassemble_instruction(&chunk, &heap, 0);
        assert!(text.ends_with("Unknown opcode 200"));
        assert_eq!(next, 1);
    }
}
