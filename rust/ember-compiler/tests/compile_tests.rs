//! Compiler tests: source in, bytecode or diagnostics out.

use ember_compiler::{compile, CompileError, ErrorLocation};
use ember_core::{Chunk, Heap, OpCode, Value};

fn compile_ok(src: &str) -> (Chunk, Heap) {
    let mut heap = Heap::new();
    let chunk = compile(src, &mut heap).expect("source should compile");
    (chunk, heap)
}

fn compile_err(src: &str) -> CompileError {
    let mut heap = Heap::new();
    match compile(src, &mut heap) {
        Ok(_) => panic!("expected a compile error for {:?}", src),
        Err(e) => e,
    }
}

fn opcodes(chunk: &Chunk) -> Vec<OpCode> {
    let mut out = Vec::new();
    let mut offset = 0;
    while offset < chunk.code.len() {
        let op = OpCode::from_byte(chunk.code[offset]).expect("valid opcode");
        out.push(op);
        offset += 1 + op.operand_len();
    }
    out
}

// ─── Code generation ───

#[test]
fn empty_program_is_a_single_return() {
    let (chunk, _) = compile_ok("");
    assert_eq!(opcodes(&chunk), vec![OpCode::Return]);
}

#[test]
fn literals_keep_their_numeric_type() {
    let (chunk, heap) = compile_ok("print 2; print 2.0; print \"two\";");
    assert_eq!(chunk.constants[0], Value::Int(2));
    assert_eq!(chunk.constants[1], Value::Double(2.0));
    let s = chunk.constants[2].as_string().expect("string constant");
    assert_eq!(heap.resolve(s).unwrap().as_str(), "two");
}

#[test]
fn var_without_initializer_defines_nil() {
    let (chunk, _) = compile_ok("var x;");
    assert_eq!(
        opcodes(&chunk),
        vec![OpCode::Nil, OpCode::DefineGlobal, OpCode::Return]
    );
}

#[test]
fn assignment_emits_set_global_and_pop() {
    let (chunk, _) = compile_ok("var x = 1; x = 2;");
    assert_eq!(
        opcodes(&chunk),
        vec![
            OpCode::Constant,
            OpCode::DefineGlobal,
            OpCode::Constant,
            OpCode::SetGlobal,
            OpCode::Pop,
            OpCode::Return,
        ]
    );
}

#[test]
fn assignment_is_right_associative() {
    let (chunk, _) = compile_ok("a = b = 1;");
    assert_eq!(
        opcodes(&chunk),
        vec![
            OpCode::Constant,
            OpCode::SetGlobal,
            OpCode::SetGlobal,
            OpCode::Pop,
            OpCode::Return,
        ]
    );
}

#[test]
fn unary_and_grouping() {
    let (chunk, _) = compile_ok("print -(1 + 2);\nprint !true;");
    assert_eq!(
        opcodes(&chunk),
        vec![
            OpCode::Constant,
            OpCode::Constant,
            OpCode::Add,
            OpCode::Negate,
            OpCode::Print,
            OpCode::True,
            OpCode::Not,
            OpCode::Print,
            OpCode::Return,
        ]
    );
}

#[test]
fn every_byte_carries_its_source_line() {
    let (chunk, _) = compile_ok("print 1\n  +\n  2;");
    assert_eq!(chunk.lines.len(), chunk.code.len());
    // CONSTANT 1 on line 1, CONSTANT 2 on line 3, ADD attributed to the `+`.
    assert_eq!(&chunk.lines[0..2], &[1, 1]);
    assert_eq!(&chunk.lines[2..4], &[3, 3]);
    assert_eq!(chunk.lines[4], 2);
}

#[test]
fn strings_are_interned_into_the_callers_heap() {
    let mut heap = Heap::new();
    let before = heap.intern("shared");
    let chunk = compile("print \"shared\"; var shared;", &mut heap).unwrap();
    let ids: Vec<_> = chunk.constants.iter().filter_map(|v| v.as_string()).collect();
    assert_eq!(ids, vec![before, before]);
}

// ─── Diagnostics ───

#[test]
fn missing_semicolon_points_at_end() {
    let err = compile_err("print 1");
    assert_eq!(err.diagnostics.len(), 1);
    assert_eq!(err.diagnostics[0].location, ErrorLocation::End);
    assert_eq!(err.diagnostics[0].message, "Expect ';' after value.");
}

#[test]
fn invalid_assignment_target() {
    let err = compile_err("var a; var b; a + b = 3;");
    assert_eq!(
        err.diagnostics[0].to_string(),
        "[line 1] Error at '=': Invalid assignment target."
    );
}

#[test]
fn missing_variable_name() {
    let err = compile_err("var 1 = 2;");
    assert_eq!(
        err.diagnostics[0].to_string(),
        "[line 1] Error at '1': Expect variable name."
    );
}

#[test]
fn unclosed_group() {
    let err = compile_err("print (1 + 2;");
    assert_eq!(
        err.diagnostics[0].to_string(),
        "[line 1] Error at ';': Expect ')' after expression."
    );
}

#[test]
fn lexical_errors_have_no_token_location() {
    let err = compile_err("print 1;\nprint \"open;");
    assert_eq!(err.diagnostics[0].to_string(), "[line 2] Error: Unterminated string.");
}

#[test]
fn reserved_words_are_not_expressions() {
    let err = compile_err("print class;");
    assert_eq!(
        err.diagnostics[0].to_string(),
        "[line 1] Error at 'class': Expect expression."
    );
}

#[test]
fn recovery_reports_errors_from_several_statements() {
    let err = compile_err("print ;\nvar = 1;\nprint 3;\n1 +;");
    let lines: Vec<usize> = err.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![1, 2, 4]);
}

#[test]
fn too_many_constants() {
    let src: String = (0..300).map(|i| format!("print {};\n", i)).collect();
    let err = compile_err(&src);
    assert!(err
        .diagnostics
        .iter()
        .any(|d| d.message == "Too many constants in one chunk."));
}
