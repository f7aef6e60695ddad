//! Source programs run through the full compile-and-execute pipeline.

mod common;

use common::capturing_vm;
use ember_vm::{InterpretError, InterpretResult, RuntimeErrorKind, VmConfig};

/// Run `source` on a fresh VM and return (result, stdout, stderr).
fn run(source: &str) -> (InterpretResult, String, String) {
    let (mut vm, out, err) = capturing_vm(VmConfig::default());
    let result = vm.interpret(source);
    (result, out.text(), err.text())
}

fn stdout_of(source: &str) -> String {
    let (result, out, err) = run(source);
    assert_eq!(result, InterpretResult::Ok, "stderr: {}", err);
    out
}

#[test]
fn e2e_prints_integer_sum() {
    assert_eq!(stdout_of("print 2 + 3;"), "5\n");
}

#[test]
fn e2e_precedence_and_grouping() {
    assert_eq!(stdout_of("print 1 + 2 * 3;"), "7\n");
    assert_eq!(stdout_of("print (1 + 2) * 3;"), "9\n");
    assert_eq!(stdout_of("print -(4 - 6);"), "2\n");
    assert_eq!(stdout_of("print 7 / 2;"), "3\n");
}

#[test]
fn e2e_doubles_print_like_percent_g() {
    assert_eq!(stdout_of("print 7.0 / 2.0;"), "3.5\n");
    assert_eq!(stdout_of("print 2.0 * 3.0;"), "6\n");
    assert_eq!(stdout_of("print 1.0 / 3.0;"), "0.333333\n");
    assert_eq!(stdout_of("print 1.0 / 0.0;"), "inf\n");
}

#[test]
fn e2e_literals_and_logic() {
    assert_eq!(
        stdout_of("print nil; print true; print !true; print !nil; print !0;"),
        "nil\ntrue\nfalse\ntrue\nfalse\n"
    );
}

#[test]
fn e2e_derived_comparison_operators() {
    let out = stdout_of(
        "print 1 != 2; print 2 != 2; print 3 >= 3; print 2 >= 3; print 2 <= 3; print 4 <= 3;",
    );
    assert_eq!(out, "true\nfalse\ntrue\nfalse\ntrue\nfalse\n");
}

#[test]
fn e2e_string_equality_is_by_content() {
    assert_eq!(stdout_of("print \"ab\" + \"c\" == \"abc\";"), "true\n");
    assert_eq!(stdout_of("print \"a\" == \"b\";"), "false\n");
    assert_eq!(stdout_of("print 1 == 1.0;"), "false\n");
}

#[test]
fn e2e_globals_define_read_and_assign() {
    let out = stdout_of("var a = 1; var b; print b; b = a + 1; print b; print a = 5; print a;");
    assert_eq!(out, "nil\n2\n5\n5\n");
}

#[test]
fn e2e_globals_persist_across_interpret_calls() {
    let (mut vm, out, _err) = capturing_vm(VmConfig::default());
    assert_eq!(vm.interpret("var greeting = \"hi\";"), InterpretResult::Ok);
    assert_eq!(vm.interpret("greeting = greeting + \"!\";"), InterpretResult::Ok);
    assert_eq!(vm.interpret("print greeting;"), InterpretResult::Ok);
    assert_eq!(out.text(), "hi!\n");
}

#[test]
fn e2e_runtime_error_reports_message_and_line() {
    let (result, out, err) = run("print 1;\nprint 2 + 3.0;\nprint 3;");
    assert_eq!(result, InterpretResult::RuntimeError);
    assert_eq!(out, "1\n");
    assert_eq!(
        err,
        "Operands must be either both integer or both double numbers.\n[line 2] in script\n"
    );
}

#[test]
fn e2e_undefined_variable_read() {
    let (result, _out, err) = run("print nope;");
    assert_eq!(result, InterpretResult::RuntimeError);
    assert_eq!(err, "Undefined variable 'nope'.\n[line 1] in script\n");
}

#[test]
fn e2e_assignment_to_undefined_global_leaves_it_undefined() {
    let (mut vm, _out, err) = capturing_vm(VmConfig::default());
    assert_eq!(vm.interpret("ghost = 1;"), InterpretResult::RuntimeError);
    assert!(vm.globals().is_empty());
    assert_eq!(vm.interpret("print ghost;"), InterpretResult::RuntimeError);
    assert!(err.text().ends_with("Undefined variable 'ghost'.\n[line 1] in script\n"));
}

#[test]
fn e2e_negating_a_string_fails() {
    let (result, _out, err) = run("print -\"x\";");
    assert_eq!(result, InterpretResult::RuntimeError);
    assert!(err.starts_with("Operand must be a number (int/double)."));
}

#[test]
fn e2e_integer_division_by_zero_fails() {
    let (mut vm, _out, _err) = capturing_vm(VmConfig::default());
    let err = vm.run_source("print 1 / 0;").unwrap_err();
    assert_eq!(err.runtime_kind(), Some(&RuntimeErrorKind::DivisionByZero));
}

#[test]
fn e2e_compile_error_runs_nothing() {
    let (result, out, err) = run("print 1;\nprint (2;");
    assert_eq!(result, InterpretResult::CompileError);
    assert_eq!(out, "");
    assert_eq!(err, "[line 2] Error at ';': Expect ')' after expression.\n");
}

#[test]
fn e2e_compile_error_is_structured() {
    let (mut vm, _out, _err) = capturing_vm(VmConfig::default());
    match vm.run_source("var = 3;") {
        Err(InterpretError::Compile(e)) => {
            assert_eq!(e.diagnostics.len(), 1);
            assert_eq!(e.diagnostics[0].message, "Expect variable name.");
        }
        other => panic!("expected compile error, got {:?}", other),
    }
}

#[test]
fn e2e_vm_recovers_after_runtime_error() {
    let (mut vm, out, _err) = capturing_vm(VmConfig::default());
    assert_eq!(vm.interpret("var x = 1; x + nil;"), InterpretResult::RuntimeError);
    assert_eq!(vm.stack_depth(), 0);
    assert_eq!(vm.interpret("print x;"), InterpretResult::Ok);
    assert_eq!(out.text(), "1\n");
}

#[test]
fn e2e_expression_statements_leave_stack_empty() {
    let (mut vm, _out, _err) = capturing_vm(VmConfig::default());
    assert_eq!(vm.interpret("1 + 2; \"a\"; nil; var z = 3; z = 4;"), InterpretResult::Ok);
    assert_eq!(vm.stack_depth(), 0);
}

#[test]
fn e2e_deep_expression_overflows_small_stack() {
    let (mut vm, _out, _err) = capturing_vm(VmConfig::new().with_stack_capacity(4));
    let err = vm.run_source("print 1 + (2 + (3 + (4 + (5 + 6))));").unwrap_err();
    assert_eq!(
        err.runtime_kind(),
        Some(&RuntimeErrorKind::StackOverflow { capacity: 4 })
    );
}

#[test]
fn e2e_teardown_forgets_globals() {
    let (mut vm, _out, _err) = capturing_vm(VmConfig::default());
    assert_eq!(vm.interpret("var kept = 1;"), InterpretResult::Ok);
    vm.teardown();
    assert_eq!(vm.interpret("print kept;"), InterpretResult::RuntimeError);
}

#[test]
fn e2e_huge_stack_limit_runs_without_preallocating() {
    let (mut vm, out, _err) = capturing_vm(VmConfig::new().with_stack_capacity(usize::MAX / 2));
    assert_eq!(vm.interpret("print 1;"), InterpretResult::Ok);
    assert_eq!(out.text(), "1\n");
}
