//! Snapshot coverage for the externally visible text formats: TAC
//! output and diagnostic messages.

use tacc::frontend::diagnostic::CompileError;
use tacc::tac::writer::module_to_string;

fn compile_text(input: &str) -> String {
    module_to_string(&tacc::compile(input.as_bytes()).expect("unexpected compile error"))
}

fn compile_error(input: &str) -> CompileError {
    tacc::compile(input.as_bytes()).expect_err("expected a compile error")
}

#[test]
fn minimal_module_text() {
    insta::assert_snapshot!(compile_text("int main() { return 0; }"), @r"
    .tac v1

    func @main() -> i32 {
      %t0 = const.i32 0
      ret %t0
    }
    ");
}

#[test]
fn control_flow_module_text() {
    let source = "void f() { if (1) return; else while (0) ; }";
    insta::assert_snapshot!(compile_text(source), @r"
    .tac v1

    func @f() -> void {
      %t0 = const.i32 1
      br %t0, .L0, .L2
      .L0:
      ret
      .L2:
      jmp .L3
      .L3:
      %t1 = const.i32 0
      br %t1, .L4, .L5
      .L4:
      jmp .L3
      .L5:
      jmp .L1
      .L1:
      ret
    }
    ");
}

#[test]
fn multiple_functions_text() {
    let source = "void a() { } int b() { return 1 && 0; }";
    insta::assert_snapshot!(compile_text(source), @r"
    .tac v1

    func @a() -> void {
      ret
    }

    func @b() -> i32 {
      %t0 = const.i32 1
      %t1 = const.i32 0
      %t2 = ne %t0, 0
      %t3 = ne %t1, 0
      %t4 = and %t2, %t3
      ret %t4
    }
    ");
}

#[test]
fn diagnostic_message_shapes() {
    let messages = [
        compile_error("int f() { return @; }").to_string(),
        compile_error("int f() { return 0xFFFFFFFF; }").to_string(),
        compile_error("#pragma once\nint f() { return 0; }").to_string(),
        compile_error("int f() { return 0 }").to_string(),
    ]
    .join("\n");

    insta::assert_snapshot!(messages, @r"
    line 1, column 18: invalid character: byte '@' does not start any token
    line 1, column 18: invalid integer literal: 0xFFFFFFFF does not fit in a signed 32-bit integer
    line 1, column 2: unsupported directive: #pragma
    line 1, column 20: expected token: expected ';', got '}'
    ");
}
