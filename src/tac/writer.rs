//! TAC text output. Deterministic: identical modules serialize
//! byte-for-byte, which the cache and the round-trip tests rely on.

use std::io::{self, Write};

use crate::tac::{Function, Instruction, Module, Parameter};

pub fn write_module<W: Write>(w: &mut W, module: &Module) -> io::Result<()> {
    w.write_all(module_to_string(module).as_bytes())
}

pub fn module_to_string(module: &Module) -> String {
    let mut out = String::from(".tac v1\n\n");
    for (i, function) in module.functions.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_function(&mut out, function);
    }
    out
}

fn write_function(out: &mut String, function: &Function) {
    out.push_str(&format!(
        "func {}({}) -> {} {{\n",
        function.name,
        format_parameters(&function.parameters),
        function.return_type
    ));
    for instruction in &function.instructions {
        out.push_str("  ");
        out.push_str(&format_instruction(instruction));
        out.push('\n');
    }
    out.push_str("}\n");
}

fn format_parameters(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|p| format!("{}:{}", p.name, p.ty))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_instruction(instruction: &Instruction) -> String {
    match instruction {
        Instruction::Label { label } => format!("{}:", label),
        Instruction::Jmp { label } => format!("jmp {}", label),
        Instruction::Br {
            cond,
            true_label,
            false_label,
        } => format!("br {}, {}, {}", cond, true_label, false_label),
        Instruction::Ret { value: None } => "ret".to_string(),
        Instruction::Ret { value: Some(value) } => format!("ret {}", value),
        Instruction::Op {
            dest,
            opcode,
            operands,
        } => {
            let mut line = opcode.clone();
            if !operands.is_empty() {
                line.push(' ');
                line.push_str(&operands.join(", "));
            }
            match dest {
                Some(dest) => format!("{} = {}", dest, line),
                None => line,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_module_is_just_the_header() {
        assert_eq!(module_to_string(&Module::default()), ".tac v1\n\n");
    }

    #[test]
    fn function_layout_matches_the_grammar() {
        let mut f = Function::new("@main", "i32");
        let t0 = f.emit_op("const.i32", &["0"]);
        f.emit_ret(Some(t0));

        let text = module_to_string(&Module { functions: vec![f] });
        assert_eq!(
            text,
            ".tac v1\n\nfunc @main() -> i32 {\n  %t0 = const.i32 0\n  ret %t0\n}\n"
        );
    }

    #[test]
    fn parameters_and_branches_format() {
        let mut f = Function::new("@max", "i32");
        f.parameters.push(Parameter {
            name: "%a".into(),
            ty: "i32".into(),
        });
        f.parameters.push(Parameter {
            name: "%b".into(),
            ty: "i32".into(),
        });
        let cond = f.emit_op("lt_s", &["%a", "%b"]);
        f.emit_br(cond, ".L0", ".L1");
        f.emit_label(".L0");
        f.emit_ret(Some("%b".into()));
        f.emit_label(".L1");
        f.emit_ret(Some("%a".into()));

        let text = module_to_string(&Module { functions: vec![f] });
        assert_eq!(
            text,
            concat!(
                ".tac v1\n",
                "\n",
                "func @max(%a:i32, %b:i32) -> i32 {\n",
                "  %t0 = lt_s %a, %b\n",
                "  br %t0, .L0, .L1\n",
                "  .L0:\n",
                "  ret %b\n",
                "  .L1:\n",
                "  ret %a\n",
                "}\n",
            )
        );
    }

    #[test]
    fn functions_are_separated_by_a_blank_line() {
        let mut a = Function::new("@a", "void");
        a.emit_ret(None);
        let mut b = Function::new("@b", "void");
        b.emit_ret(None);

        let text = module_to_string(&Module {
            functions: vec![a, b],
        });
        assert_eq!(
            text,
            ".tac v1\n\nfunc @a() -> void {\n  ret\n}\n\nfunc @b() -> void {\n  ret\n}\n"
        );
    }

    #[test]
    fn writer_is_deterministic() {
        let mut f = Function::new("@f", "void");
        f.emit_jmp(".L0");
        f.emit_label(".L0");
        f.emit_ret(None);
        let module = Module { functions: vec![f] };
        assert_eq!(module_to_string(&module), module_to_string(&module));
    }
}
