//! Three-address code: the in-memory model, textual writer and
//! validating parser, and an on-disk cache of lowered modules.
//!
//! The textual format is the crate's external contract; other tools
//! re-read what the writer emits. The writer is deterministic, and the
//! parser enforces the structural invariants (single assignment per
//! temporary, unique and defined labels, known opcodes) on the way in.

pub mod cache;
pub mod parser;
pub mod writer;

use serde::Serialize;

/// Opcodes accepted in the current milestone.
pub const CORE_OPCODES: &[&str] = &[
    "const.i32",
    "const.i8",
    "copy",
    "add",
    "sub",
    "mul",
    "div_s",
    "mod_s",
    "and",
    "or",
    "xor",
    "shl",
    "shr_s",
    "eq",
    "ne",
    "lt_s",
    "le_s",
    "gt_s",
    "ge_s",
    "neg",
    "not",
    "logic_not",
    "call",
];

/// Opcodes reserved for later milestones: recognized, but rejected with
/// a dedicated error so clients can tell them from typos.
pub const OPTIONAL_OPCODES: &[&str] = &[
    "alloca", "load", "store", "gep", "zext", "sext", "trunc", "bitcast", "phi",
];

pub fn is_core_opcode(opcode: &str) -> bool {
    CORE_OPCODES.contains(&opcode)
}

pub fn is_optional_opcode(opcode: &str) -> bool {
    OPTIONAL_OPCODES.contains(&opcode)
}

/// A TAC module: functions in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Module {
    pub functions: Vec<Function>,
}

/// One function body: a name starting with `@`, parameters whose names
/// start with `%`, a return type string, and a flat instruction list.
#[derive(Debug, Clone, Serialize)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: String,
    pub instructions: Vec<Instruction>,
    /// Temporary allocator state; `%t<N>` counts up from zero.
    #[serde(skip)]
    next_temp_id: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Instruction {
    Label {
        label: String,
    },
    Op {
        dest: Option<String>,
        opcode: String,
        operands: Vec<String>,
    },
    Jmp {
        label: String,
    },
    Br {
        cond: String,
        true_label: String,
        false_label: String,
    },
    Ret {
        value: Option<String>,
    },
}

impl Function {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: return_type.into(),
            instructions: Vec::new(),
            next_temp_id: 0,
        }
    }

    /// Allocates the next temporary name: `%t0`, `%t1`, ...
    pub fn new_temp(&mut self) -> String {
        let temp = format!("%t{}", self.next_temp_id);
        self.next_temp_id += 1;
        temp
    }

    /// Appends a value-producing op and returns its fresh destination.
    pub fn emit_op(&mut self, opcode: &str, operands: &[&str]) -> String {
        let dest = self.new_temp();
        self.instructions.push(Instruction::Op {
            dest: Some(dest.clone()),
            opcode: opcode.to_string(),
            operands: operands.iter().map(|s| s.to_string()).collect(),
        });
        dest
    }

    pub fn emit_label(&mut self, label: impl Into<String>) {
        self.instructions.push(Instruction::Label {
            label: label.into(),
        });
    }

    pub fn emit_jmp(&mut self, label: impl Into<String>) {
        self.instructions.push(Instruction::Jmp {
            label: label.into(),
        });
    }

    pub fn emit_br(
        &mut self,
        cond: impl Into<String>,
        true_label: impl Into<String>,
        false_label: impl Into<String>,
    ) {
        self.instructions.push(Instruction::Br {
            cond: cond.into(),
            true_label: true_label.into(),
            false_label: false_label.into(),
        });
    }

    pub fn emit_ret(&mut self, value: Option<String>) {
        self.instructions.push(Instruction::Ret { value });
    }
}

// The temp counter is builder state, not module identity; a re-parsed
// module compares equal to the one that was written.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.parameters == other.parameters
            && self.return_type == other.return_type
            && self.instructions == other.instructions
    }
}

impl Eq for Function {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temps_count_up_from_zero() {
        let mut f = Function::new("@f", "i32");
        assert_eq!(f.new_temp(), "%t0");
        assert_eq!(f.new_temp(), "%t1");
        assert_eq!(f.emit_op("const.i32", &["7"]), "%t2");
    }

    #[test]
    fn emit_op_records_dest_and_operands() {
        let mut f = Function::new("@f", "i32");
        let dest = f.emit_op("add", &["%a", "%b"]);
        assert_eq!(
            f.instructions[0],
            Instruction::Op {
                dest: Some(dest),
                opcode: "add".into(),
                operands: vec!["%a".into(), "%b".into()],
            }
        );
    }

    #[test]
    fn equality_ignores_the_temp_counter() {
        let mut a = Function::new("@f", "void");
        a.new_temp();
        let b = Function::new("@f", "void");
        assert_eq!(a, b);
    }

    #[test]
    fn opcode_groups_are_disjoint() {
        for opcode in CORE_OPCODES {
            assert!(!is_optional_opcode(opcode));
        }
        assert!(is_core_opcode("const.i32"));
        assert!(is_optional_opcode("alloca"));
        assert!(!is_core_opcode("frobnicate"));
    }
}
