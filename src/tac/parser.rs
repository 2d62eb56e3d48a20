//! TAC text reader. Line-oriented and validating: structural problems
//! and invariant violations (redefined destinations, duplicate or
//! undefined labels, unknown opcodes) fail with the logical line number.

use std::collections::HashSet;
use std::fmt;
use std::io::{BufRead, BufReader, Lines, Read};

use crate::tac::{Function, Instruction, Module, Parameter, is_core_opcode, is_optional_opcode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    Io,
    MissingHeader,
    DuplicateHeader,
    MalformedFunctionHeader,
    MalformedParameter,
    UnknownOpcode,
    OpcodeNotEnabled,
    RedefinedDestination,
    DuplicateLabel,
    UndefinedLabel,
    MalformedInstruction,
    MissingClosingBrace,
    DuplicateFunction,
}

impl ParseErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseErrorKind::Io => "i/o error",
            ParseErrorKind::MissingHeader => "missing header",
            ParseErrorKind::DuplicateHeader => "duplicated header",
            ParseErrorKind::MalformedFunctionHeader => "malformed function header",
            ParseErrorKind::MalformedParameter => "malformed parameter",
            ParseErrorKind::UnknownOpcode => "unknown opcode",
            ParseErrorKind::OpcodeNotEnabled => "opcode not enabled",
            ParseErrorKind::RedefinedDestination => "redefined destination",
            ParseErrorKind::DuplicateLabel => "duplicate label",
            ParseErrorKind::UndefinedLabel => "undefined label",
            ParseErrorKind::MalformedInstruction => "malformed instruction",
            ParseErrorKind::MissingClosingBrace => "missing closing brace",
            ParseErrorKind::DuplicateFunction => "duplicate function",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A TAC reading failure. Only the logical-line counter is tracked, so
/// the message shape is `line L: <kind>: <detail>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
    pub detail: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.kind, self.detail)
    }
}

impl std::error::Error for ParseError {}

pub fn parse_module<R: Read>(reader: R) -> Result<Module, ParseError> {
    ModuleParser {
        lines: BufReader::new(reader).lines(),
        line: 0,
    }
    .parse()
}

struct ModuleParser<R> {
    lines: Lines<BufReader<R>>,
    line: usize,
}

impl<R: Read> ModuleParser<R> {
    fn parse(mut self) -> Result<Module, ParseError> {
        let Some(header) = self.next_logical_line()? else {
            return Err(self.error(ParseErrorKind::MissingHeader, "expected '.tac v1'"));
        };
        if header != ".tac v1" {
            return Err(self.error(
                ParseErrorKind::MissingHeader,
                format!("expected '.tac v1', got {:?}", header),
            ));
        }

        let mut module = Module::default();
        let mut function_names = HashSet::new();

        while let Some(line) = self.next_logical_line()? {
            if line.starts_with(".meta ") {
                continue;
            }
            if line == ".tac v1" {
                return Err(self.error(ParseErrorKind::DuplicateHeader, "'.tac v1' appears twice"));
            }
            if !line.starts_with("func ") {
                return Err(self.error(
                    ParseErrorKind::MalformedFunctionHeader,
                    format!("unexpected line outside a function: {:?}", line),
                ));
            }

            let function = self.parse_function(&line)?;
            if !function_names.insert(function.name.clone()) {
                return Err(self.error(
                    ParseErrorKind::DuplicateFunction,
                    format!("function {:?} defined twice", function.name),
                ));
            }
            module.functions.push(function);
        }

        Ok(module)
    }

    fn parse_function(&mut self, header: &str) -> Result<Function, ParseError> {
        let mut function = parse_function_header(header)
            .map_err(|(kind, detail)| self.error(kind, detail))?;

        let mut defined_labels = HashSet::new();
        let mut defined_destinations = HashSet::new();
        // First-use order, so the undefined-label report is stable.
        let mut used_labels: Vec<String> = Vec::new();

        loop {
            let Some(line) = self.next_logical_line()? else {
                return Err(self.error(
                    ParseErrorKind::MissingClosingBrace,
                    format!("function {} has no closing brace", function.name),
                ));
            };
            if line == "}" {
                break;
            }

            let instruction =
                parse_instruction(&line).map_err(|(kind, detail)| self.error(kind, detail))?;

            match &instruction {
                Instruction::Label { label } => {
                    if !defined_labels.insert(label.clone()) {
                        return Err(self.error(
                            ParseErrorKind::DuplicateLabel,
                            format!("label {} defined twice", label),
                        ));
                    }
                }
                Instruction::Op {
                    dest: Some(dest), ..
                } => {
                    if !defined_destinations.insert(dest.clone()) {
                        return Err(self.error(
                            ParseErrorKind::RedefinedDestination,
                            dest.clone(),
                        ));
                    }
                }
                Instruction::Jmp { label } => used_labels.push(label.clone()),
                Instruction::Br {
                    true_label,
                    false_label,
                    ..
                } => {
                    used_labels.push(true_label.clone());
                    used_labels.push(false_label.clone());
                }
                _ => {}
            }

            function.instructions.push(instruction);
        }

        for label in &used_labels {
            if !defined_labels.contains(label) {
                return Err(self.error(
                    ParseErrorKind::UndefinedLabel,
                    format!("label {} is referenced but never defined", label),
                ));
            }
        }

        Ok(function)
    }

    /// Next non-empty line with the `;` comment suffix and surrounding
    /// whitespace removed. `None` at end of input.
    fn next_logical_line(&mut self) -> Result<Option<String>, ParseError> {
        loop {
            let Some(result) = self.lines.next() else {
                return Ok(None);
            };
            let raw = result.map_err(|err| self.error(ParseErrorKind::Io, err.to_string()))?;
            self.line += 1;

            let line = strip_comment(&raw).trim();
            if line.is_empty() {
                continue;
            }
            return Ok(Some(line.to_string()));
        }
    }

    fn error(&self, kind: ParseErrorKind, detail: impl Into<String>) -> ParseError {
        ParseError {
            line: self.line,
            kind,
            detail: detail.into(),
        }
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

type InstructionResult<T> = Result<T, (ParseErrorKind, String)>;

/// `func @name(params?) -> type {`
fn parse_function_header(line: &str) -> InstructionResult<Function> {
    let malformed = |detail: String| (ParseErrorKind::MalformedFunctionHeader, detail);

    let Some(without_brace) = line.strip_suffix('{') else {
        return Err(malformed(format!("missing '{{' in {:?}", line)));
    };
    let signature = without_brace
        .trim()
        .strip_prefix("func ")
        .unwrap_or(without_brace)
        .trim();

    let Some((left, return_type)) = signature.split_once("->") else {
        return Err(malformed("missing '->' and return type".into()));
    };
    let return_type = return_type.trim();
    if return_type.is_empty() {
        return Err(malformed("return type is empty".into()));
    }

    let left = left.trim();
    let (open, close) = match (left.find('('), left.rfind(')')) {
        (Some(open), Some(close)) if open > 0 && close > open => (open, close),
        _ => return Err(malformed(format!("malformed parameter list in {:?}", left))),
    };

    let name = left[..open].trim();
    if !name.starts_with('@') {
        return Err(malformed(format!(
            "function name must start with '@', got {:?}",
            name
        )));
    }

    let mut function = Function::new(name, return_type);
    function.parameters = parse_parameters(left[open + 1..close].trim())?;
    Ok(function)
}

fn parse_parameters(raw: &str) -> InstructionResult<Vec<Parameter>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let mut parameters = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        let Some((name, ty)) = part.split_once(':') else {
            return Err((
                ParseErrorKind::MalformedParameter,
                format!("expected 'name:type', got {:?}", part),
            ));
        };
        let name = name.trim();
        let ty = ty.trim();
        if !name.starts_with('%') {
            return Err((
                ParseErrorKind::MalformedParameter,
                format!("parameter name must start with '%', got {:?}", name),
            ));
        }
        if ty.is_empty() {
            return Err((
                ParseErrorKind::MalformedParameter,
                format!("parameter type is empty for {:?}", name),
            ));
        }
        parameters.push(Parameter {
            name: name.to_string(),
            ty: ty.to_string(),
        });
    }
    Ok(parameters)
}

fn parse_instruction(line: &str) -> InstructionResult<Instruction> {
    let malformed = |detail: String| (ParseErrorKind::MalformedInstruction, detail);

    if let Some(label) = line.strip_suffix(':') {
        if !is_label(label) {
            return Err(malformed(format!("invalid label {:?}", label)));
        }
        return Ok(Instruction::Label {
            label: label.to_string(),
        });
    }

    if let Some(rest) = line.strip_prefix("jmp ") {
        let label = rest.trim();
        if !is_label(label) {
            return Err(malformed(format!("jmp target must be a label, got {:?}", label)));
        }
        return Ok(Instruction::Jmp {
            label: label.to_string(),
        });
    }

    if let Some(rest) = line.strip_prefix("br ") {
        let parts: Vec<&str> = rest.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
        let [cond, true_label, false_label] = parts.as_slice() else {
            return Err(malformed("br requires condition and two labels".into()));
        };
        if !is_label(true_label) || !is_label(false_label) {
            return Err(malformed("br targets must be labels".into()));
        }
        return Ok(Instruction::Br {
            cond: cond.to_string(),
            true_label: true_label.to_string(),
            false_label: false_label.to_string(),
        });
    }

    if line == "ret" {
        return Ok(Instruction::Ret { value: None });
    }
    if let Some(rest) = line.strip_prefix("ret ") {
        return Ok(Instruction::Ret {
            value: Some(rest.trim().to_string()),
        });
    }

    // Everything else is an op, optionally with a destination.
    let (dest, body) = match line.split_once('=') {
        Some((left, right)) => {
            let left = left.trim();
            if !left.starts_with('%') {
                return Err(malformed(format!(
                    "destination must start with '%', got {:?}",
                    left
                )));
            }
            (Some(left.to_string()), right.trim())
        }
        None => (None, line),
    };

    let Some(opcode) = body.split_whitespace().next() else {
        return Err(malformed("empty instruction".into()));
    };
    if !is_core_opcode(opcode) {
        if is_optional_opcode(opcode) {
            return Err((ParseErrorKind::OpcodeNotEnabled, opcode.to_string()));
        }
        return Err((ParseErrorKind::UnknownOpcode, opcode.to_string()));
    }

    let rest = body[opcode.len()..].trim();
    let operands = if rest.is_empty() {
        Vec::new()
    } else if opcode == "call" {
        // The call target is a single raw tail.
        vec![rest.to_string()]
    } else {
        rest.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    };

    Ok(Instruction::Op {
        dest,
        opcode: opcode.to_string(),
        operands,
    })
}

/// `.L` followed by at least one digit.
fn is_label(candidate: &str) -> bool {
    match candidate.strip_prefix(".L") {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Module, ParseError> {
        parse_module(text.as_bytes())
    }

    fn parse_ok(text: &str) -> Module {
        parse(text).expect("expected the module to parse")
    }

    fn parse_err(text: &str) -> ParseError {
        parse(text).expect_err("expected a parse error")
    }

    #[test]
    fn minimal_module() {
        let module = parse_ok(".tac v1\n\nfunc @main() -> i32 {\n  %t0 = const.i32 0\n  ret %t0\n}\n");
        assert_eq!(module.functions.len(), 1);

        let function = &module.functions[0];
        assert_eq!(function.name, "@main");
        assert_eq!(function.return_type, "i32");
        assert_eq!(
            function.instructions,
            vec![
                Instruction::Op {
                    dest: Some("%t0".into()),
                    opcode: "const.i32".into(),
                    operands: vec!["0".into()],
                },
                Instruction::Ret {
                    value: Some("%t0".into()),
                },
            ]
        );
    }

    #[test]
    fn parameters_parse() {
        let module = parse_ok(".tac v1\nfunc @max(%a:i32, %b:i32) -> i32 {\n  ret %a\n}\n");
        let function = &module.functions[0];
        assert_eq!(function.parameters.len(), 2);
        assert_eq!(function.parameters[0].name, "%a");
        assert_eq!(function.parameters[1].ty, "i32");
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let module = parse_ok(
            "; leading comment\n.tac v1\n\n; banner\nfunc @f() -> void {\n  ret ; trailing\n\n}\n",
        );
        assert_eq!(module.functions[0].instructions.len(), 1);
    }

    #[test]
    fn meta_lines_are_ignored() {
        let module = parse_ok(".tac v1\n.meta generated-by test\nfunc @f() -> void {\n  ret\n}\n");
        assert_eq!(module.functions.len(), 1);
    }

    #[test]
    fn labels_and_branches_parse() {
        let module = parse_ok(
            ".tac v1\nfunc @f() -> void {\n  jmp .L0\n.L0:\n  %t0 = const.i32 1\n  br %t0, .L1, .L2\n.L1:\n  ret\n.L2:\n  ret\n}\n",
        );
        assert_eq!(
            module.functions[0].instructions[0],
            Instruction::Jmp { label: ".L0".into() }
        );
        assert_eq!(
            module.functions[0].instructions[3],
            Instruction::Br {
                cond: "%t0".into(),
                true_label: ".L1".into(),
                false_label: ".L2".into(),
            }
        );
    }

    #[test]
    fn call_keeps_a_raw_tail_operand() {
        let module = parse_ok(".tac v1\nfunc @f() -> i32 {\n  %t0 = call @g\n  ret %t0\n}\n");
        assert_eq!(
            module.functions[0].instructions[0],
            Instruction::Op {
                dest: Some("%t0".into()),
                opcode: "call".into(),
                operands: vec!["@g".into()],
            }
        );
    }

    #[test]
    fn missing_header_is_rejected() {
        assert_eq!(parse_err("").kind, ParseErrorKind::MissingHeader);
        assert_eq!(
            parse_err("func @f() -> void {\n  ret\n}\n").kind,
            ParseErrorKind::MissingHeader
        );
    }

    #[test]
    fn duplicate_header_is_rejected() {
        let err = parse_err(".tac v1\n.tac v1\n");
        assert_eq!(err.kind, ParseErrorKind::DuplicateHeader);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn redefined_destination_is_rejected_on_the_second_line() {
        let err = parse_err(
            ".tac v1\n\nfunc @bad() -> i32 {\n.L0:\n  %t0 = const.i32 1\n  %t0 = add %t0, 2\n  ret %t0\n}\n",
        );
        assert_eq!(err.kind, ParseErrorKind::RedefinedDestination);
        assert_eq!(err.detail, "%t0");
        assert_eq!(err.line, 6);
    }

    #[test]
    fn optional_opcodes_are_gated_not_unknown() {
        let err = parse_err(".tac v1\nfunc @f() -> void {\n  %t0 = alloca 4\n  ret\n}\n");
        assert_eq!(err.kind, ParseErrorKind::OpcodeNotEnabled);
        assert_eq!(err.detail, "alloca");
    }

    #[test]
    fn unknown_opcodes_are_rejected() {
        let err = parse_err(".tac v1\nfunc @f() -> void {\n  %t0 = frobnicate 4\n  ret\n}\n");
        assert_eq!(err.kind, ParseErrorKind::UnknownOpcode);
        assert_eq!(err.detail, "frobnicate");
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let err = parse_err(".tac v1\nfunc @f() -> void {\n.L0:\n.L0:\n  ret\n}\n");
        assert_eq!(err.kind, ParseErrorKind::DuplicateLabel);
    }

    #[test]
    fn undefined_labels_are_rejected() {
        let err = parse_err(".tac v1\nfunc @f() -> void {\n  jmp .L7\n  ret\n}\n");
        assert_eq!(err.kind, ParseErrorKind::UndefinedLabel);
        assert!(err.detail.contains(".L7"));
    }

    #[test]
    fn missing_closing_brace_is_rejected() {
        let err = parse_err(".tac v1\nfunc @f() -> void {\n  ret\n");
        assert_eq!(err.kind, ParseErrorKind::MissingClosingBrace);
    }

    #[test]
    fn duplicate_functions_are_rejected() {
        let err = parse_err(
            ".tac v1\nfunc @f() -> void {\n  ret\n}\nfunc @f() -> void {\n  ret\n}\n",
        );
        assert_eq!(err.kind, ParseErrorKind::DuplicateFunction);
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for text in [
            ".tac v1\nfunc f() -> void {\n  ret\n}\n",
            ".tac v1\nfunc @f() void {\n  ret\n}\n",
            ".tac v1\nfunc @f() -> {\n  ret\n}\n",
            ".tac v1\nfunc @f( -> void {\n  ret\n}\n",
        ] {
            let err = parse_err(text);
            assert_eq!(err.kind, ParseErrorKind::MalformedFunctionHeader, "text {:?}", text);
        }
    }

    #[test]
    fn malformed_parameters_are_rejected() {
        for text in [
            ".tac v1\nfunc @f(%a) -> void {\n  ret\n}\n",
            ".tac v1\nfunc @f(a:i32) -> void {\n  ret\n}\n",
            ".tac v1\nfunc @f(%a:) -> void {\n  ret\n}\n",
        ] {
            let err = parse_err(text);
            assert_eq!(err.kind, ParseErrorKind::MalformedParameter, "text {:?}", text);
        }
    }

    #[test]
    fn malformed_instructions_are_rejected() {
        for text in [
            ".tac v1\nfunc @f() -> void {\n  bogus:\n  ret\n}\n",
            ".tac v1\nfunc @f() -> void {\n  jmp nowhere\n  ret\n}\n",
            ".tac v1\nfunc @f() -> void {\n  br %t0, .L0\n  ret\n}\n",
            ".tac v1\nfunc @f() -> void {\n  t0 = const.i32 1\n  ret\n}\n",
        ] {
            let err = parse_err(text);
            assert_eq!(err.kind, ParseErrorKind::MalformedInstruction, "text {:?}", text);
        }
    }

    #[test]
    fn stray_lines_outside_functions_are_rejected() {
        let err = parse_err(".tac v1\nret\n");
        assert_eq!(err.kind, ParseErrorKind::MalformedFunctionHeader);
    }
}
