//! AST to TAC lowering.
//!
//! A per-function walk in source order. Statement lowering returns a
//! reachability flag: false means control cannot fall off the end of
//! the statement, which kills dead trailing statements in a block and
//! decides whether the function needs an implicit return. Expression
//! lowering returns the operand naming the value, always a fresh
//! temporary in this milestone.

use crate::frontend::ast::{
    Block, Expression, FunctionDefinition, Statement, TranslationUnit, TypeSpecifier,
};
use crate::frontend::diagnostic::{CompileError, ErrorKind};
use crate::frontend::token::TokenKind;
use crate::tac::{Function, Module};

/// Lowers a whole translation unit, one TAC function per definition.
pub fn lower(unit: &TranslationUnit) -> Result<Module, CompileError> {
    let mut module = Module::default();
    for definition in &unit.functions {
        module.functions.push(lower_function(definition)?);
    }
    Ok(module)
}

fn lower_function(definition: &FunctionDefinition) -> Result<Function, CompileError> {
    let mut function = Function::new(
        format!("@{}", definition.name),
        lower_type(definition.return_type),
    );

    let mut lowerer = Lowerer {
        function: &mut function,
        next_label_id: 0,
    };
    let reachable = lowerer.lower_block(&definition.body)?;

    if reachable {
        match definition.return_type {
            TypeSpecifier::Void => function.emit_ret(None),
            TypeSpecifier::Int => {
                return Err(CompileError::new(
                    ErrorKind::MissingReturn,
                    definition.token.position,
                    format!(
                        "function {} may reach the end without returning a value",
                        definition.name
                    ),
                ));
            }
        }
    }

    Ok(function)
}

fn lower_type(specifier: TypeSpecifier) -> &'static str {
    match specifier {
        TypeSpecifier::Int => "i32",
        TypeSpecifier::Void => "void",
    }
}

struct Lowerer<'a> {
    function: &'a mut Function,
    next_label_id: usize,
}

impl Lowerer<'_> {
    fn lower_statement(&mut self, statement: &Statement) -> Result<bool, CompileError> {
        match statement {
            Statement::Block(block) => self.lower_block(block),

            Statement::Expression { expression, .. } => {
                // Lowered for side effects; the value is discarded. The
                // empty statement produces no IR at all.
                if let Some(expression) = expression {
                    self.lower_expression(expression)?;
                }
                Ok(true)
            }

            Statement::Return { expression, .. } => {
                match expression {
                    None => self.function.emit_ret(None),
                    Some(expression) => {
                        let value = self.lower_expression(expression)?;
                        self.function.emit_ret(Some(value));
                    }
                }
                Ok(false)
            }

            Statement::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => self.lower_if(condition, then_branch, else_branch.as_deref()),

            Statement::While {
                condition, body, ..
            } => self.lower_while(condition, body),
        }
    }

    fn lower_block(&mut self, block: &Block) -> Result<bool, CompileError> {
        let mut reachable = true;
        for statement in &block.statements {
            if !reachable {
                // Dead statements are skipped silently.
                break;
            }
            reachable = self.lower_statement(statement)?;
        }
        Ok(reachable)
    }

    fn lower_if(
        &mut self,
        condition: &Expression,
        then_branch: &Statement,
        else_branch: Option<&Statement>,
    ) -> Result<bool, CompileError> {
        let cond = self.lower_expression(condition)?;

        let then_label = self.new_label();
        let end_label = self.new_label();

        let Some(else_branch) = else_branch else {
            // Without an else the false edge reaches the end directly,
            // so the join point always exists.
            self.function.emit_br(cond, then_label.clone(), end_label.clone());
            self.function.emit_label(then_label);
            let then_reachable = self.lower_statement(then_branch)?;
            if then_reachable {
                self.function.emit_jmp(end_label.clone());
            }
            self.function.emit_label(end_label);
            return Ok(true);
        };

        let else_label = self.new_label();
        self.function.emit_br(cond, then_label.clone(), else_label.clone());

        self.function.emit_label(then_label);
        let then_reachable = self.lower_statement(then_branch)?;
        if then_reachable {
            self.function.emit_jmp(end_label.clone());
        }

        self.function.emit_label(else_label);
        let else_reachable = self.lower_statement(else_branch)?;
        if else_reachable {
            self.function.emit_jmp(end_label.clone());
        }

        if then_reachable || else_reachable {
            self.function.emit_label(end_label);
            return Ok(true);
        }
        Ok(false)
    }

    fn lower_while(
        &mut self,
        condition: &Expression,
        body: &Statement,
    ) -> Result<bool, CompileError> {
        let cond_label = self.new_label();
        let body_label = self.new_label();
        let end_label = self.new_label();

        self.function.emit_jmp(cond_label.clone());
        self.function.emit_label(cond_label.clone());
        let cond = self.lower_expression(condition)?;
        self.function.emit_br(cond, body_label.clone(), end_label.clone());

        self.function.emit_label(body_label);
        let body_reachable = self.lower_statement(body)?;
        if body_reachable {
            self.function.emit_jmp(cond_label);
        }

        self.function.emit_label(end_label);
        // The loop may execute zero times, so the end is always live.
        Ok(true)
    }

    fn lower_expression(&mut self, expression: &Expression) -> Result<String, CompileError> {
        match expression {
            Expression::IntegerLiteral { token, raw } => {
                let Some(value) = parse_int_literal(raw) else {
                    return Err(CompileError::new(
                        ErrorKind::InvalidIntegerLiteral,
                        token.position,
                        format!("{} does not fit in a signed 32-bit integer", raw),
                    ));
                };
                Ok(self.function.emit_op("const.i32", &[&value.to_string()]))
            }

            Expression::Identifier { token, name } => Err(CompileError::new(
                ErrorKind::UndeclaredIdentifier,
                token.position,
                name.clone(),
            )),

            Expression::Unary {
                token, op, operand, ..
            } => {
                let value = self.lower_expression(operand)?;
                match op {
                    // Unary plus is the identity.
                    TokenKind::Plus => Ok(value),
                    TokenKind::Minus => Ok(self.function.emit_op("neg", &[&value])),
                    TokenKind::Bang => Ok(self.function.emit_op("logic_not", &[&value])),
                    TokenKind::Tilde => Ok(self.function.emit_op("not", &[&value])),
                    other => Err(CompileError::new(
                        ErrorKind::UnsupportedUnaryOperator,
                        token.position,
                        other.to_string(),
                    )),
                }
            }

            Expression::Binary {
                token,
                op,
                lhs,
                rhs,
            } => {
                // Strict left-to-right evaluation.
                let mut left = self.lower_expression(lhs)?;
                let mut right = self.lower_expression(rhs)?;

                let Some(opcode) = binary_opcode(*op) else {
                    return Err(CompileError::new(
                        ErrorKind::UnsupportedBinaryOperator,
                        token.position,
                        op.to_string(),
                    ));
                };

                // && and || are bitwise after normalizing both sides to
                // 0/1; the subset does not require short-circuiting.
                if matches!(op, TokenKind::AmpAmp | TokenKind::PipePipe) {
                    left = self.function.emit_op("ne", &[&left, "0"]);
                    right = self.function.emit_op("ne", &[&right, "0"]);
                }

                Ok(self.function.emit_op(opcode, &[&left, &right]))
            }
        }
    }

    fn new_label(&mut self) -> String {
        let label = format!(".L{}", self.next_label_id);
        self.next_label_id += 1;
        label
    }
}

fn binary_opcode(op: TokenKind) -> Option<&'static str> {
    let opcode = match op {
        TokenKind::Plus => "add",
        TokenKind::Minus => "sub",
        TokenKind::Star => "mul",
        TokenKind::Slash => "div_s",
        TokenKind::Percent => "mod_s",
        TokenKind::Amp => "and",
        TokenKind::Pipe => "or",
        TokenKind::Caret => "xor",
        TokenKind::ShiftLeft => "shl",
        TokenKind::ShiftRight => "shr_s",
        TokenKind::EqEq => "eq",
        TokenKind::NotEq => "ne",
        TokenKind::Lt => "lt_s",
        TokenKind::Le => "le_s",
        TokenKind::Gt => "gt_s",
        TokenKind::Ge => "ge_s",
        TokenKind::AmpAmp => "and",
        TokenKind::PipePipe => "or",
        _ => return None,
    };
    Some(opcode)
}

/// Interprets a C integer constant spelling: `0x`/`0X` hexadecimal,
/// leading `0` octal, decimal otherwise. Suffix letters are dropped;
/// width and signedness information beyond the i32 range check is
/// discarded in this milestone.
fn parse_int_literal(raw: &str) -> Option<i32> {
    let digits = raw.trim_end_matches(['u', 'U', 'l', 'L']);

    let value = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };

    i32::try_from(value).ok()
}
