//! Statement productions.

use std::io::Read;

use super::{Parser, unsupported};
use crate::frontend::ast::{Block, Statement};
use crate::frontend::diagnostic::CompileError;
use crate::frontend::token::TokenKind;

impl<R: Read> Parser<R> {
    pub(super) fn parse_statement(&mut self) -> Result<Statement, CompileError> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::LBrace => Ok(Statement::Block(self.parse_block()?)),
            TokenKind::KwReturn => self.parse_return_statement(),
            TokenKind::KwIf => self.parse_if_statement(),
            TokenKind::KwWhile => self.parse_while_statement(),
            TokenKind::KwInt | TokenKind::KwVoid => {
                Err(unsupported(&token, "declarations beyond current subset"))
            }
            TokenKind::KwStruct => Err(unsupported(&token, "struct declarations")),
            _ => self.parse_expression_statement(),
        }
    }

    /// block := '{' statement* '}'
    pub(super) fn parse_block(&mut self) -> Result<Block, CompileError> {
        let open = self.expect(TokenKind::LBrace, "'{'")?;

        let mut statements = Vec::new();
        loop {
            let token = self.peek()?;
            match token.kind {
                TokenKind::RBrace => {
                    self.next()?;
                    break;
                }
                TokenKind::Eof => return Err(self.eof_error(&token, "'}'")),
                _ => statements.push(self.parse_statement()?),
            }
        }

        Ok(Block {
            token: open,
            statements,
        })
    }

    fn parse_return_statement(&mut self) -> Result<Statement, CompileError> {
        let token = self.expect(TokenKind::KwReturn, "'return'")?;

        if self.peek_kind()? == TokenKind::Semicolon {
            self.next()?;
            return Ok(Statement::Return {
                token,
                expression: None,
            });
        }

        let expression = self.parse_expression(0)?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Statement::Return {
            token,
            expression: Some(expression),
        })
    }

    fn parse_if_statement(&mut self) -> Result<Statement, CompileError> {
        let token = self.expect(TokenKind::KwIf, "'if'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let condition = self.parse_expression(0)?;
        self.expect(TokenKind::RParen, "')'")?;

        let then_branch = Box::new(self.parse_statement()?);

        // 'else' binds to the nearest 'if'.
        let else_branch = if self.peek_kind()? == TokenKind::KwElse {
            self.next()?;
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::If {
            token,
            condition,
            then_branch,
            else_branch,
        })
    }

    fn parse_while_statement(&mut self) -> Result<Statement, CompileError> {
        let token = self.expect(TokenKind::KwWhile, "'while'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let condition = self.parse_expression(0)?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = Box::new(self.parse_statement()?);

        Ok(Statement::While {
            token,
            condition,
            body,
        })
    }

    /// statement := expression? ';'
    fn parse_expression_statement(&mut self) -> Result<Statement, CompileError> {
        let token = self.peek()?;

        if token.kind == TokenKind::Semicolon {
            self.next()?;
            return Ok(Statement::Expression {
                token,
                expression: None,
            });
        }

        let expression = self.parse_expression(0)?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Statement::Expression {
            token,
            expression: Some(expression),
        })
    }
}
