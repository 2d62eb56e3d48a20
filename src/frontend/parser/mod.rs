//! Recursive-descent parser for the supported C subset.
//!
//! Productions pull tokens through the lexer facade's `peek`/`next`.
//! Constructs the subset recognizes but does not support (pointers,
//! structs, parameter lists, local declarations) fail with a dedicated
//! diagnostic naming the feature, so callers can tell "not yet" from
//! "not C".

mod expression;
mod statement;

use std::io::Read;

use crate::frontend::ast::{FunctionDefinition, TranslationUnit, TypeSpecifier};
use crate::frontend::diagnostic::{CompileError, ErrorKind};
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};

pub struct Parser<R> {
    lexer: Lexer<R>,
    /// Most recent real token, so end-of-input diagnostics carry a
    /// useful position.
    last: Token,
}

impl<R: Read> Parser<R> {
    pub fn new(lexer: Lexer<R>) -> Self {
        Self {
            lexer,
            last: Token::default(),
        }
    }

    /// translation-unit := function-definition* EOF
    pub fn parse_translation_unit(&mut self) -> Result<TranslationUnit, CompileError> {
        let mut unit = TranslationUnit::default();
        loop {
            if self.peek_kind()? == TokenKind::Eof {
                self.next()?;
                return Ok(unit);
            }
            let function = self.parse_function_definition()?;
            unit.functions.push(function);
        }
    }

    /// function-definition := type-specifier IDENT '(' ')' block
    fn parse_function_definition(&mut self) -> Result<FunctionDefinition, CompileError> {
        let (type_token, return_type) = self.parse_type_specifier()?;

        if self.peek_kind()? == TokenKind::Star {
            let star = self.peek()?;
            return Err(unsupported(&star, "pointers"));
        }

        let name = self.expect(TokenKind::Identifier, "function name")?;
        self.expect(TokenKind::LParen, "'('")?;
        if self.peek_kind()? != TokenKind::RParen {
            let token = self.peek()?;
            return Err(unsupported(&token, "function parameters"));
        }
        self.expect(TokenKind::RParen, "')'")?;

        let body = self.parse_block()?;

        Ok(FunctionDefinition {
            return_type,
            name: name.text().into_owned(),
            body,
            token: type_token,
        })
    }

    fn parse_type_specifier(&mut self) -> Result<(Token, TypeSpecifier), CompileError> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::KwInt => {
                self.next()?;
                Ok((token, TypeSpecifier::Int))
            }
            TokenKind::KwVoid => {
                self.next()?;
                Ok((token, TypeSpecifier::Void))
            }
            TokenKind::KwStruct => Err(unsupported(&token, "struct declarations")),
            _ => Err(CompileError::new(
                ErrorKind::ExpectedToken,
                token.position,
                format!("expected type specifier, got {}", describe(&token)),
            )),
        }
    }

    pub(super) fn peek(&mut self) -> Result<Token, CompileError> {
        let token = self.lexer.peek()?.clone();
        self.remember(&token);
        Ok(token)
    }

    pub(super) fn peek_kind(&mut self) -> Result<TokenKind, CompileError> {
        Ok(self.lexer.peek()?.kind)
    }

    pub(super) fn next(&mut self) -> Result<Token, CompileError> {
        let token = self.lexer.next()?;
        self.remember(&token);
        Ok(token)
    }

    /// Consumes the next token and requires `kind`, describing the
    /// expectation as `what` on failure.
    pub(super) fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, CompileError> {
        let token = self.next()?;
        if token.kind == TokenKind::Eof {
            return Err(self.eof_error(&token, what));
        }
        if token.kind != kind {
            return Err(CompileError::new(
                ErrorKind::ExpectedToken,
                token.position,
                format!("expected {}, got {}", what, describe(&token)),
            ));
        }
        Ok(token)
    }

    pub(super) fn eof_error(&self, eof: &Token, what: &str) -> CompileError {
        let position = if self.last.is_valid() {
            self.last.position
        } else {
            eof.position
        };
        CompileError::new(
            ErrorKind::UnexpectedEof,
            position,
            format!("expected {} before end of file", what),
        )
    }

    fn remember(&mut self, token: &Token) {
        if token.kind != TokenKind::Eof {
            self.last = token.clone();
        }
    }
}

pub(super) fn unsupported(token: &Token, feature: &str) -> CompileError {
    CompileError::new(ErrorKind::UnsupportedSubset, token.position, feature)
}

pub(super) fn describe(token: &Token) -> String {
    if token.raw.is_empty() {
        token.kind.to_string()
    } else {
        format!("'{}'", token.text())
    }
}
