//! The preprocessor: a stateful token transformer over the tokenizer.
//!
//! Responsibilities, in pull order: drain pending macro-expansion
//! output, absorb private whitespace, resolve dot runs to `.`/`...`,
//! recognize `#` directives at the start of a logical line, substitute
//! object-like macros, and re-tag identifiers that spell a keyword.
//! Everything it emits is public vocabulary; the private kinds stop
//! here.

use std::collections::{HashMap, VecDeque};
use std::io::Read;

use crate::frontend::diagnostic::{CompileError, ErrorKind};
use crate::frontend::position::Position;
use crate::frontend::token::{Token, TokenKind, lookup_keyword};
use crate::frontend::tokenizer::Tokenizer;

pub struct Preprocessor<R> {
    tokenizer: Tokenizer<R>,
    macros: HashMap<String, Vec<Token>>,
    /// Expansion output queued for delivery; never re-expanded.
    ready: VecDeque<Token>,
    /// Line of the most recently pulled tokenizer token. A `#` opens a
    /// directive only when its line differs from this.
    last_line: usize,
}

impl<R: Read> Preprocessor<R> {
    pub fn new(tokenizer: Tokenizer<R>) -> Self {
        Self {
            tokenizer,
            macros: HashMap::new(),
            ready: VecDeque::new(),
            last_line: 0,
        }
    }

    /// Next public token. End of input is the `Eof` token.
    pub fn next(&mut self) -> Result<Token, CompileError> {
        if let Some(token) = self.ready.pop_front() {
            return Ok(token);
        }

        let token = self.tokenizer.next()?;
        let starts_line = token.position.line != self.last_line;
        self.last_line = token.position.line;

        match token.kind {
            TokenKind::Whitespace => self.next(),

            TokenKind::Dots => match token.raw.as_slice() {
                b"." => Ok(Token::new(TokenKind::Dot, token.raw, token.position)),
                b"..." => Ok(Token::new(TokenKind::Ellipsis, token.raw, token.position)),
                run => Err(CompileError::new(
                    ErrorKind::InvalidEllipsis,
                    token.position,
                    format!("'{}' is neither '.' nor '...'", String::from_utf8_lossy(run)),
                )),
            },

            TokenKind::HashStart => {
                if starts_line {
                    self.handle_directive(&token)
                } else {
                    Err(CompileError::new(
                        ErrorKind::StrayHash,
                        token.position,
                        "'#' is only valid at the start of a directive line",
                    ))
                }
            }
            TokenKind::HashGlue => Err(CompileError::new(
                ErrorKind::StrayHash,
                token.position,
                "token pasting is only valid inside a directive",
            )),

            TokenKind::Identifier => {
                let name = String::from_utf8_lossy(&token.raw);
                if let Some(body) = self.macros.get(name.as_ref()).cloned() {
                    return self.substitute(body);
                }
                match lookup_keyword(&token.raw) {
                    Some(kind) => Ok(Token::new(kind, token.raw, token.position)),
                    None => Ok(token),
                }
            }

            _ => Ok(token),
        }
    }

    /// Directive handling; the `#` token has been consumed. Pulls flow
    /// through `next`, so names arrive keyword-tagged and macro bodies
    /// arrive expanded against the macros defined so far.
    fn handle_directive(&mut self, hash: &Token) -> Result<Token, CompileError> {
        let directive_line = hash.position.line;

        let name = self.next()?;
        if name.kind == TokenKind::Eof || name.position.line != directive_line {
            return Err(CompileError::new(
                ErrorKind::ExpectedDirectiveName,
                hash.position,
                "directive name must follow '#' on the same line",
            ));
        }
        if name.kind != TokenKind::Identifier {
            return Err(CompileError::new(
                ErrorKind::ExpectedDirectiveName,
                name.position,
                format!("expected directive name, got '{}'", name.text()),
            ));
        }

        match name.raw.as_slice() {
            b"define" => self.handle_define(directive_line, name.position),
            other => Err(CompileError::new(
                ErrorKind::UnsupportedDirective,
                name.position,
                format!("#{}", String::from_utf8_lossy(other)),
            )),
        }
    }

    /// `#define NAME body...` up to the end of the logical line. The
    /// first token from a different line (or `Eof`) ends the body and is
    /// delivered as the directive's result.
    fn handle_define(
        &mut self,
        directive_line: usize,
        directive_position: Position,
    ) -> Result<Token, CompileError> {
        let name = self.next()?;
        if name.kind == TokenKind::Eof || name.position.line != directive_line {
            return Err(CompileError::new(
                ErrorKind::ExpectedMacroName,
                directive_position,
                "macro name must follow #define on the same line",
            ));
        }
        if name.kind != TokenKind::Identifier {
            return Err(CompileError::new(
                ErrorKind::ExpectedMacroName,
                name.position,
                format!("expected macro name, got '{}'", name.text()),
            ));
        }

        let macro_name = String::from_utf8_lossy(&name.raw).into_owned();
        let mut body = Vec::new();
        loop {
            let token = self.next()?;
            if token.kind == TokenKind::Eof || token.position.line != directive_line {
                self.macros.insert(macro_name, body);
                // The terminator was pulled before the macro existed, so
                // it still needs a substitution check against it.
                return self.reprocess(token);
            }
            body.push(token);
        }
    }

    fn reprocess(&mut self, token: Token) -> Result<Token, CompileError> {
        if token.kind == TokenKind::Identifier {
            let name = String::from_utf8_lossy(&token.raw);
            if let Some(body) = self.macros.get(name.as_ref()).cloned() {
                return self.substitute(body);
            }
        }
        Ok(token)
    }

    /// Emits a macro body. Substitution results are never re-expanded in
    /// this milestone; an empty body simply pulls the next token.
    fn substitute(&mut self, body: Vec<Token>) -> Result<Token, CompileError> {
        let mut tokens = body.into_iter();
        match tokens.next() {
            None => self.next(),
            Some(first) => {
                self.ready.extend(tokens);
                Ok(first)
            }
        }
    }
}
