//! The lexer facade: one token of lookahead over the preprocessor.
//!
//! `peek` caches exactly one token in the `Nil` default slot; `next`
//! drains the cache before delegating. The pipeline is single-consumer:
//! both operations take `&mut self`, so interleaved use from several
//! threads is rejected at compile time rather than guarded at runtime.

use std::io::Read;

use crate::frontend::diagnostic::CompileError;
use crate::frontend::preprocessor::Preprocessor;
use crate::frontend::scanner::Scanner;
use crate::frontend::token::Token;
use crate::frontend::tokenizer::Tokenizer;

pub struct Lexer<R> {
    preprocessor: Preprocessor<R>,
    /// Cached lookahead; the `Nil` sentinel means empty.
    peeked: Token,
}

impl<R: Read> Lexer<R> {
    /// Builds the full lexical pipeline over `scanner`: tokenizer, then
    /// preprocessor, then this facade.
    pub fn new(scanner: Scanner<R>) -> Self {
        Self {
            preprocessor: Preprocessor::new(Tokenizer::new(scanner)),
            peeked: Token::default(),
        }
    }

    /// Consumes and returns the next token.
    pub fn next(&mut self) -> Result<Token, CompileError> {
        if self.peeked.is_valid() {
            return Ok(std::mem::take(&mut self.peeked));
        }
        self.preprocessor.next()
    }

    /// Returns the token `next` would return, without consuming it.
    pub fn peek(&mut self) -> Result<&Token, CompileError> {
        if !self.peeked.is_valid() {
            self.peeked = self.preprocessor.next()?;
        }
        Ok(&self.peeked)
    }
}
