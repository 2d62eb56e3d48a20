//! The tokenizer: raw bytes to C lexical tokens.
//!
//! A single dispatch function classifies on one peeked byte and hands
//! off to the identifier, number, string, comment, or punctuation path.
//! Whitespace and comments are absorbed; everything else becomes a
//! token. Private kinds (`Dots`, `HashStart`, `HashGlue`) flow to the
//! preprocessor, which resolves or rejects them.

mod comments;
mod numbers;
mod punctuation;
mod strings;

use std::io::Read;

use crate::frontend::byte_class::ByteClass;
use crate::frontend::diagnostic::CompileError;
use crate::frontend::position::Position;
use crate::frontend::scanner::{ScanError, Scanner};
use crate::frontend::token::{Token, TokenKind};

static WHITESPACE: ByteClass = ByteClass::chars(b" \t\r\n\x0c");
static IDENT_START: ByteClass = ByteClass::range(b'a', b'z')
    .union(ByteClass::range(b'A', b'Z'))
    .union(ByteClass::chars(b"_"));
static IDENT_CONTINUE: ByteClass = ByteClass::range(b'a', b'z')
    .union(ByteClass::range(b'A', b'Z'))
    .union(ByteClass::chars(b"_"))
    .union(ByteClass::range(b'0', b'9'));
static DIGIT: ByteClass = ByteClass::range(b'0', b'9');
static OCTAL_DIGIT: ByteClass = ByteClass::range(b'0', b'7');
static HEX_DIGIT: ByteClass = ByteClass::range(b'0', b'9')
    .union(ByteClass::range(b'a', b'f'))
    .union(ByteClass::range(b'A', b'F'));
static DOTS: ByteClass = ByteClass::chars(b".");

pub struct Tokenizer<R> {
    scanner: Scanner<R>,
}

impl<R: Read> Tokenizer<R> {
    pub fn new(scanner: Scanner<R>) -> Self {
        Self { scanner }
    }

    /// Produces the next token. End of input is the `Eof` token, not an
    /// error; the first lexical failure aborts with a diagnostic.
    pub fn next(&mut self) -> Result<Token, CompileError> {
        loop {
            let position = self.scanner.position();
            let mut raw = Vec::new();
            match lex(&mut self.scanner, &mut raw, position)? {
                TokenKind::Whitespace => continue,
                TokenKind::Eof => return Ok(Token::new(TokenKind::Eof, Vec::new(), position)),
                kind => return Ok(Token::new(kind, raw, position)),
            }
        }
    }
}

/// One dispatch step: classify the next byte and lex a complete token,
/// accumulating its spelling into `raw`. Comments and whitespace come
/// back as `Whitespace` with `raw` undefined; the caller restarts.
fn lex<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    start: Position,
) -> Result<TokenKind, CompileError> {
    let b = match s.peek_one() {
        Ok(b) => b,
        Err(ScanError::Eof) => return Ok(TokenKind::Eof),
        Err(ScanError::Io(err)) => return Err(CompileError::io(start, err)),
    };

    let kind = match b {
        _ if WHITESPACE.contains(b) => {
            skip_run(s, &WHITESPACE)?;
            return Ok(TokenKind::Whitespace);
        }
        _ if IDENT_START.contains(b) => lex_identifier(s, raw, start)?,
        b'0' => numbers::lex_octal_or_hex(s, raw, start)?,
        _ if DIGIT.contains(b) => numbers::lex_decimal(s, raw, start)?,
        b'\'' => strings::lex_character_constant(s, raw, start)?,
        b'"' => strings::lex_string_literal(s, raw, start)?,
        b'.' => {
            read_run(s, raw, &DOTS)?;
            TokenKind::Dots
        }
        _ => punctuation::lex_punctuation(s, raw, start)?,
    };

    match kind {
        TokenKind::CommentSingle => {
            comments::consume_single_line(s)?;
            Ok(TokenKind::Whitespace)
        }
        TokenKind::CommentMulti => {
            comments::consume_multi_line(s, start)?;
            Ok(TokenKind::Whitespace)
        }
        kind => Ok(kind),
    }
}

/// Identifier run. A lone `L` directly before a quote continues into the
/// wide string or character constant path instead.
fn lex_identifier<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    start: Position,
) -> Result<TokenKind, CompileError> {
    read_run(s, raw, &IDENT_CONTINUE)?;

    if raw.as_slice() == b"L" {
        match peek(s)? {
            Some(b'"') => return strings::lex_string_literal(s, raw, start),
            Some(b'\'') => return strings::lex_character_constant(s, raw, start),
            _ => {}
        }
    }

    Ok(TokenKind::Identifier)
}

/// Reads a full class run into `raw`, continuing across buffer refills.
/// End of input ends the run silently.
fn read_run<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    cls: &ByteClass,
) -> Result<(), CompileError> {
    loop {
        let position = s.position();
        match s.read_bytes_in_class(cls) {
            Ok((data, is_partial)) => {
                raw.extend_from_slice(data);
                if !is_partial {
                    return Ok(());
                }
            }
            Err(ScanError::Eof) => return Ok(()),
            Err(ScanError::Io(err)) => return Err(CompileError::io(position, err)),
        }
    }
}

/// Like [`read_run`] but discards the bytes.
fn skip_run<R: Read>(
    s: &mut Scanner<R>,
    cls: &ByteClass,
) -> Result<(), CompileError> {
    loop {
        let position = s.position();
        match s.read_bytes_in_class(cls) {
            Ok((_, true)) => continue,
            Ok((_, false)) => return Ok(()),
            Err(ScanError::Eof) => return Ok(()),
            Err(ScanError::Io(err)) => return Err(CompileError::io(position, err)),
        }
    }
}

/// Peek treating end of input as `None`.
fn peek<R: Read>(s: &mut Scanner<R>) -> Result<Option<u8>, CompileError> {
    let position = s.position();
    match s.peek_one() {
        Ok(b) => Ok(Some(b)),
        Err(ScanError::Eof) => Ok(None),
        Err(ScanError::Io(err)) => Err(CompileError::io(position, err)),
    }
}

/// Consumes the next byte into `raw` if it is one of `set`.
fn take_one_of<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    set: &[u8],
) -> Result<Option<u8>, CompileError> {
    match peek(s)? {
        Some(b) if set.contains(&b) => {
            s.pop_one_from_buffer();
            raw.push(b);
            Ok(Some(b))
        }
        _ => Ok(None),
    }
}
