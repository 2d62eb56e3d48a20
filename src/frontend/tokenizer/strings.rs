//! String literals and character constants.
//!
//! The body is read with a negated byte class that stops at the closing
//! quote, a backslash, or a raw newline. Escapes are resolved here: the
//! token's `raw` holds the processed value between the original
//! delimiters, so `"hi\x41"` is stored as `"hiA"` and a backslash-newline
//! pair vanishes entirely.

use std::io::Read;

use super::{HEX_DIGIT, OCTAL_DIGIT, peek, read_run};
use crate::frontend::byte_class::ByteClass;
use crate::frontend::diagnostic::{CompileError, ErrorKind};
use crate::frontend::position::Position;
use crate::frontend::scanner::Scanner;
use crate::frontend::token::TokenKind;

static STRING_BODY: ByteClass = ByteClass::chars(b"\"\\\n").negate();
static CHAR_BODY: ByteClass = ByteClass::chars(b"'\\\n").negate();

pub(super) fn lex_string_literal<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    start: Position,
) -> Result<TokenKind, CompileError> {
    lex_quoted(s, raw, start, b'"', &STRING_BODY, ErrorKind::UnterminatedString)?;
    Ok(TokenKind::StringLiteral)
}

pub(super) fn lex_character_constant<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    start: Position,
) -> Result<TokenKind, CompileError> {
    lex_quoted(s, raw, start, b'\'', &CHAR_BODY, ErrorKind::UnterminatedChar)?;
    Ok(TokenKind::CharacterConstant)
}

fn lex_quoted<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    start: Position,
    quote: u8,
    body: &ByteClass,
    unterminated: ErrorKind,
) -> Result<(), CompileError> {
    // Opening quote, peeked by the dispatcher or the L-prefix path.
    raw.push(s.pop_one_from_buffer());

    loop {
        read_run(s, raw, body)?;

        let position = s.position();
        match peek(s)? {
            None => {
                return Err(CompileError::new(
                    unterminated,
                    start,
                    "end of file before closing quote",
                ));
            }
            Some(b'\n') => {
                return Err(CompileError::new(
                    unterminated,
                    start,
                    "newline before closing quote",
                ));
            }
            Some(b) if b == quote => {
                raw.push(s.pop_one_from_buffer());
                return Ok(());
            }
            Some(b'\\') => {
                s.pop_one_from_buffer();
                lex_escape(s, raw, position, unterminated)?;
            }
            Some(_) => unreachable!("body class excludes only quote, backslash, newline"),
        }
    }
}

/// One escape sequence; the backslash is already consumed. Contributes
/// the resolved byte to `raw`, or nothing for a line continuation.
fn lex_escape<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    position: Position,
    unterminated: ErrorKind,
) -> Result<(), CompileError> {
    let Some(b) = peek(s)? else {
        return Err(CompileError::new(
            unterminated,
            position,
            "end of file in escape sequence",
        ));
    };
    s.pop_one_from_buffer();

    match b {
        // Line continuation: the pair contributes nothing.
        b'\n' => {}

        b'\'' => raw.push(b'\''),
        b'"' => raw.push(b'"'),
        b'?' => raw.push(b'?'),
        b'\\' => raw.push(b'\\'),
        b'a' => raw.push(0x07),
        b'b' => raw.push(0x08),
        b'f' => raw.push(0x0c),
        b'n' => raw.push(b'\n'),
        b'r' => raw.push(b'\r'),
        b't' => raw.push(b'\t'),
        b'v' => raw.push(0x0b),

        b'x' => {
            let mut digits = Vec::new();
            read_run(s, &mut digits, &HEX_DIGIT)?;
            if digits.is_empty() {
                return Err(CompileError::new(
                    ErrorKind::InvalidEscape,
                    position,
                    "hexadecimal escape requires at least one digit",
                ));
            }
            let value = digits.iter().fold(0u32, |acc, &d| {
                acc.wrapping_mul(16).wrapping_add(hex_digit_value(d))
            });
            raw.push((value & 0xff) as u8);
        }

        b'0'..=b'7' => {
            // Up to three octal digits total, including the one consumed.
            let mut value = u32::from(b - b'0');
            for _ in 0..2 {
                match peek(s)? {
                    Some(d) if OCTAL_DIGIT.contains(d) => {
                        s.pop_one_from_buffer();
                        value = value * 8 + u32::from(d - b'0');
                    }
                    _ => break,
                }
            }
            raw.push((value & 0xff) as u8);
        }

        other => {
            return Err(CompileError::new(
                ErrorKind::InvalidEscape,
                position,
                format!("unknown escape '\\{}'", other as char),
            ));
        }
    }

    Ok(())
}

fn hex_digit_value(d: u8) -> u32 {
    match d {
        b'0'..=b'9' => u32::from(d - b'0'),
        b'a'..=b'f' => u32::from(d - b'a') + 10,
        b'A'..=b'F' => u32::from(d - b'A') + 10,
        _ => unreachable!("caller filters through the hex digit class"),
    }
}
