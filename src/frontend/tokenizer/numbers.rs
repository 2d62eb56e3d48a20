//! Numeric constants: decimal, octal, and hexadecimal integers with
//! C-style suffixes, and decimal or hexadecimal floating constants.

use std::io::Read;

use super::{DIGIT, HEX_DIGIT, IDENT_CONTINUE, OCTAL_DIGIT, peek, read_run, take_one_of};
use crate::frontend::diagnostic::{CompileError, ErrorKind};
use crate::frontend::position::Position;
use crate::frontend::scanner::Scanner;
use crate::frontend::token::TokenKind;

/// Decimal constant starting with `1`-`9`. Looks one byte past the digit
/// run to decide between integer, fractional float, and exponent float.
pub(super) fn lex_decimal<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    start: Position,
) -> Result<TokenKind, CompileError> {
    read_run(s, raw, &DIGIT)?;

    match peek(s)? {
        Some(b'.') => {
            raw.push(s.pop_one_from_buffer());
            lex_decimal_fraction(s, raw, start)
        }
        Some(b'e' | b'E') => {
            lex_exponent(s, raw, start)?;
            finish_float(s, raw, start)
        }
        _ => finish_integer(s, raw, start),
    }
}

/// Constant starting with `0`: plain zero, octal, hexadecimal, or a
/// hexadecimal float.
pub(super) fn lex_octal_or_hex<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    start: Position,
) -> Result<TokenKind, CompileError> {
    // The leading 0 was peeked by the dispatcher.
    raw.push(s.pop_one_from_buffer());

    match peek(s)? {
        None => Ok(TokenKind::IntegerConstant),
        Some(b'x' | b'X') => {
            raw.push(s.pop_one_from_buffer());
            read_run(s, raw, &HEX_DIGIT)?;
            match peek(s)? {
                Some(b'.') => {
                    raw.push(s.pop_one_from_buffer());
                    read_run(s, raw, &HEX_DIGIT)?;
                    match peek(s)? {
                        Some(b'p' | b'P') => lex_exponent(s, raw, start)?,
                        _ => {
                            return Err(CompileError::new(
                                ErrorKind::InvalidFloatExponent,
                                start,
                                "hexadecimal floating constants require a binary exponent",
                            ));
                        }
                    }
                    finish_float(s, raw, start)
                }
                Some(b'p' | b'P') => {
                    lex_exponent(s, raw, start)?;
                    finish_float(s, raw, start)
                }
                _ => finish_integer(s, raw, start),
            }
        }
        _ => {
            // Octal digit run; may be empty, leaving a literal 0.
            read_run(s, raw, &OCTAL_DIGIT)?;
            finish_integer(s, raw, start)
        }
    }
}

/// Fractional part after the dot: `digits? exponent? suffix?`.
fn lex_decimal_fraction<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    start: Position,
) -> Result<TokenKind, CompileError> {
    read_run(s, raw, &DIGIT)?;
    if let Some(b'e' | b'E') = peek(s)? {
        lex_exponent(s, raw, start)?;
    }
    finish_float(s, raw, start)
}

/// Exponent part. The marker byte (`e`, `E`, `p`, or `P`) has been
/// peeked by the caller; at least one digit must follow the sign.
fn lex_exponent<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    start: Position,
) -> Result<(), CompileError> {
    raw.push(s.pop_one_from_buffer());
    take_one_of(s, raw, b"+-")?;

    let digits_start = raw.len();
    read_run(s, raw, &DIGIT)?;
    if raw.len() == digits_start {
        return Err(CompileError::new(
            ErrorKind::InvalidFloatExponent,
            start,
            "exponent requires at least one digit",
        ));
    }
    Ok(())
}

fn finish_integer<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    start: Position,
) -> Result<TokenKind, CompileError> {
    consume_int_suffix(s, raw)?;
    reject_ident_tail(s, raw, start)?;
    Ok(TokenKind::IntegerConstant)
}

fn finish_float<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    start: Position,
) -> Result<TokenKind, CompileError> {
    take_one_of(s, raw, b"fFlL")?;
    reject_ident_tail(s, raw, start)?;
    Ok(TokenKind::FloatingConstant)
}

/// Integer suffix: up to two `l`/`L` then an optional `u`/`U`, or a
/// single `u`/`U` then up to two `l`/`L`. Mixed case in the long pair
/// is tolerated. A non-matching byte ends the suffix unread.
fn consume_int_suffix<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
) -> Result<(), CompileError> {
    match take_one_of(s, raw, b"lLuU")? {
        None => Ok(()),
        Some(b'u' | b'U') => {
            if take_one_of(s, raw, b"lL")?.is_some() {
                take_one_of(s, raw, b"lL")?;
            }
            Ok(())
        }
        Some(_) => match take_one_of(s, raw, b"lLuU")? {
            Some(b'l' | b'L') => {
                take_one_of(s, raw, b"uU")?;
                Ok(())
            }
            _ => Ok(()),
        },
    }
}

/// An identifier-class byte directly after a complete constant means the
/// suffix was malformed, e.g. `42lll` or `10uu`.
fn reject_ident_tail<R: Read>(
    s: &mut Scanner<R>,
    raw: &[u8],
    start: Position,
) -> Result<(), CompileError> {
    if let Some(b) = peek(s)?
        && IDENT_CONTINUE.contains(b)
    {
        return Err(CompileError::new(
            ErrorKind::InvalidIntegerSuffix,
            start,
            format!(
                "unexpected '{}' after '{}'",
                b as char,
                String::from_utf8_lossy(raw)
            ),
        ));
    }
    Ok(())
}
