//! Punctuation tables.
//!
//! A first-byte dispatch selects the one-byte kind; peeking the second
//! byte upgrades it to the two-byte forms, and a third peek covers
//! `<<=` and `>>=`. Digraphs map to the kinds of their plain spellings;
//! `%:%:` would need four bytes of lookahead, so it is deliberately
//! left as two consecutive `%:` tokens for the preprocessor to join in
//! a later milestone.
//!
//! `//` and `/*` surface as the private comment kinds so the dispatcher
//! can consume the body and restart.

use std::io::Read;

use super::take_one_of;
use crate::frontend::diagnostic::{CompileError, ErrorKind};
use crate::frontend::position::Position;
use crate::frontend::scanner::Scanner;
use crate::frontend::token::TokenKind;

pub(super) fn lex_punctuation<R: Read>(
    s: &mut Scanner<R>,
    raw: &mut Vec<u8>,
    start: Position,
) -> Result<TokenKind, CompileError> {
    let first = s.pop_one_from_buffer();
    raw.push(first);

    let kind = match first {
        // Always a single byte.
        b'[' => TokenKind::LBracket,
        b']' => TokenKind::RBracket,
        b'(' => TokenKind::LParen,
        b')' => TokenKind::RParen,
        b'{' => TokenKind::LBrace,
        b'}' => TokenKind::RBrace,
        b'~' => TokenKind::Tilde,
        b'?' => TokenKind::Question,
        b';' => TokenKind::Semicolon,
        b',' => TokenKind::Comma,

        b'-' => match take_one_of(s, raw, b">-=")? {
            Some(b'>') => TokenKind::Arrow,
            Some(b'-') => TokenKind::MinusMinus,
            Some(_) => TokenKind::MinusAssign,
            None => TokenKind::Minus,
        },
        b'+' => match take_one_of(s, raw, b"+=")? {
            Some(b'+') => TokenKind::PlusPlus,
            Some(_) => TokenKind::PlusAssign,
            None => TokenKind::Plus,
        },
        b'&' => match take_one_of(s, raw, b"&=")? {
            Some(b'&') => TokenKind::AmpAmp,
            Some(_) => TokenKind::AmpAssign,
            None => TokenKind::Amp,
        },
        b'*' => match take_one_of(s, raw, b"=")? {
            Some(_) => TokenKind::StarAssign,
            None => TokenKind::Star,
        },
        b'!' => match take_one_of(s, raw, b"=")? {
            Some(_) => TokenKind::NotEq,
            None => TokenKind::Bang,
        },
        b'/' => match take_one_of(s, raw, b"/*=")? {
            Some(b'/') => TokenKind::CommentSingle,
            Some(b'*') => TokenKind::CommentMulti,
            Some(_) => TokenKind::SlashAssign,
            None => TokenKind::Slash,
        },
        b'%' => match take_one_of(s, raw, b"=>:")? {
            Some(b'=') => TokenKind::PercentAssign,
            Some(b'>') => TokenKind::RBrace,
            Some(b':') => TokenKind::HashStart,
            _ => TokenKind::Percent,
        },
        b'<' => match take_one_of(s, raw, b"=<:%")? {
            Some(b'=') => TokenKind::Le,
            Some(b':') => TokenKind::LBracket,
            Some(b'%') => TokenKind::LBrace,
            Some(b'<') => match take_one_of(s, raw, b"=")? {
                Some(_) => TokenKind::ShiftLeftAssign,
                None => TokenKind::ShiftLeft,
            },
            _ => TokenKind::Lt,
        },
        b'>' => match take_one_of(s, raw, b"=>")? {
            Some(b'=') => TokenKind::Ge,
            Some(b'>') => match take_one_of(s, raw, b"=")? {
                Some(_) => TokenKind::ShiftRightAssign,
                None => TokenKind::ShiftRight,
            },
            _ => TokenKind::Gt,
        },
        b'^' => match take_one_of(s, raw, b"=")? {
            Some(_) => TokenKind::CaretAssign,
            None => TokenKind::Caret,
        },
        b':' => match take_one_of(s, raw, b">")? {
            Some(_) => TokenKind::RBracket,
            None => TokenKind::Colon,
        },
        b'|' => match take_one_of(s, raw, b"|=")? {
            Some(b'|') => TokenKind::PipePipe,
            Some(_) => TokenKind::PipeAssign,
            None => TokenKind::Pipe,
        },
        b'=' => match take_one_of(s, raw, b"=")? {
            Some(_) => TokenKind::EqEq,
            None => TokenKind::Assign,
        },
        b'#' => match take_one_of(s, raw, b"#")? {
            Some(_) => TokenKind::HashGlue,
            None => TokenKind::HashStart,
        },

        other => {
            return Err(CompileError::new(
                ErrorKind::InvalidCharacter,
                start,
                format!("byte '{}' does not start any token", (other as char).escape_default()),
            ));
        }
    };

    Ok(kind)
}
