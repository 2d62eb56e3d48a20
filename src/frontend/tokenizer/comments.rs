//! Comment bodies. The punctuation table recognizes `//` and `/*`;
//! the body consumption lives here so the table stays a table.

use std::io::Read;

use super::{peek, skip_run};
use crate::frontend::byte_class::ByteClass;
use crate::frontend::diagnostic::{CompileError, ErrorKind};
use crate::frontend::position::Position;
use crate::frontend::scanner::Scanner;

static SINGLE_LINE_BODY: ByteClass = ByteClass::chars(b"\n\\").negate();
static MULTI_LINE_BODY: ByteClass = ByteClass::chars(b"*").negate();

/// Consumes a `//` comment body up to and including the terminating
/// newline. A backslash continues the comment past the next byte, so a
/// backslash-newline pair extends the comment onto the following line.
pub(super) fn consume_single_line<R: Read>(s: &mut Scanner<R>) -> Result<(), CompileError> {
    loop {
        skip_run(s, &SINGLE_LINE_BODY)?;
        match peek(s)? {
            None => return Ok(()),
            Some(b'\n') => {
                s.pop_one_from_buffer();
                return Ok(());
            }
            Some(b'\\') => {
                s.pop_one_from_buffer();
                // The continued byte is comment content, newline included.
                if peek(s)?.is_some() {
                    s.pop_one_from_buffer();
                } else {
                    return Ok(());
                }
            }
            Some(_) => unreachable!("body class excludes only newline and backslash"),
        }
    }
}

/// Consumes a `/* ... */` comment body, which may span buffer refills
/// and source lines. End of input before `*/` is a lexical error.
pub(super) fn consume_multi_line<R: Read>(
    s: &mut Scanner<R>,
    start: Position,
) -> Result<(), CompileError> {
    loop {
        skip_run(s, &MULTI_LINE_BODY)?;
        match peek(s)? {
            None => {
                return Err(CompileError::new(
                    ErrorKind::UnterminatedComment,
                    start,
                    "missing closing */",
                ));
            }
            Some(b'*') => {
                s.pop_one_from_buffer();
                if peek(s)? == Some(b'/') {
                    s.pop_one_from_buffer();
                    return Ok(());
                }
            }
            Some(_) => unreachable!("body class excludes only the asterisk"),
        }
    }
}
