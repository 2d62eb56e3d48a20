pub mod frontend;
pub mod sema;
pub mod tac;

use std::io::Read;

use crate::frontend::diagnostic::CompileError;
use crate::frontend::lexer::Lexer;
use crate::frontend::parser::Parser;
use crate::frontend::scanner::Scanner;

/// Compiles one translation unit from `reader` down to a TAC module.
///
/// This is the whole pipeline: scanner, tokenizer, preprocessor, lexer
/// facade, parser, lowering. The first diagnostic aborts compilation.
pub fn compile<R: Read>(reader: R) -> Result<tac::Module, CompileError> {
    let lexer = Lexer::new(Scanner::new(reader));
    let unit = Parser::new(lexer).parse_translation_unit()?;
    sema::lower::lower(&unit)
}
