//! Driver: compile one C source file to TAC text on stdout.
//!
//! Usage: `tacc [--dump-ast] FILE`. Diagnostics render to stderr with a
//! source excerpt; the exit code is nonzero on any failure. When
//! `TACC_CACHE_DIR` is set, lowered modules are cached by source hash.

use std::io::Write;
use std::process::ExitCode;
use std::{env, fs, io};

use tacc::frontend::lexer::Lexer;
use tacc::frontend::parser::Parser;
use tacc::frontend::scanner::Scanner;
use tacc::tac::cache::{TacCache, source_hash};
use tacc::tac::writer;

const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let (dump_ast, path) = match (args.next(), args.next()) {
        (Some(flag), Some(path)) if flag == "--dump-ast" => (true, path),
        (Some(path), None) => (false, path),
        _ => {
            eprintln!("usage: tacc [--dump-ast] FILE");
            return ExitCode::FAILURE;
        }
    };

    let source = match fs::read(&path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read {}: {}", path, err);
            return ExitCode::FAILURE;
        }
    };

    match run(&path, &source, dump_ast) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(diagnostic) => {
            let source_text = String::from_utf8_lossy(&source);
            eprintln!("{}", diagnostic.render(Some(&source_text)));
            ExitCode::FAILURE
        }
    }
}

fn run(
    path: &str,
    source: &[u8],
    dump_ast: bool,
) -> Result<String, tacc::frontend::diagnostic::Diagnostic> {
    let into_diagnostic = |err: tacc::frontend::diagnostic::CompileError| {
        err.into_diagnostic().with_file(path)
    };

    if dump_ast {
        let lexer = Lexer::new(Scanner::new(source));
        let unit = Parser::new(lexer)
            .parse_translation_unit()
            .map_err(into_diagnostic)?;
        let json = serde_json::to_string_pretty(&unit)
            .unwrap_or_else(|err| format!("{{\"error\": \"{}\"}}", err));
        return Ok(format!("{}\n", json));
    }

    let cache = env::var_os("TACC_CACHE_DIR").map(TacCache::new);
    let hash = source_hash(source);

    if let Some(cache) = &cache
        && let Some(module) = cache.load(&hash, COMPILER_VERSION)
    {
        return Ok(writer::module_to_string(&module));
    }

    let module = tacc::compile(source).map_err(into_diagnostic)?;

    if let Some(cache) = &cache
        && let Err(err) = cache.store(&hash, COMPILER_VERSION, &module)
    {
        // A failed cache write never fails the compile.
        let _ = writeln!(io::stderr(), "warning: cannot write cache entry: {}", err);
    }

    Ok(writer::module_to_string(&module))
}
