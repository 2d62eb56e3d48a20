//! Compilation errors and their terminal rendering.
//!
//! Every stage of the pipeline fails with a [`CompileError`]: an error
//! kind, the position of the offending byte or token, and free-form
//! detail. The canonical message shape is
//! `line L, column C: <kind>: <detail>`. For user-facing output the
//! driver upgrades an error to a [`Diagnostic`] and renders it with a
//! source excerpt and caret.

use std::env;
use std::fmt;

use crate::frontend::position::Position;

/// Closed taxonomy of front-end failures, one variant per condition the
/// pipeline can report. Lexical, preprocessor, parse, and lowering kinds
/// share the taxonomy because they share one propagation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,

    // Lexical
    InvalidCharacter,
    InvalidEscape,
    UnterminatedString,
    UnterminatedChar,
    UnterminatedComment,
    InvalidEllipsis,
    InvalidIntegerSuffix,
    InvalidFloatExponent,

    // Preprocessor
    StrayHash,
    UnsupportedDirective,
    ExpectedDirectiveName,
    ExpectedMacroName,

    // Parse
    UnexpectedToken,
    ExpectedToken,
    UnexpectedEof,
    UnsupportedSubset,

    // Lowering
    UndeclaredIdentifier,
    InvalidIntegerLiteral,
    MissingReturn,
    UnsupportedStatement,
    UnsupportedUnaryOperator,
    UnsupportedBinaryOperator,
    UnsupportedReturnType,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Io => "i/o error",
            ErrorKind::InvalidCharacter => "invalid character",
            ErrorKind::InvalidEscape => "invalid escape sequence",
            ErrorKind::UnterminatedString => "unterminated string literal",
            ErrorKind::UnterminatedChar => "unterminated character constant",
            ErrorKind::UnterminatedComment => "unterminated comment",
            ErrorKind::InvalidEllipsis => "invalid ellipsis",
            ErrorKind::InvalidIntegerSuffix => "invalid integer suffix",
            ErrorKind::InvalidFloatExponent => "invalid float exponent",
            ErrorKind::StrayHash => "stray '#'",
            ErrorKind::UnsupportedDirective => "unsupported directive",
            ErrorKind::ExpectedDirectiveName => "expected directive name",
            ErrorKind::ExpectedMacroName => "expected macro name",
            ErrorKind::UnexpectedToken => "unexpected token",
            ErrorKind::ExpectedToken => "expected token",
            ErrorKind::UnexpectedEof => "unexpected end of file",
            ErrorKind::UnsupportedSubset => "unsupported in current subset",
            ErrorKind::UndeclaredIdentifier => "undeclared identifier",
            ErrorKind::InvalidIntegerLiteral => "invalid integer literal",
            ErrorKind::MissingReturn => "missing return",
            ErrorKind::UnsupportedStatement => "unsupported statement",
            ErrorKind::UnsupportedUnaryOperator => "unsupported unary operator",
            ErrorKind::UnsupportedBinaryOperator => "unsupported binary operator",
            ErrorKind::UnsupportedReturnType => "unsupported return type",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub position: Position,
    pub detail: String,
}

impl CompileError {
    pub fn new(kind: ErrorKind, position: Position, detail: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            detail: detail.into(),
        }
    }

    /// Wraps an I/O failure, preserving the source error's message.
    pub fn io(position: Position, err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, position, err.to_string())
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::error(self.kind.as_str())
            .with_message(self.detail)
            .with_position(self.position)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}: {}: {}",
            self.position.line, self.position.column, self.kind, self.detail
        )
    }
}

impl std::error::Error for CompileError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// User-facing diagnostic with optional source excerpt rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub title: String,
    pub message: Option<String>,
    pub file: Option<String>,
    pub position: Option<Position>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn error(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.into(),
            message: None,
            file: None,
            position: None,
            hints: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Renders the diagnostic, excerpting the offending source line with
    /// a caret when `source` is given. Honors `NO_COLOR`.
    pub fn render(&self, source: Option<&str>) -> String {
        let mut out = String::new();
        let use_color = env::var_os("NO_COLOR").is_none();
        let red = "\u{1b}[31m";
        let reset = "\u{1b}[0m";

        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };

        if use_color {
            out.push_str(red);
        }
        out.push_str(&format!("{}: {}", severity, self.title));
        if use_color {
            out.push_str(reset);
        }

        if let (Some(file), Some(position)) = (self.file.as_deref(), self.position) {
            out.push_str(&format!("\n  --> {}:{}", file, position));
        } else if let Some(position) = self.position {
            out.push_str(&format!("\n  --> {}", position));
        }

        if let Some(message) = &self.message {
            out.push('\n');
            out.push_str(message);
        }

        if let Some(position) = self.position
            && let Some(line_text) = source.and_then(|src| source_line(src, position.line))
        {
            let gutter_width = position.line.to_string().len();
            let caret_indent = position.column.saturating_sub(1).min(line_text.len());
            out.push('\n');
            out.push_str(&format!(
                "{:>width$} | {}\n",
                position.line,
                line_text,
                width = gutter_width
            ));
            out.push_str(&format!(
                "{:>width$} | {}^",
                "",
                " ".repeat(caret_indent),
                width = gutter_width
            ));
        }

        for hint in &self.hints {
            out.push_str(&format!("\nhint: {}", hint));
        }

        out
    }
}

fn source_line(source: &str, line: usize) -> Option<&str> {
    if line == 0 {
        return None;
    }
    source.lines().nth(line - 1)
}
