use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::frontend::position::Position;

/// Kind tag of a lexical token.
///
/// The `Kw*` keywords, the constant classes, the punctuators, and `Eof`
/// are the public vocabulary. `Nil`, `Whitespace`, `HashStart`,
/// `HashGlue`, `CommentSingle`, `CommentMulti`, and `Dots` are private
/// plumbing between the tokenizer and the preprocessor and never escape
/// the lexer facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TokenKind {
    /// Empty-lookahead sentinel; no real token carries this kind.
    #[default]
    Nil,

    // Keywords
    KwAuto,
    KwBreak,
    KwCase,
    KwChar,
    KwConst,
    KwContinue,
    KwDefault,
    KwDo,
    KwDouble,
    KwElse,
    KwEnum,
    KwExtern,
    KwFloat,
    KwFor,
    KwGoto,
    KwIf,
    KwInline,
    KwInt,
    KwLong,
    KwRegister,
    KwRestrict,
    KwReturn,
    KwShort,
    KwSigned,
    KwSizeof,
    KwStatic,
    KwStruct,
    KwSwitch,
    KwTypedef,
    KwUnion,
    KwUnsigned,
    KwVoid,
    KwVolatile,
    KwWhile,
    KwBool,
    KwComplex,
    KwImaginary,

    // Identifiers and constants
    Identifier,
    IntegerConstant,
    FloatingConstant,
    CharacterConstant,
    StringLiteral,

    // Punctuators
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Dot,
    Arrow,
    PlusPlus,
    MinusMinus,
    Amp,
    Star,
    Plus,
    Minus,
    Tilde,
    Bang,
    Slash,
    Percent,
    ShiftLeft,
    ShiftRight,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    NotEq,
    Caret,
    Pipe,
    AmpAmp,
    PipePipe,
    Question,
    Colon,
    Semicolon,
    Ellipsis,
    Assign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    PlusAssign,
    MinusAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    AmpAssign,
    CaretAssign,
    PipeAssign,
    Comma,

    Eof,

    // Private kinds, used only between tokenizer and preprocessor.
    Whitespace,
    HashStart,
    HashGlue,
    CommentSingle,
    CommentMulti,
    Dots,
}

impl TokenKind {
    /// True for kinds that must never be seen above the preprocessor.
    pub fn is_private(self) -> bool {
        matches!(
            self,
            TokenKind::Nil
                | TokenKind::Whitespace
                | TokenKind::HashStart
                | TokenKind::HashGlue
                | TokenKind::CommentSingle
                | TokenKind::CommentMulti
                | TokenKind::Dots
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Nil => "<nil>",

            TokenKind::KwAuto => "auto",
            TokenKind::KwBreak => "break",
            TokenKind::KwCase => "case",
            TokenKind::KwChar => "char",
            TokenKind::KwConst => "const",
            TokenKind::KwContinue => "continue",
            TokenKind::KwDefault => "default",
            TokenKind::KwDo => "do",
            TokenKind::KwDouble => "double",
            TokenKind::KwElse => "else",
            TokenKind::KwEnum => "enum",
            TokenKind::KwExtern => "extern",
            TokenKind::KwFloat => "float",
            TokenKind::KwFor => "for",
            TokenKind::KwGoto => "goto",
            TokenKind::KwIf => "if",
            TokenKind::KwInline => "inline",
            TokenKind::KwInt => "int",
            TokenKind::KwLong => "long",
            TokenKind::KwRegister => "register",
            TokenKind::KwRestrict => "restrict",
            TokenKind::KwReturn => "return",
            TokenKind::KwShort => "short",
            TokenKind::KwSigned => "signed",
            TokenKind::KwSizeof => "sizeof",
            TokenKind::KwStatic => "static",
            TokenKind::KwStruct => "struct",
            TokenKind::KwSwitch => "switch",
            TokenKind::KwTypedef => "typedef",
            TokenKind::KwUnion => "union",
            TokenKind::KwUnsigned => "unsigned",
            TokenKind::KwVoid => "void",
            TokenKind::KwVolatile => "volatile",
            TokenKind::KwWhile => "while",
            TokenKind::KwBool => "_Bool",
            TokenKind::KwComplex => "_Complex",
            TokenKind::KwImaginary => "_Imaginary",

            TokenKind::Identifier => "identifier",
            TokenKind::IntegerConstant => "integer constant",
            TokenKind::FloatingConstant => "floating constant",
            TokenKind::CharacterConstant => "character constant",
            TokenKind::StringLiteral => "string literal",

            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Dot => ".",
            TokenKind::Arrow => "->",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Amp => "&",
            TokenKind::Star => "*",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Tilde => "~",
            TokenKind::Bang => "!",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::ShiftLeft => "<<",
            TokenKind::ShiftRight => ">>",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Caret => "^",
            TokenKind::Pipe => "|",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Ellipsis => "...",
            TokenKind::Assign => "=",
            TokenKind::StarAssign => "*=",
            TokenKind::SlashAssign => "/=",
            TokenKind::PercentAssign => "%=",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::ShiftLeftAssign => "<<=",
            TokenKind::ShiftRightAssign => ">>=",
            TokenKind::AmpAssign => "&=",
            TokenKind::CaretAssign => "^=",
            TokenKind::PipeAssign => "|=",
            TokenKind::Comma => ",",

            TokenKind::Eof => "end of file",

            TokenKind::Whitespace => "<whitespace>",
            TokenKind::HashStart => "#",
            TokenKind::HashGlue => "##",
            TokenKind::CommentSingle => "<comment>",
            TokenKind::CommentMulti => "<comment>",
            TokenKind::Dots => "<dots>",
        };
        f.write_str(s)
    }
}

/// Maps an identifier spelling to its keyword kind, if any.
pub fn lookup_keyword(ident: &[u8]) -> Option<TokenKind> {
    let kind = match ident {
        b"auto" => TokenKind::KwAuto,
        b"break" => TokenKind::KwBreak,
        b"case" => TokenKind::KwCase,
        b"char" => TokenKind::KwChar,
        b"const" => TokenKind::KwConst,
        b"continue" => TokenKind::KwContinue,
        b"default" => TokenKind::KwDefault,
        b"do" => TokenKind::KwDo,
        b"double" => TokenKind::KwDouble,
        b"else" => TokenKind::KwElse,
        b"enum" => TokenKind::KwEnum,
        b"extern" => TokenKind::KwExtern,
        b"float" => TokenKind::KwFloat,
        b"for" => TokenKind::KwFor,
        b"goto" => TokenKind::KwGoto,
        b"if" => TokenKind::KwIf,
        b"inline" => TokenKind::KwInline,
        b"int" => TokenKind::KwInt,
        b"long" => TokenKind::KwLong,
        b"register" => TokenKind::KwRegister,
        b"restrict" => TokenKind::KwRestrict,
        b"return" => TokenKind::KwReturn,
        b"short" => TokenKind::KwShort,
        b"signed" => TokenKind::KwSigned,
        b"sizeof" => TokenKind::KwSizeof,
        b"static" => TokenKind::KwStatic,
        b"struct" => TokenKind::KwStruct,
        b"switch" => TokenKind::KwSwitch,
        b"typedef" => TokenKind::KwTypedef,
        b"union" => TokenKind::KwUnion,
        b"unsigned" => TokenKind::KwUnsigned,
        b"void" => TokenKind::KwVoid,
        b"volatile" => TokenKind::KwVolatile,
        b"while" => TokenKind::KwWhile,
        b"_Bool" => TokenKind::KwBool,
        b"_Complex" => TokenKind::KwComplex,
        b"_Imaginary" => TokenKind::KwImaginary,
        _ => return None,
    };
    Some(kind)
}

/// A lexical token: kind, exact spelling, and source position.
///
/// `raw` is a stable copy of the spelling; for string and character
/// constants it holds the processed value (escapes resolved, line
/// continuations collapsed) between the original delimiters, so it may
/// contain arbitrary bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Token {
    pub kind: TokenKind,
    pub raw: Vec<u8>,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, raw: impl Into<Vec<u8>>, position: Position) -> Self {
        Self {
            kind,
            raw: raw.into(),
            position,
        }
    }

    /// False only for the `Nil` empty-lookahead sentinel.
    pub fn is_valid(&self) -> bool {
        self.kind != TokenKind::Nil
    }

    /// Spelling as text, with invalid UTF-8 replaced for display.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({}, {:?}, {})", self.kind, self.text(), self.position)
    }
}
