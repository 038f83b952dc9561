use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::{ast::types::TypeDescriptor, Span};

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("fn", TokenKind::Fn);
        map.insert("return", TokenKind::Return);
        map.insert("if", TokenKind::If);
        map.insert("else", TokenKind::Else);
        map.insert("while", TokenKind::While);
        map.insert("for", TokenKind::For);
        map.insert("in", TokenKind::In);
        map.insert("struct", TokenKind::Struct);
        map.insert("enum", TokenKind::Enum);
        map.insert("true", TokenKind::True);
        map.insert("false", TokenKind::False);
        map
    };

    /// Built-in type names. The abstract "-like" types are deliberately absent,
    /// they only exist inside the checker.
    pub static ref PRIMITIVE_LOOKUP: HashMap<&'static str, TypeDescriptor> = {
        let mut map = HashMap::new();
        map.insert("u8", TypeDescriptor::U8);
        map.insert("u16", TypeDescriptor::U16);
        map.insert("u32", TypeDescriptor::U32);
        map.insert("u64", TypeDescriptor::U64);
        map.insert("s8", TypeDescriptor::S8);
        map.insert("s16", TypeDescriptor::S16);
        map.insert("s32", TypeDescriptor::S32);
        map.insert("s64", TypeDescriptor::S64);
        map.insert("f32", TypeDescriptor::F32);
        map.insert("f64", TypeDescriptor::F64);
        map.insert("bool", TypeDescriptor::BOOL8);
        map.insert("bool8", TypeDescriptor::BOOL8);
        map.insert("bool16", TypeDescriptor::BOOL16);
        map.insert("bool32", TypeDescriptor::BOOL32);
        map.insert("bool64", TypeDescriptor::BOOL64);
        map.insert("void", TypeDescriptor::VOID);
        map.insert("type", TypeDescriptor::TYPE);
        map
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Number,
    String,
    Identifier,
    Primitive,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Assignment, // =
    Equals,     // ==
    Not,        // !
    NotEquals,  // !=

    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    Or,
    And,
    Ampersand,

    Dot,
    DotDot,
    Semicolon,
    Colon,
    ColonColon,  // ::
    ColonEquals, // :=
    Comma,
    Arrow,

    PlusEquals,
    MinusEquals,
    SlashEquals,
    StarEquals,

    Plus,
    Dash,
    Slash,
    Star,

    // Reserved
    Fn,
    Return,
    If,
    Else,
    While,
    For,
    In,
    Struct,
    Enum,
    True,
    False,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token {{\nkind: {},\nvalue: {}}}", self.kind, self.value)
    }
}

impl Token {
    pub fn is_one_of_many(&self, tokens: &[TokenKind]) -> bool {
        tokens.contains(&self.kind)
    }

    pub fn is_assignment_operator(&self) -> bool {
        self.is_one_of_many(&[
            TokenKind::Assignment,
            TokenKind::PlusEquals,
            TokenKind::MinusEquals,
            TokenKind::StarEquals,
            TokenKind::SlashEquals,
        ])
    }
}
