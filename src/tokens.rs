use std::fmt::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    // End of file
    Eof,

    // Literals.
    Id,
    Num,

    // Punctuation.
    Semi,
    Comma,

    // Keywords.
    If,
    Int,
    Else,
    Return,
    Void,
    While,

    // Operators.
    Assign,
    Equal,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Diff,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Plus,
    Minus,
    Times,
    Over,

    /// A character the scanner could not classify
    Error,
}

impl TokenKind {
    /// Every terminal, in table column order.
    pub const ALL: [TokenKind; 29] = [
        TokenKind::Eof,
        TokenKind::Id,
        TokenKind::Num,
        TokenKind::Semi,
        TokenKind::Comma,
        TokenKind::If,
        TokenKind::Int,
        TokenKind::Else,
        TokenKind::Return,
        TokenKind::Void,
        TokenKind::While,
        TokenKind::Assign,
        TokenKind::Equal,
        TokenKind::Lt,
        TokenKind::LtEq,
        TokenKind::Gt,
        TokenKind::GtEq,
        TokenKind::Diff,
        TokenKind::LParen,
        TokenKind::RParen,
        TokenKind::LBracket,
        TokenKind::RBracket,
        TokenKind::LBrace,
        TokenKind::RBrace,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Times,
        TokenKind::Over,
        TokenKind::Error,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Eof => "$end",
            TokenKind::Id => "ID",
            TokenKind::Num => "NUM",
            TokenKind::Semi => "SEMI",
            TokenKind::Comma => "COMMA",
            TokenKind::If => "IF",
            TokenKind::Int => "INT",
            TokenKind::Else => "ELSE",
            TokenKind::Return => "RETURN",
            TokenKind::Void => "VOID",
            TokenKind::While => "WHILE",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Equal => "EQUAL",
            TokenKind::Lt => "LT",
            TokenKind::LtEq => "LTEQ",
            TokenKind::Gt => "GT",
            TokenKind::GtEq => "GTEQ",
            TokenKind::Diff => "DIFF",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBracket => "LBRACKETS",
            TokenKind::RBracket => "RBRACKETS",
            TokenKind::LBrace => "LKEY",
            TokenKind::RBrace => "RKEY",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Times => "TIMES",
            TokenKind::Over => "OVER",
            TokenKind::Error => "ERROR",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text for identifiers and numbers, empty otherwise
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize) -> Self {
        Self {
            kind,
            lexeme: String::new(),
            line,
        }
    }

    pub fn with_lexeme(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.lexeme.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} '{}'", self.kind, self.lexeme)
        }
    }
}

pub fn reserved_to_kind(word: &str) -> Option<TokenKind> {
    match word {
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "int" => Some(TokenKind::Int),
        "return" => Some(TokenKind::Return),
        "void" => Some(TokenKind::Void),
        "while" => Some(TokenKind::While),
        _ => None,
    }
}
