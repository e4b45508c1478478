use crate::tokens::{reserved_to_kind, Token, TokenKind};
use anyhow::Result;
use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

#[derive(Debug)]
pub struct Lexer {
    tokens: Vec<Token>,
    line: usize,
}

#[derive(Error, Debug, PartialEq)]
pub enum LexError {
    #[error("Unterminated comment starting on line {line:?}.")]
    UnterminatedComment { line: usize },
    #[error("Number literal {literal:?} on line {line:?} is out of range.")]
    NumberOutOfRange { literal: String, line: usize },
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            line: 1,
        }
    }

    pub fn get_tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn scan_tokens(&mut self, source: &mut Peekable<Chars>) -> Result<()> {
        while let Some(c) = source.next() {
            match c {
                // Single-character tokens
                ';' => self.add_token(TokenKind::Semi),
                ',' => self.add_token(TokenKind::Comma),
                '(' => self.add_token(TokenKind::LParen),
                ')' => self.add_token(TokenKind::RParen),
                '[' => self.add_token(TokenKind::LBracket),
                ']' => self.add_token(TokenKind::RBracket),
                '{' => self.add_token(TokenKind::LBrace),
                '}' => self.add_token(TokenKind::RBrace),
                '+' => self.add_token(TokenKind::Plus),
                '-' => self.add_token(TokenKind::Minus),
                '*' => self.add_token(TokenKind::Times),
                // Two-character tokens
                '=' => {
                    if source.next_if_eq(&'=').is_some() {
                        self.add_token(TokenKind::Equal);
                    } else {
                        self.add_token(TokenKind::Assign);
                    }
                }
                '<' => {
                    if source.next_if_eq(&'=').is_some() {
                        self.add_token(TokenKind::LtEq);
                    } else {
                        self.add_token(TokenKind::Lt);
                    }
                }
                '>' => {
                    if source.next_if_eq(&'=').is_some() {
                        self.add_token(TokenKind::GtEq);
                    } else {
                        self.add_token(TokenKind::Gt);
                    }
                }
                '!' => {
                    if source.next_if_eq(&'=').is_some() {
                        self.add_token(TokenKind::Diff);
                    } else {
                        self.add_lexeme(TokenKind::Error, "!".to_string());
                    }
                }
                // Comments
                '/' => {
                    if source.next_if_eq(&'*').is_some() {
                        self.skip_comment(source)?;
                    } else {
                        self.add_token(TokenKind::Over);
                    }
                }
                // Numeric literals
                '0'..='9' => {
                    let mut number_literal = String::new();
                    number_literal.push(c);
                    while let Some(ch) = source.next_if(|ch| ch.is_ascii_digit()) {
                        number_literal.push(ch);
                    }
                    if number_literal.parse::<i64>().is_err() {
                        anyhow::bail!(LexError::NumberOutOfRange {
                            literal: number_literal,
                            line: self.line
                        });
                    }
                    self.add_lexeme(TokenKind::Num, number_literal);
                }
                // Identifiers
                'a'..='z' | 'A'..='Z' => {
                    let mut id = String::new();
                    id.push(c);
                    while let Some(ch) = source.next_if(|ch| ch.is_ascii_alphabetic()) {
                        id.push(ch);
                    }
                    // Check against keywords
                    if let Some(keyword) = reserved_to_kind(&id) {
                        self.add_token(keyword);
                    } else {
                        self.add_lexeme(TokenKind::Id, id);
                    }
                }

                // Whitespace
                ' ' | '\t' | '\r' => {}
                '\n' => self.line += 1,
                // Left to the parser to report
                _ => self.add_lexeme(TokenKind::Error, c.to_string()),
            }
        }
        self.add_token(TokenKind::Eof);
        Ok(())
    }

    fn skip_comment(&mut self, source: &mut Peekable<Chars>) -> Result<()> {
        let start = self.line;
        while let Some(ch) = source.next() {
            match ch {
                '\n' => self.line += 1,
                '*' if source.next_if_eq(&'/').is_some() => return Ok(()),
                _ => {}
            }
        }
        anyhow::bail!(LexError::UnterminatedComment { line: start })
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.tokens.push(Token::new(kind, self.line));
    }

    fn add_lexeme(&mut self, kind: TokenKind, lexeme: String) {
        self.tokens.push(Token::with_lexeme(kind, lexeme, self.line));
    }
}

/// Scans a whole source string.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new();
    lexer.scan_tokens(&mut source.chars().peekable())?;
    Ok(lexer.into_tokens())
}

/// Tests
/// Note: all tests omit EOF
#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new();
        lexer.scan_tokens(&mut input.chars().peekable()).unwrap();
        let mut kinds: Vec<TokenKind> = lexer.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds.pop(), Some(TokenKind::Eof));
        kinds
    }

    #[test]
    fn test_single_tokens() {
        let expected = [
            TokenKind::Semi,
            TokenKind::Comma,
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
        ];
        assert_eq!(kinds(";,()[]{}+-*/"), expected);
    }

    #[test]
    fn test_double_tokens() {
        let expected = [
            TokenKind::Assign,
            TokenKind::Equal,
            TokenKind::Lt,
            TokenKind::LtEq,
            TokenKind::Gt,
            TokenKind::GtEq,
            TokenKind::Diff,
        ];
        assert_eq!(kinds("= == < <= > >= !="), expected);
    }

    #[test]
    fn test_literal_tokens() {
        let mut lexer = Lexer::new();
        lexer
            .scan_tokens(&mut "count 42 x7".chars().peekable())
            .unwrap();
        let expected = [
            Token::with_lexeme(TokenKind::Id, "count", 1),
            Token::with_lexeme(TokenKind::Num, "42", 1),
            Token::with_lexeme(TokenKind::Id, "x", 1),
            Token::with_lexeme(TokenKind::Num, "7", 1),
            Token::new(TokenKind::Eof, 1),
        ];
        assert_eq!(lexer.get_tokens(), expected);
    }

    #[test]
    fn test_reserved_tokens() {
        let expected = [
            TokenKind::If,
            TokenKind::Else,
            TokenKind::Int,
            TokenKind::Return,
            TokenKind::Void,
            TokenKind::While,
            TokenKind::Id,
        ];
        assert_eq!(kinds("if else int return void while whilst"), expected);
    }

    #[test]
    fn test_comments_are_skipped() {
        let input = "int /* a comment\n spanning lines */ x;";
        assert_eq!(
            kinds(input),
            [TokenKind::Int, TokenKind::Id, TokenKind::Semi]
        );
    }

    #[test]
    fn test_unknown_character_becomes_error_token() {
        let mut lexer = Lexer::new();
        lexer.scan_tokens(&mut "x $ y".chars().peekable()).unwrap();
        let tokens = lexer.get_tokens();
        assert_eq!(tokens[1], Token::with_lexeme(TokenKind::Error, "$", 1));
    }

    #[test]
    fn test_unterminated_comment() {
        let mut lexer = Lexer::new();
        let result = lexer.scan_tokens(&mut "int x;\n/* never closed".chars().peekable());
        assert_eq!(
            result.unwrap_err().downcast::<LexError>().unwrap(),
            LexError::UnterminatedComment { line: 2 }
        );
    }

    #[test]
    fn test_number_out_of_range() {
        let mut lexer = Lexer::new();
        let result = lexer.scan_tokens(&mut "99999999999999999999".chars().peekable());
        assert!(matches!(
            result.unwrap_err().downcast::<LexError>().unwrap(),
            LexError::NumberOutOfRange { line: 1, .. }
        ));
    }

    #[test]
    fn test_line_count() {
        let mut lexer = Lexer::new();
        let input = "1
        /* random comment2 */
        3
        4
        5";
        lexer.scan_tokens(&mut input.chars().peekable()).unwrap();

        assert_eq!(lexer.line, 5);
        assert_eq!(lexer.get_tokens().last().unwrap().line, 5);
    }
}
