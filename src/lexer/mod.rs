// Author: Dustin Pilgrim
// License: MIT

use std::str::Chars;

use crate::value::Format;
use crate::ArborError;

mod scanner;
mod tokenizer;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- literals ---
    Name(String),
    String(String),
    Integer(i32, Format),
    Integer64(i64, Format),
    Float(f64),
    Bool(bool),

    // --- assignment & separators ---
    Equals,
    Colon,
    Semicolon,
    Comma,

    // --- brackets ---
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,

    // --- directives ---
    Include,

    Eof,
}

pub struct Lexer<'a> {
    input: Chars<'a>,
    peek: Option<char>,
    line: usize,
    token_line: usize,
    file: Option<&'a str>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str, file: Option<&'a str>) -> Self {
        let mut lexer = Lexer {
            input: input.chars(),
            peek: None,
            line: 1,
            token_line: 1,
            file,
        };
        lexer.peek = lexer.input.next();
        lexer
    }

    /// Line the most recently returned token started on.
    pub fn token_line(&self) -> usize {
        self.token_line
    }

    pub fn file(&self) -> Option<&'a str> {
        self.file
    }

    pub fn next_token(&mut self) -> Result<Token, ArborError> {
        tokenizer::next_token(self)
    }

    fn error(&self, message: impl Into<String>) -> ArborError {
        ArborError::parse(self.file, self.line, message)
    }
}

#[cfg(test)]
mod tests;
