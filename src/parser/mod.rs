use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ast::Document;
use crate::lexer::{Lexer, Token};
use crate::options::Options;
use crate::ArborError;

mod document;
mod value;

/// Nested includes beyond this depth are rejected.
pub const MAX_INCLUDE_DEPTH: usize = 10;

/// Groups, arrays and lists nested deeper than this are rejected, across
/// included files too.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Everything the parser needs besides the text itself.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    pub options: Options,
    pub include_dir: Option<PathBuf>,
    // Canonical paths of the files currently being parsed, outermost first.
    stack: Vec<PathBuf>,
    // Containers currently open, including those of including files.
    depth: usize,
}

impl ParseContext {
    pub fn new(options: Options, include_dir: Option<PathBuf>) -> Self {
        Self { options, include_dir, stack: Vec::new(), depth: 0 }
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peek: Option<Token>,
    peek_line: usize,
    line: usize,
    file: Option<Arc<str>>,
    ctx: ParseContext,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, file: Option<&'a str>, ctx: ParseContext) -> Result<Self, ArborError> {
        let mut lexer = Lexer::new(input, file);
        let peek = Some(lexer.next_token()?);
        let peek_line = lexer.token_line();
        Ok(Self {
            lexer,
            peek,
            peek_line,
            line: peek_line,
            file: file.map(Arc::from),
            ctx,
        })
    }

    pub(crate) fn bump(&mut self) -> Result<Token, ArborError> {
        let curr = self
            .peek
            .take()
            .ok_or_else(|| self.error("unexpected end of input"))?;
        self.line = self.peek_line;
        if curr != Token::Eof {
            self.peek = Some(self.lexer.next_token()?);
            self.peek_line = self.lexer.token_line();
        } else {
            self.peek = Some(Token::Eof);
        }
        Ok(curr)
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.peek.as_ref()
    }

    pub(crate) fn expect(&mut self, expected: Token, what: &str) -> Result<Token, ArborError> {
        let token = self.bump()?;
        if token != expected {
            return Err(self.error(format!("expected {}, got {:?}", what, token)));
        }
        Ok(token)
    }

    /// Line of the most recently consumed token.
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    pub(crate) fn options(&self) -> Options {
        self.ctx.options
    }

    /// Open a container, failing once `MAX_NESTING_DEPTH` is exceeded.
    pub(crate) fn enter(&mut self) -> Result<(), ArborError> {
        if self.ctx.depth >= MAX_NESTING_DEPTH {
            return Err(self.error(format!("nesting too deep (limit {})", MAX_NESTING_DEPTH)));
        }
        self.ctx.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.ctx.depth = self.ctx.depth.saturating_sub(1);
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> ArborError {
        ArborError::parse(self.file.as_deref(), self.line, message)
    }

    pub fn parse_document(&mut self) -> Result<Document, ArborError> {
        document::parse_document(self)
    }
}

/// Parse source text that did not come from a file.
pub fn parse_str(input: &str, ctx: ParseContext) -> Result<Document, ArborError> {
    let mut parser = Parser::new(input, None, ctx)?;
    parser.parse_document()
}

/// Parse the file at `path`. Read failures are I/O failures; everything
/// after that, includes included, reports parse failures.
pub fn parse_file(path: &Path, mut ctx: ParseContext) -> Result<Document, ArborError> {
    let content = fs::read_to_string(path).map_err(|e| ArborError::io(path, e))?;
    if let Ok(canonical) = path.canonicalize() {
        ctx.stack.push(canonical);
    }
    let display = path.display().to_string();
    let mut parser = Parser::new(&content, Some(&display), ctx)?;
    parser.parse_document()
}

#[cfg(test)]
mod tests;
