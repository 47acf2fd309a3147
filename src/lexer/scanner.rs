use super::*;

/// Advance the character iterator and update line tracking
pub(super) fn bump(lexer: &mut Lexer) -> Option<char> {
    let curr = lexer.peek;
    if curr == Some('\n') {
        lexer.line += 1;
    }
    lexer.peek = lexer.input.next();
    curr
}

/// The character after the current one, without consuming anything
pub(super) fn peek_second(lexer: &Lexer) -> Option<char> {
    lexer.input.clone().next()
}

/// Skip whitespace and all three comment styles
pub(super) fn skip_whitespace_and_comments(lexer: &mut Lexer) -> Result<(), ArborError> {
    while let Some(c) = lexer.peek {
        match c {
            c if c.is_whitespace() => {
                bump(lexer);
            }
            '#' => skip_line(lexer),
            '/' if peek_second(lexer) == Some('/') => skip_line(lexer),
            '/' if peek_second(lexer) == Some('*') => {
                let start = lexer.line;
                bump(lexer);
                bump(lexer);
                let mut closed = false;
                while let Some(ch) = bump(lexer) {
                    if ch == '*' && lexer.peek == Some('/') {
                        bump(lexer);
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(ArborError::parse(
                        lexer.file,
                        start,
                        "unterminated block comment",
                    ));
                }
            }
            _ => break,
        }
    }
    Ok(())
}

fn skip_line(lexer: &mut Lexer) {
    while let Some(ch) = bump(lexer) {
        if ch == '\n' {
            break;
        }
    }
}
