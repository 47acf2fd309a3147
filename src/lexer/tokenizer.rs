use super::*;
use super::scanner::{bump, peek_second, skip_whitespace_and_comments};

pub(super) fn next_token(lexer: &mut Lexer) -> Result<Token, ArborError> {
    skip_whitespace_and_comments(lexer)?;
    lexer.token_line = lexer.line;

    match lexer.peek {
        Some('=') => tokenize_symbol(lexer, Token::Equals),
        Some(':') => tokenize_symbol(lexer, Token::Colon),
        Some(';') => tokenize_symbol(lexer, Token::Semicolon),
        Some(',') => tokenize_symbol(lexer, Token::Comma),
        Some('{') => tokenize_symbol(lexer, Token::LBrace),
        Some('}') => tokenize_symbol(lexer, Token::RBrace),
        Some('[') => tokenize_symbol(lexer, Token::LBracket),
        Some(']') => tokenize_symbol(lexer, Token::RBracket),
        Some('(') => tokenize_symbol(lexer, Token::LParen),
        Some(')') => tokenize_symbol(lexer, Token::RParen),
        Some('"') => tokenize_string(lexer),
        Some('@') => tokenize_directive(lexer),
        Some(c) if starts_number(c, peek_second(lexer)) => tokenize_number(lexer),
        Some(c) if c.is_ascii_alphabetic() || c == '*' => tokenize_name_or_bool(lexer),
        Some(ch) => tokenize_unexpected_char(lexer, ch),
        None => Ok(Token::Eof),
    }
}

fn starts_number(c: char, next: Option<char>) -> bool {
    let digit_or_dot = |ch: Option<char>| matches!(ch, Some(d) if d.is_ascii_digit() || d == '.');
    c.is_ascii_digit()
        || (c == '.' && matches!(next, Some(d) if d.is_ascii_digit()))
        || ((c == '-' || c == '+') && digit_or_dot(next))
}

fn tokenize_symbol(lexer: &mut Lexer, token: Token) -> Result<Token, ArborError> {
    bump(lexer);
    Ok(token)
}

fn tokenize_string(lexer: &mut Lexer) -> Result<Token, ArborError> {
    let start = lexer.line;
    bump(lexer); // consume opening quote
    let mut content = String::new();

    loop {
        match bump(lexer) {
            Some('"') => break,
            Some('\\') => {
                let escaped = match bump(lexer) {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('f') => '\u{0C}',
                    Some('\\') => '\\',
                    Some('"') => '"',
                    Some('x') => tokenize_hex_escape(lexer)?,
                    Some(other) => {
                        return Err(lexer.error(format!("invalid escape sequence '\\{}'", other)));
                    }
                    None => {
                        return Err(ArborError::parse(lexer.file, start, "unterminated string literal"));
                    }
                };
                content.push(escaped);
            }
            Some(ch) => content.push(ch),
            None => {
                return Err(ArborError::parse(lexer.file, start, "unterminated string literal"));
            }
        }
    }

    Ok(Token::String(content))
}

fn tokenize_hex_escape(lexer: &mut Lexer) -> Result<char, ArborError> {
    let mut digits = String::new();
    for _ in 0..2 {
        match lexer.peek {
            Some(c) if c.is_ascii_hexdigit() => {
                digits.push(c);
                bump(lexer);
            }
            _ => break,
        }
    }

    u8::from_str_radix(&digits, 16)
        .map(char::from)
        .map_err(|_| lexer.error("'\\x' must be followed by two hex digits"))
}

fn tokenize_directive(lexer: &mut Lexer) -> Result<Token, ArborError> {
    bump(lexer); // consume '@'
    let mut word = String::new();
    while let Some(ch) = lexer.peek {
        if ch.is_ascii_alphabetic() {
            word.push(ch);
            bump(lexer);
        } else {
            break;
        }
    }

    if word == "include" {
        Ok(Token::Include)
    } else {
        Err(lexer.error(format!("unknown directive '@{}'", word)))
    }
}

fn tokenize_number(lexer: &mut Lexer) -> Result<Token, ArborError> {
    let mut text = String::new();
    let mut prev: Option<char> = None;

    while let Some(ch) = lexer.peek {
        let is_hex = text.starts_with("0x") || text.starts_with("0X");
        let exponent_sign = (ch == '-' || ch == '+')
            && !is_hex
            && matches!(prev, Some('e') | Some('E'))
            && !text.is_empty();
        let leading_sign = (ch == '-' || ch == '+') && text.is_empty();

        if ch.is_ascii_alphanumeric() || ch == '.' || exponent_sign || leading_sign {
            text.push(ch);
            prev = Some(ch);
            bump(lexer);
        } else {
            break;
        }
    }

    classify_number(&text).ok_or_else(|| lexer.error(format!("invalid numeric literal '{}'", text)))
}

/// Decide the token for a numeric literal.
///
/// `L`/`LL` forces a 64-bit integer. Unsuffixed decimals that overflow 32
/// bits promote to 64 bits. Unsuffixed hex up to `0xFFFFFFFF` is a 32-bit
/// bit pattern.
pub(crate) fn classify_number(text: &str) -> Option<Token> {
    let (body, long) = if let Some(b) = text.strip_suffix("LL") {
        (b, true)
    } else if let Some(b) = text.strip_suffix('L') {
        (b, true)
    } else {
        (text, false)
    };

    if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        let bits = u64::from_str_radix(hex, 16).ok()?;
        return Some(match u32::try_from(bits) {
            Ok(small) if !long => Token::Integer(small as i32, Format::Hex),
            _ => Token::Integer64(bits as i64, Format::Hex),
        });
    }

    let is_float = body.contains(['.', 'e', 'E']);
    if is_float {
        if long || !body.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        // Overflowing literals such as 1e999 have no textual round trip.
        return body.parse::<f64>().ok().filter(|f| f.is_finite()).map(Token::Float);
    }

    let n = body.parse::<i64>().ok()?;
    Some(match i32::try_from(n) {
        Ok(small) if !long => Token::Integer(small, Format::Default),
        _ => Token::Integer64(n, Format::Default),
    })
}

fn tokenize_name_or_bool(lexer: &mut Lexer) -> Result<Token, ArborError> {
    let mut name = String::new();

    while let Some(ch) = lexer.peek {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '*' {
            name.push(ch);
            bump(lexer);
        } else {
            break;
        }
    }

    let token = if name.eq_ignore_ascii_case("true") {
        Token::Bool(true)
    } else if name.eq_ignore_ascii_case("false") {
        Token::Bool(false)
    } else {
        Token::Name(name)
    };

    Ok(token)
}

fn tokenize_unexpected_char(lexer: &mut Lexer, ch: char) -> Result<Token, ArborError> {
    let err = lexer.error(format!("unexpected character '{}'", ch));
    bump(lexer);
    Err(err)
}
