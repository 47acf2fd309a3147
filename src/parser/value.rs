use super::*;
use crate::ast::{SettingDecl, ValueDecl};
use crate::value::{Format, Value};

pub(super) fn parse_value(parser: &mut Parser) -> Result<ValueDecl, ArborError> {
    match parser.peek() {
        Some(Token::LBrace) => nested(parser, parse_group_value),
        Some(Token::LBracket) => nested(parser, parse_array_value),
        Some(Token::LParen) => nested(parser, parse_list_value),
        Some(tok) if is_scalar_token(tok) => {
            let (value, format) = parse_scalar(parser)?;
            Ok(ValueDecl::Scalar(value, format))
        }
        _ => {
            let token = parser.bump()?;
            Err(parser.error(format!("unexpected {:?} in value position", token)))
        }
    }
}

fn nested(
    parser: &mut Parser,
    parse: fn(&mut Parser) -> Result<ValueDecl, ArborError>,
) -> Result<ValueDecl, ArborError> {
    parser.enter()?;
    let value = parse(parser);
    parser.leave();
    value
}

fn is_scalar_token(tok: &Token) -> bool {
    matches!(
        tok,
        Token::Integer(..) | Token::Integer64(..) | Token::Float(_) | Token::Bool(_) | Token::String(_)
    )
}

fn parse_scalar(parser: &mut Parser) -> Result<(Value, Format), ArborError> {
    let scalar = match parser.bump()? {
        Token::Integer(n, format) => (Value::Int32(n), format),
        Token::Integer64(n, format) => (Value::Int64(n), format),
        Token::Float(f) => (Value::Float64(f), Format::Default),
        Token::Bool(b) => (Value::Bool(b), Format::Default),
        Token::String(mut s) => {
            // Adjacent string literals concatenate.
            while let Some(Token::String(_)) = parser.peek() {
                if let Token::String(next) = parser.bump()? {
                    s.push_str(&next);
                }
            }
            (Value::String(s), Format::Default)
        }
        other => {
            return Err(parser.error(format!("expected a scalar value, got {:?}", other)));
        }
    };
    Ok(scalar)
}

fn element(parser: &Parser, line: usize, value: ValueDecl) -> SettingDecl {
    SettingDecl {
        name: None,
        value,
        line,
        file: parser.file.clone(),
    }
}

fn parse_group_value(parser: &mut Parser) -> Result<ValueDecl, ArborError> {
    parser.expect(Token::LBrace, "'{'")?;
    let members = document::parse_setting_list(parser, true)?;
    Ok(ValueDecl::Group(members))
}

fn parse_array_value(parser: &mut Parser) -> Result<ValueDecl, ArborError> {
    parser.bump()?; // consume [
    let mut elements: Vec<SettingDecl> = Vec::new();

    loop {
        match parser.peek() {
            Some(Token::RBracket) => {
                parser.bump()?;
                break;
            }
            Some(tok) if is_scalar_token(tok) => {
                let line = parser.peek_line;
                let (value, format) = parse_scalar(parser)?;

                if let Some(ValueDecl::Scalar(first, _)) = elements.first().map(|e| &e.value) {
                    if first.kind() != value.kind() {
                        return Err(parser.error(format!(
                            "mismatched element type in array: expected {}, found {}",
                            first.kind(),
                            value.kind()
                        )));
                    }
                }
                elements.push(element(parser, line, ValueDecl::Scalar(value, format)));
                expect_separator(parser, Token::RBracket, "']'")?;
            }
            Some(Token::LBrace) | Some(Token::LBracket) | Some(Token::LParen) => {
                parser.bump()?;
                return Err(parser.error("arrays may only contain scalar values, use a list '( )' instead"));
            }
            _ => {
                let token = parser.bump()?;
                return Err(parser.error(format!("unexpected {:?} in array", token)));
            }
        }
    }

    Ok(ValueDecl::Array(elements))
}

fn parse_list_value(parser: &mut Parser) -> Result<ValueDecl, ArborError> {
    parser.bump()?; // consume (
    let mut elements = Vec::new();

    loop {
        match parser.peek() {
            Some(Token::RParen) => {
                parser.bump()?;
                break;
            }
            Some(Token::Eof) => {
                return Err(parser.error("unexpected end of input, expected ')'"));
            }
            _ => {
                let line = parser.peek_line;
                let value = parse_value(parser)?;
                elements.push(element(parser, line, value));
                expect_separator(parser, Token::RParen, "')'")?;
            }
        }
    }

    Ok(ValueDecl::List(elements))
}

/// After an element: a comma, or the closing bracket (left for the caller).
fn expect_separator(parser: &mut Parser, closing: Token, what: &str) -> Result<(), ArborError> {
    match parser.peek() {
        Some(Token::Comma) => {
            parser.bump()?;
            Ok(())
        }
        Some(tok) if *tok == closing => Ok(()),
        _ => {
            let token = parser.bump()?;
            Err(parser.error(format!("expected ',' or {}, got {:?}", what, token)))
        }
    }
}
