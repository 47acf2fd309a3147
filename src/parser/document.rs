use super::*;
use crate::ast::SettingDecl;

pub(super) fn parse_document(parser: &mut Parser) -> Result<Document, ArborError> {
    let settings = parse_setting_list(parser, false)?;
    Ok(Document { settings })
}

/// Settings up to end of input, or up to and including the closing `}`
/// when `in_group` is set.
pub(super) fn parse_setting_list(parser: &mut Parser, in_group: bool) -> Result<Vec<SettingDecl>, ArborError> {
    let mut settings = Vec::new();

    while let Some(tok) = parser.peek() {
        match tok {
            Token::Eof if !in_group => {
                break;
            }
            Token::Eof => {
                return Err(parser.error("unexpected end of input, expected '}'"));
            }
            Token::RBrace if in_group => {
                parser.bump()?;
                break;
            }
            Token::Include => {
                for setting in parse_include(parser)? {
                    push_unique(&mut settings, setting)?;
                }
            }
            Token::Name(_) => {
                let setting = parse_setting(parser)?;
                push_unique(&mut settings, setting)?;
            }
            _ => {
                let token = parser.bump()?;
                return Err(parser.error(format!("unexpected {:?}, expected a setting name", token)));
            }
        }
    }

    Ok(settings)
}

fn push_unique(settings: &mut Vec<SettingDecl>, setting: SettingDecl) -> Result<(), ArborError> {
    if settings.iter().any(|s| s.name() == setting.name()) {
        return Err(ArborError::parse(
            setting.file.as_deref(),
            setting.line,
            format!("duplicate setting name '{}'", setting.name().unwrap_or_default()),
        ));
    }
    settings.push(setting);
    Ok(())
}

fn parse_setting(parser: &mut Parser) -> Result<SettingDecl, ArborError> {
    let name = if let Token::Name(n) = parser.bump()? {
        n
    } else {
        return Err(parser.error("expected setting name"));
    };
    let line = parser.line();

    match parser.bump()? {
        Token::Equals => {}
        Token::Colon => {
            let is_group = matches!(parser.peek(), Some(Token::LBrace));
            let allowed = if is_group {
                parser.options().contains(Options::COLON_FOR_GROUPS)
            } else {
                parser.options().contains(Options::COLON_FOR_SCALARS)
            };
            if !allowed {
                return Err(parser.error(format!("':' assignment is disabled for '{}', use '='", name)));
            }
        }
        other => {
            return Err(parser.error(format!("expected '=' or ':' after '{}', got {:?}", name, other)));
        }
    }

    let value = value::parse_value(parser)?;

    match parser.peek() {
        Some(Token::Semicolon) => {
            if !parser.options().contains(Options::SEMICOLON_SEPARATORS) {
                parser.bump()?;
                return Err(parser.error("';' separators are disabled"));
            }
            parser.bump()?;
        }
        Some(Token::Comma) => {
            parser.bump()?;
        }
        _ => {}
    }

    Ok(SettingDecl {
        name: Some(name),
        value,
        line,
        file: parser.file.clone(),
    })
}

fn parse_include(parser: &mut Parser) -> Result<Vec<SettingDecl>, ArborError> {
    parser.bump()?; // consume @include

    let raw = if let Token::String(path) = parser.bump()? {
        path
    } else {
        return Err(parser.error("expected quoted file name after @include"));
    };

    if parser.ctx.stack.len() >= MAX_INCLUDE_DEPTH {
        return Err(parser.error(format!("include depth limit exceeded at '{}'", raw)));
    }

    let path = resolve_include_path(&raw, parser.ctx.include_dir.as_deref(), parser.file.as_deref())
        .ok_or_else(|| parser.error("could not determine home directory for ~ expansion"))?;

    let canonical = path
        .canonicalize()
        .map_err(|e| parser.error(format!("cannot open include file '{}': {}", path.display(), e)))?;
    if parser.ctx.stack.contains(&canonical) {
        return Err(parser.error(format!("include cycle through '{}'", path.display())));
    }

    let content = fs::read_to_string(&canonical)
        .map_err(|e| parser.error(format!("cannot read include file '{}': {}", path.display(), e)))?;

    let mut nested_ctx = parser.ctx.clone();
    nested_ctx.stack.push(canonical);
    let display = path.display().to_string();
    let mut nested = Parser::new(&content, Some(&display), nested_ctx)?;
    Ok(nested.parse_document()?.settings)
}

/// Expand `~/` and resolve relative paths against the include directory,
/// else the including file's directory.
fn resolve_include_path(raw: &str, include_dir: Option<&Path>, current_file: Option<&str>) -> Option<PathBuf> {
    let p = if let Some(rest) = raw.strip_prefix("~/") {
        dirs::home_dir()?.join(rest)
    } else {
        PathBuf::from(raw)
    };

    if p.is_absolute() {
        return Some(p);
    }

    let base = include_dir
        .map(Path::to_path_buf)
        .or_else(|| current_file.and_then(|f| Path::new(f).parent().map(Path::to_path_buf)));

    Some(match base {
        Some(dir) => dir.join(p),
        None => p,
    })
}
