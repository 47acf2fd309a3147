#[cfg(test)]
use super::*;
#[cfg(test)]
use crate::ast::ValueDecl;
#[cfg(test)]
use crate::value::{Format, Value};

fn parse(input: &str) -> Result<Document, ArborError> {
    parse_str(input, ParseContext::default())
}

fn scalar(decl: &ValueDecl) -> &Value {
    match decl {
        ValueDecl::Scalar(v, _) => v,
        other => panic!("Expected scalar, got {:?}", other),
    }
}

#[test]
fn test_parser_basic_document() {
    let input = r#"
version = "1.0";
general :
{
  port = 8080;
  access_allow = true;
  access :
  {
    users = [ "alice", "bob" ];
  };
};
"#;

    let doc = parse(input).expect("Failed to parse document");
    assert_eq!(doc.settings.len(), 2);
    assert_eq!(doc.settings[0].name(), Some("version"));
    assert_eq!(doc.settings[0].line, 2);

    let ValueDecl::Group(general) = &doc.settings[1].value else {
        panic!("Expected 'general' to be a group");
    };
    assert_eq!(general.len(), 3);
    assert_eq!(scalar(&general[0].value), &Value::Int32(8080));
    assert_eq!(general[0].line, 5);
    assert_eq!(scalar(&general[1].value), &Value::Bool(true));

    let ValueDecl::Group(access) = &general[2].value else {
        panic!("Expected 'access' to be a group");
    };
    let ValueDecl::Array(users) = &access[0].value else {
        panic!("Expected 'users' to be an array");
    };
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.name.is_none()));
    assert_eq!(scalar(&users[1].value), &Value::String("bob".into()));
}

#[test]
fn test_list_of_mixed_values() {
    let doc = parse(r#"items = ( 1, "two", 3.0, [ 4, 5 ], { six = 6; } );"#).unwrap();
    let ValueDecl::List(items) = &doc.settings[0].value else {
        panic!("Expected a list");
    };
    assert_eq!(items.len(), 5);
    assert!(matches!(items[3].value, ValueDecl::Array(_)));
    assert!(matches!(items[4].value, ValueDecl::Group(_)));
}

#[test]
fn test_adjacent_strings_concatenate() {
    let doc = parse("greeting = \"hello, \"\n  \"world\";").unwrap();
    assert_eq!(scalar(&doc.settings[0].value), &Value::String("hello, world".into()));
}

#[test]
fn test_hex_format_is_kept() {
    let doc = parse("mask = 0xFF; big = 0x100000000;").unwrap();
    assert_eq!(doc.settings[0].value, ValueDecl::Scalar(Value::Int32(255), Format::Hex));
    assert_eq!(
        doc.settings[1].value,
        ValueDecl::Scalar(Value::Int64(0x1_0000_0000), Format::Hex)
    );
}

#[test]
fn test_array_kinds_must_match() {
    let err = parse("a = [ 1, \"x\" ];").unwrap_err();
    assert!(err.to_string().contains("mismatched element type"), "{}", err);

    let err = parse("a = [ { b = 1; } ];").unwrap_err();
    assert!(err.to_string().contains("only contain scalar"), "{}", err);
}

#[test]
fn test_duplicate_names_rejected() {
    let err = parse("a = 1;\ng : { x = 1; x = 2; };").unwrap_err();
    assert_eq!(
        err,
        ArborError::ParseFailure {
            file: None,
            line: 2,
            message: "duplicate setting name 'x'".into(),
        }
    );
}

#[test]
fn test_missing_assignment() {
    let err = parse("port 8080;").unwrap_err();
    assert!(matches!(err, ArborError::ParseFailure { line: 1, .. }));
}

#[test]
fn test_unclosed_group_reports_eof() {
    let err = parse("g = {\n a = 1;\n").unwrap_err();
    assert!(err.to_string().contains("expected '}'"), "{}", err);
}

#[test]
fn test_separator_options() {
    let semis = ParseContext::new(Options::COLON_FOR_GROUPS, None);
    assert!(parse_str("a = 1;", semis.clone()).is_err());
    assert!(parse_str("a = 1, b = 2", semis.clone()).is_ok());
    assert!(parse_str("g : { a = 1 }", semis).is_ok());

    let no_group_colon = ParseContext::new(Options::SEMICOLON_SEPARATORS, None);
    assert!(parse_str("g : { a = 1; };", no_group_colon.clone()).is_err());
    assert!(parse_str("g = { a = 1; };", no_group_colon).is_ok());

    assert!(parse("port : 8080;").is_err());
    let scalar_colon = ParseContext::new(Options::default() | Options::COLON_FOR_SCALARS, None);
    assert!(parse_str("port : 8080;", scalar_colon).is_ok());
}

#[test]
fn test_include_splices_settings() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("extra.cfg"), "extra = 42;\nnested : { deep = true; };\n").unwrap();
    let main = dir.path().join("main.cfg");
    fs::write(&main, "first = 1;\n@include \"extra.cfg\"\nlast = 2;\n").unwrap();

    let doc = parse_file(&main, ParseContext::default()).expect("Failed to parse with include");
    let names: Vec<_> = doc.settings.iter().map(|s| s.name().unwrap()).collect();
    assert_eq!(names, vec!["first", "extra", "nested", "last"]);
    assert!(doc.settings[1].file.as_deref().unwrap().ends_with("extra.cfg"));
    assert_eq!(doc.settings[1].line, 1);
}

#[test]
fn test_include_dir_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let inc = dir.path().join("inc");
    fs::create_dir(&inc).unwrap();
    fs::write(inc.join("shared.cfg"), "shared = \"yes\";").unwrap();

    let ctx = ParseContext::new(Options::default(), Some(inc));
    let doc = parse_str("@include \"shared.cfg\"", ctx).unwrap();
    assert_eq!(doc.settings[0].name(), Some("shared"));
}

#[test]
fn test_include_cycle_and_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.cfg");
    fs::write(&a, "@include \"b.cfg\"").unwrap();
    fs::write(dir.path().join("b.cfg"), "@include \"a.cfg\"").unwrap();

    let err = parse_file(&a, ParseContext::default()).unwrap_err();
    assert!(err.to_string().contains("include cycle"), "{}", err);

    let ctx = ParseContext::new(Options::default(), Some(dir.path().to_path_buf()));
    let err = parse_str("@include \"missing.cfg\"", ctx).unwrap_err();
    assert!(matches!(err, ArborError::ParseFailure { .. }));
}

#[test]
fn test_unreadable_file_is_io_failure() {
    let dir = tempfile::tempdir().unwrap();
    let err = parse_file(&dir.path().join("absent.cfg"), ParseContext::default()).unwrap_err();
    assert!(matches!(err, ArborError::IoFailure { .. }));
}

fn nested_list(depth: usize) -> String {
    format!("a = {}{};", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn test_nesting_limit() {
    assert!(parse(&nested_list(MAX_NESTING_DEPTH)).is_ok());

    let err = parse(&nested_list(MAX_NESTING_DEPTH + 1)).unwrap_err();
    assert!(err.to_string().contains("nesting too deep"), "{}", err);

    // Far past the limit the parser still fails cleanly instead of exhausting the stack.
    let err = parse(&nested_list(20_000)).unwrap_err();
    assert!(matches!(err, ArborError::ParseFailure { line: 1, .. }));
}

#[test]
fn test_nesting_limit_spans_includes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("inner.cfg"), nested_list(MAX_NESTING_DEPTH)).unwrap();

    let ctx = ParseContext::new(Options::default(), Some(dir.path().to_path_buf()));
    assert!(parse_str("@include \"inner.cfg\"", ctx.clone()).is_ok());

    let err = parse_str("g : { @include \"inner.cfg\" };", ctx).unwrap_err();
    assert!(err.to_string().contains("nesting too deep"), "{}", err);
}
