use super::*;
use crate::{ScalarStyle, ScanErrorKind};
use facet_testhelpers::test;
use tracing::trace;

/// Render events in a compact form that is easy to compare.
fn parse(source: &str) -> Vec<String> {
    let events = Parser::new(source).parse_to_vec().unwrap();
    trace!("{:#?}", events);
    events
        .iter()
        .map(|event| match event {
            Event::DocumentStart { .. } => "start".to_owned(),
            Event::DocumentEnd { .. } => "end".to_owned(),
            Event::SectionEntry { name, .. } => format!("[{name}]"),
            Event::SectionInherit { parent, .. } => format!(":{parent}"),
            Event::Mapping { .. } => ".".to_owned(),
            Event::Scalar {
                value, tag: None, ..
            } => value.to_string(),
            Event::Scalar {
                value,
                tag: Some(tag),
                ..
            } => format!("{tag} {value}"),
            Event::Comment { text, .. } => format!("#{text}"),
        })
        .collect()
}

fn parse_err(source: &str) -> ParseError {
    Parser::new(source)
        .find_map(Result::err)
        .expect("expected a parse error")
}

#[test]
fn test_empty_document() {
    assert_eq!(parse(""), ["start", "end"]);
}

#[test]
fn test_bare_keys_open_default_section() {
    assert_eq!(
        parse("a=1\nb = two"),
        ["start", "[default]", "a", "1", "b", "two", "end"]
    );
}

#[test]
fn test_default_section_after_leading_comment() {
    assert_eq!(
        parse("# header\na=1"),
        ["start", "#header", "[default]", "a", "1", "end"]
    );
}

#[test]
fn test_sections() {
    assert_eq!(
        parse("a=1\n[dev]\nb=2\n[prod:dev]\nc=3\n"),
        [
            "start", "[default]", "a", "1", "[dev]", "b", "2", "[prod]", ":dev", "c", "3", "end"
        ]
    );
}

#[test]
fn test_empty_parent_means_default() {
    assert_eq!(parse("[a:]\n"), ["start", "[a]", ":default", "end"]);
}

#[test]
fn test_no_inherit_event_without_colon() {
    let events = parse("[a]\nx=1");
    assert!(!events.iter().any(|e| e.starts_with(':')));
}

#[test]
fn test_dotted_key() {
    assert_eq!(
        parse("a.b.c = x"),
        ["start", "[default]", "a", ".", "b", ".", "c", "x", "end"]
    );
}

#[test]
fn test_quoted_value_is_tagged_str() {
    assert_eq!(
        parse("a='1'\nb=1"),
        ["start", "[default]", "a", "!!str 1", "b", "1", "end"]
    );
}

#[test]
fn test_quoted_key_is_not_tagged() {
    let events = Parser::new("'k'=\"v\"").parse_to_vec().unwrap();
    assert!(matches!(
        &events[2],
        Event::Scalar {
            style: ScalarStyle::SingleQuoted,
            tag: None,
            ..
        }
    ));
}

#[test]
fn test_quoting_equivalence() {
    assert_eq!(
        parse("'k'=\"v\""),
        ["start", "[default]", "k", "!!str v", "end"]
    );
    assert_eq!(parse("k=v"), ["start", "[default]", "k", "v", "end"]);
}

#[test]
fn test_comments_between_entries() {
    assert_eq!(
        parse("[a]\n; one\nx=1 # two\n"),
        ["start", "[a]", "#one", "x", "1", "#two", "end"]
    );
}

#[test]
fn test_section_entry_span_is_name() {
    let source = "x=1\n[name]\n";
    let events = Parser::new(source).parse_to_vec().unwrap();
    let span = events
        .iter()
        .find_map(|e| match e {
            Event::SectionEntry { span, name } if name == "name" => Some(*span),
            _ => None,
        })
        .unwrap();
    assert_eq!(span.slice(source), "name");
    assert_eq!(span.start.line, 1);
}

#[test]
fn test_missing_value() {
    let err = parse_err("[a]\nkey\n");
    assert_eq!(
        err.kind,
        ParseErrorKind::Scan(ScanErrorKind::MissingValueIndicator(None))
    );
    assert_eq!(err.mark.line, 1);
    assert_eq!(
        err.to_string(),
        "could not find expected '=' before the end of the line"
    );
}

#[test]
fn test_key_and_value_on_separate_lines() {
    let err = parse_err("a\n= 1");
    assert_eq!(err.kind.context(), "while scanning a key");
    assert_eq!(err.mark.line, 0);
}

#[test]
fn test_spaced_dotted_key() {
    assert_eq!(parse("a . b = 1"), parse("a.b=1"));
    assert_eq!(
        parse("'a'.\"b c\" = 1"),
        ["start", "[default]", "a", ".", "b c", "1", "end"]
    );
}

#[test]
fn test_value_without_key() {
    let err = parse_err("= 1");
    assert_eq!(
        err.kind,
        ParseErrorKind::UnexpectedToken {
            expected: "<key> or <section-start>",
            found: TokenKind::Value,
        }
    );
    assert_eq!(err.mark.column, 0);
}

#[test]
fn test_scan_errors_pass_through() {
    let err = parse_err("[a] x\n");
    assert!(matches!(err.kind, ParseErrorKind::Scan(_)));
    assert_eq!(err.kind.context(), "while scanning for the section entry");
}

#[test]
fn test_past_document_end() {
    let mut parser = Parser::new("a=1");
    while !matches!(parser.next_event().unwrap(), Event::DocumentEnd { .. }) {}
    let err = parser.next_event().unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::PastDocumentEnd);
    assert_eq!(err.to_string(), "attempted to read past end of document");
}

#[test]
fn test_iterator_stops_after_end() {
    let parser = Parser::new("a=1");
    assert_eq!(parser.count(), 5);
}

#[test]
fn test_from_bytes_rejects_bad_utf8() {
    let err = Parser::from_bytes(b"a=\xC3").err().unwrap();
    assert!(matches!(err.kind, ParseErrorKind::Scan(_)));
}
