//! Document writer for tini output.

use std::borrow::Cow;
use std::fmt;

use tini_tokenizer::is_key_start;
use tini_tree::{DEFAULT_SECTION, Node, NodeKind, Tag};
use tracing::debug;

use crate::scalar::{is_plain_segment, survives_plain};
use crate::{FormatOptions, QuoteStyle, can_be_plain, quote};

/// A tree that has no text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The root handed to [`format_document`] is not a document.
    NotADocument(NodeKind),
    /// A section or parent name outside `[A-Za-z0-9_-]`.
    SectionName(String),
    /// A key path no key syntax can express.
    Key(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::NotADocument(kind) => write!(f, "expected a document, got {kind:?}"),
            FormatError::SectionName(name) => {
                write!(f, "section name '{name}' cannot be written in a header")
            }
            FormatError::Key(key) => write!(f, "key '{key}' cannot be written"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Low-level writer for tini documents.
///
/// Sections are written one at a time; the writer takes care of spacing
/// between them and of quoting keys and values.
pub struct IniWriter {
    out: String,
    options: FormatOptions,
}

impl IniWriter {
    /// Create a new writer with default options.
    pub fn new() -> Self {
        Self::with_options(FormatOptions::default())
    }

    /// Create a new writer with the given options.
    pub fn with_options(options: FormatOptions) -> Self {
        Self {
            out: String::new(),
            options,
        }
    }

    /// Consume the writer and return the text.
    pub fn finish(self) -> String {
        self.out
    }

    /// Write comment lines, one `# ` line per line of `text`.
    pub fn write_comment(&mut self, text: &str) {
        if !self.options.emit_comments {
            return;
        }
        for line in text.lines() {
            if line.is_empty() {
                self.out.push_str("#\n");
            } else {
                self.out.push_str("# ");
                self.out.push_str(line);
                self.out.push('\n');
            }
        }
    }

    /// Write `[name]` or `[name:parent]`.
    pub fn write_section_header(
        &mut self,
        name: &str,
        parent: Option<&str>,
    ) -> Result<(), FormatError> {
        check_section_name(name)?;
        self.out.push('[');
        self.out.push_str(name);
        if let Some(parent) = parent {
            check_section_name(parent)?;
            self.out.push(':');
            self.out.push_str(parent);
        }
        self.out.push_str("]\n");
        Ok(())
    }

    /// Write a section: its comment, the header (unless `headerless`), and
    /// every entry.
    pub fn write_section(
        &mut self,
        name: &Node,
        body: &Node,
        headerless: bool,
    ) -> Result<(), FormatError> {
        if !self.out.is_empty() && self.options.blank_line_between_sections {
            self.out.push('\n');
        }
        if let Some(comment) = &name.comment {
            self.write_comment(comment);
        }
        if !headerless {
            self.write_section_header(&name.value, body.inherit.as_deref())?;
        }
        self.write_pairs(&mut Vec::new(), body)
    }

    /// Write one `key = value` line. `path` holds the key segments.
    pub fn write_entry(&mut self, path: &[&str], value: &Node) -> Result<(), FormatError> {
        let key = format_key(path)?;
        self.out.push_str(&key);
        let text = self.scalar_text(value);
        match (self.options.spaced_equals, text.is_empty()) {
            (true, true) => self.out.push_str(" ="),
            (true, false) => {
                self.out.push_str(" = ");
                self.out.push_str(&text);
            }
            (false, _) => {
                self.out.push('=');
                self.out.push_str(&text);
            }
        }
        self.out.push('\n');
        Ok(())
    }

    fn write_pairs<'a>(
        &mut self,
        path: &mut Vec<&'a str>,
        node: &'a Node,
    ) -> Result<(), FormatError> {
        for (key, value) in node.pairs() {
            if value.is_mapping() && value.is_empty() {
                debug!(key = %key.value, "Skipping empty mapping");
                continue;
            }
            if let Some(comment) = &key.comment {
                self.write_comment(comment);
            }
            path.push(&key.value);
            if value.is_mapping() {
                self.write_pairs(path, value)?;
            } else {
                self.write_entry(path, value)?;
            }
            path.pop();
        }
        Ok(())
    }

    /// Text of a scalar value, quoted when the plain form would read back as
    /// something else.
    fn scalar_text<'a>(&self, node: &'a Node) -> Cow<'a, str> {
        let text = node.value.as_str();
        let plain = match node.tag {
            Some(Tag::Str | Tag::Binary) => can_be_plain(text),
            _ => survives_plain(text),
        };
        if plain {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(quote(text, self.options.quote_style))
        }
    }
}

impl Default for IniWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a whole document.
///
/// A `default` section without `inherit` goes first, headerless when it has
/// entries. When an earlier section inherits from `default`, it keeps its
/// header and its place instead, so that section does not pick up its keys
/// on reload. The others follow in document order. Comments after the last
/// entry are written at the end.
pub fn format_document(document: &Node, options: &FormatOptions) -> Result<String, FormatError> {
    if document.kind != NodeKind::Document {
        return Err(FormatError::NotADocument(document.kind));
    }
    let mut writer = IniWriter::with_options(options.clone());

    let sections: Vec<(&Node, &Node)> = document.pairs().collect();
    let hoisted = sections
        .iter()
        .position(|(name, body)| name.value == DEFAULT_SECTION && body.inherit.is_none())
        .filter(|&i| {
            let inherited_early = sections[..i]
                .iter()
                .any(|(_, body)| body.inherit.as_deref() == Some(DEFAULT_SECTION));
            if inherited_early {
                debug!("Default section is inherited before its declaration, keeping its place");
            }
            !inherited_early
        });

    if let Some(i) = hoisted {
        let (name, body) = sections[i];
        writer.write_section(name, body, !body.is_empty())?;
    }
    for (i, (name, body)) in sections.iter().enumerate() {
        if Some(i) != hoisted {
            writer.write_section(name, body, false)?;
        }
    }

    if let Some(comment) = &document.comment {
        writer.write_comment(comment);
    }
    Ok(writer.finish())
}

fn check_section_name(name: &str) -> Result<(), FormatError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(FormatError::SectionName(name.to_owned()))
    }
}

/// A key path as dotted segments. A segment that would not read back as
/// itself is double-quoted; only an empty segment, or a first segment that
/// does not start like a key, has no text form.
fn format_key(path: &[&str]) -> Result<String, FormatError> {
    if path.is_empty() {
        return Err(FormatError::Key(String::new()));
    }
    let mut key = String::new();
    for (i, segment) in path.iter().enumerate() {
        let first = i == 0;
        if !first {
            key.push('.');
        }
        if is_plain_segment(segment, first) {
            key.push_str(segment);
        } else if segment.chars().next().is_some_and(|c| !first || is_key_start(c)) {
            key.push_str(&quote(segment, QuoteStyle::Double));
        } else {
            return Err(FormatError::Key(path.join(".")));
        }
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    fn reformat(source: &str) -> String {
        let doc = tini_tree::parse_str(source).unwrap();
        format_document(&doc, &FormatOptions::default()).unwrap()
    }

    #[test]
    fn test_default_section_has_no_header() {
        insta::assert_snapshot!(reformat("name=demo\ndebug=on\n"), @r"
        name = demo
        debug = on
        ");
    }

    #[test]
    fn test_sections_and_inheritance() {
        let out = reformat(
            "title = app\n[common]\nhost = db.local\nport = 5432\n[dev:common]\nport = 5433\n",
        );
        insta::assert_snapshot!(out, @r"
        title = app

        [common]
        host = db.local
        port = 5432

        [dev:common]
        port = 5433
        host = db.local
        ");
    }

    #[test]
    fn test_default_written_first() {
        let out = reformat("[a]\nx = 1\n[default]\ny = 2\n");
        insta::assert_snapshot!(out, @r"
        y = 2

        [a]
        x = 1
        ");
    }

    #[test]
    fn test_default_inherited_before_declaration_keeps_its_place() {
        let source = "[b:default]\ny=2\n[default]\nz=1\n";
        let out = reformat(source);
        assert_eq!(out, "[b:default]\ny = 2\n\n[default]\nz = 1\n");

        let first = tini_tree::parse_str(source).unwrap();
        let second = tini_tree::parse_str(&out).unwrap();
        assert_eq!(first.section("b").unwrap().len(), 1);
        assert_eq!(second.section("b").unwrap().len(), 1);
        assert_eq!(
            second.get("default.z").and_then(Node::as_str),
            Some("1")
        );
    }

    #[test]
    fn test_nested_mappings_become_dotted_keys() {
        let out = reformat("[server]\nhttp.port = 80\nhttp.host = local\nhello.1 = world\n");
        insta::assert_snapshot!(out, @r"
        [server]
        http.port = 80
        http.host = local
        hello.1 = world
        ");
    }

    #[test]
    fn test_strings_that_look_like_other_types_are_quoted() {
        let out = reformat("port = \"8080\"\nflag = 'yes'\nempty = ''\nreal = 8080\nnothing =\n");
        insta::assert_snapshot!(out, @r#"
        port = "8080"
        flag = "yes"
        empty = ""
        real = 8080
        nothing =
        "#);
    }

    #[test]
    fn test_escapes_and_padding() {
        let out = reformat("a = \"two\\nlines\"\nb = \" padded \"\nc = \"say \\\"hi\\\"\"\nd = \"x # y\"\n");
        insta::assert_snapshot!(out, @r#"
        a = "two\nlines"
        b = " padded "
        c = say "hi"
        d = "x # y"
        "#);
    }

    #[test]
    fn test_comments_are_kept() {
        let out = reformat("# top\nname = demo\n# about db\n[db]\n; the port\nport = 1\n# trailing\n");
        insta::assert_snapshot!(out, @r"
        # top
        name = demo

        # about db
        [db]
        # the port
        port = 1
        # trailing
        ");
    }

    #[test]
    fn test_compact_without_comments() {
        let doc = tini_tree::parse_str("# c\na = 1\n[s]\nb = x y\n").unwrap();
        let options = FormatOptions::default().compact().without_comments();
        let out = format_document(&doc, &options).unwrap();
        assert_eq!(out, "a=1\n[s]\nb=x y\n");
    }

    #[test]
    fn test_single_quote_style() {
        let doc = tini_tree::parse_str("a = '42'\nb = \"it's\"\nc = \"x\\ny\"\n").unwrap();
        let options = FormatOptions::default().quote_style(QuoteStyle::Single);
        let out = format_document(&doc, &options).unwrap();
        assert_eq!(out, "a = '42'\nb = it's\nc = \"x\\ny\"\n");
    }

    #[test]
    fn test_quoted_keys() {
        let mut section = Node::section_body();
        section.insert(Node::scalar("a.b"), Node::scalar("1"));
        section.insert(Node::scalar("key "), Node::scalar("2"));
        let mut doc = Node::document();
        doc.insert(Node::scalar("default"), section);

        let out = format_document(&doc, &FormatOptions::default()).unwrap();
        assert_eq!(out, "\"a.b\" = 1\n\"key \" = 2\n");

        let back = tini_tree::parse_str(&out).unwrap();
        let default = back.section("default").unwrap();
        assert_eq!(default.child("a.b").and_then(|n| n.as_str()), Some("1"));
        assert_eq!(default.child("key ").and_then(|n| n.as_str()), Some("2"));
    }

    #[test]
    fn test_dotted_keys_quote_single_segments() {
        let mut inner = Node::mapping();
        inner.insert(Node::scalar("x.y"), Node::scalar("1"));
        inner.insert(Node::scalar("b c "), Node::scalar("2"));
        inner.insert(Node::scalar("'q"), Node::scalar("3"));
        let mut section = Node::section_body();
        section.insert(Node::scalar("outer"), inner);
        let mut doc = Node::document();
        doc.insert(Node::scalar("s"), section);

        let out = format_document(&doc, &FormatOptions::default()).unwrap();
        assert_eq!(
            out,
            "[s]\nouter.\"x.y\" = 1\nouter.\"b c \" = 2\nouter.\"'q\" = 3\n"
        );

        let back = tini_tree::parse_str(&out).unwrap();
        let outer = back.get("s.outer").unwrap();
        assert_eq!(outer.child("x.y").and_then(|n| n.as_str()), Some("1"));
        assert_eq!(outer.child("b c ").and_then(|n| n.as_str()), Some("2"));
        assert_eq!(outer.child("'q").and_then(|n| n.as_str()), Some("3"));
    }

    #[test]
    fn test_unwritable_keys() {
        let mut inner = Node::mapping();
        inner.insert(Node::scalar(""), Node::scalar("1"));
        let mut section = Node::section_body();
        section.insert(Node::scalar("outer"), inner);
        let mut doc = Node::document();
        doc.insert(Node::scalar("s"), section);
        assert_eq!(
            format_document(&doc, &FormatOptions::default()),
            Err(FormatError::Key("outer.".into()))
        );

        let mut section = Node::section_body();
        section.insert(Node::scalar("1st"), Node::scalar("1"));
        let mut doc = Node::document();
        doc.insert(Node::scalar("s"), section);
        assert_eq!(
            format_document(&doc, &FormatOptions::default()),
            Err(FormatError::Key("1st".into()))
        );
    }

    #[test]
    fn test_unwritable_section_name() {
        let mut doc = Node::document();
        doc.insert(Node::scalar("has space"), Node::section_body());
        let err = format_document(&doc, &FormatOptions::default()).unwrap_err();
        assert_eq!(err, FormatError::SectionName("has space".into()));
        assert_eq!(
            err.to_string(),
            "section name 'has space' cannot be written in a header"
        );
    }

    #[test]
    fn test_not_a_document() {
        assert_eq!(
            format_document(&Node::section_body(), &FormatOptions::default()),
            Err(FormatError::NotADocument(NodeKind::Section))
        );
    }

    #[test]
    fn test_empty_mapping_skipped() {
        let mut section = Node::section_body();
        section.insert(Node::scalar("empty"), Node::mapping());
        section.insert(Node::scalar("k"), Node::scalar("v"));
        let mut doc = Node::document();
        doc.insert(Node::scalar("s"), section);
        let out = format_document(&doc, &FormatOptions::default()).unwrap();
        assert_eq!(out, "[s]\nk = v\n");
    }

    #[test]
    fn test_inheriting_default_stays_in_place() {
        let out = reformat("[base]\nx = 1\n[default:base]\ny = 2\n");
        assert_eq!(out, "[base]\nx = 1\n\n[default:base]\ny = 2\nx = 1\n");
        tini_tree::parse_str(&out).unwrap();
    }

    #[test]
    fn test_write_entry_directly() {
        let mut w = IniWriter::new();
        w.write_section_header("s", None).unwrap();
        w.write_entry(&["a", "b"], &Node::scalar("1")).unwrap();
        w.write_entry(&["c"], &Node::scalar("true").with_tag(Tag::Str))
            .unwrap();
        assert_eq!(w.finish(), "[s]\na.b = 1\nc = \"true\"\n");
    }

    #[test]
    fn test_output_parses_to_same_tree() {
        let source = "# app\nname = demo\nretries = 3\n[db]\nhost = \" db \"\nurl = a=b\nopts.ssl = on\nopts.timeout = 1.5\n[replica:db]\nhost = r1\n";
        let first = tini_tree::parse_str(source).unwrap();
        let text = format_document(&first, &FormatOptions::default()).unwrap();
        let second = tini_tree::parse_str(&text).unwrap();
        assert_eq!(
            format_document(&second, &FormatOptions::default()).unwrap(),
            text
        );
        for (name, body) in first.sections() {
            let other = second.section(name).unwrap();
            assert_eq!(body.len(), other.len(), "section {name}");
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;
        use std::prelude::rust_2024::test;
        use std::collections::BTreeMap;

        proptest! {
            #[test]
            fn prop_string_values_survive(
                values in proptest::collection::btree_map("[a-z_][a-z0-9_-]{0,8}", "\\PC{0,20}", 0..8)
            ) {
                let mut section = Node::section_body();
                for (key, value) in &values {
                    section.insert(Node::scalar(key.as_str()), Node::scalar(value.as_str()).with_tag(Tag::Str));
                }
                let mut doc = Node::document();
                doc.insert(Node::scalar("default"), section);

                let text = format_document(&doc, &FormatOptions::default()).unwrap();
                let back = tini_tree::parse_str(&text).unwrap();
                let mut read = BTreeMap::new();
                if let Some(section) = back.section("default") {
                    for (key, value) in section.pairs() {
                        prop_assert!(matches!(value.resolve(), Ok(tini_tree::Resolved::Str(_))), "{:?}", value);
                        read.insert(key.value.clone(), value.value.clone());
                    }
                }
                prop_assert_eq!(read, values);
            }

            #[test]
            fn prop_untagged_values_keep_their_text(
                values in proptest::collection::btree_map("[a-z][a-z0-9]{0,6}", "[ -~]{0,12}", 1..6),
                style in prop_oneof![Just(QuoteStyle::Double), Just(QuoteStyle::Single)]
            ) {
                let mut section = Node::section_body();
                for (key, value) in &values {
                    section.insert(Node::scalar(key.as_str()), Node::scalar(value.as_str()));
                }
                let mut doc = Node::document();
                doc.insert(Node::scalar("s"), section);

                let options = FormatOptions::default().quote_style(style);
                let text = format_document(&doc, &options).unwrap();
                let back = tini_tree::parse_str(&text).unwrap();
                let section = back.section("s").unwrap();
                for (key, value) in &values {
                    prop_assert_eq!(section.child(key).and_then(|n| n.as_str()), Some(value.as_str()));
                }
            }
        }
    }
}
