//! Diagnostic rendering for errors.

use std::ops::Range;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use tini_parse::{ParseErrorKind, ScanErrorKind};

use crate::{Error, ErrorKind};

impl Error {
    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename, self.label_range(source));
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    /// The span to underline; an empty span covers the character at its start.
    fn label_range(&self, source: &str) -> Range<usize> {
        let Some(span) = self.span else {
            return 0..0;
        };
        let start = span.start.index.min(source.len());
        let end = if span.is_empty() {
            source
                .get(start..)
                .and_then(|rest| rest.chars().next())
                .map_or(start, |c| start + c.len_utf8())
        } else {
            span.end.index.min(source.len())
        };
        start..end
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
        range: Range<usize>,
    ) -> ariadne::ReportBuilder<'static, (&'a str, Range<usize>)> {
        let report = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_config(Config::default().with_index_type(IndexType::Byte))
            .with_message(self.kind.to_string());

        let label = |message: &str| {
            Label::new((filename, range.clone()))
                .with_message(message)
                .with_color(Color::Red)
        };

        match &self.kind {
            ErrorKind::InheritNotFound(_) => report
                .with_label(label("inherited here"))
                .with_help("a section can only inherit from `default` or a section declared above it"),

            ErrorKind::Parse(ParseErrorKind::Scan(ScanErrorKind::MissingLineBreak(_))) => report
                .with_label(label("section header ends here"))
                .with_help("put the first key on the line after the section header"),

            ErrorKind::Parse(ParseErrorKind::Scan(ScanErrorKind::InvalidKeyStart(_))) => report
                .with_label(label("invalid key"))
                .with_help("keys start with a letter, `_` or `-`; section headers start at column 0"),

            ErrorKind::Parse(ParseErrorKind::Scan(ScanErrorKind::MissingValueIndicator(_))) => {
                report
                    .with_label(label("key ends here"))
                    .with_help("put `=` after the key, on the same line")
            }

            ErrorKind::Parse(ParseErrorKind::Scan(ScanErrorKind::UnknownEscape(_))) => report
                .with_label(label("invalid escape"))
                .with_help(
                    "valid escapes are: \\0 \\a \\b \\t \\n \\v \\f \\r \\e \\\" \\' \\\\ \\N \\_ \\L \\P \\xHH \\uHHHH \\UHHHHHHHH",
                ),

            ErrorKind::Parse(ParseErrorKind::Scan(ScanErrorKind::UnterminatedQuoted)) => report
                .with_label(label("quoted scalar starts here"))
                .with_help("close the quote on the same line, or end the line with `\\`"),

            ErrorKind::Parse(kind) => report.with_label(label(kind.context())),

            ErrorKind::UnexpectedEvent(_) | ErrorKind::PastDocumentEnd | ErrorKind::Io(_) => {
                report
            }
        }
    }
}
