//! Contains the common [`ErrorKind`] trait used by all errors to display user-facing error
//! messages.
//!
//! Errors produced by the session parser are anchored to byte ranges of the session file. An
//! [`Error`] pairs those ranges with a boxed [`ErrorKind`], and renders the two into an
//! [`ariadne`] report that highlights the offending line(s).

use ariadne::{Color, Label, Report, ReportKind, Source};
use std::{fmt::Debug, ops::Range};

/// The color to use to highlight the interesting part of a line.
pub const HIGHLIGHT: Color = Color::RGB(235, 186, 52);

/// Represents any kind of error that can occur during some operation.
///
/// Implementors describe the error in three parts; the report itself is assembled once, by
/// [`Error::build_report`]. The `labels` are matched positionally with the spans attached to the
/// [`Error`], so implementors must produce exactly one label per span.
pub trait ErrorKind: Debug + Send {
    /// The headline message of the error.
    fn message(&self) -> String;

    /// One label per highlighted span, in span order. An empty string leaves the span
    /// highlighted, but unlabeled.
    fn labels(&self) -> Vec<String>;

    /// An optional trailing help message.
    fn help(&self) -> Option<String> {
        None
    }
}

/// An error associated with regions of the input that can be highlighted.
#[derive(Debug)]
pub struct Error {
    /// The regions of the input that this error originated from.
    pub spans: Vec<Range<usize>>,

    /// The kind of error that occurred.
    pub kind: Box<dyn ErrorKind>,
}

impl Error {
    /// Creates a new error with the given spans and kind.
    pub fn new(spans: Vec<Range<usize>>, kind: impl ErrorKind + 'static) -> Self {
        Self { spans, kind: Box::new(kind) }
    }

    /// Build a report for this error.
    pub fn build_report<'a>(&self, src_id: &'a str) -> Report<(&'a str, Range<usize>)> {
        let offset = self.spans.first().map(|span| span.start).unwrap_or(0);
        let mut builder = Report::build(ReportKind::Error, src_id, offset)
            .with_message(self.kind.message())
            .with_labels(
                self.spans
                    .iter()
                    .zip(self.kind.labels())
                    .map(|(span, text)| {
                        let mut label = Label::new((src_id, span.clone()))
                            .with_color(HIGHLIGHT);
                        if !text.is_empty() {
                            label = label.with_message(text);
                        }
                        label
                    })
                    .collect::<Vec<_>>(),
            );

        if let Some(help) = self.kind.help() {
            builder.set_help(help);
        }
        builder.finish()
    }

    /// Report this error to stderr, rendering the highlighted regions of `src`.
    ///
    /// The `ariadne` crate's [`Report`] type does not implement [`std::fmt::Display`], so
    /// printing to stderr is the only supported sink.
    pub fn report_to_stderr(&self, src_id: &str, src: &str) {
        self.build_report(src_id)
            .eprint((src_id, Source::from(src)))
            .unwrap();
    }
}
