//! Error kinds raised while parsing a session file.
//!
//! Every kind is fatal: a malformed session indicates a corrupted or hand-edited file, so no
//! best-effort parse is attempted. Each kind carries enough context to point at the offending
//! line of the file; the spans themselves travel on [`frac_error::Error`].

use ariadne::Fmt;
use frac_error::{ErrorKind, HIGHLIGHT};

use crate::header::HEADER_DELIMITER;

/// The session does not begin with the header delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingHeader;

impl ErrorKind for MissingHeader {
    fn message(&self) -> String {
        "the session does not begin with a header".to_string()
    }

    fn labels(&self) -> Vec<String> {
        vec![format!("expected `{HEADER_DELIMITER}` here")]
    }
}

/// The input ended before the header's closing delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnterminatedHeader;

impl ErrorKind for UnterminatedHeader {
    fn message(&self) -> String {
        "the header is never closed".to_string()
    }

    fn labels(&self) -> Vec<String> {
        vec![format!("the input ends before a closing `{HEADER_DELIMITER}`")]
    }
}

/// A header line is not of the form `Key: value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedHeaderLine;

impl ErrorKind for MalformedHeaderLine {
    fn message(&self) -> String {
        "malformed header line".to_string()
    }

    fn labels(&self) -> Vec<String> {
        vec!["this line has no `:` separating a key from its value".to_string()]
    }
}

/// A header line uses a key outside the fixed recognized set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey {
    /// The key as it appeared in the file.
    pub name: String,

    /// Recognized keys with similar spelling, if any.
    pub suggestions: Vec<String>,
}

impl ErrorKind for UnknownKey {
    fn message(&self) -> String {
        format!("`{}` is not a session header key", self.name)
    }

    fn labels(&self) -> Vec<String> {
        vec!["this key".to_string()]
    }

    fn help(&self) -> Option<String> {
        Some(if self.suggestions.is_empty() {
            "the session format defines a fixed set of header keys".to_string()
        } else if self.suggestions.len() == 1 {
            format!("did you mean the `{}` key?", (&*self.suggestions[0]).fg(HIGHLIGHT))
        } else {
            format!(
                "did you mean one of these keys? {}",
                self.suggestions
                    .iter()
                    .map(|s| format!("`{}`", s.fg(HIGHLIGHT)))
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
    }
}

/// A recognized header key appeared more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    /// The repeated key.
    pub name: String,
}

impl ErrorKind for DuplicateKey {
    fn message(&self) -> String {
        format!("the `{}` key appears more than once", self.name)
    }

    fn labels(&self) -> Vec<String> {
        vec!["second occurrence is here".to_string()]
    }
}

/// A recognized header key never appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKey {
    /// The absent key.
    pub name: &'static str,
}

impl ErrorKind for MissingKey {
    fn message(&self) -> String {
        format!("the header is missing the `{}` key", self.name)
    }

    fn labels(&self) -> Vec<String> {
        vec!["the header closes here without it".to_string()]
    }
}

/// A record line did not carry the content the format requires at its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    /// What the line was expected to begin with.
    pub expected: &'static str,
}

impl ErrorKind for MalformedRecord {
    fn message(&self) -> String {
        "malformed expression record".to_string()
    }

    fn labels(&self) -> Vec<String> {
        vec![format!("expected `{}` here", self.expected)]
    }
}

/// The input ended in the middle of an expression record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedRecord {
    /// The field the record never reached.
    pub missing: &'static str,
}

impl ErrorKind for TruncatedRecord {
    fn message(&self) -> String {
        "the input ends inside an expression record".to_string()
    }

    fn labels(&self) -> Vec<String> {
        vec![format!("the record's `{}` field is missing", self.missing)]
    }
}

/// A record's `Num` value is not an integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadSequenceNumber {
    /// The value as it appeared in the file.
    pub value: String,
}

impl ErrorKind for BadSequenceNumber {
    fn message(&self) -> String {
        format!("`{}` is not a valid sequence number", self.value)
    }

    fn labels(&self) -> Vec<String> {
        vec!["expected a non-negative integer".to_string()]
    }
}
