//! Strict reading of a persisted session.
//!
//! The reader is order-preserving and fails fast: the first malformed line aborts the parse with
//! a [`frac_error::Error`] whose span points at that line. An empty record list after a valid
//! header means "no prior expressions, generate fresh"; a non-empty list means "replay these
//! exact records instead of generating".

use crate::error::{
    BadSequenceNumber,
    DuplicateKey,
    MalformedHeaderLine,
    MalformedRecord,
    MissingHeader,
    MissingKey,
    TruncatedRecord,
    UnknownKey,
    UnterminatedHeader,
};
use crate::header::{keys, SessionHeader, HEADER_DELIMITER, KEYS, RECORD_DELIMITER};
use crate::record::SessionRecord;
use frac_error::Error;
use levenshtein::levenshtein;
use std::ops::Range;

/// The prefix that opens a record's expression field.
const EXPR_PREFIX: &str = "Expr: ";

/// The prefix that terminates the expression field and opens the derivative field. Expression
/// text may span lines precisely because this prefix is what ends it.
const DIFF_PREFIX: &str = "Diff expr: ";

/// One line of the source, remembering where it came from.
#[derive(Clone, Copy)]
struct Line<'a> {
    offset: usize,
    text: &'a str,
}

fn span(line: &Line<'_>) -> Range<usize> {
    line.offset..line.offset + line.text.len()
}

/// Levenshtein-ranked recognized keys with spelling close to `key`.
fn suggestions_for(key: &str) -> Vec<String> {
    let mut ranked: Vec<(usize, &str)> = KEYS
        .iter()
        .map(|known| (levenshtein(known, key), *known))
        .filter(|(distance, _)| *distance <= 3)
        .collect();
    ranked.sort();
    ranked.into_iter().map(|(_, known)| known.to_string()).collect()
}

/// Header fields collected so far, each at most once.
#[derive(Default)]
struct PartialHeader {
    method: Option<String>,
    method_params: Option<String>,
    epsilon: Option<String>,
    norm: Option<String>,
    scale: Option<String>,
    iterations: Option<String>,
    center_x: Option<String>,
    center_y: Option<String>,
    image_width: Option<String>,
    image_height: Option<String>,
}

impl PartialHeader {
    /// The slot a recognized key stores into, or [`None`] for an unrecognized key.
    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        Some(match key {
            keys::METHOD => &mut self.method,
            keys::METHOD_PARAMS => &mut self.method_params,
            keys::EPSILON => &mut self.epsilon,
            keys::NORM => &mut self.norm,
            keys::SCALE => &mut self.scale,
            keys::ITERATIONS => &mut self.iterations,
            keys::CENTER_X => &mut self.center_x,
            keys::CENTER_Y => &mut self.center_y,
            keys::IMAGE_WIDTH => &mut self.image_width,
            keys::IMAGE_HEIGHT => &mut self.image_height,
            _ => return None,
        })
    }

    /// Finalizes into a [`SessionHeader`], or names the first key that never appeared.
    fn finish(self) -> Result<SessionHeader, &'static str> {
        Ok(SessionHeader {
            method: self.method.ok_or(keys::METHOD)?,
            method_params: self.method_params.ok_or(keys::METHOD_PARAMS)?,
            epsilon: self.epsilon.ok_or(keys::EPSILON)?,
            norm: self.norm.ok_or(keys::NORM)?,
            scale: self.scale.ok_or(keys::SCALE)?,
            iterations: self.iterations.ok_or(keys::ITERATIONS)?,
            center_x: self.center_x.ok_or(keys::CENTER_X)?,
            center_y: self.center_y.ok_or(keys::CENTER_Y)?,
            image_width: self.image_width.ok_or(keys::IMAGE_WIDTH)?,
            image_height: self.image_height.ok_or(keys::IMAGE_HEIGHT)?,
        })
    }
}

/// A cursor over the lines of a session file.
///
/// Call [`read_header`](Self::read_header) first, then [`read_records`](Self::read_records);
/// the cursor advances through the input in order.
pub struct SessionReader<'a> {
    lines: Vec<Line<'a>>,
    cursor: usize,
    eof: usize,
}

impl<'a> SessionReader<'a> {
    /// Creates a reader over the full text of a session file.
    pub fn new(src: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut offset = 0;
        for raw in src.split_inclusive('\n') {
            let text = raw.strip_suffix('\n').unwrap_or(raw);
            let text = text.strip_suffix('\r').unwrap_or(text);
            lines.push(Line { offset, text });
            offset += raw.len();
        }
        Self { lines, cursor: 0, eof: src.len() }
    }

    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.cursor).copied()
    }

    fn bump(&mut self) -> Option<Line<'a>> {
        let line = self.peek()?;
        self.cursor += 1;
        Some(line)
    }

    fn eof_span(&self) -> Range<usize> {
        self.eof..self.eof
    }

    /// Reads the delimited header block.
    pub fn read_header(&mut self) -> Result<SessionHeader, Error> {
        let open = self
            .bump()
            .ok_or_else(|| Error::new(vec![self.eof_span()], MissingHeader))?;
        if open.text.trim_end() != HEADER_DELIMITER {
            return Err(Error::new(vec![span(&open)], MissingHeader));
        }

        let mut partial = PartialHeader::default();
        let close = loop {
            let line = self
                .bump()
                .ok_or_else(|| Error::new(vec![self.eof_span()], UnterminatedHeader))?;
            if line.text.trim_end() == HEADER_DELIMITER {
                break line;
            }

            let Some((key, value)) = line.text.split_once(':') else {
                return Err(Error::new(vec![span(&line)], MalformedHeaderLine));
            };
            let key = key.trim();
            let Some(slot) = partial.slot(key) else {
                return Err(Error::new(
                    vec![span(&line)],
                    UnknownKey { name: key.to_string(), suggestions: suggestions_for(key) },
                ));
            };
            if slot.replace(value.trim().to_string()).is_some() {
                return Err(Error::new(
                    vec![span(&line)],
                    DuplicateKey { name: key.to_string() },
                ));
            }
        };

        partial
            .finish()
            .map_err(|name| Error::new(vec![span(&close)], MissingKey { name }))
    }

    /// Reads every expression record, in file order, until the end of input.
    pub fn read_records(&mut self) -> Result<Vec<SessionRecord>, Error> {
        let mut records = Vec::new();
        while let Some(open) = self.bump() {
            if open.text.trim_end() != RECORD_DELIMITER {
                return Err(Error::new(
                    vec![span(&open)],
                    MalformedRecord { expected: RECORD_DELIMITER },
                ));
            }

            let num_line = self
                .bump()
                .ok_or_else(|| Error::new(vec![self.eof_span()], TruncatedRecord { missing: "Num" }))?;
            let num = parse_num(&num_line)?;

            // The expression field runs until the derivative prefix appears.
            let mut expr_lines: Vec<Line<'a>> = Vec::new();
            let diff_first = loop {
                let line = self.bump().ok_or_else(|| {
                    Error::new(vec![self.eof_span()], TruncatedRecord { missing: "Diff expr" })
                })?;
                if line.text.starts_with(DIFF_PREFIX) {
                    break line;
                }
                expr_lines.push(line);
            };

            let expr = match expr_lines.first() {
                Some(first) => match first.text.strip_prefix(EXPR_PREFIX) {
                    Some(head) => {
                        let mut parts = vec![head];
                        parts.extend(expr_lines[1..].iter().map(|line| line.text));
                        parts.join("\n")
                    },
                    None => {
                        return Err(Error::new(
                            vec![span(first)],
                            MalformedRecord { expected: EXPR_PREFIX },
                        ));
                    },
                },
                None => {
                    return Err(Error::new(
                        vec![span(&diff_first)],
                        MalformedRecord { expected: EXPR_PREFIX },
                    ));
                },
            };

            // The derivative field runs until the next record delimiter or end of input.
            let mut diff_lines = vec![&diff_first.text[DIFF_PREFIX.len()..]];
            while let Some(line) = self.peek() {
                if line.text.trim_end() == RECORD_DELIMITER {
                    break;
                }
                diff_lines.push(line.text);
                self.cursor += 1;
            }
            let diff_expr = diff_lines.join("\n");

            records.push(SessionRecord { num, expr, diff_expr });
        }
        Ok(records)
    }
}

fn parse_num(line: &Line<'_>) -> Result<u64, Error> {
    let Some((key, value)) = line.text.split_once(':') else {
        return Err(Error::new(vec![span(line)], MalformedRecord { expected: "Num" }));
    };
    if key.trim() != "Num" {
        return Err(Error::new(vec![span(line)], MalformedRecord { expected: "Num" }));
    }
    value
        .trim()
        .parse()
        .map_err(|_| Error::new(vec![span(line)], BadSequenceNumber { value: value.trim().to_string() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GOOD_HEADER: &str = "\
--- HEADER ---
Method: Newton
Method parameters:
Epsilon: 0.05
Norm: norm2
Scale: 20.0
Iterations: 100
X of center: 0
Y of center: 0
Length of image: 1000
Height of image: 1000
--- HEADER ---
";

    fn kind_message(src: &str) -> String {
        let mut reader = SessionReader::new(src);
        let err = reader
            .read_header()
            .and_then(|_| reader.read_records())
            .unwrap_err();
        err.kind.message()
    }

    #[test]
    fn reads_a_full_header() {
        let header = SessionReader::new(GOOD_HEADER).read_header().unwrap();
        assert_eq!(header, SessionHeader::default());
    }

    #[test]
    fn header_field_order_is_not_significant() {
        let shuffled = "\
--- HEADER ---
Height of image: 1000
Method parameters:
Epsilon: 0.05
Method: Newton
Norm: norm2
Iterations: 100
Scale: 20.0
Y of center: 0
X of center: 0
Length of image: 1000
--- HEADER ---
";
        let header = SessionReader::new(shuffled).read_header().unwrap();
        assert_eq!(header, SessionHeader::default());
    }

    #[test]
    fn empty_session_has_no_records() {
        let mut reader = SessionReader::new(GOOD_HEADER);
        reader.read_header().unwrap();
        assert_eq!(reader.read_records().unwrap(), vec![]);
    }

    #[test]
    fn reads_records_in_order() {
        let src = format!(
            "{GOOD_HEADER}--- EXPR ---\nNum: 0\nExpr: (Pt + Pt)\nDiff expr: (1.0 + 1.0)\n\
             --- EXPR ---\nNum: 1\nExpr: sin(Pt)\nDiff expr: (cos(Pt) * 1.0)\n",
        );
        let mut reader = SessionReader::new(&src);
        reader.read_header().unwrap();
        let records = reader.read_records().unwrap();
        assert_eq!(records, vec![
            SessionRecord {
                num: 0,
                expr: "(Pt + Pt)".to_string(),
                diff_expr: "(1.0 + 1.0)".to_string(),
            },
            SessionRecord {
                num: 1,
                expr: "sin(Pt)".to_string(),
                diff_expr: "(cos(Pt) * 1.0)".to_string(),
            },
        ]);
    }

    #[test]
    fn expression_text_may_span_lines() {
        let src = format!(
            "{GOOD_HEADER}--- EXPR ---\nNum: 7\nExpr: (Pt +\nPt)\nDiff expr: (1.0 +\n1.0)\n",
        );
        let mut reader = SessionReader::new(&src);
        reader.read_header().unwrap();
        let records = reader.read_records().unwrap();
        assert_eq!(records[0].expr, "(Pt +\nPt)");
        assert_eq!(records[0].diff_expr, "(1.0 +\n1.0)");
    }

    #[test]
    fn missing_opening_delimiter() {
        assert_eq!(
            kind_message("Method: Newton\n"),
            "the session does not begin with a header",
        );
    }

    #[test]
    fn unterminated_header() {
        assert_eq!(
            kind_message("--- HEADER ---\nMethod: Newton\n"),
            "the header is never closed",
        );
    }

    #[test]
    fn unknown_key_is_rejected_with_suggestion() {
        let src = "--- HEADER ---\nEpsilonn: 0.05\n--- HEADER ---\n";
        let mut reader = SessionReader::new(src);
        let err = reader.read_header().unwrap_err();
        assert_eq!(err.kind.message(), "`Epsilonn` is not a session header key");
        assert!(err.kind.help().unwrap().contains("Epsilon"));
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let src = "--- HEADER ---\nMethod: Newton\nMethod: Chord\n--- HEADER ---\n";
        assert_eq!(
            kind_message(src),
            "the `Method` key appears more than once",
        );
    }

    #[test]
    fn missing_key_is_rejected() {
        let src = "--- HEADER ---\nMethod: Newton\n--- HEADER ---\n";
        assert_eq!(
            kind_message(src),
            "the header is missing the `Method parameters` key",
        );
    }

    #[test]
    fn record_missing_diff_expr_is_rejected() {
        let src = format!("{GOOD_HEADER}--- EXPR ---\nNum: 0\nExpr: (Pt + Pt)\n");
        assert_eq!(
            kind_message(&src),
            "the input ends inside an expression record",
        );
    }

    #[test]
    fn record_with_bad_expr_prefix_is_rejected() {
        let src = format!(
            "{GOOD_HEADER}--- EXPR ---\nNum: 0\nExpression: x\nDiff expr: 1.0\n",
        );
        assert_eq!(kind_message(&src), "malformed expression record");
    }

    #[test]
    fn record_with_bad_sequence_number_is_rejected() {
        let src = format!(
            "{GOOD_HEADER}--- EXPR ---\nNum: twelve\nExpr: Pt\nDiff expr: 1.0\n",
        );
        assert_eq!(
            kind_message(&src),
            "`twelve` is not a valid sequence number",
        );
    }

    #[test]
    fn trailing_lines_join_the_derivative_field() {
        let src = format!(
            "{GOOD_HEADER}--- EXPR ---\nNum: 0\nExpr: Pt\nDiff expr: 1.0\nstray\n",
        );
        let with_follow_up = format!(
            "{src}--- EXPR ---\nNum: 1\nExpr: Pt\nDiff expr: 1.0\n",
        );
        let mut reader = SessionReader::new(&with_follow_up);
        reader.read_header().unwrap();
        let records = reader.read_records().unwrap();
        assert_eq!(records[0].diff_expr, "1.0\nstray");
        assert_eq!(records.len(), 2);
    }
}
