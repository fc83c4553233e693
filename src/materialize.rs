//! CSV row materialization
//!
//! Turns decoded text into rows of raw string fields. No header row is
//! consumed: terminology files are published without one, so the first row is
//! data. Rows are not checked against the first row's field count.

use crate::error::ParseError;
use crate::types::ParseOutcome;

/// Parse `text` into rows, stopping after `cap` rows when a cap is given
///
/// `is_truncated` is set as soon as the cap is reached, whether or not input
/// remains, and when the tokenizer stops early on an error. Blank lines are
/// skipped and never produce rows.
///
/// # Examples
///
/// ```
/// use terminology_viewer::materialize::materialize;
///
/// let outcome = materialize("1,\"Male, adult\"\n\n2,Female\n", None).unwrap();
/// assert_eq!(outcome.rows.len(), 2);
/// assert_eq!(outcome.rows[0], vec!["1", "Male, adult"]);
/// assert_eq!(outcome.column_count, 2);
/// assert!(!outcome.is_truncated);
/// ```
pub fn materialize(text: &str, cap: Option<usize>) -> Result<ParseOutcome, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut is_truncated = false;

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, rows = rows.len(), "CSV tokenizer stopped early");
                is_truncated = true;
                break;
            }
        };

        if is_blank(&record) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());

        if cap.is_some_and(|cap| rows.len() >= cap) {
            is_truncated = true;
            break;
        }
    }

    let column_count = match rows.first() {
        None => return Err(ParseError::NoRows),
        Some(first) if first.is_empty() => return Err(ParseError::NoFields),
        Some(first) => first.len(),
    };

    if is_truncated {
        tracing::debug!(rows = rows.len(), ?cap, "row set truncated");
    }

    Ok(ParseOutcome {
        rows,
        is_truncated,
        column_count,
    })
}

/// A line with no content: no fields, or a single whitespace-only field
fn is_blank(record: &csv::StringRecord) -> bool {
    match record.len() {
        0 => true,
        1 => record.get(0).is_none_or(|f| f.trim().is_empty()),
        _ => false,
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(rows: usize) -> String {
        (0..rows).map(|i| format!("{i},value {i}\n")).collect()
    }

    #[test]
    fn parses_every_row_without_cap() {
        let outcome = materialize(&numbered(30), None).unwrap();
        assert_eq!(outcome.rows.len(), 30);
        assert_eq!(outcome.column_count, 2);
        assert!(!outcome.is_truncated);
        assert_eq!(outcome.rows[29], vec!["29", "value 29"]);
    }

    #[test]
    fn first_row_is_data_not_header() {
        let outcome = materialize("code,display\nA,Alpha\n", None).unwrap();
        assert_eq!(outcome.rows[0], vec!["code", "display"]);
        assert_eq!(outcome.rows.len(), 2);
    }

    #[test]
    fn quoted_fields_keep_commas_newlines_and_escaped_quotes() {
        let text = "1,\"a, b\",\"line one\nline two\",\"say \"\"hi\"\"\"\n";
        let outcome = materialize(text, None).unwrap();
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(
            outcome.rows[0],
            vec!["1", "a, b", "line one\nline two", "say \"hi\""]
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        let outcome = materialize("a,b\n\n\r\n   \nc,d\n\n", None).unwrap();
        assert_eq!(outcome.rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn crlf_line_endings_are_handled() {
        let outcome = materialize("a,b\r\nc,d\r\n", None).unwrap();
        assert_eq!(outcome.rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn cap_stops_parsing_and_marks_truncated() {
        let outcome = materialize(&numbered(100), Some(10)).unwrap();
        assert_eq!(outcome.rows.len(), 10);
        assert!(outcome.is_truncated);
        assert_eq!(outcome.rows[9][0], "9");
    }

    #[test]
    fn cap_not_reached_is_not_truncated() {
        let outcome = materialize(&numbered(5), Some(10)).unwrap();
        assert_eq!(outcome.rows.len(), 5);
        assert!(!outcome.is_truncated);
    }

    #[test]
    fn ragged_rows_pass_through() {
        let outcome = materialize("a,b,c\nd\ne,f,g,h\n", None).unwrap();
        assert_eq!(outcome.column_count, 3);
        assert_eq!(outcome.rows[1], vec!["d"]);
        assert_eq!(outcome.rows[2].len(), 4);
    }

    #[test]
    fn fields_are_not_trimmed_or_typed() {
        let outcome = materialize(" 001 ,1.50,TRUE\n", None).unwrap();
        assert_eq!(outcome.rows[0], vec![" 001 ", "1.50", "TRUE"]);
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(matches!(materialize("", None), Err(ParseError::EmptyInput)));
        assert!(matches!(
            materialize(" \n\t\n", Some(5)),
            Err(ParseError::EmptyInput)
        ));
    }

    #[test]
    fn cap_equal_to_row_count_still_marks_truncated() {
        let outcome = materialize(&numbered(10), Some(10)).unwrap();
        assert_eq!(outcome.rows.len(), 10);
        assert!(outcome.is_truncated);
    }

    #[test]
    fn only_blank_fields_yield_no_rows() {
        assert!(matches!(
            materialize("\"\"\n\"   \"\n", None),
            Err(ParseError::NoRows)
        ));
    }

    #[test]
    fn single_row_without_trailing_newline() {
        let outcome = materialize("only,row", None).unwrap();
        assert_eq!(outcome.rows, vec![vec!["only", "row"]]);
        assert_eq!(outcome.column_count, 2);
    }
}
