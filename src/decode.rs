//! Gzip-or-plain-text decoding of fetched payloads
//!
//! Compression is the common case for the terminology bucket, and a truncated
//! gzip stream cannot be told apart from "not gzip at all" without trying to
//! inflate it, so inflation is always attempted first.

use crate::error::DecodeError;
use crate::types::DecodedText;
use flate2::read::MultiGzDecoder;
use std::io::Read;

/// How much of the original resource the payload is expected to hold
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeMode {
    /// Payload is the whole resource; a truncated gzip stream is unusable
    Complete,
    /// Payload is an arbitrary prefix; a truncated gzip stream yields what it inflated
    Prefix,
}

/// Decode `bytes` as gzip-compressed text, falling back to plain UTF-8 CSV text
///
/// Empty or whitespace-only text is a failure on either path, never an empty result.
pub fn decode(bytes: &[u8], mode: DecodeMode) -> Result<DecodedText, DecodeError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::Empty);
    }

    let inflate_failure = match inflate(bytes, mode) {
        Ok(decoded) => {
            tracing::debug!(
                bytes = bytes.len(),
                chars = decoded.text.len(),
                stream_truncated = decoded.stream_truncated,
                "decoded gzip payload"
            );
            return Ok(decoded);
        }
        Err(reason) => reason,
    };

    tracing::debug!(reason = %inflate_failure, "gzip inflate failed, trying plain text");

    match plain_text(bytes, mode) {
        Ok(text) => Ok(DecodedText {
            text,
            used_compression: false,
            stream_truncated: false,
        }),
        Err(plain_text) => Err(DecodeError::Unreadable {
            inflate: inflate_failure,
            plain_text,
        }),
    }
}

fn inflate(bytes: &[u8], mode: DecodeMode) -> Result<DecodedText, String> {
    let mut inflated = Vec::new();
    let stream_truncated = match MultiGzDecoder::new(bytes).read_to_end(&mut inflated) {
        Ok(_) => false,
        Err(e) if mode == DecodeMode::Prefix && !inflated.is_empty() => {
            tracing::debug!(error = %e, kept = inflated.len(), "keeping inflated prefix of truncated stream");
            true
        }
        Err(e) => return Err(e.to_string()),
    };

    // Inflated bytes come from a text file; invalid sequences are replaced rather than rejected.
    let mut text = String::from_utf8_lossy(&inflated).into_owned();
    if stream_truncated {
        drop_incomplete_line(&mut text);
    }
    if text.trim().is_empty() {
        return Err("inflated text is empty".to_string());
    }

    Ok(DecodedText {
        text,
        used_compression: true,
        stream_truncated,
    })
}

fn plain_text(bytes: &[u8], mode: DecodeMode) -> Result<String, String> {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text,
        // A multi-byte sequence cut by the end of the byte window
        Err(e) if mode == DecodeMode::Prefix && e.error_len().is_none() => {
            std::str::from_utf8(&bytes[..e.valid_up_to()]).map_err(|e| e.to_string())?
        }
        Err(e) => return Err(format!("invalid UTF-8: {e}")),
    };

    if text.trim().is_empty() {
        return Err("text is empty".to_string());
    }
    if !text.contains(',') && !text.contains('\n') {
        return Err("no comma or newline found".to_string());
    }
    Ok(text.to_string())
}

/// Cut everything after the last newline, keeping only whole lines
fn drop_incomplete_line(text: &mut String) {
    if let Some(pos) = text.rfind('\n') {
        text.truncate(pos + 1);
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn sample_csv(rows: usize) -> String {
        (0..rows)
            .map(|i| format!("{i},code {i},\"description, number {i}\"\n"))
            .collect()
    }

    #[test]
    fn gzip_payload_uses_compression_path() {
        let csv = sample_csv(30);
        let decoded = decode(&gzip(csv.as_bytes()), DecodeMode::Complete).unwrap();
        assert!(decoded.used_compression);
        assert!(!decoded.stream_truncated);
        assert_eq!(decoded.text, csv);
    }

    #[test]
    fn concatenated_gzip_members_are_all_inflated() {
        let mut payload = gzip(b"a,b\n");
        payload.extend(gzip(b"c,d\n"));
        let decoded = decode(&payload, DecodeMode::Complete).unwrap();
        assert_eq!(decoded.text, "a,b\nc,d\n");
    }

    #[test]
    fn plain_csv_falls_back_to_text_path() {
        let decoded = decode(b"code,display\n1,Male\n", DecodeMode::Complete).unwrap();
        assert!(!decoded.used_compression);
        assert_eq!(decoded.text, "code,display\n1,Male\n");
    }

    #[test]
    fn single_line_with_comma_is_accepted_as_text() {
        let decoded = decode(b"a,b", DecodeMode::Complete).unwrap();
        assert_eq!(decoded.text, "a,b");
    }

    #[test]
    fn text_without_comma_or_newline_is_rejected() {
        let err = decode(b"just some words", DecodeMode::Complete).unwrap_err();
        match err {
            DecodeError::Unreadable { plain_text, .. } => {
                assert!(plain_text.contains("no comma or newline"))
            }
            other => panic!("expected Unreadable, got {other:?}"),
        }
    }

    #[test]
    fn whitespace_only_payload_is_empty_error() {
        assert!(matches!(decode(b"", DecodeMode::Complete), Err(DecodeError::Empty)));
        assert!(matches!(
            decode(b" \n\t ", DecodeMode::Prefix),
            Err(DecodeError::Empty)
        ));
    }

    #[test]
    fn gzip_of_whitespace_is_rejected() {
        let err = decode(&gzip(b"   \n\n"), DecodeMode::Complete).unwrap_err();
        assert!(matches!(err, DecodeError::Unreadable { .. }));
    }

    #[test]
    fn truncated_gzip_fails_in_complete_mode() {
        let compressed = gzip(sample_csv(2_000).as_bytes());
        let truncated = &compressed[..compressed.len() / 2];
        let err = decode(truncated, DecodeMode::Complete).unwrap_err();
        assert!(matches!(err, DecodeError::Unreadable { .. }));
    }

    #[test]
    fn truncated_gzip_yields_whole_lines_in_prefix_mode() {
        let csv = sample_csv(2_000);
        let compressed = gzip(csv.as_bytes());
        let truncated = &compressed[..compressed.len() / 2];

        let decoded = decode(truncated, DecodeMode::Prefix).unwrap();
        assert!(decoded.used_compression);
        assert!(decoded.stream_truncated);
        assert!(decoded.text.ends_with('\n'));
        assert!(csv.starts_with(&decoded.text));
        assert!(decoded.text.len() < csv.len());
    }

    #[test]
    fn complete_gzip_in_prefix_mode_is_not_marked_truncated() {
        let csv = sample_csv(5);
        let decoded = decode(&gzip(csv.as_bytes()), DecodeMode::Prefix).unwrap();
        assert!(!decoded.stream_truncated);
        assert_eq!(decoded.text, csv);
    }

    #[test]
    fn prefix_mode_trims_split_multibyte_character() {
        let text = "code,name\n1,Zoë\n";
        let bytes = text.as_bytes();
        // Cut inside the two-byte 'ë'
        let cut = text.find('ë').unwrap() + 1;
        let decoded = decode(&bytes[..cut], DecodeMode::Prefix).unwrap();
        assert_eq!(decoded.text, "code,name\n1,Zo");

        assert!(decode(&bytes[..cut], DecodeMode::Complete).is_err());
    }

    #[test]
    fn binary_garbage_is_unreadable() {
        let garbage = [0x1f, 0x8b, 0xff, 0x00, 0x2c, 0x0a, 0x9c];
        let err = decode(&garbage, DecodeMode::Prefix).unwrap_err();
        match err {
            DecodeError::Unreadable { plain_text, .. } => {
                assert!(plain_text.contains("invalid UTF-8"))
            }
            other => panic!("expected Unreadable, got {other:?}"),
        }
    }

    #[test]
    fn drop_incomplete_line_keeps_text_without_newline() {
        let mut s = "no newline here".to_string();
        drop_incomplete_line(&mut s);
        assert_eq!(s, "no newline here");

        let mut s = "a,b\nc,".to_string();
        drop_incomplete_line(&mut s);
        assert_eq!(s, "a,b\n");
    }
}
