//! Core types and events for terminology-viewer

use crate::error::{Error, LoadError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Address of one remote compressed-or-plain CSV file
///
/// Immutable once built. The same URL doubles as the direct download link.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceLocator(Url);

impl ResourceLocator {
    /// Parse a locator from an absolute URL string
    pub fn parse(url: &str) -> Result<Self> {
        Url::parse(url)
            .map(Self)
            .map_err(|e| Error::InvalidLocator(format!("{url}: {e}")))
    }

    /// The underlying URL
    pub fn url(&self) -> &Url {
        &self.0
    }

    /// URL handed to the caller for direct browser download (the locator itself)
    pub fn download_url(&self) -> &str {
        self.0.as_str()
    }

    /// Last path segment, e.g. `gender.csv_0_0_0.csv.gz`
    pub fn file_name(&self) -> &str {
        self.0
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
    }
}

impl From<Url> for ResourceLocator {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Inclusive byte window for a ranged request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    /// First byte offset
    pub start: u64,
    /// Last byte offset (inclusive)
    pub end: u64,
}

impl ByteRange {
    /// Window covering the first `end + 1` bytes of a resource
    pub const fn prefix(end: u64) -> Self {
        Self { start: 0, end }
    }

    /// Value for the `Range` request header
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }

    /// Number of bytes covered by the window
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start) + 1
    }

    /// Whether the window is inverted (end before start)
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl Default for ByteRange {
    fn default() -> Self {
        Self::prefix(150_000)
    }
}

/// Raw response of a single GET request
#[derive(Clone, Debug)]
pub struct FetchResult {
    /// Response body
    pub bytes: Vec<u8>,
    /// Number of body bytes received
    pub total_length: u64,
    /// Whether the server answered `206 Partial Content`
    pub range_honored: bool,
    /// HTTP status code
    pub status: u16,
}

impl FetchResult {
    /// Build a result from a status code and body
    pub fn new(status: u16, bytes: Vec<u8>) -> Self {
        Self {
            total_length: bytes.len() as u64,
            range_honored: status == 206,
            status,
            bytes,
        }
    }

    /// Whether the status is in the success range
    pub fn status_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Text produced by the decoder
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedText {
    /// Decoded character data
    pub text: String,
    /// Whether the gzip path produced the text
    pub used_compression: bool,
    /// Whether the gzip stream ended early and only its prefix was kept
    pub stream_truncated: bool,
}

/// Terminal artifact of the pipeline: the rows to display
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOutcome {
    /// Parsed rows, each an ordered list of raw string fields
    pub rows: Vec<Vec<String>>,
    /// Whether parsing stopped before the end of the input
    pub is_truncated: bool,
    /// Field count of the first row
    pub column_count: usize,
}

impl ParseOutcome {
    /// Placeholder column names (`Column 1`, `Column 2`, ...) for files without a header row
    pub fn placeholder_headers(&self) -> Vec<String> {
        (1..=self.column_count)
            .map(|i| format!("Column {i}"))
            .collect()
    }
}

/// Pipeline stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStage {
    /// Unconditional GET of the whole resource
    FullFetch,
    /// Decoding the full payload
    FullDecode,
    /// Parsing the full payload
    FullParse,
    /// GET restricted to the fallback byte window
    RangedFetch,
    /// Decoding the ranged payload
    RangedDecode,
    /// Parsing the ranged payload
    RangedParse,
}

impl LoadStage {
    /// Whether the stage belongs to the ranged fallback tier
    pub fn is_ranged(&self) -> bool {
        matches!(
            self,
            LoadStage::RangedFetch | LoadStage::RangedDecode | LoadStage::RangedParse
        )
    }
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoadStage::FullFetch => "full fetch",
            LoadStage::FullDecode => "full decode",
            LoadStage::FullParse => "full parse",
            LoadStage::RangedFetch => "ranged fetch",
            LoadStage::RangedDecode => "ranged decode",
            LoadStage::RangedParse => "ranged parse",
        };
        f.write_str(s)
    }
}

/// Final classification of one load
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    /// Every row of the resource was parsed
    Complete,
    /// Rows are a known-incomplete view (row cap or truncated fetch window)
    Partial,
    /// No rows could be produced
    Failed {
        /// Human-readable failure reason
        reason: String,
    },
}

impl Classification {
    /// Whether the load produced rows
    pub fn is_success(&self) -> bool {
        !matches!(self, Classification::Failed { .. })
    }

    /// Short label for logs and events
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Complete => "complete",
            Classification::Partial => "partial",
            Classification::Failed { .. } => "failed",
        }
    }
}

/// Per-load state: the stage reached and the single final classification
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadState {
    /// Last stage entered
    pub stage: LoadStage,
    /// Final classification
    pub classification: Classification,
}

/// Everything a caller needs after one load settles
#[derive(Clone, Debug)]
pub struct LoadReport {
    /// The locator that was loaded
    pub locator: ResourceLocator,
    /// Stage reached and classification
    pub state: LoadState,
    /// Parsed rows, present iff the classification is not `Failed`
    pub outcome: Option<ParseOutcome>,
    /// Whether the accepted payload was gzip-compressed
    pub used_compression: bool,
    /// Size in bytes of the payload that produced the rows (or failed)
    pub payload_bytes: u64,
}

impl LoadReport {
    /// Whether the rows are a known-incomplete view
    pub fn is_partial(&self) -> bool {
        self.state.classification == Classification::Partial
    }

    /// Convert into the rows or the terminal failure
    pub fn into_result(self) -> std::result::Result<ParseOutcome, LoadError> {
        match (self.state.classification, self.outcome) {
            (Classification::Failed { reason }, _) => Err(LoadError {
                stage: self.state.stage,
                reason,
            }),
            (_, Some(outcome)) => Ok(outcome),
            (_, None) => Err(LoadError {
                stage: self.state.stage,
                reason: format!("{} produced no rows", self.state.stage),
            }),
        }
    }
}

/// Monotonic load generation within a viewer session
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event emitted during the load lifecycle
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A load was requested
    LoadStarted {
        /// Load generation
        generation: Generation,
        /// Requested locator
        locator: ResourceLocator,
    },

    /// The full tier failed to produce rows; the ranged tier is being tried
    FallbackStarted {
        /// Load generation
        generation: Generation,
        /// Why the full tier was abandoned
        reason: String,
    },

    /// Rows were published as the currently displayed file
    Loaded {
        /// Load generation
        generation: Generation,
        /// Number of rows
        rows: usize,
        /// Number of columns in the first row
        column_count: usize,
        /// Complete or partial
        classification: Classification,
    },

    /// The load ended in the failed classification
    LoadFailed {
        /// Load generation
        generation: Generation,
        /// Stage that failed
        stage: LoadStage,
        /// Human-readable reason
        error: String,
    },

    /// A newer request superseded this load; its result was discarded
    Superseded {
        /// The discarded generation
        generation: Generation,
        /// The generation that is now current
        current: Generation,
    },
}
