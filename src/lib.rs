//! # terminology-viewer
//!
//! Loading backend for a viewer of versioned, gzip-compressed CSV terminology
//! files hosted on a public object-store bucket.
//!
//! ## Design Philosophy
//!
//! terminology-viewer is designed to be:
//! - **Degrading, not failing** - Oversized or truncated files still yield a bounded, clearly-marked partial row set
//! - **Library-first** - No UI; a shell calls [`ViewerSession`] or [`ResourceLoader`] and renders the rows
//! - **Explicit** - Loads take a locator and return a value, with no ambient state
//! - **Event-driven** - Consumers subscribe to load events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use terminology_viewer::{Classification, Config, ViewerSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = ViewerSession::new(Config::default())?;
//!
//!     session.open("admit_source.csv_0_0_0.csv.gz").await?;
//!
//!     if let Some(file) = session.current().await {
//!         match (&file.report.state.classification, &file.report.outcome) {
//!             (Classification::Failed { reason }, _) => eprintln!("error: {reason}"),
//!             (classification, Some(outcome)) => {
//!                 println!("{} rows ({})", outcome.rows.len(), classification.label());
//!             }
//!             _ => {}
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Known terminology files and versions
pub mod catalog;
/// Configuration types
pub mod config;
/// Gzip-or-plain-text decoding
pub mod decode;
/// Error types
pub mod error;
/// HTTP fetching
pub mod fetch;
/// Fetch-decode-parse pipeline with ranged fallback
pub mod loader;
/// CSV row materialization
pub mod materialize;
/// Displayed-file session with last-request-wins semantics
pub mod session;
/// Core types and events
pub mod types;
/// Row filtering and pagination
pub mod view;

// Re-export commonly used types
pub use catalog::Catalog;
pub use config::{CatalogConfig, Config, FetchConfig, LoaderConfig};
pub use error::{DecodeError, Error, FetchError, LoadError, ParseError, Result};
pub use fetch::{Fetcher, HttpFetcher};
pub use loader::ResourceLoader;
pub use session::{DisplayedFile, LoadTicket, ViewerSession};
pub use types::{
    ByteRange, Classification, DecodedText, Event, FetchResult, Generation, LoadReport, LoadStage,
    LoadState, ParseOutcome, ResourceLocator,
};
pub use view::{Page, RowView};
