//! Fetch-decompress-parse pipeline with ranged fallback
//!
//! Tiers:
//! 1. Full fetch → full decode → full parse (row cap applied to oversized input)
//! 2. Ranged fetch of a fixed byte window → prefix decode → parse, always partial
//!
//! The ranged tier only runs when the full tier fetched a payload it could not
//! turn into rows. A failed full fetch is terminal unless
//! [`LoaderConfig::fallback_on_fetch_error`] is set. The two tiers never run
//! concurrently.

use crate::config::{Config, LoaderConfig};
use crate::decode::{DecodeMode, decode};
use crate::error::{Error, LoadError, Result};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::materialize::materialize;
use crate::types::{
    Classification, LoadReport, LoadStage, LoadState, ParseOutcome, ResourceLocator,
};
use std::sync::Arc;

/// Rows produced by a tier, before they are wrapped into a report
struct Settled {
    stage: LoadStage,
    outcome: ParseOutcome,
    classification: Classification,
    used_compression: bool,
    payload_bytes: u64,
}

/// A tier that stopped at `stage` with `error`
struct Abandoned {
    stage: LoadStage,
    error: Error,
    payload_bytes: u64,
}

impl Abandoned {
    fn new(stage: LoadStage, error: impl Into<Error>, payload_bytes: u64) -> Self {
        Self {
            stage,
            error: error.into(),
            payload_bytes,
        }
    }
}

/// The resource loader: owns a [`Fetcher`] and the size policy
///
/// Each call to [`load`](ResourceLoader::load) is independent and owns its own
/// state; the loader itself holds nothing mutable.
#[derive(Clone)]
pub struct ResourceLoader {
    fetcher: Arc<dyn Fetcher>,
    config: LoaderConfig,
}

impl ResourceLoader {
    /// Create a loader backed by [`HttpFetcher`]
    pub fn new(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Ok(Self::with_fetcher(Arc::new(fetcher), config.loader.clone()))
    }

    /// Create a loader with a custom fetcher
    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, config: LoaderConfig) -> Self {
        Self { fetcher, config }
    }

    /// Size policy in use
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load `locator` into a bounded row set
    ///
    /// Never fails outward: every failure ends in [`Classification::Failed`]
    /// with a human-readable reason.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use terminology_viewer::{Config, ResourceLoader, ResourceLocator};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let loader = ResourceLoader::new(&Config::default())?;
    /// let locator = ResourceLocator::parse(
    ///     "https://tuva-public-resources.s3.amazonaws.com/versioned_terminology/0.14.12/gender.csv_0_0_0.csv.gz",
    /// )?;
    ///
    /// let report = loader.load(&locator).await;
    /// println!("{}: {:?}", report.state.classification.label(), report.outcome.map(|o| o.rows.len()));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load(&self, locator: &ResourceLocator) -> LoadReport {
        self.load_observed(locator, |_| {}).await
    }

    /// Like [`load`](ResourceLoader::load), calling `on_fallback` with the
    /// reason when the ranged tier is entered
    pub(crate) async fn load_observed<F>(&self, locator: &ResourceLocator, on_fallback: F) -> LoadReport
    where
        F: FnOnce(&str) + Send,
    {
        tracing::info!(url = %locator, "loading terminology file");

        let abandoned = match self.full_tier(locator).await {
            Ok(settled) => return self.settle(locator, settled),
            Err(abandoned) => abandoned,
        };

        let fetch_failed = abandoned.stage == LoadStage::FullFetch;
        if fetch_failed && !self.config.fallback_on_fetch_error {
            return self.fail(locator, abandoned);
        }

        let reason = LoadError::new(abandoned.stage, &abandoned.error).reason;
        tracing::warn!(
            url = %locator,
            stage = %abandoned.stage,
            error = %abandoned.error,
            range = %self.config.range_window.header_value(),
            "full load failed, falling back to ranged fetch"
        );
        on_fallback(&reason);

        match self.ranged_tier(locator).await {
            Ok(settled) => self.settle(locator, settled),
            Err(abandoned) => self.fail(locator, abandoned),
        }
    }

    async fn full_tier(&self, locator: &ResourceLocator) -> std::result::Result<Settled, Abandoned> {
        let fetched = self
            .fetcher
            .fetch(locator, None)
            .await
            .map_err(|e| Abandoned::new(LoadStage::FullFetch, e, 0))?;
        let payload_bytes = fetched.total_length;

        let decoded = decode(&fetched.bytes, DecodeMode::Complete)
            .map_err(|e| Abandoned::new(LoadStage::FullDecode, e, payload_bytes))?;

        let oversized_payload = payload_bytes > self.config.payload_threshold_bytes;
        let long_text = decoded.text.chars().count() > self.config.text_threshold_chars;
        let cap = (oversized_payload || long_text).then_some(self.config.row_cap);
        if let Some(cap) = cap {
            tracing::debug!(url = %locator, payload_bytes, cap, "applying row cap");
        }

        let outcome = materialize(&decoded.text, cap)
            .map_err(|e| Abandoned::new(LoadStage::FullParse, e, payload_bytes))?;

        // Truncation without a cap means the tokenizer stopped early, which is partial too.
        let plain_text_oversized = !decoded.used_compression && oversized_payload;
        let classification = if outcome.is_truncated || plain_text_oversized {
            Classification::Partial
        } else {
            Classification::Complete
        };

        Ok(Settled {
            stage: LoadStage::FullParse,
            outcome,
            classification,
            used_compression: decoded.used_compression,
            payload_bytes,
        })
    }

    async fn ranged_tier(&self, locator: &ResourceLocator) -> std::result::Result<Settled, Abandoned> {
        let fetched = self
            .fetcher
            .fetch(locator, Some(self.config.range_window))
            .await
            .map_err(|e| Abandoned::new(LoadStage::RangedFetch, e, 0))?;
        let payload_bytes = fetched.total_length;

        let decoded = decode(&fetched.bytes, DecodeMode::Prefix)
            .map_err(|e| Abandoned::new(LoadStage::RangedDecode, e, payload_bytes))?;

        // The window already bounds the input, so no cap.
        let outcome = materialize(&decoded.text, None)
            .map_err(|e| Abandoned::new(LoadStage::RangedParse, e, payload_bytes))?;

        Ok(Settled {
            stage: LoadStage::RangedParse,
            outcome,
            classification: Classification::Partial,
            used_compression: decoded.used_compression,
            payload_bytes,
        })
    }

    fn settle(&self, locator: &ResourceLocator, settled: Settled) -> LoadReport {
        let Settled {
            stage,
            outcome,
            classification,
            used_compression,
            payload_bytes,
        } = settled;

        if classification == Classification::Partial {
            tracing::warn!(
                url = %locator,
                stage = %stage,
                rows = outcome.rows.len(),
                "showing partial data"
            );
        }
        tracing::info!(
            url = %locator,
            rows = outcome.rows.len(),
            columns = outcome.column_count,
            classification = classification.label(),
            used_compression,
            "terminology file loaded"
        );

        LoadReport {
            locator: locator.clone(),
            state: LoadState {
                stage,
                classification,
            },
            outcome: Some(outcome),
            used_compression,
            payload_bytes,
        }
    }

    fn fail(&self, locator: &ResourceLocator, abandoned: Abandoned) -> LoadReport {
        let failure = LoadError::new(abandoned.stage, &abandoned.error);
        tracing::error!(
            url = %locator,
            stage = %abandoned.stage,
            error = %abandoned.error,
            "terminology file load failed"
        );

        LoadReport {
            locator: locator.clone(),
            state: LoadState {
                stage: failure.stage,
                classification: Classification::Failed {
                    reason: failure.reason,
                },
            },
            outcome: None,
            used_compression: false,
            payload_bytes: abandoned.payload_bytes,
        }
    }
}

impl std::fmt::Debug for ResourceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
