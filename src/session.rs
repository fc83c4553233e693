//! Viewer session: the currently displayed file of one display surface
//!
//! A session serializes nothing: loads may overlap freely. Each load claims a
//! generation number up front and publishes its result only if no newer load
//! was requested in the meantime, so the last requested locator always wins.

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::loader::ResourceLoader;
use crate::types::{Classification, Event, Generation, LoadReport, LoadState, ResourceLocator};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{RwLock, broadcast};

/// Buffered events per subscriber before the oldest are dropped
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A published load result
#[derive(Clone, Debug)]
pub struct DisplayedFile {
    /// Generation that produced this result
    pub generation: Generation,
    /// The load result
    pub report: LoadReport,
}

/// What happened to the result of one [`ViewerSession::load`] call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadTicket {
    /// The result became the displayed file
    Published {
        /// Generation of this load
        generation: Generation,
        /// Stage reached and classification
        state: LoadState,
    },
    /// A newer load was requested before this one settled; the result was discarded
    Superseded {
        /// Generation of this load
        generation: Generation,
        /// Generation that was current when this load settled
        current: Generation,
    },
}

impl LoadTicket {
    /// Whether the result was published
    pub fn is_published(&self) -> bool {
        matches!(self, LoadTicket::Published { .. })
    }
}

#[derive(Debug)]
struct Selection {
    version: String,
    file: Option<String>,
}

/// Per-display-surface owner of the displayed file
///
/// Share it behind an `Arc` when loads are started from several tasks.
///
/// # Example
///
/// ```no_run
/// use terminology_viewer::{Config, ViewerSession};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let session = ViewerSession::new(Config::default())?;
///
/// let mut events = session.subscribe();
/// tokio::spawn(async move {
///     while let Ok(event) = events.recv().await {
///         println!("event: {:?}", event);
///     }
/// });
///
/// session.open("gender.csv_0_0_0.csv.gz").await?;
/// if let Some(file) = session.current().await {
///     println!("{} rows", file.report.outcome.as_ref().map_or(0, |o| o.rows.len()));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ViewerSession {
    loader: ResourceLoader,
    catalog: Catalog,
    generation: AtomicU64,
    current: RwLock<Option<Arc<DisplayedFile>>>,
    selection: Mutex<Selection>,
    event_tx: broadcast::Sender<Event>,
}

impl ViewerSession {
    /// Create a session over the HTTP fetcher after validating `config`
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let loader = ResourceLoader::new(&config)?;
        Ok(Self::with_loader(loader, Catalog::new(config.catalog)))
    }

    /// Create a session around an existing loader and catalog
    pub fn with_loader(loader: ResourceLoader, catalog: Catalog) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let selection = Selection {
            version: catalog.default_version().to_string(),
            file: None,
        };
        Self {
            loader,
            catalog,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
            selection: Mutex::new(selection),
            event_tx,
        }
    }

    /// Subscribe to load lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The catalog backing [`open`](ViewerSession::open)
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Currently selected version
    pub fn version(&self) -> String {
        self.selection().version.clone()
    }

    /// Generation of the most recently requested load (0 before any load)
    pub fn latest_generation(&self) -> Generation {
        Generation(self.generation.load(Ordering::SeqCst))
    }

    /// The displayed file, if any load has been published
    pub async fn current(&self) -> Option<Arc<DisplayedFile>> {
        self.current.read().await.clone()
    }

    /// Load a catalog file at the selected version
    pub async fn open(&self, file_name: &str) -> Result<LoadTicket> {
        let version = self.version();
        let locator = self.catalog.locator_for(file_name, &version)?;
        self.selection().file = Some(file_name.to_string());
        Ok(self.load(&locator).await)
    }

    /// Select another version, reloading the selected file if there is one
    ///
    /// Returns `None` when no file has been opened yet.
    pub async fn switch_version(&self, version: &str) -> Result<Option<LoadTicket>> {
        if !self.catalog.contains_version(version) {
            return Err(Error::UnknownVersion(version.to_string()));
        }
        let file = {
            let mut selection = self.selection();
            selection.version = version.to_string();
            selection.file.clone()
        };

        match file {
            Some(file) => {
                let locator = self.catalog.locator_for(&file, version)?;
                Ok(Some(self.load(&locator).await))
            }
            None => Ok(None),
        }
    }

    /// Load `locator` and publish the result unless a newer load was requested
    pub async fn load(&self, locator: &ResourceLocator) -> LoadTicket {
        let generation = Generation(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
        self.emit(Event::LoadStarted {
            generation,
            locator: locator.clone(),
        });

        let fallback_tx = self.event_tx.clone();
        let report = self
            .loader
            .load_observed(locator, move |reason| {
                fallback_tx
                    .send(Event::FallbackStarted {
                        generation,
                        reason: reason.to_string(),
                    })
                    .ok();
            })
            .await;

        // Check and publish under one lock so an older load can never land after a newer one.
        let mut current = self.current.write().await;
        let latest = self.latest_generation();
        if latest != generation {
            drop(current);
            tracing::debug!(url = %locator, %generation, %latest, "discarding superseded load");
            self.emit(Event::Superseded {
                generation,
                current: latest,
            });
            return LoadTicket::Superseded {
                generation,
                current: latest,
            };
        }

        let state = report.state.clone();
        match (&state.classification, &report.outcome) {
            (Classification::Failed { reason }, _) => self.emit(Event::LoadFailed {
                generation,
                stage: state.stage,
                error: reason.clone(),
            }),
            (classification, Some(outcome)) => self.emit(Event::Loaded {
                generation,
                rows: outcome.rows.len(),
                column_count: outcome.column_count,
                classification: classification.clone(),
            }),
            (_, None) => {}
        }

        *current = Some(Arc::new(DisplayedFile { generation, report }));
        LoadTicket::Published { generation, state }
    }

    fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    fn selection(&self) -> std::sync::MutexGuard<'_, Selection> {
        // Selection holds plain strings; a poisoned lock still has consistent data.
        self.selection
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
