//! Catalog of known terminology files and published versions
//!
//! Resolves a file name and version into a [`ResourceLocator`]. Provider data
//! lives under a separate folder from the rest of the terminology set; the
//! folder is chosen by a substring match on the file name.

use crate::config::CatalogConfig;
use crate::error::{Error, Result};
use crate::types::ResourceLocator;

/// Known files and versions of one bucket
#[derive(Clone, Debug)]
pub struct Catalog {
    config: CatalogConfig,
}

impl Catalog {
    /// Create a catalog from its configuration
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    /// Known file names in catalog order
    pub fn files(&self) -> &[String] {
        &self.config.files
    }

    /// Published versions, oldest first
    pub fn versions(&self) -> &[String] {
        &self.config.versions
    }

    /// Version used when the caller has not picked one
    pub fn default_version(&self) -> &str {
        &self.config.default_version
    }

    /// Whether `version` is a published version
    pub fn contains_version(&self, version: &str) -> bool {
        self.config.versions.iter().any(|v| v == version)
    }

    /// File names containing `term`, case-insensitively (an empty term matches all)
    pub fn search(&self, term: &str) -> Vec<&str> {
        let needle = term.to_lowercase();
        self.config
            .files
            .iter()
            .filter(|f| f.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    /// Folder holding `file_name`
    pub fn folder_for(&self, file_name: &str) -> &str {
        if file_name.contains(&self.config.provider_marker) {
            &self.config.provider_folder
        } else {
            &self.config.default_folder
        }
    }

    /// Locator for a catalog file at a published version
    pub fn locator_for(&self, file_name: &str, version: &str) -> Result<ResourceLocator> {
        if !self.config.files.iter().any(|f| f == file_name) {
            return Err(Error::UnknownFile(file_name.to_string()));
        }
        if !self.contains_version(version) {
            return Err(Error::UnknownVersion(version.to_string()));
        }
        self.build_locator(file_name, version)
    }

    /// Locator for the same file at another version
    ///
    /// Used when the caller switches versions while a file is displayed.
    pub fn relocate(&self, current: &ResourceLocator, version: &str) -> Result<ResourceLocator> {
        self.locator_for(current.file_name(), version)
    }

    fn build_locator(&self, file_name: &str, version: &str) -> Result<ResourceLocator> {
        let base = self.config.base_url.trim_end_matches('/');
        let folder = self.folder_for(file_name);
        ResourceLocator::parse(&format!("{base}/{folder}/{version}/{file_name}"))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}
