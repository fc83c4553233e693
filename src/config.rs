//! Configuration types for terminology-viewer

use crate::error::{Error, Result};
use crate::types::ByteRange;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP transport settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout (default: 60 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Size policy and fallback behavior of the loading pipeline
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Maximum rows parsed from an oversized payload (default: 50,000)
    #[serde(default = "default_row_cap")]
    pub row_cap: usize,

    /// Decoded text longer than this many characters is parsed with the row cap (default: 2,000,000)
    #[serde(default = "default_text_threshold_chars")]
    pub text_threshold_chars: usize,

    /// Payloads larger than this many bytes are parsed with the row cap (default: 5,000,000)
    ///
    /// A payload over this size that only decoded as plain text is classified partial.
    #[serde(default = "default_payload_threshold_bytes")]
    pub payload_threshold_bytes: u64,

    /// Byte window requested by the ranged fallback (default: bytes 0-150000)
    #[serde(default)]
    pub range_window: ByteRange,

    /// Also try the ranged fallback when the full fetch itself fails (default: false)
    ///
    /// A failed status on the full request usually means the resource is absent,
    /// so the default treats fetch errors as terminal.
    #[serde(default)]
    pub fallback_on_fetch_error: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            row_cap: default_row_cap(),
            text_threshold_chars: default_text_threshold_chars(),
            payload_threshold_bytes: default_payload_threshold_bytes(),
            range_window: ByteRange::default(),
            fallback_on_fetch_error: false,
        }
    }
}

/// Location and contents of the terminology bucket
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Bucket base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Folder for terminology files
    #[serde(default = "default_folder")]
    pub default_folder: String,

    /// Folder for provider data files
    #[serde(default = "default_provider_folder")]
    pub provider_folder: String,

    /// File names containing this substring live in `provider_folder`
    #[serde(default = "default_provider_marker")]
    pub provider_marker: String,

    /// Published versions, oldest first
    #[serde(default = "default_versions")]
    pub versions: Vec<String>,

    /// Version selected when none is given
    #[serde(default = "default_version")]
    pub default_version: String,

    /// Known file names
    #[serde(default = "default_files")]
    pub files: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_folder: default_folder(),
            provider_folder: default_provider_folder(),
            provider_marker: default_provider_marker(),
            versions: default_versions(),
            default_version: default_version(),
            files: default_files(),
        }
    }
}

/// Main configuration
///
/// Every field has a default, so `Config::default()` points at the public
/// terminology bucket with the standard size policy.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP transport settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Pipeline size policy and fallback behavior
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Bucket layout and known files
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Config {
    /// Parse a JSON configuration document and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json).map_err(|e| Error::Config {
            message: format!("invalid configuration JSON: {e}"),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.loader.row_cap == 0 {
            return Err(config_error("row cap must be at least 1", "loader.row_cap"));
        }
        if self.loader.range_window.is_empty() {
            return Err(config_error(
                "range window end must not precede its start",
                "loader.range_window",
            ));
        }
        if self.fetch.timeout.is_zero() {
            return Err(config_error("timeout must be non-zero", "fetch.timeout"));
        }
        if url::Url::parse(&self.catalog.base_url).is_err() {
            return Err(config_error(
                format!("base URL '{}' is not an absolute URL", self.catalog.base_url),
                "catalog.base_url",
            ));
        }
        if self.catalog.versions.is_empty() {
            return Err(config_error(
                "at least one version is required",
                "catalog.versions",
            ));
        }
        if !self.catalog.versions.contains(&self.catalog.default_version) {
            return Err(config_error(
                format!(
                    "default version '{}' is not in the version list",
                    self.catalog.default_version
                ),
                "catalog.default_version",
            ));
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>, key: &str) -> Error {
    Error::Config {
        message: message.into(),
        key: Some(key.to_string()),
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_user_agent() -> String {
    concat!("terminology-viewer/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_row_cap() -> usize {
    50_000
}

fn default_text_threshold_chars() -> usize {
    2_000_000
}

fn default_payload_threshold_bytes() -> u64 {
    5_000_000
}

fn default_base_url() -> String {
    "https://tuva-public-resources.s3.amazonaws.com".to_string()
}

fn default_folder() -> String {
    "versioned_terminology".to_string()
}

fn default_provider_folder() -> String {
    "versioned_provider_data".to_string()
}

fn default_provider_marker() -> String {
    "provider".to_string()
}

fn default_versions() -> Vec<String> {
    ["0.14.9", "0.14.11", "0.14.12"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_version() -> String {
    "0.14.12".to_string()
}

const TERMINOLOGY_FILES: &[&str] = &[
    "admit_source.csv_0_0_0.csv.gz",
    "admit_type.csv_0_0_0.csv.gz",
    "apr_drg.csv_0_0_0.csv.gz",
    "bill_type.csv_0_0_0.csv.gz",
    "ccs_services_procedures.csv_0_0_0.csv.gz",
    "claim_type.csv_0_0_0.csv.gz",
    "discharge_disposition.csv_0_0_0.csv.gz",
    "encounter_type.csv_0_0_0.csv.gz",
    "ethnicity.csv_0_0_0.csv.gz",
    "gender.csv_0_0_0.csv.gz",
    "hcpcs_level_2.csv_0_0_0.csv.gz",
    "hcpcs_to_rbcs.csv_0_0_0.csv.gz",
    "icd_10_pcs_cms_ontology.csv_0_0_0.csv.gz",
    "icd_10_cm.csv_0_0_0.csv.gz",
    "icd_10_pcs.csv_0_0_0.csv.gz",
    "icd_9_cm.csv_0_0_0.csv.gz",
    "icd_9_pcs.csv_0_0_0.csv.gz",
    "loinc.csv_0_0_0.csv.gz",
    "loinc_deprecated_mapping.csv_0_0_0.csv.gz",
    "mdc.csv_0_0_0.csv.gz",
    "medicare_dual_eligibility.csv_0_0_0.csv.gz",
    "medicare_orec.csv_0_0_0.csv.gz",
    "medicare_status.csv_0_0_0.csv.gz",
    "ms_drg.csv_0_0_0.csv.gz",
    "ms_drg_weights_los.csv_0_0_0.csv.gz",
    "ndc.csv_0_0_0.csv.gz",
    "nitos.csv_0_0_0.csv.gz",
    "other_provider_taxonomy.csv_0_0_0.csv.gz",
    "payer_type.csv_0_0_0.csv.gz",
    "place_of_service.csv_0_0_0.csv.gz",
    "present_on_admission.csv_0_0_0.csv.gz",
    "provider.csv_0_0_0.csv.gz",
    "race.csv_0_0_0.csv.gz",
    "revenue_center.csv_0_0_0.csv.gz",
    "rxnorm_brand_generic.csv_0_0_0.csv.gz",
    "rxnorm_to_atc.csv_0_0_0.csv.gz",
    "snomed_ct.csv_0_0_0.csv.gz",
    "snomed_ct_transitive_closures.csv_0_0_0.csv.gz",
    "snomed_icd_10_map.csv_0_0_0.csv.gz",
];

fn default_files() -> Vec<String> {
    TERMINOLOGY_FILES.iter().map(|s| s.to_string()).collect()
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
