use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document id of a scan, assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanId(String);

impl ScanId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Id of the authenticated user owning the scans. Every store query is
/// scoped by owner; the caches are scoped to one owner session at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One alternate candidate reported when the model is unsure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternatePrediction {
    pub disease: String,
    pub probability: f64,
}

/// The analysis the inference backend wrote onto the scan document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Analysis {
    pub disease: String,
    pub confidence: f64,
    #[serde(default)]
    pub is_low_confidence: bool,
    #[serde(default)]
    pub confidence_warning: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Top candidates when the prediction was ambiguous; empty otherwise.
    #[serde(default)]
    pub alternates: Vec<AlternatePrediction>,
}

/// A single analyzed image, as read through from the remote store.
///
/// `storage_path` and `image_url` are the two halves of the display-URL
/// story: older documents only recorded the object-store path and the URL is
/// filled in lazily by [`crate::hydrator`]; newer documents already carry a
/// resolved URL, which is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub id: ScanId,
    pub captured_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub analysis: Analysis,
}

impl Scan {
    /// Whether the hydrator still has work to do for this scan.
    pub fn needs_image_url(&self) -> bool {
        self.image_url.is_none() && self.storage_path.is_some()
    }
}
