use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One completed upload as held by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRecord {
    pub code: String,
    pub file_path: PathBuf,
    pub qr_path: PathBuf,
    /// Name handed back to the client for single-file shares. `None` for archives.
    pub original_filename: Option<String>,
    pub file_count: usize,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ShareRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Filename used in the `Content-Disposition` of a download.
    pub fn download_name(&self) -> String {
        if let Some(name) = &self.original_filename {
            return name.clone();
        }
        self.file_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}.zip", self.code))
    }
}
