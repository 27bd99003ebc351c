use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::constants::Env;

/// A file part read from the multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Share service configuration
#[derive(Debug, Clone)]
pub struct ShareConfig {
    pub upload_dir: PathBuf,
    pub qr_dir: PathBuf,
    pub max_upload_size: usize,
    pub expiry: chrono::Duration,
    pub sweep_interval: Duration,
    /// Public base for download links. Falls back to the request host when unset.
    pub base_url: Option<String>,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            qr_dir: PathBuf::from("static/qr"),
            max_upload_size: 100 * 1024 * 1024, // 100MB
            expiry: chrono::Duration::seconds(3600),
            sweep_interval: Duration::from_secs(60),
            base_url: None,
        }
    }
}

impl From<&Env> for ShareConfig {
    fn from(env: &Env) -> Self {
        Self {
            upload_dir: PathBuf::from(&env.upload_dir),
            qr_dir: PathBuf::from(&env.qr_dir),
            max_upload_size: env.max_upload_size,
            expiry: chrono::Duration::seconds(env.expiry_seconds),
            sweep_interval: Duration::from_secs(env.sweep_interval_seconds),
            base_url: env.base_url.clone(),
        }
    }
}

impl ShareConfig {
    /// Human readable size cap used in error messages, e.g. `100MB`.
    pub fn max_upload_size_label(&self) -> String {
        const MB: usize = 1024 * 1024;
        if self.max_upload_size >= MB && self.max_upload_size % MB == 0 {
            format!("{}MB", self.max_upload_size / MB)
        } else {
            format!("{} bytes", self.max_upload_size)
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub code: String,
    pub files: usize,
    pub link: String,
    pub qr: String,
}

#[derive(Deserialize, Validate)]
pub struct GetFileModel {
    #[validate(length(min = 1, max = 64, message = "Code must be between 1 and 64 characters"))]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LinkResponse {
    pub link: String,
}

/// An opened artifact ready to be streamed to the client.
#[derive(Debug)]
pub struct DownloadFile {
    pub file: tokio::fs::File,
    pub size: u64,
    pub download_name: String,
}

/// Outcome of one sweep pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    pub failed: usize,
}
