use chrono::{DateTime, Utc};
use log::info;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::api::error;
use crate::constants::{MAX_CODE_ATTEMPTS, QR_PUBLIC_PREFIX};
use crate::modules::share::{
    archive::write_zip_archive,
    model::{DownloadFile, LinkResponse, ShareConfig, SweepReport, UploadResponse, UploadedFile},
    qr::write_qr_png,
    repository::ShareRepository,
    schema::ShareRecord,
};
use crate::utils::{generate_code, sanitize_filename};

pub type CodeGenerator = Arc<dyn Fn() -> String + Send + Sync>;

const INVALID_CODE: &str = "Invalid or expired code";
const INVALID_DOWNLOAD: &str = "Invalid or expired";
const FILE_GONE: &str = "File no longer available";

#[derive(Clone)]
pub struct ShareService {
    repo: Arc<dyn ShareRepository + Send + Sync>,
    config: ShareConfig,
    reserved: Arc<Mutex<HashSet<String>>>,
    code_generator: CodeGenerator,
}

/// Holds a code for an in-flight upload or sweep; released on drop.
struct CodeReservation {
    code: String,
    reserved: Arc<Mutex<HashSet<String>>>,
}

impl Drop for CodeReservation {
    fn drop(&mut self) {
        let mut reserved = self.reserved.lock().unwrap_or_else(|e| e.into_inner());
        reserved.remove(&self.code);
    }
}

impl ShareService {
    pub fn with_dependencies(
        repo: Arc<dyn ShareRepository + Send + Sync>,
        config: ShareConfig,
    ) -> Self {
        info!("ShareService initialized with dependencies");
        ShareService {
            repo,
            config,
            reserved: Arc::new(Mutex::new(HashSet::new())),
            code_generator: Arc::new(generate_code),
        }
    }

    pub fn with_code_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.code_generator = Arc::new(generator);
        self
    }

    pub fn config(&self) -> &ShareConfig {
        &self.config
    }

    /// `<base>/download/<code>`, using the configured base URL when there is one.
    pub fn download_link(&self, code: &str, request_base: &str) -> String {
        let base = self.config.base_url.as_deref().unwrap_or(request_base).trim_end_matches('/');
        format!("{base}/download/{code}")
    }

    /// Check the file list and return its total size in bytes.
    pub fn validate_upload(&self, files: &[UploadedFile]) -> Result<usize, error::SystemError> {
        if files.is_empty() {
            return Err(error::SystemError::bad_request("No files selected"));
        }

        let total: usize = files.iter().map(|f| f.bytes.len()).sum();
        if total > self.config.max_upload_size {
            return Err(self.size_exceeded());
        }

        Ok(total)
    }

    pub fn size_exceeded(&self) -> error::SystemError {
        error::SystemError::payload_too_large(format!(
            "Total size exceeds {}",
            self.config.max_upload_size_label()
        ))
    }

    /// Claim `code` for this task, `None` if an upload or a sweep already holds it.
    fn try_reserve(&self, code: &str) -> Option<CodeReservation> {
        let mut reserved = self.reserved.lock().unwrap_or_else(|e| e.into_inner());
        if !reserved.insert(code.to_string()) {
            return None;
        }
        Some(CodeReservation { code: code.to_string(), reserved: self.reserved.clone() })
    }

    async fn allocate_code(&self) -> Result<CodeReservation, error::SystemError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = (self.code_generator)();

            // Reserve before checking the registry so two uploads never share a code.
            let Some(reservation) = self.try_reserve(&code) else {
                continue;
            };
            if self.repo.get(&reservation.code).await.is_none() {
                return Ok(reservation);
            }
            log::debug!("Share code {} already taken, regenerating", reservation.code);
        }

        Err(error::SystemError::conflict("Could not allocate a share code"))
    }

    /// Store the upload, render its QR code and register it.
    ///
    /// Anything written to disk is removed again if a later step fails.
    pub async fn upload(
        &self,
        files: Vec<UploadedFile>,
        request_base: &str,
    ) -> Result<UploadResponse, error::SystemError> {
        let total_size = self.validate_upload(&files)?;

        tokio::fs::create_dir_all(&self.config.upload_dir).await?;
        tokio::fs::create_dir_all(&self.config.qr_dir).await?;

        let reservation = self.allocate_code().await?;
        let code = reservation.code.clone();
        let file_count = files.len();

        let (file_path, original_filename) = self.persist(&code, files).await?;

        let link = self.download_link(&code, request_base);
        let qr_path = self.config.qr_dir.join(format!("{code}.png"));

        let qr_link = link.clone();
        let qr_target = qr_path.clone();
        let rendered = tokio::task::spawn_blocking(move || write_qr_png(&qr_link, &qr_target))
            .await
            .map_err(error::SystemError::from)
            .and_then(|r| r);
        if let Err(e) = rendered {
            log::error!("QR generation failed for share {}: {}", code, e);
            remove_quietly(&file_path).await;
            remove_quietly(&qr_path).await;
            return Err(e);
        }

        let now = Utc::now();
        let record = ShareRecord {
            code: code.clone(),
            file_path,
            qr_path,
            original_filename,
            file_count,
            created_at: now,
            expires_at: now + self.config.expiry,
        };
        self.repo.put(&code, record).await;
        drop(reservation);

        info!("Share {} created with {} file(s), {} bytes", code, file_count, total_size);

        Ok(UploadResponse {
            code: code.clone(),
            files: file_count,
            link,
            qr: format!("{QR_PUBLIC_PREFIX}/{code}.png"),
        })
    }

    /// Write a single file as `<code>_<name>`, or several as `<code>.zip`.
    async fn persist(
        &self,
        code: &str,
        mut files: Vec<UploadedFile>,
    ) -> Result<(PathBuf, Option<String>), error::SystemError> {
        if files.len() == 1 {
            let upload = files.remove(0);
            let name = sanitize_filename(&upload.filename, "file");
            let path = self.config.upload_dir.join(format!("{code}_{name}"));

            if let Err(e) = tokio::fs::write(&path, &upload.bytes).await {
                remove_quietly(&path).await;
                return Err(e.into());
            }
            return Ok((path, Some(name)));
        }

        let path = self.config.upload_dir.join(format!("{code}.zip"));
        let target = path.clone();
        let written = tokio::task::spawn_blocking(move || write_zip_archive(&target, &files))
            .await
            .map_err(error::SystemError::from)
            .and_then(|r| r);
        if let Err(e) = written {
            remove_quietly(&path).await;
            return Err(e);
        }
        Ok((path, None))
    }

    /// Record for `code` unless it is unknown or past its expiry.
    pub async fn find_live(&self, code: &str) -> Option<ShareRecord> {
        self.repo.get(code).await.filter(|record| !record.is_expired(Utc::now()))
    }

    pub async fn lookup(
        &self,
        code: &str,
        request_base: &str,
    ) -> Result<LinkResponse, error::SystemError> {
        let record =
            self.find_live(code).await.ok_or_else(|| error::SystemError::not_found(INVALID_CODE))?;
        Ok(LinkResponse { link: self.download_link(&record.code, request_base) })
    }

    pub async fn open_download(&self, code: &str) -> Result<DownloadFile, error::SystemError> {
        let record = self
            .find_live(code)
            .await
            .ok_or_else(|| error::SystemError::not_found(INVALID_DOWNLOAD))?;
        let download_name = record.download_name();
        open_stored(&record.file_path, download_name).await
    }

    pub async fn open_qr_image(&self, code: &str) -> Result<DownloadFile, error::SystemError> {
        let record = self
            .find_live(code)
            .await
            .ok_or_else(|| error::SystemError::not_found(INVALID_DOWNLOAD))?;
        let download_name = format!("{}.png", record.code);
        open_stored(&record.qr_path, download_name).await
    }

    /// Remove every record that expired before `now`, together with its files.
    ///
    /// File removal failures are logged and counted; the pass always visits every record.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        for code in self.repo.all_codes().await {
            let Some(record) = self.repo.get(&code).await else {
                continue;
            };
            if !record.is_expired(now) {
                continue;
            }
            // Held until the files are gone so no upload can reuse the code meanwhile.
            // A code held elsewhere is left for the next pass.
            let Some(_reservation) = self.try_reserve(&code) else {
                continue;
            };

            // Row first, so a code that resolves always has its files.
            self.repo.delete(&code).await;
            report.removed += 1;

            for path in [&record.file_path, &record.qr_path] {
                if let Err(e) = tokio::fs::remove_file(path).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        report.failed += 1;
                        tracing::warn!(
                            code = %code,
                            path = %path.display(),
                            error = %e,
                            "Failed to remove expired file"
                        );
                    }
                }
            }
        }

        report
    }
}

async fn open_stored(path: &Path, download_name: String) -> Result<DownloadFile, error::SystemError> {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(error::SystemError::gone(FILE_GONE));
        }
        Err(e) => return Err(e.into()),
    };
    let size = file.metadata().await?.len();
    Ok(DownloadFile { file, size, download_name })
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}
