use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::api::error;
use crate::modules::share::model::UploadedFile;
use crate::utils::{dedupe_filename, sanitize_filename};

/// Write a Deflate zip at `path` holding every uploaded file under its own name.
///
/// Blocking; run it on the blocking pool.
pub fn write_zip_archive(path: &Path, files: &[UploadedFile]) -> Result<(), error::SystemError> {
    let file = std::fs::File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    let mut taken = HashSet::new();
    for (index, upload) in files.iter().enumerate() {
        let name = sanitize_filename(&upload.filename, &format!("file_{}", index + 1));
        let name = dedupe_filename(&name, &mut taken);

        zip.start_file(name, options)?;
        zip.write_all(&upload.bytes)?;
    }

    zip.finish()?;
    Ok(())
}
