use image::{ImageFormat, Luma};
use qrcode::QrCode;
use std::path::Path;

use crate::api::error;

/// Render `data` as a QR code and save it as a PNG at `path`.
///
/// Blocking; run it on the blocking pool.
pub fn write_qr_png(data: &str, path: &Path) -> Result<(), error::SystemError> {
    let code = QrCode::new(data.as_bytes())?;
    let image = code.render::<Luma<u8>>().min_dimensions(320, 320).quiet_zone(true).build();
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
