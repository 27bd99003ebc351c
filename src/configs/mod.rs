use crate::{api::error, modules::share::model::ShareConfig};

/// `env_logger` for the `log` facade (actix `Logger`, services) and a fmt
/// subscriber for `tracing` events from background tasks.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let subscriber = tracing_subscriber::fmt().with_target(false).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        log::warn!("A tracing subscriber was already installed");
    }
}

/// Create the blob and QR directories if they are missing.
pub async fn prepare_storage(config: &ShareConfig) -> Result<(), error::SystemError> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    tokio::fs::create_dir_all(&config.qr_dir).await?;
    log::info!(
        "Storage ready: uploads in {}, QR images in {}",
        config.upload_dir.display(),
        config.qr_dir.display()
    );
    Ok(())
}
