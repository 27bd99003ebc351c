/// Number of digits in a share code.
pub const CODE_LENGTH: usize = 6;

/// How many fresh codes are tried before an upload gives up.
pub const MAX_CODE_ATTEMPTS: usize = 10;

/// Public URL prefix under which QR images are served.
pub const QR_PUBLIC_PREFIX: &str = "/static/qr";

/// Parse a strictly positive number, `None` for garbage, zero or negatives.
fn parse_positive<T>(raw: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw.trim().parse::<T>().ok().filter(|v| *v > T::default())
}

pub struct Env {
    pub ip: String,
    pub port: u16,
    pub workers: usize,
    pub upload_dir: String,
    pub qr_dir: String,
    pub max_upload_size: usize,
    pub expiry_seconds: i64,
    pub sweep_interval_seconds: u64,
    pub base_url: Option<String>,
}

impl Env {
    fn new() -> Self {
        let ip = std::env::var("IP").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        let workers = std::env::var("WORKERS")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<usize>()
            .expect("WORKERS must be a valid usize integer");

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let qr_dir = std::env::var("QR_DIR").unwrap_or_else(|_| "static/qr".to_string());

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .unwrap_or_else(|_| (100 * 1024 * 1024).to_string())
            .parse::<usize>()
            .expect("MAX_UPLOAD_SIZE must be a valid usize integer");
        let expiry_seconds = parse_positive::<i64>(
            &std::env::var("EXPIRY_SECONDS").unwrap_or_else(|_| "3600".to_string()),
        )
        .expect("EXPIRY_SECONDS must be a positive integer");
        let sweep_interval_seconds = parse_positive::<u64>(
            &std::env::var("SWEEP_INTERVAL_SECONDS").unwrap_or_else(|_| "60".to_string()),
        )
        .expect("SWEEP_INTERVAL_SECONDS must be a positive integer");

        let base_url = std::env::var("BASE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        Env {
            ip,
            port,
            workers,
            upload_dir,
            qr_dir,
            max_upload_size,
            expiry_seconds,
            sweep_interval_seconds,
            base_url,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
