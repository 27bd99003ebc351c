use actix_web::{web, FromRequest};
use futures_util::future::LocalBoxFuture;
use std::collections::HashSet;
use std::path::Path;
use validator::Validate;

use crate::{api::error, constants::CODE_LENGTH};

/// Short numeric share code taken from the low decimal digits of a random v4 UUID.
///
/// Collisions are possible; callers check the registry before using the code.
pub fn generate_code() -> String {
    let modulus = 10u128.pow(CODE_LENGTH as u32);
    let value = uuid::Uuid::new_v4().as_u128() % modulus;
    format!("{:0width$}", value, width = CODE_LENGTH)
}

/// Reduce a client supplied filename to a bare file name.
/// Strips path components such as `../` and falls back when nothing usable is left.
pub fn sanitize_filename(filename: &str, fallback: &str) -> String {
    let normalized = filename.replace('\\', "/");
    Path::new(&normalized)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}

/// Make `name` unique within `taken` by appending ` (n)` before the extension.
pub fn dedupe_filename(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }

    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(name);
    let extension = path.extension().and_then(|e| e.to_str());

    let mut n = 1;
    loop {
        let candidate = match extension {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

pub struct ValidatedForm<T>(pub T);

impl<T> FromRequest for ValidatedForm<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = error::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Form::<T>::from_request(req, payload);

        Box::pin(async move {
            let form = fut.await.map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            let model = form.into_inner();
            model.validate().map_err(|e| error::Error::BadRequest(e.to_string().into()))?;
            Ok(ValidatedForm(model))
        })
    }
}
