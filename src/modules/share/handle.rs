use actix_multipart::Multipart;
use actix_web::{
    body::SizedStream,
    get,
    http::{
        header::{Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue},
        StatusCode,
    },
    post, web, HttpRequest, HttpResponse,
};
use askama::Template;
use futures_util::TryStreamExt;
use std::borrow::Cow;
use tokio_util::io::ReaderStream;

use crate::api::{error, success};
use crate::modules::share::{
    model::{DownloadFile, GetFileModel, LinkResponse, UploadResponse, UploadedFile},
    service::ShareService,
    template::IndexTemplate,
};
use crate::utils::ValidatedForm;

const FILES_FIELD: &str = "files";

/// Scheme and host the client used to reach us, e.g. `http://localhost:5000`.
fn request_base(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

fn plain_text(status: StatusCode, body: Cow<'static, str>) -> HttpResponse {
    HttpResponse::build(status).content_type("text/plain; charset=utf-8").body(body.into_owned())
}

fn attachment(name: String) -> ContentDisposition {
    let mut parameters = vec![DispositionParam::Filename(name.clone())];
    if !name.is_ascii() {
        parameters.push(DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_string()),
            language_tag: None,
            value: name.into_bytes(),
        }));
    }
    ContentDisposition { disposition: DispositionType::Attachment, parameters }
}

fn stream_file(artifact: DownloadFile, disposition: Option<ContentDisposition>) -> HttpResponse {
    let content_type = mime_guess::from_path(&artifact.download_name).first_or_octet_stream();
    let mut res = HttpResponse::Ok();
    res.content_type(content_type.to_string());
    if let Some(disposition) = disposition {
        res.insert_header(disposition);
    }
    res.body(SizedStream::new(artifact.size, ReaderStream::new(artifact.file)))
}

#[get("/")]
pub async fn index(service: web::Data<ShareService>) -> Result<HttpResponse, error::Error> {
    let config = service.config();
    let page = IndexTemplate {
        max_size: config.max_upload_size_label(),
        expiry_minutes: config.expiry.num_minutes(),
    }
    .render()
    .map_err(|e| error::Error::from(error::SystemError::from(e)))?;

    Ok(HttpResponse::Ok().content_type("text/html; charset=utf-8").body(page))
}

#[post("/upload")]
pub async fn upload(
    mut payload: Multipart,
    req: HttpRequest,
    service: web::Data<ShareService>,
) -> Result<success::Success<UploadResponse>, error::Error> {
    let max_upload_size = service.config().max_upload_size;
    let mut files = Vec::new();
    let mut total_size = 0usize;

    while let Some(mut field) =
        payload.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
    {
        let (name, filename) = match field.content_disposition() {
            Some(cd) => (cd.get_name().map(str::to_string), cd.get_filename().map(str::to_string)),
            None => (None, None),
        };
        if name.as_deref() != Some(FILES_FIELD) {
            continue;
        }

        // Read file bytes, bailing out as soon as the request is over the cap
        let mut bytes = Vec::new();
        while let Some(chunk) =
            field.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
        {
            total_size += chunk.len();
            if total_size > max_upload_size {
                return Err(service.size_exceeded().into());
            }
            bytes.extend_from_slice(&chunk);
        }

        let filename = filename.unwrap_or_default();
        // browsers send an empty part when nothing was picked
        if filename.is_empty() && bytes.is_empty() {
            continue;
        }
        files.push(UploadedFile { filename, bytes });
    }

    let result = service.upload(files, &request_base(&req)).await?;
    Ok(success::Success::ok(result))
}

#[post("/getfile")]
pub async fn get_file(
    req: HttpRequest,
    service: web::Data<ShareService>,
    form: ValidatedForm<GetFileModel>,
) -> Result<success::Success<LinkResponse>, error::Error> {
    let link = service.lookup(form.0.code.trim(), &request_base(&req)).await?;
    Ok(success::Success::ok(link))
}

#[get("/download/{code}")]
pub async fn download(
    code: web::Path<String>,
    service: web::Data<ShareService>,
) -> Result<HttpResponse, error::Error> {
    match service.open_download(&code).await {
        Ok(file) => {
            let disposition = attachment(file.download_name.clone());
            Ok(stream_file(file, Some(disposition)))
        }
        Err(error::SystemError::NotFound(msg)) => Ok(plain_text(StatusCode::NOT_FOUND, msg)),
        Err(error::SystemError::Gone(msg)) => Ok(plain_text(StatusCode::GONE, msg)),
        Err(e) => Err(e.into()),
    }
}

#[get("/static/qr/{code:[0-9]+}.png")]
pub async fn qr_image(
    code: web::Path<String>,
    service: web::Data<ShareService>,
) -> Result<HttpResponse, error::Error> {
    match service.open_qr_image(&code).await {
        Ok(file) => Ok(stream_file(file, None)),
        Err(error::SystemError::NotFound(msg) | error::SystemError::Gone(msg)) => {
            Ok(plain_text(StatusCode::NOT_FOUND, msg))
        }
        Err(e) => Err(e.into()),
    }
}
