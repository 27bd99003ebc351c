use crate::modules::share::handle::*;
use actix_web::web::ServiceConfig;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(index)
        .service(upload)
        .service(get_file)
        .service(download)
        .service(qr_image);
}
