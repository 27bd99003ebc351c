use actix_web::{self, middleware::Logger, web, App, HttpServer};
use std::sync::{Arc, LazyLock};

use crate::modules::share::{
    model::ShareConfig, route, ShareRepositoryMemory, ShareService, Sweeper,
};

mod api;
mod configs;
mod constants;
mod modules;
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    configs::init_logging();
    log::info!("Environment variables loaded");
    constants::Env::default()
});

#[actix_web::get("/health")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = ShareConfig::from(&*ENV);

    configs::prepare_storage(&config)
        .await
        .map_err(|_| std::io::Error::other("Could not create storage directories"))?;

    let share_repo = ShareRepositoryMemory::new();
    let share_service = ShareService::with_dependencies(Arc::new(share_repo), config.clone());

    let sweeper = Sweeper::new(share_service.clone(), config.sweep_interval).start();

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(share_service.clone()))
            .service(health_check)
            .configure(route::configure)
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(ENV.workers)
    .run()
    .await;

    sweeper.stop().await;
    server
}
