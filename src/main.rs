mod config;
mod database;
mod model;
mod omdb;
mod routes;
mod store;
mod views;

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use log::info;
use omdb::{MovieService, OmdbClient};
use routes::AppState;
use std::io;
use std::sync::Arc;

#[actix_rt::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("moviedekho=debug,actix_web=info"),
    )
    .init();

    let config = Config::load().map_err(io::Error::other)?;

    let tera = tera::Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*"))
        .map_err(io::Error::other)?;
    let db = match &config.data_dir {
        Some(dir) => sled::open(dir)?,
        None => sled::Config::new().temporary(true).open()?,
    };
    let client: Arc<dyn MovieService> =
        Arc::new(OmdbClient::new(&config.omdb).map_err(io::Error::other)?);

    let tera = web::Data::new(tera);
    let db = web::Data::new(db);
    let movies: web::Data<dyn MovieService> = web::Data::from(client);
    let state = web::Data::new(AppState::new(config.ui.movies_per_page));

    info!("listening on http://{}", config.bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(tera.clone())
            .app_data(db.clone())
            .app_data(movies.clone())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}
