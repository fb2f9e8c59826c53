use std::fs::OpenOptions;

use actix_web::{web, App, HttpServer};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{filter, fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use crate::{auth::Authority, ledger::store::FsReportStore};

mod config;
mod consts;
mod error;
mod utils;

mod entity;
mod auth;
mod ledger;
mod pages;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenvy::dotenv();

    let log_file = OpenOptions::new()
        .append(true)
        .create(true)
        .open("trace.log")
        .expect("Unable to open `trace.log`");

    let subscriber = Registry::default()
        .with(
            fmt::layer()
                .with_ansi(true)
                .with_line_number(true)
                .with_filter(EnvFilter::from_default_env())
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(log_file)
                .with_filter(filter::LevelFilter::from_level(Level::TRACE))
        );

    tracing::subscriber::set_global_default(subscriber).expect("Unable to install tracing subscriber");

    let config::Config {
        host_address,
        database_opt,
        jwt_key,
        media_root,
        media_url,
    } = config::load();

    let connection = Database::connect(database_opt).await.expect("Unable to connect to database");
    Migrator::up(&connection, None).await.expect("Unable to apply migrations");

    let database = web::Data::new(connection);
    let authority = web::Data::new(Authority::new(jwt_key.as_bytes()));
    let report_store = web::Data::new(FsReportStore::new(media_root, media_url));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(database.clone())
            .app_data(authority.clone())
            .app_data(report_store.clone())
            .wrap(TracingLogger::default())
            .configure(pages::config)
    });

    let server = server.bind(host_address)?;
    info!(addresses = ?server.addrs(), "listening");

    server.run().await
}
