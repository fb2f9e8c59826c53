use actix_web::web;

use crate::error::ApiError;

mod auth;
mod contract;
mod report;
mod week;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .app_data(web::JsonConfig::default()
            .error_handler(|err, _| ApiError::validation("body", err.to_string()).into()))
        .app_data(web::QueryConfig::default()
            .error_handler(|err, _| ApiError::validation("query", err.to_string()).into()))
        .app_data(web::PathConfig::default()
            .error_handler(|err, _| ApiError::validation("path", err.to_string()).into()))
        .service(web::scope("/auth")
            .configure(auth::config))
        .service(web::scope("/contracts")
            .configure(contract::config))
        .service(web::scope("/weeks")
            .configure(week::config))
        .service(web::scope("/reports")
            .configure(report::config));
}
