use std::io;

use actix_web::{get, web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{auth::Owner, error::ApiError, ledger::{contracts, store::{FsReportStore, ReportKey, ReportStore}}};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(download_report);
}

/// Serves a stored report, only to the owner of its contract
#[get("/{contract_id}/{week_number}")]
async fn download_report(db: web::Data<DatabaseConnection>, store: web::Data<FsReportStore>, owner: Owner, path: web::Path<(Uuid, i32)>) -> Result<impl Responder, ApiError> {
    let (contract_id, week_number) = path.into_inner();

    let contract = contracts::find_owned(db.get_ref(), &owner, contract_id).await?;
    let key = ReportKey {
        contract_id: contract.id,
        week_number,
    };

    let document = web::block(move || store.get(key)).await?
        .map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ApiError::NotFound,
            _ => ApiError::Storage(err),
        })?;

    Ok(
        HttpResponse::Ok()
            .content_type("application/pdf")
            .body(document)
    )
}
