use std::str::FromStr;

use actix_web::{delete, dev, get, post, web, FromRequest, HttpRequest, HttpResponse, Responder};
use futures_util::future::LocalBoxFuture;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{auth::Owner, entity::contract, error::ApiError, ledger::{contracts, expenses, input::{ContractPayload, DailyRecordPayload, ExpensePayload, NonWorkingDayPayload, WorkerPayload}, non_working_days, profit, records::{self, RecordView, Upsert}, report, store::FsReportStore, weeks, workers}};

use model::*;

mod extractor;
mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(list_contracts)
        .service(create_contract)
        .service(get_contract)
        .service(delete_contract)
        .service(list_workers)
        .service(create_worker)
        .service(list_expenses)
        .service(create_expense)
        .service(list_weeks)
        .service(list_non_working_days)
        .service(create_non_working_day)
        .service(list_records)
        .service(upsert_record)
        .service(generate_report);
}

#[get("")]
async fn list_contracts(db: web::Data<DatabaseConnection>, owner: Owner) -> Result<impl Responder, ApiError> {
    let mut views = Vec::new();

    for contract in contracts::list(db.get_ref(), &owner).await? {
        let profitability = profit::load(db.get_ref(), &contract).await?;
        views.push(ContractView { contract, profitability });
    }

    Ok(web::Json(views))
}

#[post("")]
async fn create_contract(db: web::Data<DatabaseConnection>, owner: Owner, payload: web::Json<ContractPayload>) -> Result<impl Responder, ApiError> {
    let new = payload.into_inner().validate()?;

    let (contract, weeks) = contracts::create(db.get_ref(), &owner, new).await?;

    Ok(
        HttpResponse::Created()
            .json(web::Json(ContractCreated { contract, weeks }))
    )
}

#[get("/{contract_id}")]
async fn get_contract(db: web::Data<DatabaseConnection>, contract: contract::Model) -> Result<impl Responder, ApiError> {
    let profitability = profit::load(db.get_ref(), &contract).await?;

    Ok(web::Json(ContractView { contract, profitability }))
}

#[delete("/{contract_id}")]
async fn delete_contract(db: web::Data<DatabaseConnection>, owner: Owner, contract_id: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    contracts::delete(db.get_ref(), &owner, contract_id.into_inner()).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[get("/{contract_id}/workers")]
async fn list_workers(db: web::Data<DatabaseConnection>, contract: contract::Model) -> Result<impl Responder, ApiError> {
    Ok(web::Json(workers::list(db.get_ref(), &contract).await?))
}

#[post("/{contract_id}/workers")]
async fn create_worker(db: web::Data<DatabaseConnection>, contract: contract::Model, payload: web::Json<WorkerPayload>) -> Result<impl Responder, ApiError> {
    let new = payload.into_inner().validate()?;

    let worker = workers::create(db.get_ref(), &contract, new).await?;

    Ok(HttpResponse::Created().json(web::Json(worker)))
}

#[get("/{contract_id}/expenses")]
async fn list_expenses(db: web::Data<DatabaseConnection>, contract: contract::Model) -> Result<impl Responder, ApiError> {
    Ok(web::Json(expenses::list(db.get_ref(), &contract).await?))
}

#[post("/{contract_id}/expenses")]
async fn create_expense(db: web::Data<DatabaseConnection>, contract: contract::Model, payload: web::Json<ExpensePayload>) -> Result<impl Responder, ApiError> {
    let new = payload.into_inner().validate()?;

    let expense = expenses::create(db.get_ref(), &contract, new).await?;

    Ok(HttpResponse::Created().json(web::Json(expense)))
}

#[get("/{contract_id}/weeks")]
async fn list_weeks(db: web::Data<DatabaseConnection>, contract: contract::Model) -> Result<impl Responder, ApiError> {
    Ok(web::Json(weeks::list(db.get_ref(), &contract).await?))
}

#[get("/{contract_id}/non_working_days")]
async fn list_non_working_days(db: web::Data<DatabaseConnection>, contract: contract::Model) -> Result<impl Responder, ApiError> {
    Ok(web::Json(non_working_days::list(db.get_ref(), &contract).await?))
}

#[post("/{contract_id}/non_working_days")]
async fn create_non_working_day(db: web::Data<DatabaseConnection>, contract: contract::Model, payload: web::Json<NonWorkingDayPayload>) -> Result<impl Responder, ApiError> {
    let new = payload.into_inner().validate()?;

    let day = non_working_days::create(db.get_ref(), &contract, new).await?;

    Ok(HttpResponse::Created().json(web::Json(day)))
}

#[get("/{contract_id}/records")]
async fn list_records(db: web::Data<DatabaseConnection>, contract: contract::Model, query: web::Query<RecordsQuery>) -> Result<impl Responder, ApiError> {
    let Some(week_id) = query.week_id else {
        return Err(ApiError::validation("week_id", "this field is required"));
    };

    let records = records::list_for_week(db.get_ref(), &contract, week_id).await?
        .into_iter()
        .map(|record| RecordView::new(record, &contract))
        .collect::<Vec<_>>();

    Ok(web::Json(records))
}

#[post("/{contract_id}/records")]
async fn upsert_record(db: web::Data<DatabaseConnection>, contract: contract::Model, payload: web::Json<DailyRecordPayload>) -> Result<impl Responder, ApiError> {
    let input = payload.into_inner().validate()?;

    let (record, outcome) = records::upsert(db.get_ref(), &contract, input).await?;
    let view = RecordView::new(record, &contract);

    Ok(match outcome {
        Upsert::Created => HttpResponse::Created().json(web::Json(view)),
        Upsert::Updated => HttpResponse::Ok().json(web::Json(view)),
    })
}

#[get("/{contract_id}/report")]
async fn generate_report(db: web::Data<DatabaseConnection>, store: web::Data<FsReportStore>, contract: contract::Model, query: web::Query<ReportQuery>) -> Result<impl Responder, ApiError> {
    let week_number = query.week.unwrap_or(1);

    let report_url = report::generate(db.get_ref(), store.into_inner(), &contract, week_number).await?;

    Ok(web::Json(ReportLink { report_url }))
}
