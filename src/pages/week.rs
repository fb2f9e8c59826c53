use actix_web::{get, post, web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{auth::Owner, error::ApiError, ledger::{expenses, input::ExpensePayload, weeks}};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(list_week_expenses)
        .service(create_week_expense);
}

#[get("/{week_id}/expenses")]
async fn list_week_expenses(db: web::Data<DatabaseConnection>, owner: Owner, week_id: web::Path<Uuid>) -> Result<impl Responder, ApiError> {
    let week = weeks::find_owned(db.get_ref(), &owner, week_id.into_inner()).await?;

    Ok(web::Json(expenses::list_for_week(db.get_ref(), &week).await?))
}

#[post("/{week_id}/expenses")]
async fn create_week_expense(db: web::Data<DatabaseConnection>, owner: Owner, week_id: web::Path<Uuid>, payload: web::Json<ExpensePayload>) -> Result<impl Responder, ApiError> {
    let week = weeks::find_owned(db.get_ref(), &owner, week_id.into_inner()).await?;

    let new = payload.into_inner().validate()?;
    let expense = expenses::create_for_week(db.get_ref(), &week, new).await?;

    Ok(HttpResponse::Created().json(web::Json(expense)))
}
