use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::Local;
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, SqlErr};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{auth::{hash_password, AuthError, Authority, Owner}, entity::{prelude::*, user}, error::ApiError, ledger::input::RegisterPayload};

const USERNAME_TAKEN: &str = "username already exists, please choose another one";

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(register)
        .service(login)
        .service(refresh)
        .service(whoami);
}

#[derive(Debug, Serialize, Deserialize)]
struct Login {
    username: String,
    password: String,
}

#[post("/register")]
async fn register(db: web::Data<DatabaseConnection>, payload: web::Json<RegisterPayload>) -> Result<HttpResponse, ApiError> {
    let new = payload.into_inner().validate()?;

    let taken = User::find()
        .filter(user::Column::Username.eq(&new.username))
        .one(db.get_ref()).await?;
    if taken.is_some() {
        return Err(ApiError::Conflict(USERNAME_TAKEN.to_string()));
    }

    let password = hash_password(&new.username, &new.password);

    // Two registrations may race past the check above, the unique index settles it
    let user = User::insert(user::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        username: Set(new.username),
        email: Set(new.email),
        password: Set(password),
    })
        .exec_with_returning(db.get_ref()).await
        .map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::Conflict(USERNAME_TAKEN.to_string()),
            _ => ApiError::Database(err),
        })?;

    info!(user_id = %user.id, username = %user.username, "user registered");

    Ok(
        HttpResponse::Created()
            .json(web::Json(user))
    )
}

#[post("/login")]
async fn login(db: web::Data<DatabaseConnection>, authority: web::Data<Authority>, credentials: web::Json<Login>) -> Result<String, actix_web::Error> {
    let hashed_password = hash_password(&credentials.username, &credentials.password);

    let Some(user) = User::find()
        .filter(user::Column::Username.eq(&credentials.username))
        .filter(user::Column::Password.eq(hashed_password))
        .one(db.get_ref()).await
        .map_err(ApiError::from)?
    else {
        return Err(actix_web::error::ErrorForbidden("invalid credentials"));
    };

    Ok(authority.issue_for(&Owner::from(&user))?)
}

#[post("/refresh")]
async fn refresh(authority: web::Data<Authority>, owner: Owner) -> Result<String, AuthError> {
    authority.issue_for(&owner)
}

#[get("")]
async fn whoami(owner: Owner) -> impl Responder {
    web::Json(owner)
}
