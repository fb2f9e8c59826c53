use chrono::{Local, NaiveDate};
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{entity::{contract, non_working_day, prelude::*}, ledger::input::NewNonWorkingDay};

pub async fn list(db: &impl ConnectionTrait, contract: &contract::Model) -> Result<Vec<non_working_day::Model>, DbErr> {
    NonWorkingDay::find()
        .filter(non_working_day::Column::ContractId.eq(contract.id))
        .order_by_asc(non_working_day::Column::CreatedAt)
        .all(db).await
}

/// Non-working days of `contract` falling within `[start, end]`
pub async fn list_between(db: &impl ConnectionTrait, contract: &contract::Model, start: NaiveDate, end: NaiveDate) -> Result<Vec<non_working_day::Model>, DbErr> {
    NonWorkingDay::find()
        .filter(non_working_day::Column::ContractId.eq(contract.id))
        .filter(non_working_day::Column::Date.between(start, end))
        .order_by_asc(non_working_day::Column::CreatedAt)
        .all(db).await
}

pub async fn create(db: &impl ConnectionTrait, contract: &contract::Model, new: NewNonWorkingDay) -> Result<non_working_day::Model, DbErr> {
    NonWorkingDay::insert(non_working_day::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        contract_id: Set(contract.id),
        date: Set(new.date),
        reason: Set(new.reason),
    }).exec_with_returning(db).await
}
