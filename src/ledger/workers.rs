use chrono::Local;
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{entity::{contract, prelude::*, worker}, ledger::input::NewWorker};

pub async fn list(db: &impl ConnectionTrait, contract: &contract::Model) -> Result<Vec<worker::Model>, DbErr> {
    Worker::find()
        .filter(worker::Column::ContractId.eq(contract.id))
        .order_by_asc(worker::Column::CreatedAt)
        .all(db).await
}

pub async fn create(db: &impl ConnectionTrait, contract: &contract::Model, new: NewWorker) -> Result<worker::Model, DbErr> {
    Worker::insert(worker::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        contract_id: Set(contract.id),
        name: Set(new.name),
        trade: Set(new.trade),
    }).exec_with_returning(db).await
}
