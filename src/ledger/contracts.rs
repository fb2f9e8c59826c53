use chrono::Local;
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait};
use tracing::info;
use uuid::Uuid;

use crate::{auth::Owner, entity::{contract, daily_record, expense, non_working_day, prelude::*, week, worker}, error::ApiError, ledger::{input::NewContract, weeks}};

/// Contract `contract_id` if `owner` owns it
///
/// Someone else's contract is reported exactly like a missing one.
pub async fn find_owned(db: &impl ConnectionTrait, owner: &Owner, contract_id: Uuid) -> Result<contract::Model, ApiError> {
    Contract::find_by_id(contract_id)
        .filter(contract::Column::OwnerId.eq(owner.id))
        .one(db).await?
        .ok_or(ApiError::NotFound)
}

pub async fn list(db: &impl ConnectionTrait, owner: &Owner) -> Result<Vec<contract::Model>, ApiError> {
    Ok(
        Contract::find()
            .filter(contract::Column::OwnerId.eq(owner.id))
            .order_by_asc(contract::Column::CreatedAt)
            .all(db).await?
    )
}

/// Creates the contract together with all of its weeks
///
/// Either both land or neither does.
pub async fn create(db: &DatabaseConnection, owner: &Owner, new: NewContract) -> Result<(contract::Model, Vec<week::Model>), ApiError> {
    let txn = db.begin().await?;

    let contract = Contract::insert(contract::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        owner_id: Set(owner.id),
        name: Set(new.name),
        trade: Set(new.trade),
        real_unit_price: Set(new.real_unit_price),
        agreed_unit_price: Set(new.agreed_unit_price),
        start_date: Set(new.start_date),
        end_date: Set(new.end_date),
        tax_percent: Set(new.tax_percent),
        profit_margin_percent: Set(new.profit_margin_percent),
        max_workers: Set(new.max_workers),
    }).exec_with_returning(&txn).await?;

    let weeks = weeks::generate(&txn, &contract).await?;

    txn.commit().await?;

    info!(contract_id = %contract.id, weeks = weeks.len(), "contract created");

    Ok((contract, weeks))
}

/// Deletes the contract and everything hanging off it
pub async fn delete(db: &DatabaseConnection, owner: &Owner, contract_id: Uuid) -> Result<(), ApiError> {
    let txn = db.begin().await?;

    let contract = find_owned(&txn, owner, contract_id).await?;

    let week_ids = Week::find()
        .select_only()
        .column(week::Column::Id)
        .filter(week::Column::ContractId.eq(contract.id))
        .into_tuple::<Uuid>()
        .all(&txn).await?;

    let worker_ids = Worker::find()
        .select_only()
        .column(worker::Column::Id)
        .filter(worker::Column::ContractId.eq(contract.id))
        .into_tuple::<Uuid>()
        .all(&txn).await?;

    DailyRecord::delete_many()
        .filter(
            daily_record::Column::WeekId.is_in(week_ids)
                .or(daily_record::Column::WorkerId.is_in(worker_ids))
        )
        .exec(&txn).await?;

    Expense::delete_many()
        .filter(expense::Column::ContractId.eq(contract.id))
        .exec(&txn).await?;

    NonWorkingDay::delete_many()
        .filter(non_working_day::Column::ContractId.eq(contract.id))
        .exec(&txn).await?;

    Week::delete_many()
        .filter(week::Column::ContractId.eq(contract.id))
        .exec(&txn).await?;

    Worker::delete_many()
        .filter(worker::Column::ContractId.eq(contract.id))
        .exec(&txn).await?;

    Contract::delete_by_id(contract.id)
        .exec(&txn).await?;

    txn.commit().await?;

    info!(contract_id = %contract.id, "contract deleted");

    Ok(())
}
