use chrono::{Days, Local, NaiveDate};
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, sea_query::JoinType};
use uuid::Uuid;

use crate::{auth::Owner, consts::DAYS_PER_WEEK, entity::{contract, prelude::*, week}, error::ApiError};

/// One slice of a contract's date span, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekSpan {
    pub number: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// `ceil((end - start + 1 day) / 7)`, zero for an inverted range
pub fn week_count(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return 0;
    }

    let days_span = (end - start).num_days();

    days_span / DAYS_PER_WEEK + 1
}

/// Splits `[start, end]` into consecutive 7 day weeks numbered from 1
///
/// The last week is cut short at `end`.
pub fn partition(start: NaiveDate, end: NaiveDate) -> Vec<WeekSpan> {
    (0..week_count(start, end))
        .map_while(|i| {
            let week_start = start.checked_add_days(Days::new((i * DAYS_PER_WEEK) as u64))?;
            // Near the end of the calendar the full week does not exist, `end` does
            let week_end = week_start.checked_add_days(Days::new((DAYS_PER_WEEK - 1) as u64))
                .map_or(end, |week_end| week_end.min(end));

            Some(WeekSpan {
                number: i as i32 + 1,
                start_date: week_start,
                end_date: week_end,
            })
        })
        .collect()
}

/// Inserts the week rows of a freshly created contract
///
/// Must run inside the transaction that inserted the contract.
pub(crate) async fn generate(txn: &impl ConnectionTrait, contract: &contract::Model) -> Result<Vec<week::Model>, DbErr> {
    let now = Local::now().fixed_offset();

    let weeks = partition(contract.start_date, contract.end_date)
        .into_iter()
        .map(|span| week::Model {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            contract_id: contract.id,
            number: span.number,
            start_date: span.start_date,
            end_date: span.end_date,
        })
        .collect::<Vec<_>>();

    if weeks.is_empty() {
        return Ok(weeks);
    }

    Week::insert_many(weeks.iter().cloned().map(|week| week::ActiveModel {
        id: Set(week.id),
        created_at: Set(week.created_at),
        updated_at: Set(week.updated_at),
        contract_id: Set(week.contract_id),
        number: Set(week.number),
        start_date: Set(week.start_date),
        end_date: Set(week.end_date),
    }))
        .exec_without_returning(txn).await?;

    Ok(weeks)
}

pub async fn list(db: &impl ConnectionTrait, contract: &contract::Model) -> Result<Vec<week::Model>, DbErr> {
    Week::find()
        .filter(week::Column::ContractId.eq(contract.id))
        .order_by_asc(week::Column::Number)
        .all(db).await
}

pub async fn find_by_number(db: &impl ConnectionTrait, contract: &contract::Model, number: i32) -> Result<week::Model, ApiError> {
    Week::find()
        .filter(week::Column::ContractId.eq(contract.id))
        .filter(week::Column::Number.eq(number))
        .one(db).await?
        .ok_or(ApiError::NotFound)
}

/// Week of a contract `owner` owns
pub async fn find_owned(db: &impl ConnectionTrait, owner: &Owner, week_id: Uuid) -> Result<week::Model, ApiError> {
    Week::find_by_id(week_id)
        .join(JoinType::InnerJoin, week::Relation::Contract.def())
        .filter(contract::Column::OwnerId.eq(owner.id))
        .one(db).await?
        .ok_or(ApiError::NotFound)
}
