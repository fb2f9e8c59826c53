use chrono::Local;
use sea_orm::{ActiveValue::{Set, Unchanged}, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, RelationTrait, QuerySelect, TransactionTrait, sea_query::{JoinType, OnConflict}};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{entity::{contract, daily_record, prelude::*, week, worker}, error::ApiError, ledger::input::DailyRecordInput};

/// What an upsert ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// A daily record with its pay at the contract's agreed price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordView {
    #[serde(flatten)]
    pub record: daily_record::Model,
    pub total_pay: f64,
}

impl RecordView {
    pub fn new(record: daily_record::Model, contract: &contract::Model) -> Self {
        Self {
            total_pay: record.units as f64 * contract.agreed_unit_price,
            record,
        }
    }
}

/// Creates or overwrites the record keyed by `(week, worker, day)`
///
/// Both the week and the worker must belong to `contract`.
pub async fn upsert(db: &DatabaseConnection, contract: &contract::Model, input: DailyRecordInput) -> Result<(daily_record::Model, Upsert), ApiError> {
    let txn = db.begin().await?;

    let week = Week::find_by_id(input.week_id)
        .filter(week::Column::ContractId.eq(contract.id))
        .one(&txn).await?;
    if week.is_none() {
        return Err(ApiError::validation("week_id", "week does not belong to the contract"));
    }

    let worker = Worker::find_by_id(input.worker_id)
        .filter(worker::Column::ContractId.eq(contract.id))
        .one(&txn).await?;
    if worker.is_none() {
        return Err(ApiError::validation("worker_id", "worker does not belong to the contract"));
    }

    let existing = find_keyed(&txn, &input).await?;

    let (record, outcome) = match existing {
        Some(record) => (set_units(&txn, record.id, input.units).await?, Upsert::Updated),
        None => {
            let inserted = DailyRecord::insert(daily_record::ActiveModel {
                id: Set(Uuid::new_v4()),
                created_at: Set(Local::now().fixed_offset()),
                updated_at: Set(Local::now().fixed_offset()),
                week_id: Set(input.week_id),
                worker_id: Set(input.worker_id),
                day: Set(input.day.clone()),
                units: Set(input.units),
            })
                .on_conflict(OnConflict::columns([
                    daily_record::Column::WeekId,
                    daily_record::Column::WorkerId,
                    daily_record::Column::Day,
                ]).do_nothing().to_owned())
                .exec_with_returning(&txn).await;

            match inserted {
                Ok(record) => (record, Upsert::Created),
                // Another request stored the same key first, nothing came back
                Err(DbErr::RecordNotFound(_)) => {
                    let Some(record) = find_keyed(&txn, &input).await? else {
                        return Err(ApiError::Database(DbErr::RecordNotInserted));
                    };
                    (set_units(&txn, record.id, input.units).await?, Upsert::Updated)
                },
                Err(err) => return Err(err.into()),
            }
        },
    };

    txn.commit().await?;

    info!(record_id = %record.id, units = record.units, ?outcome, "daily record stored");

    Ok((record, outcome))
}

async fn find_keyed(db: &impl ConnectionTrait, input: &DailyRecordInput) -> Result<Option<daily_record::Model>, DbErr> {
    DailyRecord::find()
        .filter(daily_record::Column::WeekId.eq(input.week_id))
        .filter(daily_record::Column::WorkerId.eq(input.worker_id))
        .filter(daily_record::Column::Day.eq(&input.day))
        .order_by_asc(daily_record::Column::CreatedAt)
        .one(db).await
}

async fn set_units(db: &impl ConnectionTrait, id: Uuid, units: i32) -> Result<daily_record::Model, DbErr> {
    DailyRecord::update(daily_record::ActiveModel {
        id: Unchanged(id),
        updated_at: Set(Local::now().fixed_offset()),
        units: Set(units),
        ..Default::default()
    }).exec(db).await
}

/// Records of `week_id` for workers of `contract`
pub async fn list_for_week(db: &impl ConnectionTrait, contract: &contract::Model, week_id: Uuid) -> Result<Vec<daily_record::Model>, ApiError> {
    let Some(week) = Week::find_by_id(week_id)
        .filter(week::Column::ContractId.eq(contract.id))
        .one(db).await?
    else {
        return Err(ApiError::NotFound);
    };

    Ok(
        DailyRecord::find()
            .join(JoinType::InnerJoin, daily_record::Relation::Worker.def())
            .filter(daily_record::Column::WeekId.eq(week.id))
            .filter(worker::Column::ContractId.eq(contract.id))
            .order_by_asc(daily_record::Column::CreatedAt)
            .all(db).await?
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::{auth::tests::owner, ledger::contracts::tests::contract};

    use super::*;

    pub(crate) fn week(contract: &contract::Model, number: i32) -> week::Model {
        let start = contract.start_date + chrono::Days::new(7 * (number as u64 - 1));

        week::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            contract_id: contract.id,
            number,
            start_date: start,
            end_date: (start + chrono::Days::new(6)).min(contract.end_date),
        }
    }

    pub(crate) fn worker(contract: &contract::Model, name: &str) -> worker::Model {
        worker::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            contract_id: contract.id,
            name: name.to_string(),
            trade: "Mason".to_string(),
        }
    }

    pub(crate) fn record(week: &week::Model, worker: &worker::Model, day: &str, units: i32) -> daily_record::Model {
        daily_record::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            week_id: week.id,
            worker_id: worker.id,
            day: day.to_string(),
            units,
        }
    }

    #[actix_web::test]
    async fn test_upsert_creates_then_updates() {
        let contract = contract(&owner());
        let week = week(&contract, 1);
        let worker = worker(&contract, "Ana");
        let first = record(&week, &worker, "monday", 5);
        let second = daily_record::Model { units: 8, ..first.clone() };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // first upsert
            .append_query_results([ vec![ week.clone() ] ])
            .append_query_results([ vec![ worker.clone() ] ])
            .append_query_results([ Vec::<daily_record::Model>::new(), vec![ first.clone() ] ])
            // second upsert
            .append_query_results([ vec![ week.clone() ] ])
            .append_query_results([ vec![ worker.clone() ] ])
            .append_query_results([ vec![ first.clone() ], vec![ second.clone() ] ])
            .into_connection();

        let input = |units| DailyRecordInput {
            week_id: week.id,
            worker_id: worker.id,
            day: "monday".to_string(),
            units,
        };

        let (stored, outcome) = upsert(&db, &contract, input(5)).await.unwrap();
        assert_eq!(outcome, Upsert::Created);
        assert_eq!(stored, first);

        let (stored, outcome) = upsert(&db, &contract, input(8)).await.unwrap();
        assert_eq!(outcome, Upsert::Updated);
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.units, 8);
    }

    #[actix_web::test]
    async fn test_upsert_rejects_worker_of_another_contract() {
        let contract = contract(&owner());
        let week = week(&contract, 1);
        let other_contract = contract::Model { id: Uuid::new_v4(), ..contract.clone() };
        let foreign_worker = worker(&other_contract, "Luis");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([ vec![ week.clone() ] ])
            .append_query_results([ Vec::<worker::Model>::new() ])
            .into_connection();

        let err = upsert(&db, &contract, DailyRecordInput {
            week_id: week.id,
            worker_id: foreign_worker.id,
            day: "monday".to_string(),
            units: 3,
        }).await.unwrap_err();

        let ApiError::Validation(err) = err else {
            panic!("expected a validation error, got {err:?}");
        };
        assert_eq!(err.fields[0].field, "worker_id");
    }

    #[actix_web::test]
    async fn test_upsert_rejects_week_of_another_contract() {
        let contract = contract(&owner());
        let worker = worker(&contract, "Ana");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([ Vec::<week::Model>::new() ])
            .into_connection();

        let err = upsert(&db, &contract, DailyRecordInput {
            week_id: Uuid::new_v4(),
            worker_id: worker.id,
            day: "friday".to_string(),
            units: 1,
        }).await.unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[actix_web::test]
    async fn test_upsert_updates_when_insert_loses_the_key() {
        let contract = contract(&owner());
        let week = week(&contract, 1);
        let worker = worker(&contract, "Ana");
        let stored_first = record(&week, &worker, "tuesday", 2);
        let updated = daily_record::Model { units: 6, ..stored_first.clone() };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([ vec![ week.clone() ] ])
            .append_query_results([ vec![ worker.clone() ] ])
            // not there yet, then the insert returns nothing
            .append_query_results([ Vec::<daily_record::Model>::new(), Vec::new() ])
            .append_query_results([ vec![ stored_first.clone() ], vec![ updated.clone() ] ])
            .into_connection();

        let (stored, outcome) = upsert(&db, &contract, DailyRecordInput {
            week_id: week.id,
            worker_id: worker.id,
            day: "tuesday".to_string(),
            units: 6,
        }).await.unwrap();

        assert_eq!(outcome, Upsert::Updated);
        assert_eq!(stored.id, stored_first.id);
        assert_eq!(stored.units, 6);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("ON CONFLICT"));
        assert!(log.contains("DO NOTHING"));
    }

    #[test]
    fn test_record_view_pay() {
        let contract = contract(&owner());
        let week = week(&contract, 2);
        assert_eq!(week.start_date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(week.end_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());

        let view = RecordView::new(record(&week, &worker(&contract, "Ana"), "monday", 7), &contract);
        assert_eq!(view.total_pay, 420.0);
    }
}
