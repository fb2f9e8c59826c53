use chrono::Local;
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{entity::{contract, expense, prelude::*, week}, error::ApiError, ledger::input::NewExpense};

pub async fn list(db: &impl ConnectionTrait, contract: &contract::Model) -> Result<Vec<expense::Model>, DbErr> {
    Expense::find()
        .filter(expense::Column::ContractId.eq(contract.id))
        .order_by_asc(expense::Column::CreatedAt)
        .all(db).await
}

pub async fn list_for_week(db: &impl ConnectionTrait, week: &week::Model) -> Result<Vec<expense::Model>, DbErr> {
    Expense::find()
        .filter(expense::Column::WeekId.eq(week.id))
        .order_by_asc(expense::Column::CreatedAt)
        .all(db).await
}

/// Records an expense on `contract`, optionally tagged to one of its weeks
pub async fn create(db: &impl ConnectionTrait, contract: &contract::Model, new: NewExpense) -> Result<expense::Model, ApiError> {
    if let Some(week_id) = new.week_id {
        let week = Week::find_by_id(week_id)
            .filter(week::Column::ContractId.eq(contract.id))
            .one(db).await?;

        if week.is_none() {
            return Err(ApiError::validation("week_id", "week does not belong to the contract"));
        }
    }

    Ok(insert(db, contract.id, new.week_id, new).await?)
}

/// Records an expense tagged to `week`, whatever week the payload named
pub async fn create_for_week(db: &impl ConnectionTrait, week: &week::Model, new: NewExpense) -> Result<expense::Model, DbErr> {
    insert(db, week.contract_id, Some(week.id), new).await
}

async fn insert(db: &impl ConnectionTrait, contract_id: Uuid, week_id: Option<Uuid>, new: NewExpense) -> Result<expense::Model, DbErr> {
    Expense::insert(expense::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        contract_id: Set(contract_id),
        week_id: Set(week_id),
        name: Set(new.name),
        cost: Set(new.cost),
    }).exec_with_returning(db).await
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::{auth::tests::owner, ledger::contracts::tests::contract};

    use super::*;

    #[actix_web::test]
    async fn test_expense_for_foreign_week_is_rejected() {
        let contract = contract(&owner());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                Vec::<week::Model>::new(),
            ])
            .into_connection();

        let err = create(&db, &contract, NewExpense {
            name: "Cement".to_string(),
            cost: 50.0,
            week_id: Some(Uuid::new_v4()),
        }).await.unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[actix_web::test]
    async fn test_contract_level_expense() {
        let contract = contract(&owner());

        let stored = expense::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            contract_id: contract.id,
            week_id: None,
            name: "Permit".to_string(),
            cost: 20.0,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ stored.clone() ],
            ])
            .into_connection();

        let created = create(&db, &contract, NewExpense {
            name: "Permit".to_string(),
            cost: 20.0,
            week_id: None,
        }).await.unwrap();

        assert_eq!(created, stored);
    }
}
