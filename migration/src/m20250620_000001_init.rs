use sea_orm_migration::prelude::*;

use crate::util::{default_table_statement, owned_by};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(default_table_statement()
                .table(User::Table)
                .col(ColumnDef::new(User::Username)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(User::Email)
                    .text()
                    .not_null()
                    .default(""))
                .col(ColumnDef::new(User::Password)
                    .binary()
                    .not_null()) // SHA-256 of `password:username`
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Contract::Table)
                .col(ColumnDef::new(Contract::OwnerId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Contract::Name)
                    .string_len(100)
                    .not_null())
                .col(ColumnDef::new(Contract::Trade)
                    .string_len(100)
                    .not_null())
                .col(ColumnDef::new(Contract::RealUnitPrice)
                    .double()
                    .not_null())
                .col(ColumnDef::new(Contract::AgreedUnitPrice)
                    .double()
                    .not_null())
                .col(ColumnDef::new(Contract::StartDate)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Contract::EndDate)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Contract::TaxPercent)
                    .double()
                    .not_null())
                .col(ColumnDef::new(Contract::ProfitMarginPercent)
                    .double()
                    .not_null())
                .col(ColumnDef::new(Contract::MaxWorkers)
                    .integer()
                    .not_null())
                .check(Expr::col(Contract::EndDate).gte(Expr::col(Contract::StartDate)))
                .take()
            ).await?;
        manager.create_foreign_key(owned_by(Contract::Table, Contract::OwnerId, User::Table)).await?;

        manager
            .create_table(default_table_statement()
                .table(Worker::Table)
                .col(ColumnDef::new(Worker::ContractId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Worker::Name)
                    .string_len(100)
                    .not_null())
                .col(ColumnDef::new(Worker::Trade)
                    .string_len(100)
                    .not_null())
                .take()
            ).await?;
        manager.create_foreign_key(owned_by(Worker::Table, Worker::ContractId, Contract::Table)).await?;

        manager
            .create_table(default_table_statement()
                .table(Week::Table)
                .col(ColumnDef::new(Week::ContractId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Week::Number)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Week::StartDate)
                    .date()
                    .not_null())
                .col(ColumnDef::new(Week::EndDate)
                    .date()
                    .not_null())
                .take()
            ).await?;
        manager.create_foreign_key(owned_by(Week::Table, Week::ContractId, Contract::Table)).await?;
        manager
            .create_index(Index::create()
                .name("idx_week_contract_number")
                .table(Week::Table)
                .col(Week::ContractId)
                .col(Week::Number)
                .unique()
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(DailyRecord::Table)
                .col(ColumnDef::new(DailyRecord::WeekId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(DailyRecord::WorkerId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(DailyRecord::Day)
                    .string_len(10)
                    .not_null())
                .col(ColumnDef::new(DailyRecord::Units)
                    .integer()
                    .not_null()
                    .default(0))
                .check(Expr::col(DailyRecord::Units).gte(0))
                .take()
            ).await?;
        manager.create_foreign_key(owned_by(DailyRecord::Table, DailyRecord::WeekId, Week::Table)).await?;
        manager.create_foreign_key(owned_by(DailyRecord::Table, DailyRecord::WorkerId, Worker::Table)).await?;
        manager
            .create_index(Index::create()
                .name("idx_daily_record_week_worker_day")
                .table(DailyRecord::Table)
                .col(DailyRecord::WeekId)
                .col(DailyRecord::WorkerId)
                .col(DailyRecord::Day)
                .unique()
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(NonWorkingDay::Table)
                .col(ColumnDef::new(NonWorkingDay::ContractId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(NonWorkingDay::Date)
                    .date()
                    .not_null())
                .col(ColumnDef::new(NonWorkingDay::Reason)
                    .string_len(255)
                    .not_null()
                    .default("unspecified"))
                .take()
            ).await?;
        manager.create_foreign_key(owned_by(NonWorkingDay::Table, NonWorkingDay::ContractId, Contract::Table)).await?;

        manager
            .create_table(default_table_statement()
                .table(Expense::Table)
                .col(ColumnDef::new(Expense::ContractId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(Expense::WeekId)
                    .uuid())
                .col(ColumnDef::new(Expense::Name)
                    .string_len(100)
                    .not_null())
                .col(ColumnDef::new(Expense::Cost)
                    .double()
                    .not_null())
                .check(Expr::col(Expense::Cost).gte(0))
                .take()
            ).await?;
        manager.create_foreign_key(owned_by(Expense::Table, Expense::ContractId, Contract::Table)).await?;
        manager.create_foreign_key(owned_by(Expense::Table, Expense::WeekId, Week::Table)).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children first, the foreign keys would refuse otherwise
        manager
            .drop_table(
                TableDropStatement::new()
                    .table(Expense::Table)
                    .table(NonWorkingDay::Table)
                    .table(DailyRecord::Table)
                    .table(Week::Table)
                    .table(Worker::Table)
                    .table(Contract::Table)
                    .table(User::Table)
                    .take()
            ).await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    Username,
    Email,
    Password,
}

#[derive(DeriveIden)]
enum Contract {
    Table,
    OwnerId,
    Name,
    Trade,
    RealUnitPrice,
    AgreedUnitPrice,
    StartDate,
    EndDate,
    TaxPercent,
    ProfitMarginPercent,
    MaxWorkers,
}

#[derive(DeriveIden)]
enum Worker {
    Table,
    ContractId,
    Name,
    Trade,
}

#[derive(DeriveIden)]
enum Week {
    Table,
    ContractId,
    Number,
    StartDate,
    EndDate,
}

#[derive(DeriveIden)]
enum DailyRecord {
    Table,
    WeekId,
    WorkerId,
    Day,
    Units,
}

#[derive(DeriveIden)]
enum NonWorkingDay {
    Table,
    ContractId,
    Date,
    Reason,
}

#[derive(DeriveIden)]
enum Expense {
    Table,
    ContractId,
    WeekId,
    Name,
    Cost,
}
