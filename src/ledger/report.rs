use std::{collections::HashSet, sync::Arc};

use actix_web::web;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::info;

use crate::{entity::{contract, daily_record, expense, non_working_day, prelude::*, worker}, error::ApiError, ledger::{expenses, non_working_days, store::{ReportKey, ReportStore}, weeks, workers}, utils::{capitalize, format_amount}};

pub mod layout;
pub mod pdf;

/// Everything a weekly report is rendered from
#[derive(Debug, Clone)]
pub struct ReportData {
    pub contract: contract::Model,
    pub week_number: i32,
    pub workers: Vec<worker::Model>,
    /// Oldest first
    pub records: Vec<daily_record::Model>,
    pub non_working_days: Vec<non_working_day::Model>,
    pub expenses: Vec<expense::Model>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayRow {
    pub day: String,
    pub units: i32,
    pub pay: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerSection {
    pub name: String,
    pub days: Vec<DayRow>,
    pub total_units: i64,
    pub total_pay: f64,
}

/// Report content, already deduplicated and formatted, ready to be laid out
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSections {
    pub contract_name: String,
    pub week_number: i32,
    pub workers: Vec<WorkerSection>,
    pub non_working_days: Vec<String>,
    pub expenses: Vec<String>,
}

impl From<&ReportData> for ReportSections {
    fn from(data: &ReportData) -> Self {
        let price = data.contract.agreed_unit_price;

        let workers = data.workers.iter()
            .map(|worker| {
                let mut records = data.records.iter()
                    .filter(|record| record.worker_id == worker.id)
                    .collect::<Vec<_>>();
                // Stable, so equal days keep their insertion order
                records.sort_by(|a, b| a.day.cmp(&b.day));

                // Storage may hold duplicate rows for a day, the first one wins
                let mut seen = HashSet::new();
                let days = records.into_iter()
                    .filter(|record| seen.insert(record.day.as_str()))
                    .map(|record| DayRow {
                        day: capitalize(&record.day),
                        units: record.units,
                        pay: record.units as f64 * price,
                    })
                    .collect::<Vec<_>>();

                WorkerSection {
                    name: worker.name.clone(),
                    total_units: days.iter().map(|day| day.units as i64).sum(),
                    total_pay: days.iter().map(|day| day.pay).sum(),
                    days,
                }
            })
            .collect();

        Self {
            contract_name: data.contract.name.clone(),
            week_number: data.week_number,
            workers,
            non_working_days: data.non_working_days.iter()
                .map(|day| format!("{} - {}", day.date, day.reason))
                .collect(),
            expenses: data.expenses.iter()
                .map(|expense| format!("{}: {}", expense.name, format_amount(expense.cost)))
                .collect(),
        }
    }
}

/// Loads the rows the report of week `week_number` needs
pub async fn collect(db: &impl ConnectionTrait, contract: &contract::Model, week_number: i32) -> Result<ReportData, ApiError> {
    let week = weeks::find_by_number(db, contract, week_number).await?;

    let workers = workers::list(db, contract).await?;

    let records = DailyRecord::find()
        .filter(daily_record::Column::WeekId.eq(week.id))
        .order_by_asc(daily_record::Column::CreatedAt)
        .all(db).await?;

    let non_working_days = non_working_days::list_between(db, contract, week.start_date, week.end_date).await?;

    let expenses = expenses::list_for_week(db, &week).await?;

    Ok(ReportData {
        contract: contract.clone(),
        week_number,
        workers,
        records,
        non_working_days,
        expenses,
    })
}

/// Renders one PDF page per layout page
pub fn render(data: &ReportData) -> Vec<u8> {
    let pages = layout::layout(&ReportSections::from(data));

    pdf::encode(&pages)
}

/// Renders the report of week `week_number` and stores it, returning its URL
///
/// Rendering the same week again replaces the stored document.
pub async fn generate<S: ReportStore>(db: &impl ConnectionTrait, store: Arc<S>, contract: &contract::Model, week_number: i32) -> Result<String, ApiError> {
    let data = collect(db, contract, week_number).await?;

    let key = ReportKey {
        contract_id: contract.id,
        week_number,
    };

    let url = web::block(move || {
        let document = render(&data);
        store.put(key, &document)
    }).await??;

    info!(contract_id = %key.contract_id, week_number, %url, "report stored");

    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{Local, NaiveDate};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::{auth::tests::owner, ledger::{contracts::tests::contract, records::tests::{record, week, worker}, store::tests::temp_store}};

    use super::*;

    fn data() -> ReportData {
        let contract = contract(&owner());
        let week = week(&contract, 1);
        let ana = worker(&contract, "Ana");
        let luis = worker(&contract, "Luis");

        ReportData {
            week_number: 1,
            records: vec![
                record(&week, &luis, "tuesday", 3),
                record(&week, &ana, "monday", 5),
                record(&week, &ana, "monday", 9),
                record(&week, &luis, "monday", 1),
                record(&week, &luis, "tuesday", 7),
            ],
            workers: vec![ana, luis],
            non_working_days: vec![non_working_day::Model {
                id: Uuid::new_v4(),
                created_at: Local::now().into(),
                updated_at: Local::now().into(),
                contract_id: contract.id,
                date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                reason: "Rain".to_string(),
            }],
            expenses: vec![expense::Model {
                id: Uuid::new_v4(),
                created_at: Local::now().into(),
                updated_at: Local::now().into(),
                contract_id: contract.id,
                week_id: Some(week.id),
                name: "Cement".to_string(),
                cost: 50.0,
            }],
            contract,
        }
    }

    #[test]
    fn test_duplicate_days_show_once() {
        let sections = ReportSections::from(&data());

        let ana = &sections.workers[0];
        assert_eq!(ana.name, "Ana");
        assert_eq!(ana.days, vec![DayRow { day: "Monday".to_string(), units: 5, pay: 300.0 }]);
        assert_eq!(ana.total_units, 5);
        assert_eq!(ana.total_pay, 300.0);

        let luis = &sections.workers[1];
        assert_eq!(luis.days, vec![
            DayRow { day: "Monday".to_string(), units: 1, pay: 60.0 },
            DayRow { day: "Tuesday".to_string(), units: 3, pay: 180.0 },
        ]);
        assert_eq!(luis.total_units, 4);

        assert_eq!(sections.non_working_days, ["2024-01-03 - Rain"]);
        assert_eq!(sections.expenses, ["Cement: 50.00"]);
    }

    #[test]
    fn test_worker_without_records_gets_empty_table() {
        let mut data = data();
        data.records.clear();

        let sections = ReportSections::from(&data);
        assert_eq!(sections.workers.len(), 2);
        assert!(sections.workers.iter().all(|w| w.days.is_empty() && w.total_units == 0));
    }

    #[test]
    fn test_render_produces_pdf() {
        let document = render(&data());

        assert!(document.starts_with(b"%PDF-"));
    }

    #[actix_web::test]
    async fn test_generate_overwrites_previous_report() {
        let data = data();
        let week = crate::entity::week::Model {
            id: data.expenses[0].week_id.unwrap(),
            ..week(&data.contract, 1)
        };
        let (store, root) = temp_store();
        let store = Arc::new(store);

        let mut db = MockDatabase::new(DatabaseBackend::Postgres);
        for _ in 0..2 {
            db = db
                .append_query_results([ vec![ week.clone() ] ])
                .append_query_results([ data.workers.clone() ])
                .append_query_results([ data.records.clone() ])
                .append_query_results([ data.non_working_days.clone() ])
                .append_query_results([ data.expenses.clone() ]);
        }
        let db = db.into_connection();

        let first = generate(&db, store.clone(), &data.contract, 1).await.unwrap();
        let first_document = store.get(ReportKey { contract_id: data.contract.id, week_number: 1 }).unwrap();

        let second = generate(&db, store.clone(), &data.contract, 1).await.unwrap();

        assert_eq!(first, format!("/reports/{}/1", data.contract.id));
        assert_eq!(first, second);
        assert!(first_document.starts_with(b"%PDF-"));

        let files = fs::read_dir(root.join(data.contract.id.to_string())).unwrap().count();
        assert_eq!(files, 1);

        fs::remove_dir_all(root).unwrap();
    }

    #[actix_web::test]
    async fn test_generate_unknown_week() {
        let data = data();
        let (store, _) = temp_store();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([ Vec::<crate::entity::week::Model>::new() ])
            .into_connection();

        let err = generate(&db, Arc::new(store), &data.contract, 9).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }
}
