//! Raw request payloads and the validated values the ledger operates on.
//!
//! Payload fields are all optional so a missing field is reported the same way as
//! an invalid one, with every offending field listed at once.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{consts::{DEFAULT_NON_WORKING_REASON, MAX_CONTRACT_WEEKS, MAX_DAY_LEN, MAX_NAME_LEN, MAX_REASON_LEN}, error::ValidationError, ledger::weeks};

fn required<T>(err: &mut ValidationError, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        err.push(field, "this field is required");
    }

    value
}

fn text(err: &mut ValidationError, field: &str, value: Option<String>, max_len: usize) -> Option<String> {
    let value = required(err, field, value)?;
    let value = value.trim();

    if value.is_empty() {
        err.push(field, "must not be blank");
        return None;
    }

    if value.chars().count() > max_len {
        err.push(field, format!("must be at most {max_len} characters"));
        return None;
    }

    Some(value.to_string())
}

fn amount(err: &mut ValidationError, field: &str, value: Option<f64>) -> Option<f64> {
    let value = required(err, field, value)?;

    if !value.is_finite() || value < 0.0 {
        err.push(field, "must be a non-negative number");
        return None;
    }

    Some(value)
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ContractPayload {
    pub name: Option<String>,
    pub trade: Option<String>,
    pub real_unit_price: Option<f64>,
    pub agreed_unit_price: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub tax_percent: Option<f64>,
    pub profit_margin_percent: Option<f64>,
    pub max_workers: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewContract {
    pub name: String,
    pub trade: String,
    pub real_unit_price: f64,
    pub agreed_unit_price: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub tax_percent: f64,
    /// Stored, never used in the profit formula
    pub profit_margin_percent: f64,
    /// Stored, not enforced
    pub max_workers: i32,
}

impl ContractPayload {
    pub fn validate(self) -> Result<NewContract, ValidationError> {
        let mut err = ValidationError::default();

        let name = text(&mut err, "name", self.name, MAX_NAME_LEN);
        let trade = text(&mut err, "trade", self.trade, MAX_NAME_LEN);
        let real_unit_price = amount(&mut err, "real_unit_price", self.real_unit_price);
        let agreed_unit_price = amount(&mut err, "agreed_unit_price", self.agreed_unit_price);
        let start_date = required(&mut err, "start_date", self.start_date);
        let end_date = required(&mut err, "end_date", self.end_date);
        let tax_percent = amount(&mut err, "tax_percent", self.tax_percent);
        let profit_margin_percent = amount(&mut err, "profit_margin_percent", self.profit_margin_percent);
        let max_workers = required(&mut err, "max_workers", self.max_workers)
            .filter(|max| {
                if *max < 0 {
                    err.push("max_workers", "must not be negative");
                }
                *max >= 0
            });

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                err.push("end_date", "must not be before start_date");
            } else if weeks::week_count(start, end) > MAX_CONTRACT_WEEKS {
                err.push("end_date", format!("contract must not span more than {MAX_CONTRACT_WEEKS} weeks"));
            }
        }

        match (name, trade, real_unit_price, agreed_unit_price, start_date, end_date, tax_percent, profit_margin_percent, max_workers) {
            (
                Some(name),
                Some(trade),
                Some(real_unit_price),
                Some(agreed_unit_price),
                Some(start_date),
                Some(end_date),
                Some(tax_percent),
                Some(profit_margin_percent),
                Some(max_workers),
            ) if err.is_empty() => Ok(NewContract {
                name,
                trade,
                real_unit_price,
                agreed_unit_price,
                start_date,
                end_date,
                tax_percent,
                profit_margin_percent,
                max_workers,
            }),
            _ => Err(err),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WorkerPayload {
    pub name: Option<String>,
    pub trade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorker {
    pub name: String,
    pub trade: String,
}

impl WorkerPayload {
    pub fn validate(self) -> Result<NewWorker, ValidationError> {
        let mut err = ValidationError::default();

        let name = text(&mut err, "name", self.name, MAX_NAME_LEN);
        let trade = text(&mut err, "trade", self.trade, MAX_NAME_LEN);

        match (name, trade) {
            (Some(name), Some(trade)) if err.is_empty() => Ok(NewWorker { name, trade }),
            _ => Err(err),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ExpensePayload {
    pub name: Option<String>,
    pub cost: Option<f64>,
    /// Leave empty for a contract-level expense
    pub week_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub name: String,
    pub cost: f64,
    pub week_id: Option<Uuid>,
}

impl ExpensePayload {
    pub fn validate(self) -> Result<NewExpense, ValidationError> {
        let mut err = ValidationError::default();

        let name = text(&mut err, "name", self.name, MAX_NAME_LEN);
        let cost = amount(&mut err, "cost", self.cost);

        match (name, cost) {
            (Some(name), Some(cost)) if err.is_empty() => Ok(NewExpense { name, cost, week_id: self.week_id }),
            _ => Err(err),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NonWorkingDayPayload {
    pub date: Option<NaiveDate>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNonWorkingDay {
    pub date: NaiveDate,
    pub reason: String,
}

impl NonWorkingDayPayload {
    pub fn validate(self) -> Result<NewNonWorkingDay, ValidationError> {
        let mut err = ValidationError::default();

        let date = required(&mut err, "date", self.date);
        let reason = match self.reason.as_deref().map(str::trim) {
            None | Some("") => Some(DEFAULT_NON_WORKING_REASON.to_string()),
            Some(reason) => text(&mut err, "reason", Some(reason.to_string()), MAX_REASON_LEN),
        };

        match (date, reason) {
            (Some(date), Some(reason)) if err.is_empty() => Ok(NewNonWorkingDay { date, reason }),
            _ => Err(err),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DailyRecordPayload {
    pub week_id: Option<Uuid>,
    pub worker_id: Option<Uuid>,
    pub day: Option<String>,
    pub units: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRecordInput {
    pub week_id: Uuid,
    pub worker_id: Uuid,
    pub day: String,
    pub units: i32,
}

impl DailyRecordPayload {
    pub fn validate(self) -> Result<DailyRecordInput, ValidationError> {
        let mut err = ValidationError::default();

        let week_id = required(&mut err, "week_id", self.week_id);
        let worker_id = required(&mut err, "worker_id", self.worker_id);
        let day = text(&mut err, "day", self.day, MAX_DAY_LEN);
        let units = match i32::try_from(self.units.unwrap_or(0)) {
            Ok(units) if units >= 0 => Some(units),
            Ok(_) => {
                err.push("units", "must not be negative");
                None
            },
            Err(_) => {
                err.push("units", "is out of range");
                None
            },
        };

        match (week_id, worker_id, day, units) {
            (Some(week_id), Some(worker_id), Some(day), Some(units)) if err.is_empty() => Ok(DailyRecordInput {
                week_id,
                worker_id,
                day,
                units,
            }),
            _ => Err(err),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterPayload {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterPayload {
    pub fn validate(self) -> Result<NewUser, ValidationError> {
        let mut err = ValidationError::default();

        let username = text(&mut err, "username", self.username, MAX_NAME_LEN);
        let email = self.email.map(|email| email.trim().to_string()).unwrap_or_default();
        if !email.is_empty() && !email.contains('@') {
            err.push("email", "is not a valid address");
        }
        let password = required(&mut err, "password", self.password)
            .filter(|password| {
                if password.is_empty() {
                    err.push("password", "must not be blank");
                }
                !password.is_empty()
            });

        match (username, password) {
            (Some(username), Some(password)) if err.is_empty() => Ok(NewUser { username, email, password }),
            _ => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract_payload() -> ContractPayload {
        ContractPayload {
            name: Some("  Bridge ".to_string()),
            trade: Some("Masonry".to_string()),
            real_unit_price: Some(100.0),
            agreed_unit_price: Some(60.0),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 10),
            tax_percent: Some(10.0),
            profit_margin_percent: Some(15.0),
            max_workers: Some(5),
        }
    }

    fn fields(err: ValidationError) -> Vec<String> {
        err.fields.into_iter().map(|f| f.field).collect()
    }

    #[test]
    fn test_contract_payload_validates() {
        let contract = contract_payload().validate().unwrap();

        assert_eq!(contract.name, "Bridge");
        assert_eq!(contract.end_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn test_contract_payload_rejects_endless_span() {
        let err = ContractPayload {
            start_date: NaiveDate::from_ymd_opt(1, 1, 1),
            end_date: NaiveDate::from_ymd_opt(9999, 12, 31),
            ..contract_payload()
        }.validate().unwrap_err();

        assert_eq!(fields(err), ["end_date"]);

        // Ten years is still fine
        let contract = ContractPayload {
            end_date: NaiveDate::from_ymd_opt(2033, 12, 1),
            ..contract_payload()
        }.validate().unwrap();
        assert_eq!(weeks::week_count(contract.start_date, contract.end_date), 518);

        // So is the very end of the calendar
        assert!(ContractPayload {
            start_date: NaiveDate::MAX.checked_sub_days(chrono::Days::new(2)),
            end_date: Some(NaiveDate::MAX),
            ..contract_payload()
        }.validate().is_ok());
    }

    #[test]
    fn test_contract_payload_collects_every_field() {
        let err = ContractPayload {
            name: Some("   ".to_string()),
            real_unit_price: Some(-1.0),
            tax_percent: Some(f64::NAN),
            ..contract_payload()
        }.validate().unwrap_err();

        assert_eq!(fields(err), ["name", "real_unit_price", "tax_percent"]);

        let err = ContractPayload::default().validate().unwrap_err();
        assert_eq!(err.fields.len(), 9);
    }

    #[test]
    fn test_contract_end_before_start() {
        let err = ContractPayload {
            end_date: NaiveDate::from_ymd_opt(2023, 12, 31),
            ..contract_payload()
        }.validate().unwrap_err();

        assert_eq!(fields(err), ["end_date"]);

        let same_day = ContractPayload {
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..contract_payload()
        }.validate();
        assert!(same_day.is_ok());
    }

    #[test]
    fn test_daily_record_units() {
        let payload = || DailyRecordPayload {
            week_id: Some(Uuid::new_v4()),
            worker_id: Some(Uuid::new_v4()),
            day: Some("monday".to_string()),
            units: None,
        };

        assert_eq!(payload().validate().unwrap().units, 0);
        assert_eq!(DailyRecordPayload { units: Some(12), ..payload() }.validate().unwrap().units, 12);

        let err = DailyRecordPayload { units: Some(-3), ..payload() }.validate().unwrap_err();
        assert_eq!(fields(err), ["units"]);

        let err = DailyRecordPayload { units: Some(i64::MAX), ..payload() }.validate().unwrap_err();
        assert_eq!(fields(err), ["units"]);

        let err = DailyRecordPayload { day: Some("wednesday-ish".to_string()), ..payload() }.validate().unwrap_err();
        assert_eq!(fields(err), ["day"]);
    }

    #[test]
    fn test_non_working_day_reason_defaults() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 3);

        let day = NonWorkingDayPayload { date, reason: None }.validate().unwrap();
        assert_eq!(day.reason, DEFAULT_NON_WORKING_REASON);

        let day = NonWorkingDayPayload { date, reason: Some("  ".to_string()) }.validate().unwrap();
        assert_eq!(day.reason, DEFAULT_NON_WORKING_REASON);

        let day = NonWorkingDayPayload { date, reason: Some("Rain".to_string()) }.validate().unwrap();
        assert_eq!(day.reason, "Rain");

        let err = NonWorkingDayPayload { date: None, reason: None }.validate().unwrap_err();
        assert_eq!(fields(err), ["date"]);
    }

    #[test]
    fn test_expense_cost_must_not_be_negative() {
        let err = ExpensePayload {
            name: Some("Cement".to_string()),
            cost: Some(-0.5),
            week_id: None,
        }.validate().unwrap_err();

        assert_eq!(fields(err), ["cost"]);
    }

    #[test]
    fn test_register_payload() {
        let user = RegisterPayload {
            username: Some("bob".to_string()),
            email: None,
            password: Some("secret".to_string()),
        }.validate().unwrap();
        assert_eq!(user.email, "");

        let err = RegisterPayload {
            username: Some("bob".to_string()),
            email: Some("not-an-email".to_string()),
            password: Some(String::new()),
        }.validate().unwrap_err();
        assert_eq!(fields(err), ["email", "password"]);
    }
}
