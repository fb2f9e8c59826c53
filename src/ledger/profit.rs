use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{contract, daily_record, expense, prelude::*, week};

/// Aggregates of a single week
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeekTotals {
    pub total_units: i64,
    pub total_expenses: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Profitability {
    pub total_units: i64,
    pub theoretical_revenue: f64,
    pub worker_payouts: f64,
    pub taxes: f64,
    /// Week-tagged expenses only
    pub expenses: f64,
    pub net_profit: f64,
    /// Expenses without a week. Reported, but NOT subtracted from `net_profit`
    pub unassigned_expenses: f64,
}

impl Profitability {
    pub fn compute(contract: &contract::Model, weeks: &[WeekTotals], unassigned_expenses: f64) -> Self {
        let total_units = weeks.iter().map(|w| w.total_units).sum::<i64>();
        let expenses = weeks.iter().map(|w| w.total_expenses).sum::<f64>();

        let theoretical_revenue = total_units as f64 * contract.real_unit_price;
        let worker_payouts = total_units as f64 * contract.agreed_unit_price;
        let taxes = theoretical_revenue * (contract.tax_percent / 100.0);

        Self {
            total_units,
            theoretical_revenue,
            worker_payouts,
            taxes,
            expenses,
            net_profit: theoretical_revenue - worker_payouts - taxes - expenses,
            unassigned_expenses,
        }
    }
}

/// Recomputes the profitability of `contract` from its stored rows
pub async fn load(db: &impl ConnectionTrait, contract: &contract::Model) -> Result<Profitability, DbErr> {
    let weeks = Week::find()
        .filter(week::Column::ContractId.eq(contract.id))
        .all(db).await?;

    let mut totals = weeks.iter()
        .map(|week| (week.id, WeekTotals::default()))
        .collect::<HashMap<Uuid, WeekTotals>>();

    let records = DailyRecord::find()
        .filter(daily_record::Column::WeekId.is_in(totals.keys().copied().collect::<Vec<_>>()))
        .all(db).await?;

    for record in records {
        if let Some(week) = totals.get_mut(&record.week_id) {
            week.total_units += record.units as i64;
        }
    }

    let expenses = Expense::find()
        .filter(expense::Column::ContractId.eq(contract.id))
        .all(db).await?;

    let mut unassigned = 0.0;
    for expense in expenses {
        match expense.week_id.and_then(|id| totals.get_mut(&id)) {
            Some(week) => week.total_expenses += expense.cost,
            None => unassigned += expense.cost,
        }
    }

    Ok(Profitability::compute(contract, &totals.into_values().collect::<Vec<_>>(), unassigned))
}
