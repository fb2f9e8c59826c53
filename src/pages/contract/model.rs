use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{entity::{contract, week}, ledger::profit::Profitability};

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ContractView {
    #[serde(flatten)]
    pub(super) contract: contract::Model,
    pub(super) profitability: Profitability,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ContractCreated {
    #[serde(flatten)]
    pub(super) contract: contract::Model,
    pub(super) weeks: Vec<week::Model>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct RecordsQuery {
    pub(super) week_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ReportQuery {
    /// Week number, the first week when omitted
    pub(super) week: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ReportLink {
    pub(super) report_url: String,
}
