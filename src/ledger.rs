//! Contract bookkeeping: contracts and their weeks, workers, daily records,
//! expenses and non-working days, plus the numbers and reports derived from them.
//!
//! Every entry point takes an already owner-resolved contract (or the owner itself),
//! so nothing in here can reach rows of another owner.

pub mod contracts;
pub mod expenses;
pub mod input;
pub mod non_working_days;
pub mod profit;
pub mod records;
pub mod report;
pub mod store;
pub mod weeks;
pub mod workers;
