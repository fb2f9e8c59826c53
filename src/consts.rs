/// Stored when a non-working day comes without a reason
pub const DEFAULT_NON_WORKING_REASON: &str = "unspecified";

/// Lifetime of an issued token, in weeks
pub const TOKEN_LIFETIME_WEEKS: i64 = 1;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_REASON_LEN: usize = 255;
pub const MAX_DAY_LEN: usize = 10;

pub const DAYS_PER_WEEK: i64 = 7;

/// Longest contract accepted, ten years of weeks
pub const MAX_CONTRACT_WEEKS: i64 = 520;
