use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::error;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveMessageModel {
    pub message_id: Uuid,
    pub to_user_id: Uuid,
    #[validate(length(min = 1, max = 4000, message = "Message must be 1 to 4000 characters"))]
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DayQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MonthQuery {
    #[validate(length(equal = 7, message = "Month must look like YYYY-MM"))]
    pub month: String,
}

/// `[start, end)` of a UTC calendar day. The last representable date has no end.
pub fn day_bounds(
    date: NaiveDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>), error::SystemError> {
    let next =
        date.succ_opt().ok_or_else(|| error::SystemError::bad_request("Date out of range"))?;
    Ok((midnight(date), midnight(next)))
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// Parses `YYYY-MM` into the `[start, end)` range of that UTC month.
pub fn month_bounds(month: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), error::SystemError> {
    let invalid = || error::SystemError::bad_request("Month must look like YYYY-MM");

    let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map_err(|_| invalid())?;
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .ok_or_else(invalid)?;

    Ok((midnight(first), midnight(next)))
}
