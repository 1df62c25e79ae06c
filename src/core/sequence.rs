use crate::adapters::sqlite::sequences;
use crate::domain::numbering::{self, CASE_SCOPE, TRACKING_SCOPE};
use crate::utils::error::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rusqlite::Connection;

/// 依設定的時區偏移換算當地日期
pub fn local_date(now: DateTime<Utc>, utc_offset_minutes: i32) -> NaiveDate {
    match FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60)) {
        Some(offset) => now.with_timezone(&offset).date_naive(),
        None => now.date_naive(),
    }
}

pub fn next_tracking_number(
    conn: &Connection,
    now: DateTime<Utc>,
    utc_offset_minutes: i32,
) -> Result<String> {
    let date = local_date(now, utc_offset_minutes);
    let seq = sequences::next_value(conn, TRACKING_SCOPE, &numbering::tracking_period(date))?;
    numbering::tracking_number(date, seq)
}

pub fn next_case_number(
    conn: &Connection,
    now: DateTime<Utc>,
    utc_offset_minutes: i32,
) -> Result<String> {
    let date = local_date(now, utc_offset_minutes);
    let seq = sequences::next_value(conn, CASE_SCOPE, &numbering::case_period(date))?;
    numbering::case_number(date, seq)
}
