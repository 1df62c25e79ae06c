use crate::utils::error::{DocTrackError, Result};
use chrono::{Datelike, NaiveDate};

pub const TRACKING_SCOPE: &str = "tracking";
pub const CASE_SCOPE: &str = "case";

/// 每日追蹤號上限（3 位數）
pub const MAX_DAILY_SEQUENCE: i64 = 999;
/// 每年案件號上限（4 位數）
pub const MAX_YEARLY_CASE_SEQUENCE: i64 = 9999;
/// A..=Z
pub const SPLIT_SUFFIX_CAPACITY: usize = 26;

/// 追蹤號序列的期間鍵，例如 241017
pub fn tracking_period(date: NaiveDate) -> String {
    date.format("%y%m%d").to_string()
}

pub fn case_period(date: NaiveDate) -> String {
    format!("{:04}", date.year())
}

/// YYMMDD + 三位數流水號
pub fn tracking_number(date: NaiveDate, seq: i64) -> Result<String> {
    let period = tracking_period(date);
    if !(1..=MAX_DAILY_SEQUENCE).contains(&seq) {
        return Err(DocTrackError::SequenceExhausted {
            scope: TRACKING_SCOPE.to_string(),
            period,
        });
    }
    Ok(format!("{}{:03}", period, seq))
}

pub fn case_number(date: NaiveDate, seq: i64) -> Result<String> {
    let period = case_period(date);
    if !(1..=MAX_YEARLY_CASE_SEQUENCE).contains(&seq) {
        return Err(DocTrackError::SequenceExhausted {
            scope: CASE_SCOPE.to_string(),
            period,
        });
    }
    Ok(format!("CASE-{}-{:04}", period, seq))
}

pub fn child_tracking_number(parent: &str, suffix: char) -> String {
    format!("{}-{}", parent, suffix)
}

fn suffix_index(suffix: char) -> Option<usize> {
    if suffix.is_ascii_uppercase() {
        Some((suffix as u8 - b'A') as usize)
    } else {
        None
    }
}

/// 分配拆分後綴。新字母從母文件已用過的最大字母之後開始，
/// 用過的字母不回收；超出 Z 則整批失敗。
pub fn allocate_suffixes(used: &[char], count: usize) -> Result<Vec<char>> {
    if count == 0 {
        return Err(DocTrackError::validation(
            "parts",
            "At least one part is required to split a document",
        ));
    }

    let next = match used.iter().filter_map(|c| suffix_index(*c)).max() {
        Some(highest) => highest + 1,
        None => 0,
    };
    let available = SPLIT_SUFFIX_CAPACITY.saturating_sub(next);
    if count > available {
        return Err(DocTrackError::SplitCapacityExceeded {
            requested: count,
            available,
        });
    }

    Ok((next..next + count).map(|i| (b'A' + i as u8) as char).collect())
}
