use rusqlite::{params, Connection};

/// 遞增 (scope, period) 的計數並回傳新值。
/// 呼叫端必須在 IMMEDIATE 交易中執行，寫鎖在交易開始時就已取得。
pub fn next_value(conn: &Connection, scope: &str, period: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "INSERT INTO sequences(scope, period, last_value) VALUES (?1, ?2, 1) \
         ON CONFLICT(scope, period) DO UPDATE SET last_value = last_value + 1 \
         RETURNING last_value",
        params![scope, period],
        |row| row.get(0),
    )
}

pub fn current_value(conn: &Connection, scope: &str, period: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(last_value), 0) FROM sequences WHERE scope=?1 AND period=?2",
        params![scope, period],
        |row| row.get(0),
    )
}
