use super::rows::{self, TRANSFER_COLUMNS};
use crate::domain::model::{DocumentTransfer, TransferStatus, VersionType};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

#[allow(clippy::too_many_arguments)]
pub fn insert_transfer(
    conn: &Connection,
    document_id: i64,
    from_department_id: i64,
    from_user_id: i64,
    to_department_id: i64,
    to_user_id: Option<i64>,
    version_type: VersionType,
    remarks: Option<&str>,
    now: DateTime<Utc>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO document_transfers(document_id, from_department_id, from_user_id, \
         to_department_id, to_user_id, version_type, status, remarks, forwarded_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            document_id,
            from_department_id,
            from_user_id,
            to_department_id,
            to_user_id,
            version_type.as_str(),
            TransferStatus::Pending.as_str(),
            remarks,
            now
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_transfer(conn: &Connection, id: i64) -> rusqlite::Result<Option<DocumentTransfer>> {
    conn.query_row(
        &format!("SELECT {TRANSFER_COLUMNS} FROM document_transfers WHERE id=?1"),
        params![id],
        rows::transfer,
    )
    .optional()
}

pub fn pending_for_document(
    conn: &Connection,
    document_id: i64,
) -> rusqlite::Result<Option<DocumentTransfer>> {
    conn.query_row(
        &format!(
            "SELECT {TRANSFER_COLUMNS} FROM document_transfers \
             WHERE document_id=?1 AND status='pending' ORDER BY id DESC LIMIT 1"
        ),
        params![document_id],
        rows::transfer,
    )
    .optional()
}

/// 只有 pending 的轉送可以被結案；回傳受影響列數
pub fn resolve_transfer(
    conn: &Connection,
    id: i64,
    status: TransferStatus,
    resolved_by: i64,
    now: DateTime<Utc>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE document_transfers SET status=?2, resolved_by=?3, resolved_at=?4 \
         WHERE id=?1 AND status='pending'",
        params![id, status.as_str(), resolved_by, now],
    )
}

pub fn list_for_document(conn: &Connection, document_id: i64) -> rusqlite::Result<Vec<DocumentTransfer>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRANSFER_COLUMNS} FROM document_transfers WHERE document_id=?1 ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map(params![document_id], rows::transfer)?;
    rows.collect()
}

pub fn pending_forwarded_before(
    conn: &Connection,
    cutoff: DateTime<Utc>,
) -> rusqlite::Result<Vec<DocumentTransfer>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TRANSFER_COLUMNS} FROM document_transfers \
         WHERE status='pending' AND forwarded_at<?1 ORDER BY forwarded_at ASC, id ASC"
    ))?;
    let rows = stmt.query_map(params![cutoff], rows::transfer)?;
    rows.collect()
}

pub fn pending_incoming_by_department(conn: &Connection) -> rusqlite::Result<Vec<(i64, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT to_department_id, COUNT(1) FROM document_transfers \
         WHERE status='pending' GROUP BY to_department_id",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

pub fn count_pending_incoming(conn: &Connection, department_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(1) FROM document_transfers WHERE status='pending' AND to_department_id=?1",
        params![department_id],
        |row| row.get(0),
    )
}

pub fn count_pending_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(1) FROM document_transfers WHERE status='pending' AND to_user_id=?1",
        params![user_id],
        |row| row.get(0),
    )
}
