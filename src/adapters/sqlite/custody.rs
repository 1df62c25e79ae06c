use super::rows::{self, COPY_COLUMNS, CUSTODY_COLUMNS};
use crate::domain::model::{CopyStatus, DocumentCopy, DocumentCustody, VersionType};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

pub fn current_custody(
    conn: &Connection,
    document_id: i64,
    version_type: VersionType,
) -> rusqlite::Result<Option<DocumentCustody>> {
    conn.query_row(
        &format!(
            "SELECT {CUSTODY_COLUMNS} FROM document_custodies \
             WHERE document_id=?1 AND version_type=?2 AND is_current=1 \
             ORDER BY id DESC LIMIT 1"
        ),
        params![document_id, version_type.as_str()],
        rows::custody,
    )
    .optional()
}

/// 結束目前保管紀錄；回傳受影響列數
pub fn release_current(
    conn: &Connection,
    document_id: i64,
    version_type: VersionType,
    now: DateTime<Utc>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE document_custodies SET is_current=0, released_at=?3 \
         WHERE document_id=?1 AND version_type=?2 AND is_current=1",
        params![document_id, version_type.as_str(), now],
    )
}

#[allow(clippy::too_many_arguments)]
pub fn insert_current(
    conn: &Connection,
    document_id: i64,
    version_type: VersionType,
    department_id: i64,
    user_id: Option<i64>,
    copy_id: Option<i64>,
    notes: Option<&str>,
    now: DateTime<Utc>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO document_custodies(document_id, version_type, department_id, user_id, copy_id, \
         is_current, received_at, notes) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?7)",
        params![
            document_id,
            version_type.as_str(),
            department_id,
            user_id,
            copy_id,
            now,
            notes
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_custody(conn: &Connection, id: i64) -> rusqlite::Result<Option<DocumentCustody>> {
    conn.query_row(
        &format!("SELECT {CUSTODY_COLUMNS} FROM document_custodies WHERE id=?1"),
        params![id],
        rows::custody,
    )
    .optional()
}

pub fn history(conn: &Connection, document_id: i64) -> rusqlite::Result<Vec<DocumentCustody>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CUSTODY_COLUMNS} FROM document_custodies WHERE document_id=?1 ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map(params![document_id], rows::custody)?;
    rows.collect()
}

pub fn count_current(
    conn: &Connection,
    document_id: i64,
    version_type: VersionType,
) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(1) FROM document_custodies \
         WHERE document_id=?1 AND version_type=?2 AND is_current=1",
        params![document_id, version_type.as_str()],
        |row| row.get(0),
    )
}

pub fn next_copy_number(conn: &Connection, document_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(copy_number), 0) + 1 FROM document_copies WHERE document_id=?1",
        params![document_id],
        |row| row.get(0),
    )
}

pub fn insert_copy(
    conn: &Connection,
    document_id: i64,
    copy_number: i64,
    department_id: i64,
    issued_by: i64,
    purpose: Option<&str>,
    now: DateTime<Utc>,
) -> rusqlite::Result<DocumentCopy> {
    conn.execute(
        "INSERT INTO document_copies(document_id, copy_number, department_id, issued_by, purpose, \
         status, issued_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            document_id,
            copy_number,
            department_id,
            issued_by,
            purpose,
            CopyStatus::Issued.as_str(),
            now
        ],
    )?;
    Ok(DocumentCopy {
        id: conn.last_insert_rowid(),
        document_id,
        copy_number,
        department_id,
        issued_by,
        purpose: purpose.map(str::to_string),
        status: CopyStatus::Issued,
        issued_at: now,
        returned_at: None,
    })
}

pub fn find_copy(conn: &Connection, id: i64) -> rusqlite::Result<Option<DocumentCopy>> {
    conn.query_row(
        &format!("SELECT {COPY_COLUMNS} FROM document_copies WHERE id=?1"),
        params![id],
        rows::copy,
    )
    .optional()
}

pub fn mark_copy_returned(conn: &Connection, id: i64, now: DateTime<Utc>) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE document_copies SET status=?2, returned_at=?3 WHERE id=?1 AND status='issued'",
        params![id, CopyStatus::Returned.as_str(), now],
    )
}

pub fn copies_for_document(conn: &Connection, document_id: i64) -> rusqlite::Result<Vec<DocumentCopy>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COPY_COLUMNS} FROM document_copies WHERE document_id=?1 ORDER BY copy_number ASC"
    ))?;
    let rows = stmt.query_map(params![document_id], rows::copy)?;
    rows.collect()
}

pub fn move_copy(conn: &Connection, id: i64, department_id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE document_copies SET department_id=?2 WHERE id=?1",
        params![id, department_id],
    )
}
