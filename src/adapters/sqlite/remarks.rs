use super::rows::{self, REMARK_COLUMNS};
use crate::domain::model::DocumentRemark;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

pub fn insert_remark(
    conn: &Connection,
    document_id: i64,
    parent_id: Option<i64>,
    author_id: i64,
    body: &str,
    now: DateTime<Utc>,
) -> rusqlite::Result<DocumentRemark> {
    conn.execute(
        "INSERT INTO document_remarks(document_id, parent_id, author_id, body, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![document_id, parent_id, author_id, body, now],
    )?;
    Ok(DocumentRemark {
        id: conn.last_insert_rowid(),
        document_id,
        parent_id,
        author_id,
        body: body.to_string(),
        created_at: now,
    })
}

pub fn find_remark(conn: &Connection, id: i64) -> rusqlite::Result<Option<DocumentRemark>> {
    conn.query_row(
        &format!("SELECT {REMARK_COLUMNS} FROM document_remarks WHERE id=?1"),
        params![id],
        rows::remark,
    )
    .optional()
}

pub fn for_document(conn: &Connection, document_id: i64) -> rusqlite::Result<Vec<DocumentRemark>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REMARK_COLUMNS} FROM document_remarks WHERE document_id=?1 ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map(params![document_id], rows::remark)?;
    rows.collect()
}
