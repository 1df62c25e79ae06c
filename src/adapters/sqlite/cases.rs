use super::rows::{self, CASE_COLUMNS};
use crate::domain::model::{CaseStatus, DocumentCase};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

pub fn insert_case(
    conn: &Connection,
    case_number: &str,
    title: &str,
    description: Option<&str>,
    created_by: i64,
    now: DateTime<Utc>,
) -> rusqlite::Result<DocumentCase> {
    conn.execute(
        "INSERT INTO document_cases(case_number, title, description, status, created_by, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            case_number,
            title,
            description,
            CaseStatus::Open.as_str(),
            created_by,
            now
        ],
    )?;
    Ok(DocumentCase {
        id: conn.last_insert_rowid(),
        case_number: case_number.to_string(),
        title: title.to_string(),
        description: description.map(str::to_string),
        status: CaseStatus::Open,
        created_by,
        created_at: now,
        closed_at: None,
    })
}

pub fn find_case(conn: &Connection, id: i64) -> rusqlite::Result<Option<DocumentCase>> {
    conn.query_row(
        &format!("SELECT {CASE_COLUMNS} FROM document_cases WHERE id=?1"),
        params![id],
        rows::document_case,
    )
    .optional()
}

pub fn close_case(conn: &Connection, id: i64, now: DateTime<Utc>) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE document_cases SET status=?2, closed_at=?3 WHERE id=?1 AND status='open'",
        params![id, CaseStatus::Closed.as_str(), now],
    )
}
