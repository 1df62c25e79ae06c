use super::rows::{self, EVENT_COLUMNS};
use crate::domain::model::{DocumentEvent, EventType};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

// 稽核紀錄只新增，不提供更新或刪除

pub fn insert_event(
    conn: &Connection,
    document_id: i64,
    event_type: EventType,
    actor_id: Option<i64>,
    department_id: Option<i64>,
    details: &serde_json::Value,
    now: DateTime<Utc>,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO document_events(document_id, event_type, actor_id, department_id, details, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            document_id,
            event_type.as_str(),
            actor_id,
            department_id,
            details.to_string(),
            now
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn for_document(conn: &Connection, document_id: i64) -> rusqlite::Result<Vec<DocumentEvent>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM document_events WHERE document_id=?1 ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map(params![document_id], rows::event)?;
    rows.collect()
}
