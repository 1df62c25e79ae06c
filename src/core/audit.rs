use crate::adapters::sqlite::events as db;
use crate::domain::model::{DocumentEvent, EventType, User};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

/// 寫入一筆稽核事件，與主要操作在同一個交易內
pub fn record(
    conn: &Connection,
    document_id: i64,
    event_type: EventType,
    actor: Option<&User>,
    details: serde_json::Value,
    now: DateTime<Utc>,
) -> Result<i64> {
    let id = db::insert_event(
        conn,
        document_id,
        event_type,
        actor.map(|a| a.id),
        actor.map(|a| a.department_id),
        &details,
        now,
    )?;
    tracing::debug!("📝 event {} on document {}", event_type, document_id);
    Ok(id)
}

pub fn list(conn: &Connection, document_id: i64) -> Result<Vec<DocumentEvent>> {
    Ok(db::for_document(conn, document_id)?)
}
