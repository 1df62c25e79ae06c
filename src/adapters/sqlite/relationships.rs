use super::rows::{self, RELATIONSHIP_COLUMNS};
use crate::domain::model::{DocumentRelationship, RelationType};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

pub fn insert_relationship(
    conn: &Connection,
    from_document_id: i64,
    to_document_id: i64,
    relation: RelationType,
    created_by: i64,
    now: DateTime<Utc>,
) -> rusqlite::Result<DocumentRelationship> {
    conn.execute(
        "INSERT INTO document_relationships(from_document_id, to_document_id, relation, created_by, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![from_document_id, to_document_id, relation.as_str(), created_by, now],
    )?;
    Ok(DocumentRelationship {
        id: conn.last_insert_rowid(),
        from_document_id,
        to_document_id,
        relation,
        created_by,
        created_at: now,
    })
}

pub fn exists(
    conn: &Connection,
    from_document_id: i64,
    to_document_id: i64,
    relation: RelationType,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM document_relationships \
         WHERE from_document_id=?1 AND to_document_id=?2 AND relation=?3)",
        params![from_document_id, to_document_id, relation.as_str()],
        |row| row.get(0),
    )
}

pub fn find_relationship(conn: &Connection, id: i64) -> rusqlite::Result<Option<DocumentRelationship>> {
    conn.query_row(
        &format!("SELECT {RELATIONSHIP_COLUMNS} FROM document_relationships WHERE id=?1"),
        params![id],
        rows::relationship,
    )
    .optional()
}

pub fn delete_relationship(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM document_relationships WHERE id=?1", params![id])
}

/// 兩個方向的關聯都列出
pub fn for_document(conn: &Connection, document_id: i64) -> rusqlite::Result<Vec<DocumentRelationship>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RELATIONSHIP_COLUMNS} FROM document_relationships \
         WHERE from_document_id=?1 OR to_document_id=?1 ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map(params![document_id], rows::relationship)?;
    rows.collect()
}
