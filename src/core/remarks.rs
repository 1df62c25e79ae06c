use crate::adapters::sqlite::remarks as db;
use crate::core::requests::RemarkRequest;
use crate::core::{audit, documents::require_document};
use crate::domain::model::{DocumentRemark, EventType, RemarkThread, User};
use crate::utils::error::{DocTrackError, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde_json::json;
use std::collections::HashMap;

pub fn add(
    conn: &Connection,
    actor: &User,
    document_id: i64,
    request: &RemarkRequest,
    now: DateTime<Utc>,
) -> Result<DocumentRemark> {
    let document = require_document(conn, document_id)?;
    if let Some(parent_id) = request.parent_id {
        let parent = db::find_remark(conn, parent_id)?
            .ok_or_else(|| DocTrackError::not_found("remark", parent_id))?;
        if parent.document_id != document.id {
            return Err(DocTrackError::validation(
                "parent_id",
                "Replies must belong to the same document",
            ));
        }
    }

    let remark = db::insert_remark(
        conn,
        document.id,
        request.parent_id,
        actor.id,
        request.body.trim(),
        now,
    )?;
    audit::record(
        conn,
        document.id,
        EventType::RemarkAdded,
        Some(actor),
        json!({ "remark_id": remark.id, "parent_id": remark.parent_id }),
        now,
    )?;
    Ok(remark)
}

/// 依建立順序組成留言樹
pub fn build_thread(remarks: Vec<DocumentRemark>) -> Vec<RemarkThread> {
    let mut by_parent: HashMap<Option<i64>, Vec<DocumentRemark>> = HashMap::new();
    for remark in remarks {
        by_parent.entry(remark.parent_id).or_default().push(remark);
    }
    attach(&mut by_parent, None)
}

fn attach(
    by_parent: &mut HashMap<Option<i64>, Vec<DocumentRemark>>,
    parent_id: Option<i64>,
) -> Vec<RemarkThread> {
    let mut level = by_parent.remove(&parent_id).unwrap_or_default();
    level.sort_by_key(|r| (r.created_at, r.id));
    level
        .into_iter()
        .map(|remark| {
            let replies = attach(by_parent, Some(remark.id));
            RemarkThread { remark, replies }
        })
        .collect()
}

pub fn thread(conn: &Connection, document_id: i64) -> Result<Vec<RemarkThread>> {
    require_document(conn, document_id)?;
    Ok(build_thread(db::for_document(conn, document_id)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn remark(id: i64, parent_id: Option<i64>, minute: i64) -> DocumentRemark {
        DocumentRemark {
            id,
            document_id: 1,
            parent_id,
            author_id: 1,
            body: format!("remark {}", id),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(minute),
        }
    }

    #[test]
    fn test_build_thread_nests_replies() {
        let remarks = vec![
            remark(1, None, 0),
            remark(2, Some(1), 1),
            remark(3, None, 2),
            remark(4, Some(2), 3),
        ];
        let tree = build_thread(remarks);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].remark.id, 1);
        assert_eq!(tree[0].replies[0].remark.id, 2);
        assert_eq!(tree[0].replies[0].replies[0].remark.id, 4);
        assert!(tree[1].replies.is_empty());
    }

    #[test]
    fn test_build_thread_orders_by_creation() {
        let tree = build_thread(vec![remark(5, None, 10), remark(6, None, 1)]);
        let ids: Vec<i64> = tree.iter().map(|t| t.remark.id).collect();
        assert_eq!(ids, vec![6, 5]);
    }
}
