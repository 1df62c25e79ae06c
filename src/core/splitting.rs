use crate::adapters::sqlite::{documents as db, relationships as relationship_db, transfers};
use crate::core::documents::require_document;
use crate::core::requests::{SplitPart, SplitRequest, MAX_TITLE_LENGTH};
use crate::core::workflow::{ensure_holder, ensure_transition};
use crate::core::{audit, custody};
use crate::domain::model::{Document, DocumentStatus, EventType, RelationType, User, VersionType};
use crate::domain::numbering::{allocate_suffixes, child_tracking_number};
use crate::domain::workflow::WorkflowAction;
use crate::utils::error::{DocTrackError, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde_json::{json, Value};

/// 母文件 metadata 為底，部分自帶的欄位覆蓋
fn merge_metadata(parent: &Value, part: Option<&Value>) -> Value {
    let mut merged = match parent {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    if let Some(Value::Object(extra)) = part {
        for (key, value) in extra {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}

/// 未命名的部分沿用母文件標題加 "(Part X)"；母標題過長時截短，
/// 讓結果仍在 MAX_TITLE_LENGTH 個字元內
fn child_title(parent: &Document, part: &SplitPart, suffix: char) -> String {
    if let Some(title) = part.title.as_deref().map(str::trim) {
        if !title.is_empty() {
            return title.to_string();
        }
    }

    let tail = format!(" (Part {})", suffix);
    let room = MAX_TITLE_LENGTH.saturating_sub(tail.chars().count());
    let base: String = parent.title.chars().take(room).collect();
    format!("{}{}", base.trim_end(), tail)
}

/// 將文件拆成多份子文件；母文件狀態不變。
/// 需在同一個交易內呼叫，任何一份失敗整批回滾。
pub fn split(
    conn: &Connection,
    actor: &User,
    parent_id: i64,
    request: &SplitRequest,
    now: DateTime<Utc>,
) -> Result<Vec<Document>> {
    let parent = require_document(conn, parent_id)?;
    ensure_transition(&parent, WorkflowAction::Split)?;
    ensure_holder(actor, &parent, WorkflowAction::Split.as_str())?;

    if parent.parent_id.is_some() {
        return Err(DocTrackError::validation(
            "document_id",
            format!("{} is itself a split part and cannot be split again", parent.tracking_number),
        ));
    }
    if transfers::pending_for_document(conn, parent_id)?.is_some() {
        return Err(DocTrackError::conflict(format!(
            "document {} has a pending transfer",
            parent.tracking_number
        )));
    }

    let used = db::child_suffixes(conn, parent_id)?;
    let suffixes = allocate_suffixes(&used, request.parts.len())?;

    let mut children = Vec::with_capacity(suffixes.len());
    for (part, suffix) in request.parts.iter().zip(suffixes) {
        let tracking_number = child_tracking_number(&parent.tracking_number, suffix);
        let title = child_title(&parent, part, suffix);
        let metadata = merge_metadata(&parent.metadata, part.metadata.as_ref());
        let description = part.description.as_deref().or(parent.description.as_deref());

        let child_id = db::insert_document(
            conn,
            &db::NewDocument {
                tracking_number: &tracking_number,
                title: &title,
                description,
                document_type: &parent.document_type,
                status: DocumentStatus::Received,
                origin_department_id: actor.department_id,
                current_department_id: actor.department_id,
                current_user_id: Some(actor.id),
                created_by: actor.id,
                case_id: parent.case_id,
                parent_id: Some(parent.id),
                split_suffix: Some(suffix),
                metadata: &metadata,
                now,
            },
        )?;
        custody::assign(
            conn,
            child_id,
            VersionType::Original,
            actor.department_id,
            Some(actor.id),
            None,
            Some("split"),
            now,
        )?;
        relationship_db::insert_relationship(
            conn,
            child_id,
            parent.id,
            RelationType::SplitFrom,
            actor.id,
            now,
        )?;
        audit::record(
            conn,
            child_id,
            EventType::SplitChildCreated,
            Some(actor),
            json!({
                "parent_id": parent.id,
                "parent_tracking_number": parent.tracking_number,
                "suffix": suffix.to_string(),
            }),
            now,
        )?;
        children.push(require_document(conn, child_id)?);
    }

    let created: Vec<&str> = children.iter().map(|c| c.tracking_number.as_str()).collect();
    audit::record(
        conn,
        parent.id,
        EventType::Split,
        Some(actor),
        json!({ "children": created, "remarks": request.remarks }),
        now,
    )?;

    tracing::info!(
        "✂️ split {} into {} part(s)",
        parent.tracking_number,
        children.len()
    );
    Ok(children)
}
