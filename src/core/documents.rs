use crate::adapters::sqlite::{cases as case_db, documents as db, transfers as transfer_db};
use crate::core::requests::{CreateDocumentRequest, UpdateDocumentRequest};
use crate::core::workflow::ensure_holder;
use crate::core::{audit, custody, directory, sequence};
use crate::domain::model::{
    CaseStatus, Document, DocumentFilter, DocumentStatus, DocumentTransfer, EventType, User,
    VersionType,
};
use crate::utils::error::{DocTrackError, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// 搜尋建議至少需要的字元數
pub const MIN_SUGGESTION_QUERY: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: i64,
    pub tracking_number: String,
    pub title: String,
    pub status: String,
}

pub fn require_document(conn: &Connection, id: i64) -> Result<Document> {
    db::find_document(conn, id)?.ok_or_else(|| DocTrackError::not_found("document", id))
}

pub fn require_by_tracking_number(conn: &Connection, tracking: &str) -> Result<Document> {
    db::find_by_tracking_number(conn, tracking.trim())?
        .ok_or_else(|| DocTrackError::not_found("document", tracking.trim()))
}

pub fn create(
    conn: &Connection,
    actor: &User,
    request: &CreateDocumentRequest,
    utc_offset_minutes: i32,
    now: DateTime<Utc>,
) -> Result<Document> {
    directory::require_active_department(conn, actor.department_id)?;

    if let Some(case_id) = request.case_id {
        let case = case_db::find_case(conn, case_id)?
            .ok_or_else(|| DocTrackError::not_found("case", case_id))?;
        if case.status != CaseStatus::Open {
            return Err(DocTrackError::validation(
                "case_id",
                format!("Case {} is closed", case.case_number),
            ));
        }
    }

    let tracking_number = sequence::next_tracking_number(conn, now, utc_offset_minutes)?;
    let metadata = request.metadata.clone().unwrap_or_else(|| json!({}));
    let id = db::insert_document(
        conn,
        &db::NewDocument {
            tracking_number: &tracking_number,
            title: request.title.trim(),
            description: request.description.as_deref(),
            document_type: request.document_type.trim(),
            status: DocumentStatus::Received,
            origin_department_id: actor.department_id,
            current_department_id: actor.department_id,
            current_user_id: Some(actor.id),
            created_by: actor.id,
            case_id: request.case_id,
            parent_id: None,
            split_suffix: None,
            metadata: &metadata,
            now,
        },
    )?;

    custody::assign(
        conn,
        id,
        VersionType::Original,
        actor.department_id,
        Some(actor.id),
        None,
        Some("intake"),
        now,
    )?;
    audit::record(
        conn,
        id,
        EventType::Created,
        Some(actor),
        json!({ "tracking_number": tracking_number, "case_id": request.case_id }),
        now,
    )?;

    require_document(conn, id)
}

pub fn update(
    conn: &Connection,
    actor: &User,
    document_id: i64,
    request: &UpdateDocumentRequest,
    now: DateTime<Utc>,
) -> Result<Document> {
    let mut document = require_document(conn, document_id)?;
    if document.status.is_terminal() {
        return Err(DocTrackError::transition("update", document.status));
    }
    ensure_holder(actor, &document, "update")?;

    let mut changed = Vec::new();
    if let Some(title) = &request.title {
        document.title = title.trim().to_string();
        changed.push("title");
    }
    if let Some(description) = &request.description {
        document.description = Some(description.clone());
        changed.push("description");
    }
    if let Some(document_type) = &request.document_type {
        document.document_type = document_type.trim().to_string();
        changed.push("document_type");
    }
    if let Some(metadata) = &request.metadata {
        document.metadata = metadata.clone();
        changed.push("metadata");
    }
    if changed.is_empty() {
        return Ok(document);
    }

    db::update_details(conn, &document, now)?;
    audit::record(
        conn,
        document_id,
        EventType::Updated,
        Some(actor),
        json!({ "fields": changed }),
        now,
    )?;
    require_document(conn, document_id)
}

pub fn list(conn: &Connection, filter: &DocumentFilter) -> Result<Vec<Document>> {
    Ok(db::list_documents(conn, filter)?)
}

pub fn children(conn: &Connection, document_id: i64) -> Result<Vec<Document>> {
    require_document(conn, document_id)?;
    Ok(db::children(conn, document_id)?)
}

pub fn transfers(conn: &Connection, document_id: i64) -> Result<Vec<DocumentTransfer>> {
    require_document(conn, document_id)?;
    Ok(transfer_db::list_for_document(conn, document_id)?)
}

pub fn suggestions(conn: &Connection, query: &str, limit: usize) -> Result<Vec<Suggestion>> {
    if query.trim().chars().count() < MIN_SUGGESTION_QUERY {
        return Ok(Vec::new());
    }
    let docs = db::suggestions(conn, query, limit)?;
    Ok(docs
        .into_iter()
        .map(|d| Suggestion {
            id: d.id,
            tracking_number: d.tracking_number,
            title: d.title,
            status: d.status.to_string(),
        })
        .collect())
}
