use crate::adapters::sqlite::{documents as doc_db, relationships as db, transfers};
use crate::core::audit;
use crate::core::documents::require_document;
use crate::core::requests::{LinkRequest, MergeRequest};
use crate::core::workflow::{ensure_holder, ensure_transition};
use crate::domain::model::{Document, DocumentRelationship, EventType, RelationType, User};
use crate::domain::workflow::WorkflowAction;
use crate::utils::error::{DocTrackError, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde_json::json;

pub fn for_document(conn: &Connection, document_id: i64) -> Result<Vec<DocumentRelationship>> {
    require_document(conn, document_id)?;
    Ok(db::for_document(conn, document_id)?)
}

pub fn link(
    conn: &Connection,
    actor: &User,
    from_document_id: i64,
    request: &LinkRequest,
    now: DateTime<Utc>,
) -> Result<DocumentRelationship> {
    if !request.relation.is_user_managed() {
        return Err(DocTrackError::validation(
            "relation",
            format!("Relation '{}' is managed by the system", request.relation),
        ));
    }
    if from_document_id == request.to_document_id {
        return Err(DocTrackError::validation(
            "to_document_id",
            "A document cannot be linked to itself",
        ));
    }

    let from = require_document(conn, from_document_id)?;
    let to = require_document(conn, request.to_document_id)?;
    ensure_holder(actor, &from, "link documents")?;

    if db::exists(conn, from.id, to.id, request.relation)? {
        return Err(DocTrackError::conflict(format!(
            "{} is already {} {}",
            from.tracking_number, request.relation, to.tracking_number
        )));
    }

    let relationship = db::insert_relationship(conn, from.id, to.id, request.relation, actor.id, now)?;
    audit::record(
        conn,
        from.id,
        EventType::Linked,
        Some(actor),
        json!({
            "relationship_id": relationship.id,
            "relation": request.relation,
            "to_document_id": to.id,
            "to_tracking_number": to.tracking_number,
        }),
        now,
    )?;
    Ok(relationship)
}

pub fn unlink(
    conn: &Connection,
    actor: &User,
    relationship_id: i64,
    now: DateTime<Utc>,
) -> Result<DocumentRelationship> {
    let relationship = db::find_relationship(conn, relationship_id)?
        .ok_or_else(|| DocTrackError::not_found("relationship", relationship_id))?;
    if !relationship.relation.is_user_managed() {
        return Err(DocTrackError::validation(
            "relation",
            format!("Relation '{}' cannot be removed", relationship.relation),
        ));
    }

    let from = require_document(conn, relationship.from_document_id)?;
    ensure_holder(actor, &from, "unlink documents")?;

    db::delete_relationship(conn, relationship.id)?;
    audit::record(
        conn,
        from.id,
        EventType::Unlinked,
        Some(actor),
        json!({
            "relationship_id": relationship.id,
            "relation": relationship.relation,
            "to_document_id": relationship.to_document_id,
        }),
        now,
    )?;
    Ok(relationship)
}

/// 將來源文件併入目標文件；所有文件都需由操作者的部門持有
pub fn merge(
    conn: &Connection,
    actor: &User,
    target_id: i64,
    request: &MergeRequest,
    now: DateTime<Utc>,
) -> Result<Document> {
    if request.source_ids.contains(&target_id) {
        return Err(DocTrackError::validation(
            "source_ids",
            "The merge target cannot be one of its sources",
        ));
    }

    let target = require_document(conn, target_id)?;
    if !target.status.is_actionable() {
        return Err(DocTrackError::transition("merge into", target.status));
    }
    ensure_holder(actor, &target, "merge documents")?;

    let mut sources = Vec::with_capacity(request.source_ids.len());
    for source_id in &request.source_ids {
        let source = require_document(conn, *source_id)?;
        let next = ensure_transition(&source, WorkflowAction::Merge)?;
        ensure_holder(actor, &source, WorkflowAction::Merge.as_str())?;
        if transfers::pending_for_document(conn, source.id)?.is_some() {
            return Err(DocTrackError::conflict(format!(
                "document {} has a pending transfer",
                source.tracking_number
            )));
        }
        sources.push((source, next));
    }

    for (source, next) in &sources {
        doc_db::update_status(conn, source.id, *next, now)?;
        db::insert_relationship(
            conn,
            source.id,
            target.id,
            RelationType::MergedInto,
            actor.id,
            now,
        )?;
        audit::record(
            conn,
            source.id,
            EventType::Merged,
            Some(actor),
            json!({
                "target_id": target.id,
                "target_tracking_number": target.tracking_number,
                "remarks": request.remarks,
            }),
            now,
        )?;
    }

    let merged: Vec<&str> = sources
        .iter()
        .map(|(s, _)| s.tracking_number.as_str())
        .collect();
    audit::record(
        conn,
        target.id,
        EventType::MergeTarget,
        Some(actor),
        json!({ "sources": merged, "remarks": request.remarks }),
        now,
    )?;

    tracing::info!(
        "🔗 merged {} document(s) into {}",
        sources.len(),
        target.tracking_number
    );
    require_document(conn, target.id)
}
