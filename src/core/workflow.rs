use crate::adapters::sqlite::{documents as doc_db, transfers as db};
use crate::core::directory::{require_active_department, require_user};
use crate::core::documents::require_document;
use crate::core::requests::{ActionRequest, ForwardRequest};
use crate::core::{audit, custody};
use crate::domain::model::{
    Document, DocumentStatus, DocumentTransfer, EventType, TransferStatus, User, VersionType,
};
use crate::domain::workflow::{next_status, WorkflowAction};
use crate::utils::error::{DocTrackError, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde_json::json;

/// 操作者必須屬於文件目前所在部門（管理者例外）
pub fn ensure_holder(actor: &User, document: &Document, action: &str) -> Result<()> {
    if actor.is_admin() || actor.department_id == document.current_department_id {
        Ok(())
    } else {
        Err(DocTrackError::unauthorized(
            action,
            format!(
                "document {} is held by department {}",
                document.tracking_number, document.current_department_id
            ),
        ))
    }
}

/// 查轉移表，不合法時回傳 InvalidWorkflowTransition
pub fn ensure_transition(document: &Document, action: WorkflowAction) -> Result<DocumentStatus> {
    next_status(document.status, action)
        .ok_or_else(|| DocTrackError::transition(action.as_str(), document.status))
}

fn require_transfer(conn: &Connection, transfer_id: i64) -> Result<DocumentTransfer> {
    db::find_transfer(conn, transfer_id)?.ok_or_else(|| DocTrackError::not_found("transfer", transfer_id))
}

/// 取得仍待處理的轉送與其文件
fn pending_transfer(
    conn: &Connection,
    transfer_id: i64,
    action: WorkflowAction,
) -> Result<(DocumentTransfer, Document)> {
    let transfer = require_transfer(conn, transfer_id)?;
    if transfer.status != TransferStatus::Pending {
        return Err(DocTrackError::transition(
            action.as_str(),
            format!("transfer {}", transfer.status),
        ));
    }
    let document = require_document(conn, transfer.document_id)?;
    Ok((transfer, document))
}

/// 收件方：目標部門成員；若指定收件人則必須是本人
fn ensure_recipient(actor: &User, transfer: &DocumentTransfer, action: WorkflowAction) -> Result<()> {
    if actor.is_admin() {
        return Ok(());
    }
    if actor.department_id != transfer.to_department_id {
        return Err(DocTrackError::unauthorized(
            action.as_str(),
            format!(
                "transfer {} is addressed to department {}",
                transfer.id, transfer.to_department_id
            ),
        ));
    }
    match transfer.to_user_id {
        Some(user_id) if user_id != actor.id => Err(DocTrackError::unauthorized(
            action.as_str(),
            format!("transfer {} is addressed to user {}", transfer.id, user_id),
        )),
        _ => Ok(()),
    }
}

fn resolve(
    conn: &Connection,
    transfer: &DocumentTransfer,
    status: TransferStatus,
    actor: &User,
    now: DateTime<Utc>,
) -> Result<()> {
    if db::resolve_transfer(conn, transfer.id, status, actor.id, now)? == 0 {
        return Err(DocTrackError::conflict(format!(
            "transfer {} is no longer pending",
            transfer.id
        )));
    }
    Ok(())
}

pub fn forward(
    conn: &Connection,
    actor: &User,
    document_id: i64,
    request: &ForwardRequest,
    now: DateTime<Utc>,
) -> Result<DocumentTransfer> {
    let document = require_document(conn, document_id)?;
    let next = ensure_transition(&document, WorkflowAction::Forward)?;
    ensure_holder(actor, &document, "forward")?;

    if db::pending_for_document(conn, document_id)?.is_some() {
        return Err(DocTrackError::conflict(format!(
            "document {} already has a pending transfer",
            document.tracking_number
        )));
    }
    if request.to_department_id == document.current_department_id {
        return Err(DocTrackError::validation(
            "to_department_id",
            "Cannot forward a document to the department that already holds it",
        ));
    }
    require_active_department(conn, request.to_department_id)?;
    if let Some(user_id) = request.to_user_id {
        let recipient = require_user(conn, user_id)?;
        if recipient.department_id != request.to_department_id || !recipient.is_active {
            return Err(DocTrackError::validation(
                "to_user_id",
                "Recipient must be an active member of the target department",
            ));
        }
    }
    if request.version_type == VersionType::Original {
        custody::ensure_holds_original(conn, document.current_department_id, document_id)?;
    }

    let transfer_id = db::insert_transfer(
        conn,
        document_id,
        document.current_department_id,
        actor.id,
        request.to_department_id,
        request.to_user_id,
        request.version_type,
        request.remarks.as_deref(),
        now,
    )?;
    doc_db::update_status(conn, document_id, next, now)?;
    audit::record(
        conn,
        document_id,
        EventType::Forwarded,
        Some(actor),
        json!({
            "transfer_id": transfer_id,
            "from_department_id": document.current_department_id,
            "to_department_id": request.to_department_id,
            "to_user_id": request.to_user_id,
            "version_type": request.version_type,
            "remarks": request.remarks,
        }),
        now,
    )?;

    tracing::debug!(
        "document {} forwarded to department {}",
        document.tracking_number,
        request.to_department_id
    );
    require_transfer(conn, transfer_id)
}

/// 接收：文件移到收件部門；正本轉送則正本保管跟著移動，
/// 副本轉送則為收件部門發一份副本，正本留在原處。
pub fn accept(
    conn: &Connection,
    actor: &User,
    transfer_id: i64,
    request: &ActionRequest,
    now: DateTime<Utc>,
) -> Result<Document> {
    let (transfer, document) = pending_transfer(conn, transfer_id, WorkflowAction::Accept)?;
    let next = ensure_transition(&document, WorkflowAction::Accept)?;
    ensure_recipient(actor, &transfer, WorkflowAction::Accept)?;

    resolve(conn, &transfer, TransferStatus::Accepted, actor, now)?;
    doc_db::update_routing(
        conn,
        document.id,
        next,
        transfer.to_department_id,
        Some(actor.id),
        now,
    )?;

    match transfer.version_type {
        VersionType::Original => {
            let notes = format!("transfer #{}", transfer.id);
            custody::assign(
                conn,
                document.id,
                VersionType::Original,
                transfer.to_department_id,
                Some(actor.id),
                None,
                Some(&notes),
                now,
            )?;
        }
        VersionType::Copy => {
            custody::issue_copy_to(
                conn,
                actor,
                document.id,
                transfer.to_department_id,
                Some(actor.id),
                transfer.remarks.as_deref(),
                now,
            )?;
        }
    }

    audit::record(
        conn,
        document.id,
        EventType::Accepted,
        Some(actor),
        json!({
            "transfer_id": transfer.id,
            "from_department_id": transfer.from_department_id,
            "version_type": transfer.version_type,
            "remarks": request.remarks,
        }),
        now,
    )?;
    require_document(conn, document.id)
}

/// 退回：回到寄件部門，狀態 returned
pub fn reject(
    conn: &Connection,
    actor: &User,
    transfer_id: i64,
    request: &ActionRequest,
    now: DateTime<Utc>,
) -> Result<Document> {
    let (transfer, document) = pending_transfer(conn, transfer_id, WorkflowAction::Reject)?;
    let next = ensure_transition(&document, WorkflowAction::Reject)?;
    ensure_recipient(actor, &transfer, WorkflowAction::Reject)?;

    resolve(conn, &transfer, TransferStatus::Rejected, actor, now)?;
    doc_db::update_routing(
        conn,
        document.id,
        next,
        transfer.from_department_id,
        Some(transfer.from_user_id),
        now,
    )?;
    audit::record(
        conn,
        document.id,
        EventType::Rejected,
        Some(actor),
        json!({
            "transfer_id": transfer.id,
            "to_department_id": transfer.to_department_id,
            "remarks": request.remarks,
        }),
        now,
    )?;
    require_document(conn, document.id)
}

/// 撤回：寄件部門在對方接收前收回
pub fn recall(
    conn: &Connection,
    actor: &User,
    transfer_id: i64,
    request: &ActionRequest,
    now: DateTime<Utc>,
) -> Result<Document> {
    let (transfer, document) = pending_transfer(conn, transfer_id, WorkflowAction::Recall)?;
    let next = ensure_transition(&document, WorkflowAction::Recall)?;
    if !actor.is_admin() && actor.department_id != transfer.from_department_id {
        return Err(DocTrackError::unauthorized(
            WorkflowAction::Recall.as_str(),
            format!(
                "only department {} can recall transfer {}",
                transfer.from_department_id, transfer.id
            ),
        ));
    }

    resolve(conn, &transfer, TransferStatus::Recalled, actor, now)?;
    doc_db::update_routing(
        conn,
        document.id,
        next,
        transfer.from_department_id,
        Some(transfer.from_user_id),
        now,
    )?;
    audit::record(
        conn,
        document.id,
        EventType::Recalled,
        Some(actor),
        json!({
            "transfer_id": transfer.id,
            "to_department_id": transfer.to_department_id,
            "remarks": request.remarks,
        }),
        now,
    )?;
    require_document(conn, document.id)
}

fn lifecycle(
    conn: &Connection,
    actor: &User,
    document_id: i64,
    action: WorkflowAction,
    event: EventType,
    request: &ActionRequest,
    now: DateTime<Utc>,
) -> Result<Document> {
    let document = require_document(conn, document_id)?;
    let next = ensure_transition(&document, action)?;
    let archivist = action == WorkflowAction::Archive && actor.is_records_officer();
    if !archivist {
        ensure_holder(actor, &document, action.as_str())?;
    }

    doc_db::update_status(conn, document_id, next, now)?;
    audit::record(
        conn,
        document_id,
        event,
        Some(actor),
        json!({ "from_status": document.status, "remarks": request.remarks }),
        now,
    )?;
    require_document(conn, document_id)
}

pub fn complete(
    conn: &Connection,
    actor: &User,
    document_id: i64,
    request: &ActionRequest,
    now: DateTime<Utc>,
) -> Result<Document> {
    lifecycle(
        conn,
        actor,
        document_id,
        WorkflowAction::Complete,
        EventType::Completed,
        request,
        now,
    )
}

pub fn reopen(
    conn: &Connection,
    actor: &User,
    document_id: i64,
    request: &ActionRequest,
    now: DateTime<Utc>,
) -> Result<Document> {
    lifecycle(
        conn,
        actor,
        document_id,
        WorkflowAction::Reopen,
        EventType::Reopened,
        request,
        now,
    )
}

pub fn archive(
    conn: &Connection,
    actor: &User,
    document_id: i64,
    request: &ActionRequest,
    now: DateTime<Utc>,
) -> Result<Document> {
    lifecycle(
        conn,
        actor,
        document_id,
        WorkflowAction::Archive,
        EventType::Archived,
        request,
        now,
    )
}
