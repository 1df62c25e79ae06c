use crate::adapters::sqlite::custody as db;
use crate::core::audit;
use crate::core::directory::{require_active_department, require_user};
use crate::core::documents::require_document;
use crate::core::requests::{CustodyTransferRequest, IssueCopyRequest};
use crate::domain::model::{
    CopyStatus, DocumentCopy, DocumentCustody, DocumentStatus, EventType, User, VersionType,
};
use crate::utils::error::{DocTrackError, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

/// 文件目前的正本與副本保管狀態
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustodySnapshot {
    pub original: Option<DocumentCustody>,
    pub copy: Option<DocumentCustody>,
    pub copies: Vec<DocumentCopy>,
    pub history: Vec<DocumentCustody>,
}

/// 結束同版本的目前紀錄並新增一筆目前紀錄。
/// 每份文件每種版本最多只有一筆 is_current。
#[allow(clippy::too_many_arguments)]
pub fn assign(
    conn: &Connection,
    document_id: i64,
    version_type: VersionType,
    department_id: i64,
    user_id: Option<i64>,
    copy_id: Option<i64>,
    notes: Option<&str>,
    now: DateTime<Utc>,
) -> Result<i64> {
    let released = db::release_current(conn, document_id, version_type, now)?;
    if released > 1 {
        tracing::warn!(
            "⚠️ document {} had {} current {} custody rows",
            document_id,
            released,
            version_type
        );
    }
    Ok(db::insert_current(
        conn,
        document_id,
        version_type,
        department_id,
        user_id,
        copy_id,
        notes,
        now,
    )?)
}

pub fn current(
    conn: &Connection,
    document_id: i64,
    version_type: VersionType,
) -> Result<Option<DocumentCustody>> {
    Ok(db::current_custody(conn, document_id, version_type)?)
}

pub fn snapshot(conn: &Connection, document_id: i64) -> Result<CustodySnapshot> {
    require_document(conn, document_id)?;
    Ok(CustodySnapshot {
        original: db::current_custody(conn, document_id, VersionType::Original)?,
        copy: db::current_custody(conn, document_id, VersionType::Copy)?,
        copies: db::copies_for_document(conn, document_id)?,
        history: db::history(conn, document_id)?,
    })
}

/// 轉送正本前，文件所在部門必須持有正本
pub fn ensure_holds_original(conn: &Connection, department_id: i64, document_id: i64) -> Result<()> {
    match db::current_custody(conn, document_id, VersionType::Original)? {
        Some(custody) if custody.department_id == department_id => Ok(()),
        Some(custody) => Err(DocTrackError::custody(format!(
            "the original is held by department {}, not department {}",
            custody.department_id, department_id
        ))),
        None => Err(DocTrackError::custody("the original has no current custodian")),
    }
}

/// 建立副本並把副本保管指向收件部門
pub fn issue_copy_to(
    conn: &Connection,
    issued_by: &User,
    document_id: i64,
    department_id: i64,
    user_id: Option<i64>,
    purpose: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DocumentCopy> {
    let copy_number = db::next_copy_number(conn, document_id)?;
    let copy = db::insert_copy(
        conn,
        document_id,
        copy_number,
        department_id,
        issued_by.id,
        purpose,
        now,
    )?;
    assign(
        conn,
        document_id,
        VersionType::Copy,
        department_id,
        user_id,
        Some(copy.id),
        purpose,
        now,
    )?;
    audit::record(
        conn,
        document_id,
        EventType::CopyIssued,
        Some(issued_by),
        json!({
            "copy_id": copy.id,
            "copy_number": copy.copy_number,
            "department_id": department_id,
        }),
        now,
    )?;
    Ok(copy)
}

pub fn issue_copy(
    conn: &Connection,
    actor: &User,
    document_id: i64,
    request: &IssueCopyRequest,
    now: DateTime<Utc>,
) -> Result<DocumentCopy> {
    let document = require_document(conn, document_id)?;
    if document.status == DocumentStatus::Merged {
        return Err(DocTrackError::custody(
            "copies cannot be issued from a merged document",
        ));
    }

    let holds_original = db::current_custody(conn, document_id, VersionType::Original)?
        .is_some_and(|c| c.department_id == actor.department_id);
    let holds_document = document.current_department_id == actor.department_id;
    if !(holds_original || holds_document || actor.is_records_officer()) {
        return Err(DocTrackError::custody(
            "only the department holding the document can issue copies",
        ));
    }

    let department_id = request.department_id.unwrap_or(actor.department_id);
    require_active_department(conn, department_id)?;
    issue_copy_to(
        conn,
        actor,
        document_id,
        department_id,
        None,
        request.purpose.as_deref(),
        now,
    )
}

pub fn return_copy(
    conn: &Connection,
    actor: &User,
    copy_id: i64,
    now: DateTime<Utc>,
) -> Result<DocumentCopy> {
    let copy = db::find_copy(conn, copy_id)?.ok_or_else(|| DocTrackError::not_found("copy", copy_id))?;
    if copy.status != CopyStatus::Issued {
        return Err(DocTrackError::custody(format!(
            "copy #{} was already returned",
            copy.copy_number
        )));
    }
    if copy.department_id != actor.department_id && !actor.is_records_officer() {
        return Err(DocTrackError::custody(
            "only the department holding the copy can return it",
        ));
    }

    db::mark_copy_returned(conn, copy.id, now)?;
    if let Some(current) = db::current_custody(conn, copy.document_id, VersionType::Copy)? {
        if current.copy_id == Some(copy.id) {
            db::release_current(conn, copy.document_id, VersionType::Copy, now)?;
        }
    }

    audit::record(
        conn,
        copy.document_id,
        EventType::CopyReturned,
        Some(actor),
        json!({ "copy_id": copy.id, "copy_number": copy.copy_number }),
        now,
    )?;

    Ok(DocumentCopy {
        status: CopyStatus::Returned,
        returned_at: Some(now),
        ..copy
    })
}

/// 人工實體移交
pub fn transfer_custody(
    conn: &Connection,
    actor: &User,
    document_id: i64,
    request: &CustodyTransferRequest,
    now: DateTime<Utc>,
) -> Result<DocumentCustody> {
    let document = require_document(conn, document_id)?;
    if document.status == DocumentStatus::Merged {
        return Err(DocTrackError::custody("a merged document has no custody to move"));
    }
    if request.version_type == VersionType::Original && document.status == DocumentStatus::InTransit {
        return Err(DocTrackError::custody(
            "the original is in transit; accept, reject or recall the transfer first",
        ));
    }

    let current = db::current_custody(conn, document_id, request.version_type)?.ok_or_else(|| {
        DocTrackError::custody(format!(
            "document has no current {} custody",
            request.version_type
        ))
    })?;

    if current.department_id != actor.department_id && !actor.is_records_officer() {
        return Err(DocTrackError::custody(format!(
            "only the current custodian can hand over the {}",
            request.version_type
        )));
    }
    if current.department_id == request.department_id && current.user_id == request.user_id {
        return Err(DocTrackError::custody("target is already the current custodian"));
    }

    require_active_department(conn, request.department_id)?;
    if let Some(user_id) = request.user_id {
        let user = require_user(conn, user_id)?;
        if user.department_id != request.department_id || !user.is_active {
            return Err(DocTrackError::validation(
                "user_id",
                "User must be an active member of the target department",
            ));
        }
    }

    if let Some(copy_id) = current.copy_id {
        db::move_copy(conn, copy_id, request.department_id)?;
    }
    let id = assign(
        conn,
        document_id,
        request.version_type,
        request.department_id,
        request.user_id,
        current.copy_id,
        request.notes.as_deref(),
        now,
    )?;

    audit::record(
        conn,
        document_id,
        EventType::CustodyTransferred,
        Some(actor),
        json!({
            "version_type": request.version_type,
            "from_department_id": current.department_id,
            "to_department_id": request.department_id,
            "to_user_id": request.user_id,
        }),
        now,
    )?;

    db::find_custody(conn, id)?.ok_or_else(|| DocTrackError::not_found("custody", id))
}

/// 不變量檢查：每種版本最多一筆目前紀錄
pub fn current_count(conn: &Connection, document_id: i64, version_type: VersionType) -> Result<i64> {
    Ok(db::count_current(conn, document_id, version_type)?)
}
