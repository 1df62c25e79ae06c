use crate::adapters::sqlite::{cases as db, documents as doc_db};
use crate::core::requests::CreateCaseRequest;
use crate::core::workflow::ensure_holder;
use crate::core::{audit, documents::require_document, sequence};
use crate::domain::model::{CaseStatus, Document, DocumentCase, EventType, User};
use crate::utils::error::{DocTrackError, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;

/// 案件與其下所有文件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseDetail {
    #[serde(flatten)]
    pub case: DocumentCase,
    pub documents: Vec<Document>,
}

pub fn require_case(conn: &Connection, case_id: i64) -> Result<DocumentCase> {
    db::find_case(conn, case_id)?.ok_or_else(|| DocTrackError::not_found("case", case_id))
}

pub fn create_case(
    conn: &Connection,
    actor: &User,
    request: &CreateCaseRequest,
    utc_offset_minutes: i32,
    now: DateTime<Utc>,
) -> Result<DocumentCase> {
    let case_number = sequence::next_case_number(conn, now, utc_offset_minutes)?;
    let case = db::insert_case(
        conn,
        &case_number,
        request.title.trim(),
        request.description.as_deref(),
        actor.id,
        now,
    )?;
    tracing::info!("📁 case {} opened by user {}", case.case_number, actor.id);
    Ok(case)
}

pub fn assign_document(
    conn: &Connection,
    actor: &User,
    case_id: i64,
    document_id: i64,
    now: DateTime<Utc>,
) -> Result<Document> {
    let case = require_case(conn, case_id)?;
    if case.status != CaseStatus::Open {
        return Err(DocTrackError::validation(
            "case_id",
            format!("Case {} is closed", case.case_number),
        ));
    }
    let document = require_document(conn, document_id)?;
    ensure_holder(actor, &document, "assign to a case")?;
    if document.status.is_terminal() {
        return Err(DocTrackError::transition("assign to a case", document.status));
    }
    if document.case_id == Some(case.id) {
        return Ok(document);
    }

    doc_db::set_case(conn, document.id, case.id, now)?;
    audit::record(
        conn,
        document.id,
        EventType::CaseAssigned,
        Some(actor),
        json!({
            "case_id": case.id,
            "case_number": case.case_number,
            "previous_case_id": document.case_id,
        }),
        now,
    )?;
    require_document(conn, document.id)
}

/// 案件內所有文件都需已結束（completed / archived / merged）
pub fn close_case(
    conn: &Connection,
    actor: &User,
    case_id: i64,
    now: DateTime<Utc>,
) -> Result<DocumentCase> {
    let case = require_case(conn, case_id)?;
    if case.status != CaseStatus::Open {
        return Err(DocTrackError::conflict(format!(
            "case {} is already closed",
            case.case_number
        )));
    }

    let open: Vec<String> = doc_db::in_case(conn, case.id)?
        .into_iter()
        .filter(|d| !d.status.is_closed())
        .map(|d| d.tracking_number)
        .collect();
    if !open.is_empty() {
        return Err(DocTrackError::validation(
            "case_id",
            format!("Documents still open: {}", open.join(", ")),
        ));
    }

    db::close_case(conn, case.id, now)?;
    tracing::info!("📁 case {} closed by user {}", case.case_number, actor.id);
    require_case(conn, case.id)
}

pub fn get_case(conn: &Connection, case_id: i64) -> Result<CaseDetail> {
    let case = require_case(conn, case_id)?;
    let documents = doc_db::in_case(conn, case.id)?;
    Ok(CaseDetail { case, documents })
}
