use crate::domain::model::{
    CaseStatus, CopyStatus, Department, Document, DocumentCase, DocumentCopy, DocumentCustody,
    DocumentEvent, DocumentRelationship, DocumentRemark, DocumentStatus, DocumentTransfer,
    EventType, RelationType, TransferStatus, User, UserRole, VersionType,
};
use rusqlite::types::Type;
use rusqlite::Row;

pub const DEPARTMENT_COLUMNS: &str = "id, code, name, is_active";
pub const USER_COLUMNS: &str = "id, name, email, department_id, role, is_active";
pub const DOCUMENT_COLUMNS: &str = "id, tracking_number, title, description, document_type, status, \
     origin_department_id, current_department_id, current_user_id, created_by, case_id, parent_id, \
     split_suffix, metadata, created_at, updated_at";
pub const CASE_COLUMNS: &str =
    "id, case_number, title, description, status, created_by, created_at, closed_at";
pub const TRANSFER_COLUMNS: &str = "id, document_id, from_department_id, from_user_id, to_department_id, \
     to_user_id, version_type, status, remarks, forwarded_at, resolved_at, resolved_by";
pub const CUSTODY_COLUMNS: &str = "id, document_id, version_type, department_id, user_id, copy_id, \
     is_current, received_at, released_at, notes";
pub const COPY_COLUMNS: &str = "id, document_id, copy_number, department_id, issued_by, purpose, status, \
     issued_at, returned_at";
pub const RELATIONSHIP_COLUMNS: &str =
    "id, from_document_id, to_document_id, relation, created_by, created_at";
pub const EVENT_COLUMNS: &str =
    "id, document_id, event_type, actor_id, department_id, details, created_at";
pub const REMARK_COLUMNS: &str = "id, document_id, parent_id, author_id, body, created_at";

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn enum_col<T>(row: &Row<'_>, idx: usize, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| conversion_error(idx, format!("unknown value '{raw}'")))
}

fn json_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<serde_json::Value> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, format!("invalid json: {e}")))
}

pub fn department(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get(0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        is_active: row.get(3)?,
    })
}

pub fn user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        department_id: row.get(3)?,
        role: enum_col(row, 4, UserRole::from_db_value)?,
        is_active: row.get(5)?,
    })
}

pub fn document(row: &Row<'_>) -> rusqlite::Result<Document> {
    let suffix: Option<String> = row.get(12)?;
    Ok(Document {
        id: row.get(0)?,
        tracking_number: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        document_type: row.get(4)?,
        status: enum_col(row, 5, DocumentStatus::from_db_value)?,
        origin_department_id: row.get(6)?,
        current_department_id: row.get(7)?,
        current_user_id: row.get(8)?,
        created_by: row.get(9)?,
        case_id: row.get(10)?,
        parent_id: row.get(11)?,
        split_suffix: suffix.and_then(|s| s.chars().next()),
        metadata: json_col(row, 13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

pub fn document_case(row: &Row<'_>) -> rusqlite::Result<DocumentCase> {
    Ok(DocumentCase {
        id: row.get(0)?,
        case_number: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: enum_col(row, 4, CaseStatus::from_db_value)?,
        created_by: row.get(5)?,
        created_at: row.get(6)?,
        closed_at: row.get(7)?,
    })
}

pub fn transfer(row: &Row<'_>) -> rusqlite::Result<DocumentTransfer> {
    Ok(DocumentTransfer {
        id: row.get(0)?,
        document_id: row.get(1)?,
        from_department_id: row.get(2)?,
        from_user_id: row.get(3)?,
        to_department_id: row.get(4)?,
        to_user_id: row.get(5)?,
        version_type: enum_col(row, 6, VersionType::from_db_value)?,
        status: enum_col(row, 7, TransferStatus::from_db_value)?,
        remarks: row.get(8)?,
        forwarded_at: row.get(9)?,
        resolved_at: row.get(10)?,
        resolved_by: row.get(11)?,
    })
}

pub fn custody(row: &Row<'_>) -> rusqlite::Result<DocumentCustody> {
    Ok(DocumentCustody {
        id: row.get(0)?,
        document_id: row.get(1)?,
        version_type: enum_col(row, 2, VersionType::from_db_value)?,
        department_id: row.get(3)?,
        user_id: row.get(4)?,
        copy_id: row.get(5)?,
        is_current: row.get(6)?,
        received_at: row.get(7)?,
        released_at: row.get(8)?,
        notes: row.get(9)?,
    })
}

pub fn copy(row: &Row<'_>) -> rusqlite::Result<DocumentCopy> {
    Ok(DocumentCopy {
        id: row.get(0)?,
        document_id: row.get(1)?,
        copy_number: row.get(2)?,
        department_id: row.get(3)?,
        issued_by: row.get(4)?,
        purpose: row.get(5)?,
        status: enum_col(row, 6, CopyStatus::from_db_value)?,
        issued_at: row.get(7)?,
        returned_at: row.get(8)?,
    })
}

pub fn relationship(row: &Row<'_>) -> rusqlite::Result<DocumentRelationship> {
    Ok(DocumentRelationship {
        id: row.get(0)?,
        from_document_id: row.get(1)?,
        to_document_id: row.get(2)?,
        relation: enum_col(row, 3, RelationType::from_db_value)?,
        created_by: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub fn event(row: &Row<'_>) -> rusqlite::Result<DocumentEvent> {
    Ok(DocumentEvent {
        id: row.get(0)?,
        document_id: row.get(1)?,
        event_type: enum_col(row, 2, EventType::from_db_value)?,
        actor_id: row.get(3)?,
        department_id: row.get(4)?,
        details: json_col(row, 5)?,
        created_at: row.get(6)?,
    })
}

pub fn remark(row: &Row<'_>) -> rusqlite::Result<DocumentRemark> {
    Ok(DocumentRemark {
        id: row.get(0)?,
        document_id: row.get(1)?,
        parent_id: row.get(2)?,
        author_id: row.get(3)?,
        body: row.get(4)?,
        created_at: row.get(5)?,
    })
}
