use crate::domain::model::{RelationType, UserRole, VersionType};
use crate::utils::error::{DocTrackError, Result};
use crate::utils::validation::{
    validate_email, validate_json_object, validate_length, validate_non_empty_string, Validate,
};
use serde::{Deserialize, Serialize};

pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_TEXT_LENGTH: usize = 2000;
pub const MAX_DOCUMENT_TYPE_LENGTH: usize = 100;

fn validate_optional_text(field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(text) if text.chars().count() > MAX_TEXT_LENGTH => Err(DocTrackError::validation(
            field,
            format!("Must be at most {} characters", MAX_TEXT_LENGTH),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub description: Option<String>,
    pub document_type: String,
    pub metadata: Option<serde_json::Value>,
    pub case_id: Option<i64>,
}

impl Validate for CreateDocumentRequest {
    fn validate(&self) -> Result<()> {
        validate_length("title", &self.title, 1, MAX_TITLE_LENGTH)?;
        validate_length("document_type", &self.document_type, 1, MAX_DOCUMENT_TYPE_LENGTH)?;
        validate_optional_text("description", self.description.as_deref())?;
        if let Some(metadata) = &self.metadata {
            validate_json_object("metadata", metadata)?;
        }
        Ok(())
    }
}

/// 只更新有提供的欄位
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub document_type: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl Validate for UpdateDocumentRequest {
    fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            validate_length("title", title, 1, MAX_TITLE_LENGTH)?;
        }
        if let Some(document_type) = &self.document_type {
            validate_length("document_type", document_type, 1, MAX_DOCUMENT_TYPE_LENGTH)?;
        }
        validate_optional_text("description", self.description.as_deref())?;
        if let Some(metadata) = &self.metadata {
            validate_json_object("metadata", metadata)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardRequest {
    pub to_department_id: i64,
    pub to_user_id: Option<i64>,
    #[serde(default = "default_version_type")]
    pub version_type: VersionType,
    pub remarks: Option<String>,
}

fn default_version_type() -> VersionType {
    VersionType::Original
}

impl ForwardRequest {
    pub fn to_department(to_department_id: i64) -> Self {
        Self {
            to_department_id,
            to_user_id: None,
            version_type: VersionType::Original,
            remarks: None,
        }
    }
}

impl Validate for ForwardRequest {
    fn validate(&self) -> Result<()> {
        validate_optional_text("remarks", self.remarks.as_deref())
    }
}

/// 流程動作（接收、退回、撤回、結案等）的附註
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionRequest {
    pub remarks: Option<String>,
}

impl Validate for ActionRequest {
    fn validate(&self) -> Result<()> {
        validate_optional_text("remarks", self.remarks.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitPart {
    pub title: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitRequest {
    pub parts: Vec<SplitPart>,
    pub remarks: Option<String>,
}

impl SplitRequest {
    /// n 個未命名的部分
    pub fn into_parts(count: usize) -> Self {
        Self {
            parts: vec![SplitPart::default(); count],
            remarks: None,
        }
    }
}

impl Validate for SplitRequest {
    fn validate(&self) -> Result<()> {
        if self.parts.is_empty() {
            return Err(DocTrackError::validation(
                "parts",
                "At least one part is required to split a document",
            ));
        }
        for part in &self.parts {
            if let Some(title) = &part.title {
                validate_length("parts.title", title, 1, MAX_TITLE_LENGTH)?;
            }
            validate_optional_text("parts.description", part.description.as_deref())?;
            if let Some(metadata) = &part.metadata {
                validate_json_object("parts.metadata", metadata)?;
            }
        }
        validate_optional_text("remarks", self.remarks.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeRequest {
    pub source_ids: Vec<i64>,
    pub remarks: Option<String>,
}

impl Validate for MergeRequest {
    fn validate(&self) -> Result<()> {
        if self.source_ids.is_empty() {
            return Err(DocTrackError::validation(
                "source_ids",
                "At least one source document is required",
            ));
        }
        let mut seen = std::collections::HashSet::new();
        if !self.source_ids.iter().all(|id| seen.insert(*id)) {
            return Err(DocTrackError::validation(
                "source_ids",
                "Source documents must be distinct",
            ));
        }
        validate_optional_text("remarks", self.remarks.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustodyTransferRequest {
    pub version_type: VersionType,
    pub department_id: i64,
    pub user_id: Option<i64>,
    pub notes: Option<String>,
}

impl Validate for CustodyTransferRequest {
    fn validate(&self) -> Result<()> {
        validate_optional_text("notes", self.notes.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueCopyRequest {
    /// 未指定時發給操作者所屬部門
    pub department_id: Option<i64>,
    pub purpose: Option<String>,
}

impl Validate for IssueCopyRequest {
    fn validate(&self) -> Result<()> {
        validate_optional_text("purpose", self.purpose.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRequest {
    pub to_document_id: i64,
    pub relation: RelationType,
}

impl Validate for LinkRequest {
    fn validate(&self) -> Result<()> {
        if !self.relation.is_user_managed() {
            return Err(DocTrackError::validation(
                "relation",
                format!("Relation '{}' is managed by the system", self.relation),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemarkRequest {
    pub body: String,
    pub parent_id: Option<i64>,
}

impl Validate for RemarkRequest {
    fn validate(&self) -> Result<()> {
        validate_length("body", &self.body, 1, MAX_TEXT_LENGTH)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCaseRequest {
    pub title: String,
    pub description: Option<String>,
}

impl Validate for CreateCaseRequest {
    fn validate(&self) -> Result<()> {
        validate_length("title", &self.title, 1, MAX_TITLE_LENGTH)?;
        validate_optional_text("description", self.description.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignCaseRequest {
    pub document_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDepartmentRequest {
    pub code: String,
    pub name: String,
}

impl Validate for CreateDepartmentRequest {
    fn validate(&self) -> Result<()> {
        validate_length("code", &self.code, 1, 32)?;
        if !self
            .code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DocTrackError::validation(
                "code",
                "Only letters, digits, '-' and '_' are allowed",
            ));
        }
        validate_length("name", &self.name, 1, MAX_TITLE_LENGTH)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub department_id: i64,
    pub role: UserRole,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        validate_length("name", &self.name, 1, MAX_TITLE_LENGTH)?;
        validate_email("email", &self.email)
    }
}
