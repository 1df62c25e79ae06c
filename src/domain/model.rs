use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 資料庫中以文字儲存的列舉，產生 as_str / from_db_value / Display
macro_rules! db_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn from_db_value(raw: &str) -> Option<Self> {
                match raw {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

db_enum!(
    /// 文件流程狀態
    DocumentStatus {
        Received => "received",
        InTransit => "in_transit",
        Returned => "returned",
        Completed => "completed",
        Archived => "archived",
        Merged => "merged",
    }
);

impl DocumentStatus {
    /// 目前有部門實際持有、可以被處理的狀態
    pub fn is_actionable(&self) -> bool {
        matches!(self, DocumentStatus::Received | DocumentStatus::Returned)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Archived | DocumentStatus::Merged)
    }

    /// 案件可以結案時，文件需處於這些狀態
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            DocumentStatus::Completed | DocumentStatus::Archived | DocumentStatus::Merged
        )
    }
}

db_enum!(
    UserRole {
        Admin => "admin",
        RecordsOfficer => "records_officer",
        Staff => "staff",
    }
);

db_enum!(
    /// 正本或副本
    VersionType {
        Original => "original",
        Copy => "copy",
    }
);

db_enum!(
    TransferStatus {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
        Recalled => "recalled",
    }
);

db_enum!(
    CopyStatus {
        Issued => "issued",
        Returned => "returned",
    }
);

db_enum!(
    RelationType {
        SplitFrom => "split_from",
        MergedInto => "merged_into",
        AttachedTo => "attached_to",
        RelatedTo => "related_to",
    }
);

impl RelationType {
    /// split_from / merged_into 只能由系統建立
    pub fn is_user_managed(&self) -> bool {
        matches!(self, RelationType::AttachedTo | RelationType::RelatedTo)
    }
}

db_enum!(
    CaseStatus {
        Open => "open",
        Closed => "closed",
    }
);

db_enum!(
    EventType {
        Created => "created",
        Updated => "updated",
        Forwarded => "forwarded",
        Accepted => "accepted",
        Rejected => "rejected",
        Recalled => "recalled",
        Completed => "completed",
        Reopened => "reopened",
        Archived => "archived",
        Split => "split",
        SplitChildCreated => "split_child_created",
        Merged => "merged",
        MergeTarget => "merge_target",
        CustodyTransferred => "custody_transferred",
        CopyIssued => "copy_issued",
        CopyReturned => "copy_returned",
        Linked => "linked",
        Unlinked => "unlinked",
        RemarkAdded => "remark_added",
        CaseAssigned => "case_assigned",
    }
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub department_id: i64,
    pub role: UserRole,
    pub is_active: bool,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_records_officer(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::RecordsOfficer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub tracking_number: String,
    pub title: String,
    pub description: Option<String>,
    pub document_type: String,
    pub status: DocumentStatus,
    pub origin_department_id: i64,
    pub current_department_id: i64,
    pub current_user_id: Option<i64>,
    pub created_by: i64,
    pub case_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub split_suffix: Option<char>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCase {
    pub id: i64,
    pub case_number: String,
    pub title: String,
    pub description: Option<String>,
    pub status: CaseStatus,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTransfer {
    pub id: i64,
    pub document_id: i64,
    pub from_department_id: i64,
    pub from_user_id: i64,
    pub to_department_id: i64,
    pub to_user_id: Option<i64>,
    pub version_type: VersionType,
    pub status: TransferStatus,
    pub remarks: Option<String>,
    pub forwarded_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCustody {
    pub id: i64,
    pub document_id: i64,
    pub version_type: VersionType,
    pub department_id: i64,
    pub user_id: Option<i64>,
    pub copy_id: Option<i64>,
    pub is_current: bool,
    pub received_at: DateTime<Utc>,
    pub released_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCopy {
    pub id: i64,
    pub document_id: i64,
    pub copy_number: i64,
    pub department_id: i64,
    pub issued_by: i64,
    pub purpose: Option<String>,
    pub status: CopyStatus,
    pub issued_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRelationship {
    pub id: i64,
    pub from_document_id: i64,
    pub to_document_id: i64,
    pub relation: RelationType,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEvent {
    pub id: i64,
    pub document_id: i64,
    pub event_type: EventType,
    pub actor_id: Option<i64>,
    pub department_id: Option<i64>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRemark {
    pub id: i64,
    pub document_id: i64,
    pub parent_id: Option<i64>,
    pub author_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// 文件列表與匯出的篩選條件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentFilter {
    pub status: Option<DocumentStatus>,
    pub department_id: Option<i64>,
    pub case_id: Option<i64>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
    pub q: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// 巢狀留言串
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemarkThread {
    #[serde(flatten)]
    pub remark: DocumentRemark,
    pub replies: Vec<RemarkThread>,
}
