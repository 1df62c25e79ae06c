use crate::domain::model::DocumentStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 流程動作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Forward,
    Accept,
    Reject,
    Recall,
    Complete,
    Reopen,
    Archive,
    Merge,
    Split,
}

impl WorkflowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowAction::Forward => "forward",
            WorkflowAction::Accept => "accept",
            WorkflowAction::Reject => "reject",
            WorkflowAction::Recall => "recall",
            WorkflowAction::Complete => "complete",
            WorkflowAction::Reopen => "reopen",
            WorkflowAction::Archive => "archive",
            WorkflowAction::Merge => "merge",
            WorkflowAction::Split => "split",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 狀態轉移表；回傳 None 代表該狀態不允許此動作。
/// Split 不改變母文件狀態，只檢查前置條件。
pub fn next_status(current: DocumentStatus, action: WorkflowAction) -> Option<DocumentStatus> {
    use DocumentStatus::*;
    use WorkflowAction::*;

    match (current, action) {
        (Received | Returned, Forward) => Some(InTransit),
        (InTransit, Accept) => Some(Received),
        (InTransit, Reject) => Some(Returned),
        (InTransit, Recall) => Some(Received),
        (Received | Returned, Complete) => Some(Completed),
        (Completed, Reopen) => Some(Received),
        (Completed, Archive) => Some(Archived),
        (Received | Returned, Merge) => Some(Merged),
        (status @ (Received | Returned), Split) => Some(status),
        _ => None,
    }
}

pub fn can_apply(current: DocumentStatus, action: WorkflowAction) -> bool {
    next_status(current, action).is_some()
}
