use crate::adapters::sqlite::SqliteStore;
use crate::config::toml_config::{DEFAULT_OVERDUE_AFTER_HOURS, DEFAULT_SUGGESTION_LIMIT};
use crate::config::{DepartmentSeed, UserSeed};
use crate::core::cases::CaseDetail;
use crate::core::custody::CustodySnapshot;
use crate::core::documents::Suggestion;
use crate::core::reports::{
    DepartmentHolding, NotificationCounts, OverdueTransfer, PublicTracking, StatusCount,
};
use crate::core::requests::{
    ActionRequest, AssignCaseRequest, CreateCaseRequest, CreateDepartmentRequest,
    CreateDocumentRequest, CreateUserRequest, CustodyTransferRequest, ForwardRequest,
    IssueCopyRequest, LinkRequest, MergeRequest, RemarkRequest, SplitRequest,
    UpdateDocumentRequest,
};
use crate::core::{
    audit, cases, custody, directory, documents, relationships, remarks, reports, splitting,
    workflow,
};
use crate::domain::model::{
    Department, Document, DocumentCase, DocumentCopy, DocumentCustody, DocumentEvent,
    DocumentFilter, DocumentRelationship, DocumentRemark, DocumentTransfer, RemarkThread, User,
    VersionType,
};
use crate::domain::ports::{Clock, ConfigProvider, SystemClock};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::sync::Arc;

/// 由設定檔帶入的流程參數
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSettings {
    pub utc_offset_minutes: i32,
    pub overdue_after_hours: i64,
    pub suggestion_limit: usize,
    pub public_base_url: Option<String>,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            overdue_after_hours: DEFAULT_OVERDUE_AFTER_HOURS,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            public_base_url: None,
        }
    }
}

impl WorkflowSettings {
    pub fn from_config(config: &impl ConfigProvider) -> Self {
        Self {
            utc_offset_minutes: config.utc_offset_minutes(),
            overdue_after_hours: config.overdue_after_hours(),
            suggestion_limit: config.suggestion_limit(),
            public_base_url: config.public_base_url().map(str::to_string),
        }
    }
}

/// 所有操作的入口。每個寫入操作在一個 IMMEDIATE 交易中執行，
/// 任何錯誤都會讓整個交易回滾。
pub struct DocumentRegistry {
    store: SqliteStore,
    clock: Arc<dyn Clock>,
    settings: WorkflowSettings,
}

impl DocumentRegistry {
    pub fn new(store: SqliteStore, clock: Arc<dyn Clock>, settings: WorkflowSettings) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    /// 依設定開啟資料庫，使用系統時鐘
    pub fn open(config: &impl ConfigProvider) -> Result<Self> {
        let store = SqliteStore::open(config.database_path())?;
        tracing::info!("🗄️ Opened records database at {}", config.database_path());
        Ok(Self::new(
            store,
            Arc::new(SystemClock),
            WorkflowSettings::from_config(config),
        ))
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn write<T>(
        &mut self,
        actor_id: i64,
        op: impl FnOnce(&Connection, &User, DateTime<Utc>) -> Result<T>,
    ) -> Result<T> {
        let now = self.clock.now();
        let tx = self.store.transaction()?;
        let actor = directory::load_actor(&tx, actor_id)?;
        let out = op(&*tx, &actor, now)?;
        tx.commit()?;
        Ok(out)
    }

    fn read_as<T>(&self, actor_id: i64, op: impl FnOnce(&Connection, &User) -> Result<T>) -> Result<T> {
        let conn = self.store.conn();
        let actor = directory::load_actor(conn, actor_id)?;
        op(conn, &actor)
    }

    // 目錄

    pub fn seed(&mut self, departments: &[DepartmentSeed], users: &[UserSeed]) -> Result<usize> {
        let tx = self.store.transaction()?;
        let created = directory::seed(&tx, departments, users)?;
        tx.commit()?;
        Ok(created)
    }

    pub fn authenticate(&self, actor_id: i64) -> Result<User> {
        directory::load_actor(self.store.conn(), actor_id)
    }

    pub fn list_departments(&self, actor_id: i64) -> Result<Vec<Department>> {
        self.read_as(actor_id, |conn, _| directory::list_departments(conn))
    }

    pub fn create_department(
        &mut self,
        actor_id: i64,
        request: &CreateDepartmentRequest,
    ) -> Result<Department> {
        request.validate()?;
        self.write(actor_id, |conn, actor, _| {
            directory::create_department(conn, actor, request)
        })
    }

    pub fn list_users(&self, actor_id: i64, department_id: Option<i64>) -> Result<Vec<User>> {
        self.read_as(actor_id, |conn, _| directory::list_users(conn, department_id))
    }

    pub fn create_user(&mut self, actor_id: i64, request: &CreateUserRequest) -> Result<User> {
        request.validate()?;
        self.write(actor_id, |conn, actor, _| directory::create_user(conn, actor, request))
    }

    // 文件

    pub fn create_document(
        &mut self,
        actor_id: i64,
        request: &CreateDocumentRequest,
    ) -> Result<Document> {
        request.validate()?;
        let offset = self.settings.utc_offset_minutes;
        let document = self.write(actor_id, |conn, actor, now| {
            documents::create(conn, actor, request, offset, now)
        })?;
        tracing::info!("📄 Created document {}", document.tracking_number);
        Ok(document)
    }

    pub fn update_document(
        &mut self,
        actor_id: i64,
        document_id: i64,
        request: &UpdateDocumentRequest,
    ) -> Result<Document> {
        request.validate()?;
        self.write(actor_id, |conn, actor, now| {
            documents::update(conn, actor, document_id, request, now)
        })
    }

    pub fn get_document(&self, actor_id: i64, document_id: i64) -> Result<Document> {
        self.read_as(actor_id, |conn, _| documents::require_document(conn, document_id))
    }

    pub fn list_documents(&self, actor_id: i64, filter: &DocumentFilter) -> Result<Vec<Document>> {
        self.read_as(actor_id, |conn, _| documents::list(conn, filter))
    }

    pub fn document_children(&self, actor_id: i64, document_id: i64) -> Result<Vec<Document>> {
        self.read_as(actor_id, |conn, _| documents::children(conn, document_id))
    }

    pub fn document_transfers(
        &self,
        actor_id: i64,
        document_id: i64,
    ) -> Result<Vec<DocumentTransfer>> {
        self.read_as(actor_id, |conn, _| documents::transfers(conn, document_id))
    }

    pub fn search_suggestions(&self, actor_id: i64, query: &str) -> Result<Vec<Suggestion>> {
        let limit = self.settings.suggestion_limit;
        self.read_as(actor_id, |conn, _| documents::suggestions(conn, query, limit))
    }

    // 流程

    pub fn forward(
        &mut self,
        actor_id: i64,
        document_id: i64,
        request: &ForwardRequest,
    ) -> Result<DocumentTransfer> {
        request.validate()?;
        self.write(actor_id, |conn, actor, now| {
            workflow::forward(conn, actor, document_id, request, now)
        })
    }

    pub fn accept(
        &mut self,
        actor_id: i64,
        transfer_id: i64,
        request: &ActionRequest,
    ) -> Result<Document> {
        request.validate()?;
        self.write(actor_id, |conn, actor, now| {
            workflow::accept(conn, actor, transfer_id, request, now)
        })
    }

    pub fn reject(
        &mut self,
        actor_id: i64,
        transfer_id: i64,
        request: &ActionRequest,
    ) -> Result<Document> {
        request.validate()?;
        self.write(actor_id, |conn, actor, now| {
            workflow::reject(conn, actor, transfer_id, request, now)
        })
    }

    pub fn recall(
        &mut self,
        actor_id: i64,
        transfer_id: i64,
        request: &ActionRequest,
    ) -> Result<Document> {
        request.validate()?;
        self.write(actor_id, |conn, actor, now| {
            workflow::recall(conn, actor, transfer_id, request, now)
        })
    }

    pub fn complete(
        &mut self,
        actor_id: i64,
        document_id: i64,
        request: &ActionRequest,
    ) -> Result<Document> {
        request.validate()?;
        self.write(actor_id, |conn, actor, now| {
            workflow::complete(conn, actor, document_id, request, now)
        })
    }

    pub fn reopen(
        &mut self,
        actor_id: i64,
        document_id: i64,
        request: &ActionRequest,
    ) -> Result<Document> {
        request.validate()?;
        self.write(actor_id, |conn, actor, now| {
            workflow::reopen(conn, actor, document_id, request, now)
        })
    }

    pub fn archive(
        &mut self,
        actor_id: i64,
        document_id: i64,
        request: &ActionRequest,
    ) -> Result<Document> {
        request.validate()?;
        self.write(actor_id, |conn, actor, now| {
            workflow::archive(conn, actor, document_id, request, now)
        })
    }

    pub fn split(
        &mut self,
        actor_id: i64,
        document_id: i64,
        request: &SplitRequest,
    ) -> Result<Vec<Document>> {
        request.validate()?;
        self.write(actor_id, |conn, actor, now| {
            splitting::split(conn, actor, document_id, request, now)
        })
    }

    pub fn merge(
        &mut self,
        actor_id: i64,
        target_id: i64,
        request: &MergeRequest,
    ) -> Result<Document> {
        request.validate()?;
        self.write(actor_id, |conn, actor, now| {
            relationships::merge(conn, actor, target_id, request, now)
        })
    }

    // 保管

    pub fn custody(&self, actor_id: i64, document_id: i64) -> Result<CustodySnapshot> {
        self.read_as(actor_id, |conn, _| custody::snapshot(conn, document_id))
    }

    pub fn transfer_custody(
        &mut self,
        actor_id: i64,
        document_id: i64,
        request: &CustodyTransferRequest,
    ) -> Result<DocumentCustody> {
        request.validate()?;
        self.write(actor_id, |conn, actor, now| {
            custody::transfer_custody(conn, actor, document_id, request, now)
        })
    }

    pub fn issue_copy(
        &mut self,
        actor_id: i64,
        document_id: i64,
        request: &IssueCopyRequest,
    ) -> Result<DocumentCopy> {
        request.validate()?;
        self.write(actor_id, |conn, actor, now| {
            custody::issue_copy(conn, actor, document_id, request, now)
        })
    }

    pub fn return_copy(&mut self, actor_id: i64, copy_id: i64) -> Result<DocumentCopy> {
        self.write(actor_id, |conn, actor, now| {
            custody::return_copy(conn, actor, copy_id, now)
        })
    }

    // 關聯、稽核、留言

    pub fn relationships(
        &self,
        actor_id: i64,
        document_id: i64,
    ) -> Result<Vec<DocumentRelationship>> {
        self.read_as(actor_id, |conn, _| relationships::for_document(conn, document_id))
    }

    pub fn link(
        &mut self,
        actor_id: i64,
        document_id: i64,
        request: &LinkRequest,
    ) -> Result<DocumentRelationship> {
        request.validate()?;
        self.write(actor_id, |conn, actor, now| {
            relationships::link(conn, actor, document_id, request, now)
        })
    }

    pub fn unlink(&mut self, actor_id: i64, relationship_id: i64) -> Result<DocumentRelationship> {
        self.write(actor_id, |conn, actor, now| {
            relationships::unlink(conn, actor, relationship_id, now)
        })
    }

    pub fn events(&self, actor_id: i64, document_id: i64) -> Result<Vec<DocumentEvent>> {
        self.read_as(actor_id, |conn, _| {
            documents::require_document(conn, document_id)?;
            audit::list(conn, document_id)
        })
    }

    pub fn remarks(&self, actor_id: i64, document_id: i64) -> Result<Vec<RemarkThread>> {
        self.read_as(actor_id, |conn, _| remarks::thread(conn, document_id))
    }

    pub fn add_remark(
        &mut self,
        actor_id: i64,
        document_id: i64,
        request: &RemarkRequest,
    ) -> Result<DocumentRemark> {
        request.validate()?;
        self.write(actor_id, |conn, actor, now| {
            remarks::add(conn, actor, document_id, request, now)
        })
    }

    // 案件

    pub fn create_case(&mut self, actor_id: i64, request: &CreateCaseRequest) -> Result<DocumentCase> {
        request.validate()?;
        let offset = self.settings.utc_offset_minutes;
        self.write(actor_id, |conn, actor, now| {
            cases::create_case(conn, actor, request, offset, now)
        })
    }

    pub fn get_case(&self, actor_id: i64, case_id: i64) -> Result<CaseDetail> {
        self.read_as(actor_id, |conn, _| cases::get_case(conn, case_id))
    }

    pub fn assign_case(
        &mut self,
        actor_id: i64,
        case_id: i64,
        request: &AssignCaseRequest,
    ) -> Result<Document> {
        self.write(actor_id, |conn, actor, now| {
            cases::assign_document(conn, actor, case_id, request.document_id, now)
        })
    }

    pub fn close_case(&mut self, actor_id: i64, case_id: i64) -> Result<DocumentCase> {
        self.write(actor_id, |conn, actor, now| {
            cases::close_case(conn, actor, case_id, now)
        })
    }

    // 報表

    pub fn status_summary(&self, actor_id: i64) -> Result<Vec<StatusCount>> {
        self.read_as(actor_id, |conn, _| reports::status_summary(conn))
    }

    pub fn department_holdings(&self, actor_id: i64) -> Result<Vec<DepartmentHolding>> {
        self.read_as(actor_id, |conn, _| reports::department_holdings(conn))
    }

    pub fn overdue_transfers(&self, actor_id: i64) -> Result<Vec<OverdueTransfer>> {
        let now = self.clock.now();
        let hours = self.settings.overdue_after_hours;
        self.read_as(actor_id, |conn, _| reports::overdue_transfers(conn, now, hours))
    }

    pub fn export_csv(&self, actor_id: i64, filter: &DocumentFilter) -> Result<Vec<u8>> {
        self.read_as(actor_id, |conn, _| reports::export_csv(conn, filter))
    }

    pub fn notification_counts(&self, actor_id: i64) -> Result<NotificationCounts> {
        self.read_as(actor_id, reports::notification_counts)
    }

    /// 不需登入的公開查詢
    pub fn public_tracking(&self, tracking_number: &str) -> Result<PublicTracking> {
        reports::public_tracking(
            self.store.conn(),
            tracking_number,
            self.settings.public_base_url.as_deref(),
        )
    }

    /// 離線報表工具使用，不經過操作者驗證
    pub fn offline_summary(&self) -> Result<Vec<StatusCount>> {
        reports::status_summary(self.store.conn())
    }

    pub fn offline_export(&self, filter: &DocumentFilter) -> Result<Vec<u8>> {
        reports::export_csv(self.store.conn(), filter)
    }

    pub fn offline_overdue(&self) -> Result<Vec<OverdueTransfer>> {
        reports::overdue_transfers(
            self.store.conn(),
            self.clock.now(),
            self.settings.overdue_after_hours,
        )
    }

    /// 測試與維運檢查用：每種版本的目前保管筆數
    pub fn current_custody_count(
        &self,
        document_id: i64,
        version_type: VersionType,
    ) -> Result<i64> {
        custody::current_count(self.store.conn(), document_id, version_type)
    }
}
