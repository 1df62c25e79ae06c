#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use doc_tracker::adapters::sqlite::directory as directory_db;
use doc_tracker::config::{DepartmentSeed, UserSeed};
use doc_tracker::core::directory;
use doc_tracker::core::requests::{CreateDocumentRequest, ForwardRequest};
use doc_tracker::domain::model::{Document, DocumentTransfer, UserRole};
use doc_tracker::domain::ports::{Clock, ManualClock};
use doc_tracker::{DocumentRegistry, SqliteStore, WorkflowSettings};
use std::sync::Arc;
use tempfile::TempDir;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 17, 1, 0, 0).unwrap()
}

/// 三個部門與六位使用者的測試環境
pub struct Fixture {
    pub registry: DocumentRegistry,
    pub clock: Arc<ManualClock>,
    pub _dir: TempDir,
    pub reg: i64,
    pub fin: i64,
    pub leg: i64,
    /// REG 管理者
    pub admin: i64,
    /// REG 承辦
    pub alice: i64,
    /// FIN 承辦
    pub bob: i64,
    /// FIN 承辦
    pub carol: i64,
    /// LEG 承辦
    pub dave: i64,
    /// LEG 檔案管理員
    pub rita: i64,
}

fn department(code: &str, name: &str) -> DepartmentSeed {
    DepartmentSeed {
        code: code.to_string(),
        name: name.to_string(),
    }
}

fn user(name: &str, department: &str, role: UserRole) -> UserSeed {
    UserSeed {
        name: name.to_string(),
        email: format!("{}@example.org", name.to_lowercase()),
        department: department.to_string(),
        role,
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_settings(WorkflowSettings::default())
    }

    pub fn with_settings(settings: WorkflowSettings) -> Self {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path().join("records.db")).unwrap();

        let departments = vec![
            department("REG", "Registry"),
            department("FIN", "Finance"),
            department("LEG", "Legal"),
        ];
        let users = vec![
            user("Admin", "REG", UserRole::Admin),
            user("Alice", "REG", UserRole::Staff),
            user("Bob", "FIN", UserRole::Staff),
            user("Carol", "FIN", UserRole::Staff),
            user("Dave", "LEG", UserRole::Staff),
            user("Rita", "LEG", UserRole::RecordsOfficer),
        ];
        directory::seed(store.conn(), &departments, &users).unwrap();

        let dept = |code: &str| {
            directory_db::find_department_by_code(store.conn(), code)
                .unwrap()
                .unwrap()
                .id
        };
        let person = |name: &str| {
            directory_db::find_user_by_email(store.conn(), &format!("{}@example.org", name))
                .unwrap()
                .unwrap()
                .id
        };
        let (reg, fin, leg) = (dept("REG"), dept("FIN"), dept("LEG"));
        let (admin, alice, bob, carol, dave, rita) = (
            person("admin"),
            person("alice"),
            person("bob"),
            person("carol"),
            person("dave"),
            person("rita"),
        );

        let clock = Arc::new(ManualClock::new(start_time()));
        let shared: Arc<dyn Clock> = clock.clone();
        let registry = DocumentRegistry::new(store, shared, settings);

        Self {
            registry,
            clock,
            _dir: dir,
            reg,
            fin,
            leg,
            admin,
            alice,
            bob,
            carol,
            dave,
            rita,
        }
    }

    pub fn create_doc(&mut self, actor: i64, title: &str) -> Document {
        self.registry
            .create_document(
                actor,
                &CreateDocumentRequest {
                    title: title.to_string(),
                    document_type: "memo".to_string(),
                    ..Default::default()
                },
            )
            .unwrap()
    }

    pub fn forward_to(&mut self, actor: i64, document_id: i64, department: i64) -> DocumentTransfer {
        self.registry
            .forward(actor, document_id, &ForwardRequest::to_department(department))
            .unwrap()
    }

    pub fn document(&self, id: i64) -> Document {
        self.registry.get_document(self.admin, id).unwrap()
    }

    pub fn event_count(&self, id: i64) -> usize {
        self.registry.events(self.admin, id).unwrap().len()
    }
}
