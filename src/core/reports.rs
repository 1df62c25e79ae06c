use crate::adapters::sqlite::{directory as directory_db, documents as doc_db, transfers};
use crate::core::documents::require_by_tracking_number;
use crate::domain::model::{Department, DocumentFilter, DocumentStatus, TransferStatus, User};
use crate::utils::error::{DocTrackError, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: DocumentStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentHolding {
    pub department_id: i64,
    pub code: String,
    pub name: String,
    pub held: i64,
    pub pending_incoming: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdueTransfer {
    pub transfer_id: i64,
    pub document_id: i64,
    pub tracking_number: String,
    pub title: String,
    pub from_department: String,
    pub to_department: String,
    pub forwarded_at: DateTime<Utc>,
    pub hours_pending: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationCounts {
    pub incoming: i64,
    pub addressed_to_me: i64,
    pub returned: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub from_department: String,
    pub to_department: String,
    pub status: TransferStatus,
    pub forwarded_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// 公開查詢結果；不含附註與使用者
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicTracking {
    pub tracking_number: String,
    pub title: String,
    pub status: DocumentStatus,
    pub current_department: String,
    pub timeline: Vec<TimelineEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

struct DepartmentNames(HashMap<i64, Department>);

impl DepartmentNames {
    fn load(conn: &Connection) -> Result<Self> {
        let departments = directory_db::list_departments(conn)?;
        Ok(Self(departments.into_iter().map(|d| (d.id, d)).collect()))
    }

    fn name(&self, id: i64) -> String {
        self.0
            .get(&id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| format!("#{}", id))
    }
}

/// 每個狀態的文件數；沒有文件的狀態補 0
pub fn status_summary(conn: &Connection) -> Result<Vec<StatusCount>> {
    let counts: HashMap<String, i64> = doc_db::count_by_status(conn)?.into_iter().collect();
    Ok(DocumentStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: counts.get(status.as_str()).copied().unwrap_or(0),
        })
        .collect())
}

pub fn department_holdings(conn: &Connection) -> Result<Vec<DepartmentHolding>> {
    let held: HashMap<i64, i64> = doc_db::holdings_by_department(conn)?.into_iter().collect();
    let incoming: HashMap<i64, i64> = transfers::pending_incoming_by_department(conn)?
        .into_iter()
        .collect();

    Ok(directory_db::list_departments(conn)?
        .into_iter()
        .map(|d| DepartmentHolding {
            held: held.get(&d.id).copied().unwrap_or(0),
            pending_incoming: incoming.get(&d.id).copied().unwrap_or(0),
            department_id: d.id,
            code: d.code,
            name: d.name,
        })
        .collect())
}

pub fn overdue_transfers(
    conn: &Connection,
    now: DateTime<Utc>,
    overdue_after_hours: i64,
) -> Result<Vec<OverdueTransfer>> {
    let cutoff = now - Duration::hours(overdue_after_hours);
    let names = DepartmentNames::load(conn)?;

    let mut out = Vec::new();
    for transfer in transfers::pending_forwarded_before(conn, cutoff)? {
        let Some(document) = doc_db::find_document(conn, transfer.document_id)? else {
            continue;
        };
        out.push(OverdueTransfer {
            transfer_id: transfer.id,
            document_id: document.id,
            tracking_number: document.tracking_number,
            title: document.title,
            from_department: names.name(transfer.from_department_id),
            to_department: names.name(transfer.to_department_id),
            forwarded_at: transfer.forwarded_at,
            hours_pending: (now - transfer.forwarded_at).num_hours(),
        });
    }
    Ok(out)
}

/// 匯出所有符合篩選條件的文件為 CSV（含標題列），不分頁
pub fn export_csv(conn: &Connection, filter: &DocumentFilter) -> Result<Vec<u8>> {
    let names = DepartmentNames::load(conn)?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "tracking_number",
        "title",
        "document_type",
        "status",
        "origin_department",
        "current_department",
        "case_id",
        "created_at",
        "updated_at",
    ])?;

    let mut exported = 0usize;
    doc_db::for_each_matching(conn, filter, |doc| -> Result<()> {
        writer.write_record([
            doc.tracking_number,
            doc.title,
            doc.document_type,
            doc.status.to_string(),
            names.name(doc.origin_department_id),
            names.name(doc.current_department_id),
            doc.case_id.map(|id| id.to_string()).unwrap_or_default(),
            doc.created_at.to_rfc3339(),
            doc.updated_at.to_rfc3339(),
        ])?;
        exported += 1;
        Ok(())
    })?;

    tracing::debug!("📤 exported {} document(s) to CSV", exported);
    writer
        .into_inner()
        .map_err(|e| DocTrackError::IoError(e.into_error()))
}

pub fn notification_counts(conn: &Connection, actor: &User) -> Result<NotificationCounts> {
    let incoming = transfers::count_pending_incoming(conn, actor.department_id)?;
    let addressed_to_me = transfers::count_pending_for_user(conn, actor.id)?;
    let returned = doc_db::count_with_status_in_department(
        conn,
        DocumentStatus::Returned,
        actor.department_id,
    )?;
    Ok(NotificationCounts {
        incoming,
        addressed_to_me,
        returned,
        total: incoming + returned,
    })
}

/// 以設定的對外網址組出查詢連結
pub fn tracking_url(public_base_url: Option<&str>, tracking_number: &str) -> Option<String> {
    let base = Url::parse(public_base_url?).ok()?;
    let mut url = base.join("track/").ok()?;
    url.path_segments_mut().ok()?.pop_if_empty().push(tracking_number);
    Some(url.to_string())
}

pub fn public_tracking(
    conn: &Connection,
    tracking_number: &str,
    public_base_url: Option<&str>,
) -> Result<PublicTracking> {
    let document = require_by_tracking_number(conn, tracking_number)?;
    let names = DepartmentNames::load(conn)?;

    let timeline = transfers::list_for_document(conn, document.id)?
        .into_iter()
        .map(|t| TimelineEntry {
            from_department: names.name(t.from_department_id),
            to_department: names.name(t.to_department_id),
            status: t.status,
            forwarded_at: t.forwarded_at,
            resolved_at: t.resolved_at,
        })
        .collect();

    Ok(PublicTracking {
        url: tracking_url(public_base_url, &document.tracking_number),
        current_department: names.name(document.current_department_id),
        tracking_number: document.tracking_number,
        title: document.title,
        status: document.status,
        timeline,
    })
}

/// 狀態統計轉成 status → count 的對照，方便輸出
pub fn summary_map(summary: &[StatusCount]) -> BTreeMap<String, i64> {
    summary
        .iter()
        .map(|s| (s.status.to_string(), s.count))
        .collect()
}
