use super::rows::{self, DOCUMENT_COLUMNS};
use crate::domain::model::{Document, DocumentFilter, DocumentStatus};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 500;

/// 新增文件所需欄位
#[derive(Debug, Clone)]
pub struct NewDocument<'a> {
    pub tracking_number: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub document_type: &'a str,
    pub status: DocumentStatus,
    pub origin_department_id: i64,
    pub current_department_id: i64,
    pub current_user_id: Option<i64>,
    pub created_by: i64,
    pub case_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub split_suffix: Option<char>,
    pub metadata: &'a serde_json::Value,
    pub now: DateTime<Utc>,
}

pub fn insert_document(conn: &Connection, doc: &NewDocument<'_>) -> rusqlite::Result<i64> {
    let metadata = doc.metadata.to_string();
    let suffix = doc.split_suffix.map(|c| c.to_string());
    conn.execute(
        "INSERT INTO documents(tracking_number, title, description, document_type, status, \
         origin_department_id, current_department_id, current_user_id, created_by, case_id, \
         parent_id, split_suffix, metadata, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
        params![
            doc.tracking_number,
            doc.title,
            doc.description,
            doc.document_type,
            doc.status.as_str(),
            doc.origin_department_id,
            doc.current_department_id,
            doc.current_user_id,
            doc.created_by,
            doc.case_id,
            doc.parent_id,
            suffix,
            metadata,
            doc.now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_document(conn: &Connection, id: i64) -> rusqlite::Result<Option<Document>> {
    conn.query_row(
        &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id=?1"),
        params![id],
        rows::document,
    )
    .optional()
}

pub fn find_by_tracking_number(conn: &Connection, tracking: &str) -> rusqlite::Result<Option<Document>> {
    conn.query_row(
        &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE tracking_number=?1"),
        params![tracking],
        rows::document,
    )
    .optional()
}

/// 更新狀態與目前持有者
pub fn update_routing(
    conn: &Connection,
    id: i64,
    status: DocumentStatus,
    department_id: i64,
    user_id: Option<i64>,
    now: DateTime<Utc>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE documents SET status=?2, current_department_id=?3, current_user_id=?4, updated_at=?5 \
         WHERE id=?1",
        params![id, status.as_str(), department_id, user_id, now],
    )
}

pub fn update_status(
    conn: &Connection,
    id: i64,
    status: DocumentStatus,
    now: DateTime<Utc>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE documents SET status=?2, updated_at=?3 WHERE id=?1",
        params![id, status.as_str(), now],
    )
}

pub fn update_details(
    conn: &Connection,
    doc: &Document,
    now: DateTime<Utc>,
) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE documents SET title=?2, description=?3, document_type=?4, metadata=?5, updated_at=?6 \
         WHERE id=?1",
        params![
            doc.id,
            doc.title,
            doc.description,
            doc.document_type,
            doc.metadata.to_string(),
            now
        ],
    )
}

pub fn set_case(conn: &Connection, id: i64, case_id: i64, now: DateTime<Utc>) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE documents SET case_id=?2, updated_at=?3 WHERE id=?1",
        params![id, case_id, now],
    )
}

/// 母文件已使用的拆分後綴
pub fn child_suffixes(conn: &Connection, parent_id: i64) -> rusqlite::Result<Vec<char>> {
    let mut stmt = conn.prepare(
        "SELECT split_suffix FROM documents WHERE parent_id=?1 AND split_suffix IS NOT NULL",
    )?;
    let rows = stmt.query_map(params![parent_id], |row| row.get::<_, String>(0))?;
    let mut out = Vec::new();
    for raw in rows {
        if let Some(c) = raw?.chars().next() {
            out.push(c);
        }
    }
    Ok(out)
}

pub fn children(conn: &Connection, parent_id: i64) -> rusqlite::Result<Vec<Document>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE parent_id=?1 ORDER BY split_suffix ASC"
    ))?;
    let rows = stmt.query_map(params![parent_id], rows::document)?;
    rows.collect()
}

pub fn in_case(conn: &Connection, case_id: i64) -> rusqlite::Result<Vec<Document>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE case_id=?1 ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map(params![case_id], rows::document)?;
    rows.collect()
}

/// LIKE 萬用字元跳脫
pub fn like_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

/// 列表與匯出共用的篩選條件，參數 ?1..?6
const FILTER_WHERE: &str = "WHERE (?1 IS NULL OR status=?1) \
       AND (?2 IS NULL OR current_department_id=?2) \
       AND (?3 IS NULL OR case_id=?3) \
       AND (?4 IS NULL OR created_at>=?4) \
       AND (?5 IS NULL OR created_at<?5) \
       AND (?6 IS NULL OR tracking_number LIKE ?6 || '%' ESCAPE '\\' \
            OR title LIKE '%' || ?6 || '%' ESCAPE '\\')";

struct FilterParams {
    status: Option<&'static str>,
    department_id: Option<i64>,
    case_id: Option<i64>,
    created_from: Option<DateTime<Utc>>,
    created_until: Option<DateTime<Utc>>,
    q: Option<String>,
}

impl FilterParams {
    fn from_filter(filter: &DocumentFilter) -> Self {
        Self {
            status: filter.status.map(|s| s.as_str()),
            department_id: filter.department_id,
            case_id: filter.case_id,
            created_from: filter.created_from.map(day_start),
            created_until: filter
                .created_to
                .and_then(|d| d.succ_opt())
                .map(day_start),
            q: filter
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(like_escape),
        }
    }
}

/// 分頁列表，最新的在前
pub fn list_documents(conn: &Connection, filter: &DocumentFilter) -> rusqlite::Result<Vec<Document>> {
    let limit = filter.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE) as i64;
    let offset = filter.offset.unwrap_or(0) as i64;
    let p = FilterParams::from_filter(filter);

    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents {FILTER_WHERE} \
         ORDER BY id DESC \
         LIMIT ?7 OFFSET ?8"
    ))?;
    let rows = stmt.query_map(
        params![
            p.status,
            p.department_id,
            p.case_id,
            p.created_from,
            p.created_until,
            p.q,
            limit,
            offset
        ],
        rows::document,
    )?;
    rows.collect()
}

/// 逐筆走訪所有符合條件的文件（不分頁，依 id 由舊到新），供匯出使用
pub fn for_each_matching<E>(
    conn: &Connection,
    filter: &DocumentFilter,
    mut visit: impl FnMut(Document) -> Result<(), E>,
) -> Result<(), E>
where
    E: From<rusqlite::Error>,
{
    let p = FilterParams::from_filter(filter);
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents {FILTER_WHERE} ORDER BY id ASC"
    ))?;
    let mut rows = stmt.query(params![
        p.status,
        p.department_id,
        p.case_id,
        p.created_from,
        p.created_until,
        p.q
    ])?;
    while let Some(row) = rows.next()? {
        visit(rows::document(row)?)?;
    }
    Ok(())
}

/// 搜尋建議：追蹤號前綴或標題包含
pub fn suggestions(conn: &Connection, q: &str, limit: usize) -> rusqlite::Result<Vec<Document>> {
    let pattern = like_escape(q.trim());
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents \
         WHERE tracking_number LIKE ?1 || '%' ESCAPE '\\' OR title LIKE '%' || ?1 || '%' ESCAPE '\\' \
         ORDER BY CASE WHEN tracking_number LIKE ?1 || '%' ESCAPE '\\' THEN 0 ELSE 1 END, id DESC \
         LIMIT ?2"
    ))?;
    let rows = stmt.query_map(params![pattern, limit as i64], rows::document)?;
    rows.collect()
}

pub fn count_by_status(conn: &Connection) -> rusqlite::Result<Vec<(String, i64)>> {
    let mut stmt =
        conn.prepare("SELECT status, COUNT(1) FROM documents GROUP BY status ORDER BY status ASC")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

/// 各部門目前持有（未結束）的文件數，傳送中的文件算在送出部門直到對方接收
pub fn holdings_by_department(conn: &Connection) -> rusqlite::Result<Vec<(i64, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT current_department_id, COUNT(1) FROM documents \
         WHERE status IN ('received', 'in_transit', 'returned', 'completed') \
         GROUP BY current_department_id",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

pub fn count_with_status_in_department(
    conn: &Connection,
    status: DocumentStatus,
    department_id: i64,
) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(1) FROM documents WHERE status=?1 AND current_department_id=?2",
        params![status.as_str(), department_id],
        |row| row.get(0),
    )
}
