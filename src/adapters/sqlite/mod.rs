pub mod cases;
pub mod custody;
pub mod directory;
pub mod documents;
pub mod events;
pub mod relationships;
pub mod remarks;
mod rows;
pub mod schema;
pub mod sequences;
pub mod transfers;

use crate::utils::error::Result;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// 開啟（必要時建立）資料庫檔案並安裝資料表
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::prepare(conn, Some(db_path))
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::prepare(conn, None)
    }

    fn prepare(conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::install_schema(&conn)?;
        tracing::debug!("SQLite schema ready (version {})", schema::SCHEMA_VERSION);
        Ok(Self { conn, db_path })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// 以 IMMEDIATE 模式開始交易：一開始就取得寫鎖，
    /// 追蹤號與案件號的產生因此被序列化。
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}
