// ==========================================
// 仓库库存跟踪系统 - 出货台账仓储
// ==========================================
// 职责: 管理 outgoing_entry 表的插入与查询
// 口径: 出货只记台账, 不动任何库存计数器 (扣减在看板汇总时发生)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::outgoing::OutgoingEntry;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// OutgoingRepository - 出货台账仓储
// ==========================================
pub struct OutgoingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OutgoingRepository {
    /// 创建新的 OutgoingRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 行映射: outgoing_entry 表 → OutgoingEntry
    fn map_row(row: &Row<'_>) -> rusqlite::Result<OutgoingEntry> {
        Ok(OutgoingEntry {
            id: row.get(0)?,
            computer_code: row.get(1)?,
            part_no: row.get(2)?,
            product_name: row.get(3)?,
            qty_out: row.get(4)?,
            responsible_person: row.get(5)?,
            ship_date: chrono::NaiveDate::parse_from_str(&row.get::<_, String>(6)?, "%Y-%m-%d")
                .unwrap_or_else(|_| chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
            created_at: row
                .get::<_, String>(7)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }

    /// 插入出货台账
    pub fn insert(&self, entry: &OutgoingEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO outgoing_entry (
                id, computer_code, part_no, product_name, qty_out,
                responsible_person, ship_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                entry.id,
                entry.computer_code,
                entry.part_no,
                entry.product_name,
                entry.qty_out,
                entry.responsible_person,
                entry.ship_date.to_string(),
                entry.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 查询出货历史, 最近创建在前
    pub fn list(&self) -> RepositoryResult<Vec<OutgoingEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, computer_code, part_no, product_name, qty_out,
                   responsible_person, ship_date, created_at
            FROM outgoing_entry
            ORDER BY created_at DESC
            "#,
        )?;

        let entries = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
