// ==========================================
// 仓库库存跟踪系统 - 来料批次仓储
// ==========================================
// 职责: 管理 incoming_batch 表的插入与查询
// 红线: remaining_qty/status 的变更只发生在质检释放事务内
//       (见 inspection_repo), 本仓储不提供单独的计数器更新
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::incoming::IncomingBatch;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// IncomingRepository - 来料批次仓储
// ==========================================
pub struct IncomingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl IncomingRepository {
    /// 创建新的 IncomingRepository 实例
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

    const SELECT_COLUMNS: &'static str = r#"
        id, receipt_date, computer_code, part_no, product_name,
        incoming_qty, remaining_qty, status, batch_no, responsible_person,
        created_at, updated_at
    "#;

    /// 行映射: incoming_batch 表 → IncomingBatch
    fn map_row(row: &Row<'_>) -> rusqlite::Result<IncomingBatch> {
        Ok(IncomingBatch {
            id: row.get(0)?,
            receipt_date: chrono::NaiveDate::parse_from_str(
                &row.get::<_, String>(1)?,
                "%Y-%m-%d",
            )
            .unwrap_or_else(|_| chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
            computer_code: row.get(2)?,
            part_no: row.get(3)?,
            product_name: row.get(4)?,
            incoming_qty: row.get(5)?,
            remaining_qty: row.get(6)?,
            status: row
                .get::<_, String>(7)?
                .parse()
                .unwrap_or(crate::domain::types::BatchStatus::Open),
            batch_no: row.get(8)?,
            responsible_person: row.get(9)?,
            created_at: row
                .get::<_, String>(10)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap_or_else(|_| chrono::Utc::now()),
            updated_at: row
                .get::<_, String>(11)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }

    /// 插入来料批次
    pub fn insert(&self, batch: &IncomingBatch) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO incoming_batch (
                id, receipt_date, computer_code, part_no, product_name,
                incoming_qty, remaining_qty, status, batch_no, responsible_person,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                batch.id,
                batch.receipt_date.to_string(),
                batch.computer_code,
                batch.part_no,
                batch.product_name,
                batch.incoming_qty,
                batch.remaining_qty,
                batch.status.to_string(),
                batch.batch_no,
                batch.responsible_person,
                batch.created_at.to_rfc3339(),
                batch.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按 id 查询来料批次
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<IncomingBatch>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM incoming_batch WHERE id = ?1",
            Self::SELECT_COLUMNS
        ))?;

        let result = stmt.query_row(params![id], Self::map_row);
        match result {
            Ok(batch) => Ok(Some(batch)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询所有 OPEN 批次, 收货日期新的在前
    pub fn list_open(&self) -> RepositoryResult<Vec<IncomingBatch>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM incoming_batch
            WHERE status = 'OPEN'
            ORDER BY receipt_date DESC
            "#,
            Self::SELECT_COLUMNS
        ))?;

        let batches = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    /// 查询所有非 OPEN 批次 (历史), 最近创建在前
    pub fn list_closed(&self) -> RepositoryResult<Vec<IncomingBatch>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM incoming_batch
            WHERE status != 'OPEN'
            ORDER BY created_at DESC
            "#,
            Self::SELECT_COLUMNS
        ))?;

        let batches = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    /// 查询质检释放队列: 仍有剩余数量的批次, 先来先检 (创建早的在前)
    pub fn list_queue(&self) -> RepositoryResult<Vec<IncomingBatch>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM incoming_batch
            WHERE remaining_qty > 0
            ORDER BY created_at ASC
            "#,
            Self::SELECT_COLUMNS
        ))?;

        let batches = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }
}
