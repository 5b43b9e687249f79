// ==========================================
// 仓库库存跟踪系统 - 去毛边台账仓储
// ==========================================
// 职责: 管理 deflashing_entry 表, 以及台账插入与产品基准库存回补的
//       单事务写入
// 红线: 台账条目与 initial_stock 回补必须同时生效或同时不生效,
//       不允许出现"台账在、库存没加"的中间状态
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::deflashing::DeflashingEntry;
use crate::domain::types::ProductionType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// DeflashingRepository - 去毛边台账仓储
// ==========================================
pub struct DeflashingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DeflashingRepository {
    /// 创建新的 DeflashingRepository 实例
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
        id, computer_code, part_no, product_name, production_type,
        qty_in, qty_out, ng_qty, spare_qty, responsible_person,
        remark, created_at
    "#;

    /// 行映射: deflashing_entry 表 → DeflashingEntry
    fn map_row(row: &Row<'_>) -> rusqlite::Result<DeflashingEntry> {
        Ok(DeflashingEntry {
            id: row.get(0)?,
            computer_code: row.get(1)?,
            part_no: row.get(2)?,
            product_name: row.get(3)?,
            production_type: row
                .get::<_, String>(4)?
                .parse()
                .unwrap_or_default(),
            qty_in: row.get(5)?,
            qty_out: row.get(6)?,
            ng_qty: row.get(7)?,
            spare_qty: row.get(8)?,
            responsible_person: row.get(9)?,
            remark: row.get(10)?,
            created_at: row
                .get::<_, String>(11)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }

    /// 插入去毛边台账并回补产品基准库存 (单事务)
    ///
    /// 单事务内完成:
    /// 1. 插入台账条目
    /// 2. 匹配产品 initial_stock += (qty_out + spare_qty)
    ///
    /// # 返回
    /// - Err(NotFound): 电脑码未匹配到产品, 事务整体回滚
    pub fn insert_with_stock_increment(&self, entry: &DeflashingEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        // 1. 台账条目
        tx.execute(
            r#"
            INSERT INTO deflashing_entry (
                id, computer_code, part_no, product_name, production_type,
                qty_in, qty_out, ng_qty, spare_qty, responsible_person,
                remark, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                entry.id,
                entry.computer_code,
                entry.part_no,
                entry.product_name,
                entry.production_type.to_string(),
                entry.qty_in,
                entry.qty_out,
                entry.ng_qty,
                entry.spare_qty,
                entry.responsible_person,
                entry.remark,
                entry.created_at.to_rfc3339(),
            ],
        )?;

        // 2. 基准库存回补
        let affected = tx.execute(
            r#"
            UPDATE product
            SET initial_stock = initial_stock + ?2, updated_at = ?3
            WHERE computer_code = ?1
            "#,
            params![
                entry.computer_code,
                entry.stock_delta(),
                entry.created_at.to_rfc3339(),
            ],
        )?;

        if affected == 0 {
            // 未匹配到产品: 放弃整个事务, 台账条目一并回滚
            return Err(RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: entry.computer_code.clone(),
            });
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 查询台账历史, 最近创建在前, 可按生产类别过滤
    pub fn list(&self, filter: Option<ProductionType>) -> RepositoryResult<Vec<DeflashingEntry>> {
        let conn = self.get_conn()?;

        let entries = match filter {
            Some(production_type) => {
                let mut stmt = conn.prepare(&format!(
                    r#"
                    SELECT {} FROM deflashing_entry
                    WHERE production_type = ?1
                    ORDER BY created_at DESC
                    "#,
                    Self::SELECT_COLUMNS
                ))?;
                let rows = stmt
                    .query_map(params![production_type.to_string()], Self::map_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM deflashing_entry ORDER BY created_at DESC",
                    Self::SELECT_COLUMNS
                ))?;
                let rows = stmt
                    .query_map([], Self::map_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(entries)
    }
}
