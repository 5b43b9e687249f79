// ==========================================
// 仓库库存跟踪系统 - 库存看板仓储
// ==========================================
// 职责: 对产品目录逐 SKU 汇总四本台账, 产出看板行
// 口径: 纯读侧投影, 每次请求实时计算, 不写任何表
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::stock::StockSummary;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

// ==========================================
// StockSummaryRepository - 库存看板仓储
// ==========================================
pub struct StockSummaryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StockSummaryRepository {
    /// 创建新的 StockSummaryRepository 实例
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

    /// 逐 SKU 计算库存汇总, 电脑码升序
    ///
    /// final_stock = initial_stock + Σ来料 + Σ质检合格 + Σ(去毛边合格+备品) - Σ出货
    ///
    /// 注意: initial_stock 在去毛边台账创建时已经累加过 (qty_out + spare),
    /// 这里按台账再求和一次, 同一数量计入两次。此为沿用的现行业务口径,
    /// 调整前保持原样 (dashboard 测试固定该行为)。
    pub fn compute_all(&self) -> RepositoryResult<Vec<StockSummary>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                p.computer_code,
                p.part_no,
                p.product_name,
                p.production_type,
                p.location,
                p.initial_stock,
                COALESCE((SELECT SUM(i.incoming_qty)
                          FROM incoming_batch i
                          WHERE i.computer_code = p.computer_code), 0) AS total_incoming,
                COALESCE((SELECT SUM(r.after_qty)
                          FROM inspection_record r
                          WHERE r.computer_code = p.computer_code), 0) AS total_after_oqc,
                COALESCE((SELECT SUM(o.qty_out)
                          FROM outgoing_entry o
                          WHERE o.computer_code = p.computer_code), 0) AS total_outgoing,
                COALESCE((SELECT COUNT(*)
                          FROM deflashing_entry d
                          WHERE d.computer_code = p.computer_code), 0) AS total_deflashing,
                COALESCE((SELECT SUM(d.qty_out + d.spare_qty)
                          FROM deflashing_entry d
                          WHERE d.computer_code = p.computer_code), 0) AS total_deflashing_qty,
                COALESCE((SELECT SUM(d.ng_qty)
                          FROM deflashing_entry d
                          WHERE d.computer_code = p.computer_code), 0) AS total_deflashing_ng
            FROM product p
            ORDER BY p.computer_code ASC
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                let initial_stock: i64 = row.get(5)?;
                let total_incoming: i64 = row.get(6)?;
                let total_after_oqc: i64 = row.get(7)?;
                let total_outgoing: i64 = row.get(8)?;
                let total_deflashing: i64 = row.get(9)?;
                let total_deflashing_qty: i64 = row.get(10)?;
                let total_deflashing_ng: i64 = row.get(11)?;

                Ok(StockSummary {
                    computer_code: row.get(0)?,
                    part_no: row.get(1)?,
                    product_name: row.get(2)?,
                    production_type: row
                        .get::<_, String>(3)?
                        .parse()
                        .unwrap_or_default(),
                    location: row.get(4)?,
                    initial_stock,
                    total_incoming,
                    total_after_oqc,
                    total_outgoing,
                    total_deflashing,
                    total_deflashing_qty,
                    total_deflashing_ng,
                    final_stock: initial_stock
                        + total_incoming
                        + total_after_oqc
                        + total_deflashing_qty
                        - total_outgoing,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
