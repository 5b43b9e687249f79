// ==========================================
// 仓库库存跟踪系统 - 质检(OQC)仓储
// ==========================================
// 职责: 管理 inspection_record / inspection_log 两张表,
//       以及跨表的两个核对事务:
//       1. 释放质检 (来料批次扣减 + 汇总累加 + 占位日志)
//       2. 录入结果 (日志追加 + 汇总累加 + 状态翻转)
// 红线: 两个事务各自必须整体提交或整体回滚,
//       不允许出现只写了一半的中间状态
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::inspection::{InspectionLogEntry, InspectionRecord};
use crate::domain::types::{BatchStatus, InspectionStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

// ==========================================
// InspectionLogView - 日志 + 汇总快照的联查行
// ==========================================
/// 用于质检历史展示的联查行 (日志明细 + 所属汇总的 SKU 快照)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionLogView {
    pub log: InspectionLogEntry,
    pub computer_code: String,
    pub part_no: String,
    pub product_name: String,
}

// ==========================================
// InspectionRepository - 质检仓储
// ==========================================
pub struct InspectionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InspectionRepository {
    /// 创建新的 InspectionRepository 实例
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
        id, incoming_id, computer_code, part_no, product_name,
        before_qty, after_qty, ng_qty, spare_qty, status,
        responsible_person, created_at, updated_at
    "#;

    /// 行映射: inspection_record 表 → InspectionRecord
    fn map_row(row: &Row<'_>) -> rusqlite::Result<InspectionRecord> {
        Ok(InspectionRecord {
            id: row.get(0)?,
            incoming_id: row.get(1)?,
            computer_code: row.get(2)?,
            part_no: row.get(3)?,
            product_name: row.get(4)?,
            before_qty: row.get(5)?,
            after_qty: row.get(6)?,
            ng_qty: row.get(7)?,
            spare_qty: row.get(8)?,
            status: row
                .get::<_, String>(9)?
                .parse()
                .unwrap_or(InspectionStatus::Pending),
            responsible_person: row.get(10)?,
            created_at: row
                .get::<_, String>(11)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap_or_else(|_| chrono::Utc::now()),
            updated_at: row
                .get::<_, String>(12)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }

    // ==========================================
    // 核对事务 1: 释放质检
    // ==========================================

    /// 从来料批次释放数量进入质检
    ///
    /// 单事务内完成:
    /// 1. 校验批次存在且剩余数量充足
    /// 2. 找到或创建该批次的质检汇总 (首次 before=qty, 否则 before+=qty)
    /// 3. 追加一条全零占位日志 (等待后续录入结果)
    /// 4. 批次 remaining -= qty, remaining==0 时置 CLOSED
    ///
    /// # 返回
    /// - Ok(String): 质检汇总 id
    /// - Err(NotFound): 批次不存在
    /// - Err(ValidationError): qty 超出批次剩余数量
    pub fn release_into_inspection(
        &self,
        batch_id: &str,
        qty: i64,
        person: &str,
    ) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = chrono::Utc::now();

        // 1. 读取批次当前状态
        let batch: Option<(i64, String, String, String)> = tx
            .query_row(
                r#"
                SELECT remaining_qty, computer_code, part_no, product_name
                FROM incoming_batch WHERE id = ?1
                "#,
                params![batch_id],
                |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                },
            )
            .optional()?;

        let (remaining_qty, computer_code, part_no, product_name) =
            batch.ok_or_else(|| RepositoryError::NotFound {
                entity: "IncomingBatch".to_string(),
                id: batch_id.to_string(),
            })?;

        if qty > remaining_qty {
            return Err(RepositoryError::ValidationError(format!(
                "释放数量超出批次剩余: qty={}, remaining={}",
                qty, remaining_qty
            )));
        }

        // 2. 找到或创建质检汇总
        let existing: Option<String> = tx
            .query_row(
                "SELECT id FROM inspection_record WHERE incoming_id = ?1 LIMIT 1",
                params![batch_id],
                |row| row.get(0),
            )
            .optional()?;

        let record_id = match existing {
            Some(record_id) => {
                tx.execute(
                    r#"
                    UPDATE inspection_record
                    SET before_qty = before_qty + ?2, updated_at = ?3
                    WHERE id = ?1
                    "#,
                    params![record_id, qty, now.to_rfc3339()],
                )?;
                record_id
            }
            None => {
                let record_id = uuid::Uuid::new_v4().to_string();
                tx.execute(
                    r#"
                    INSERT INTO inspection_record (
                        id, incoming_id, computer_code, part_no, product_name,
                        before_qty, after_qty, ng_qty, spare_qty, status,
                        responsible_person, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, 0, ?7, ?8, ?9, ?9)
                    "#,
                    params![
                        record_id,
                        batch_id,
                        computer_code,
                        part_no,
                        product_name,
                        qty,
                        InspectionStatus::Pending.to_string(),
                        person,
                        now.to_rfc3339(),
                    ],
                )?;
                record_id
            }
        };

        // 3. 追加全零占位日志
        tx.execute(
            r#"
            INSERT INTO inspection_log (
                id, inspection_id, ok_qty, ng_qty, spare_qty,
                responsible_person, created_at
            ) VALUES (?1, ?2, 0, 0, 0, ?3, ?4)
            "#,
            params![
                uuid::Uuid::new_v4().to_string(),
                record_id,
                person,
                now.to_rfc3339(),
            ],
        )?;

        // 4. 批次扣减与状态翻转
        let new_remaining = remaining_qty - qty;
        let new_status = BatchStatus::from_remaining(new_remaining);
        tx.execute(
            r#"
            UPDATE incoming_batch
            SET remaining_qty = ?2, status = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
            params![batch_id, new_remaining, new_status.to_string(), now.to_rfc3339()],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(record_id)
    }

    // ==========================================
    // 核对事务 2: 录入结果
    // ==========================================

    /// 对质检汇总追加一批结果
    ///
    /// 单事务内完成:
    /// 1. 追加日志 (本批 合格/不良/备品)
    /// 2. 汇总累加并重算状态: remaining = before - (after + ng),
    ///    remaining <= 0 时置 DONE
    ///
    /// 入参数量应由调用方完成钳制 (>= 0), 仓储按原样落账
    ///
    /// # 返回
    /// - Ok((remaining, status)): 本次录入后的剩余数量与状态
    /// - Err(NotFound): 汇总不存在
    pub fn apply_outcome(
        &self,
        record_id: &str,
        ok_qty: i64,
        ng_qty: i64,
        spare_qty: i64,
        person: &str,
    ) -> RepositoryResult<(i64, InspectionStatus)> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = chrono::Utc::now();

        // 读取汇总当前累计值
        let existing: Option<(i64, i64, i64, i64)> = tx
            .query_row(
                r#"
                SELECT before_qty, after_qty, ng_qty, spare_qty
                FROM inspection_record WHERE id = ?1
                "#,
                params![record_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let (before_qty, after_qty, cur_ng_qty, cur_spare_qty) =
            existing.ok_or_else(|| RepositoryError::NotFound {
                entity: "InspectionRecord".to_string(),
                id: record_id.to_string(),
            })?;

        // 1. 追加日志
        tx.execute(
            r#"
            INSERT INTO inspection_log (
                id, inspection_id, ok_qty, ng_qty, spare_qty,
                responsible_person, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                uuid::Uuid::new_v4().to_string(),
                record_id,
                ok_qty,
                ng_qty,
                spare_qty,
                person,
                now.to_rfc3339(),
            ],
        )?;

        // 2. 汇总累加与状态重算
        let total_after = after_qty + ok_qty;
        let total_ng = cur_ng_qty + ng_qty;
        let total_spare = cur_spare_qty + spare_qty;
        let remaining = before_qty - (total_after + total_ng);
        let status = InspectionStatus::from_remaining(remaining);

        tx.execute(
            r#"
            UPDATE inspection_record
            SET after_qty = ?2, ng_qty = ?3, spare_qty = ?4,
                status = ?5, responsible_person = ?6, updated_at = ?7
            WHERE id = ?1
            "#,
            params![
                record_id,
                total_after,
                total_ng,
                total_spare,
                status.to_string(),
                person,
                now.to_rfc3339(),
            ],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok((remaining, status))
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 按 id 查询质检汇总
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<InspectionRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM inspection_record WHERE id = ?1",
            Self::SELECT_COLUMNS
        ))?;

        let result = stmt.query_row(params![id], Self::map_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按来料批次查询质检汇总 (每批次至多一条)
    pub fn find_by_incoming_id(
        &self,
        incoming_id: &str,
    ) -> RepositoryResult<Option<InspectionRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM inspection_record WHERE incoming_id = ?1 LIMIT 1",
            Self::SELECT_COLUMNS
        ))?;

        let result = stmt.query_row(params![incoming_id], Self::map_row);
        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询一组来料批次的质检汇总, 最近创建在前 (用于来料列表联查展示)
    pub fn list_by_incoming_ids(
        &self,
        incoming_ids: &[String],
    ) -> RepositoryResult<Vec<InspectionRecord>> {
        if incoming_ids.is_empty() {
            return Ok(vec![]);
        }

        let conn = self.get_conn()?;
        let placeholders = incoming_ids
            .iter()
            .enumerate()
            .map(|(i, _)| format!("?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");

        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM inspection_record
            WHERE incoming_id IN ({})
            ORDER BY created_at DESC
            "#,
            Self::SELECT_COLUMNS,
            placeholders
        ))?;

        let records = stmt
            .query_map(rusqlite::params_from_iter(incoming_ids.iter()), Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// 查询所有 PENDING 汇总, 先创建的在前 (操作员按先后处理)
    pub fn list_pending(&self) -> RepositoryResult<Vec<InspectionRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM inspection_record
            WHERE status = 'PENDING'
            ORDER BY created_at ASC
            "#,
            Self::SELECT_COLUMNS
        ))?;

        let records = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// 查询所有 DONE 汇总 (历史), 最近更新在前
    pub fn list_done(&self) -> RepositoryResult<Vec<InspectionRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM inspection_record
            WHERE status = 'DONE'
            ORDER BY updated_at DESC
            "#,
            Self::SELECT_COLUMNS
        ))?;

        let records = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// 查询全部质检日志并联查所属汇总的 SKU 快照, 最近在前
    pub fn list_logs(&self) -> RepositoryResult<Vec<InspectionLogView>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                l.id, l.inspection_id, l.ok_qty, l.ng_qty, l.spare_qty,
                l.responsible_person, l.created_at,
                r.computer_code, r.part_no, r.product_name
            FROM inspection_log l
            JOIN inspection_record r ON r.id = l.inspection_id
            ORDER BY l.created_at DESC
            "#,
        )?;

        let views = stmt
            .query_map([], |row| {
                Ok(InspectionLogView {
                    log: InspectionLogEntry {
                        id: row.get(0)?,
                        inspection_id: row.get(1)?,
                        ok_qty: row.get(2)?,
                        ng_qty: row.get(3)?,
                        spare_qty: row.get(4)?,
                        responsible_person: row.get(5)?,
                        created_at: row
                            .get::<_, String>(6)?
                            .parse::<chrono::DateTime<chrono::Utc>>()
                            .unwrap_or_else(|_| chrono::Utc::now()),
                    },
                    computer_code: row.get(7)?,
                    part_no: row.get(8)?,
                    product_name: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(views)
    }

    /// 查询某条汇总下的全部日志, 先创建的在前 (测试与审计用)
    pub fn list_logs_by_record(
        &self,
        record_id: &str,
    ) -> RepositoryResult<Vec<InspectionLogEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, inspection_id, ok_qty, ng_qty, spare_qty,
                   responsible_person, created_at
            FROM inspection_log
            WHERE inspection_id = ?1
            ORDER BY created_at ASC
            "#,
        )?;

        let logs = stmt
            .query_map(params![record_id], |row| {
                Ok(InspectionLogEntry {
                    id: row.get(0)?,
                    inspection_id: row.get(1)?,
                    ok_qty: row.get(2)?,
                    ng_qty: row.get(3)?,
                    spare_qty: row.get(4)?,
                    responsible_person: row.get(5)?,
                    created_at: row
                        .get::<_, String>(6)?
                        .parse::<chrono::DateTime<chrono::Utc>>()
                        .unwrap_or_else(|_| chrono::Utc::now()),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }
}
