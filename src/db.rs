// ==========================================
// 仓库库存跟踪系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 集中建表语句，应用启动与测试共用同一份 schema
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 说明：
/// - 版本号用于**提示/告警**（不做自动迁移），避免静默在旧库上运行导致隐性错误
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化数据库 schema（幂等）
///
/// 说明：
/// - 全部使用 CREATE TABLE IF NOT EXISTS，可在已有库上重复执行
/// - 台账表只增不删：来料/质检/去毛边/出货历史是审计依据
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
        [],
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        rusqlite::params![CURRENT_SCHEMA_VERSION],
    )?;

    // 产品主数据表
    // computer_code 全局唯一（入库前统一 trim + 大写）
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS product (
            id TEXT PRIMARY KEY,
            computer_code TEXT NOT NULL UNIQUE,
            part_no TEXT NOT NULL,
            product_name TEXT NOT NULL,
            production_type TEXT NOT NULL DEFAULT 'HT',
            location TEXT,
            initial_stock INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // 来料批次表
    // remaining_qty 随质检释放单调递减; status 由 remaining_qty 推导
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS incoming_batch (
            id TEXT PRIMARY KEY,
            receipt_date TEXT NOT NULL,
            computer_code TEXT NOT NULL,
            part_no TEXT NOT NULL DEFAULT '',
            product_name TEXT NOT NULL DEFAULT '',
            incoming_qty INTEGER NOT NULL,
            remaining_qty INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'OPEN',
            batch_no INTEGER NOT NULL,
            responsible_person TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // 质检汇总表（每个来料批次至多一条，可变滚动汇总）
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS inspection_record (
            id TEXT PRIMARY KEY,
            incoming_id TEXT NOT NULL REFERENCES incoming_batch(id),
            computer_code TEXT NOT NULL,
            part_no TEXT NOT NULL DEFAULT '',
            product_name TEXT NOT NULL DEFAULT '',
            before_qty INTEGER NOT NULL,
            after_qty INTEGER NOT NULL DEFAULT 0,
            ng_qty INTEGER NOT NULL DEFAULT 0,
            spare_qty INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'PENDING',
            responsible_person TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // 质检批次日志表（append-only 审计轨迹，不可修改）
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS inspection_log (
            id TEXT PRIMARY KEY,
            inspection_id TEXT NOT NULL REFERENCES inspection_record(id),
            ok_qty INTEGER NOT NULL DEFAULT 0,
            ng_qty INTEGER NOT NULL DEFAULT 0,
            spare_qty INTEGER NOT NULL DEFAULT 0,
            responsible_person TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // 去毛边台账表（创建后不可修改）
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS deflashing_entry (
            id TEXT PRIMARY KEY,
            computer_code TEXT NOT NULL,
            part_no TEXT NOT NULL,
            product_name TEXT NOT NULL,
            production_type TEXT NOT NULL,
            qty_in INTEGER NOT NULL,
            qty_out INTEGER NOT NULL,
            ng_qty INTEGER NOT NULL DEFAULT 0,
            spare_qty INTEGER NOT NULL DEFAULT 0,
            responsible_person TEXT NOT NULL,
            remark TEXT,
            created_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // 出货台账表（创建后不可修改）
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS outgoing_entry (
            id TEXT PRIMARY KEY,
            computer_code TEXT NOT NULL,
            part_no TEXT NOT NULL DEFAULT '',
            product_name TEXT NOT NULL DEFAULT '',
            qty_out INTEGER NOT NULL,
            responsible_person TEXT NOT NULL,
            ship_date TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // 查询索引
    conn.execute_batch(
        r#"
        CREATE INDEX IF NOT EXISTS idx_incoming_status ON incoming_batch(status);
        CREATE INDEX IF NOT EXISTS idx_incoming_code ON incoming_batch(computer_code);
        CREATE INDEX IF NOT EXISTS idx_inspection_incoming ON inspection_record(incoming_id);
        CREATE INDEX IF NOT EXISTS idx_inspection_status ON inspection_record(status);
        CREATE INDEX IF NOT EXISTS idx_inspection_log_parent ON inspection_log(inspection_id);
        CREATE INDEX IF NOT EXISTS idx_deflashing_code ON deflashing_entry(computer_code);
        CREATE INDEX IF NOT EXISTS idx_outgoing_code ON outgoing_entry(computer_code);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_幂等() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        // 重复执行不应报错
        init_schema(&conn).unwrap();

        let version = read_schema_version(&conn).unwrap();
        assert_eq!(version, Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_read_schema_version_无表时返回None() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }
}
