// ==========================================
// 仓库库存跟踪系统 - 产品主数据仓储
// ==========================================
// 职责: 管理 product 表的 CRUD 操作
// 红线: 不含业务逻辑, 只负责数据访问
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::product::Product;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ProductRepository - 产品主数据仓储
// ==========================================
pub struct ProductRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductRepository {
    /// 创建新的 ProductRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 行映射: product 表 → Product
    fn map_row(row: &Row<'_>) -> rusqlite::Result<Product> {
        Ok(Product {
            id: row.get(0)?,
            computer_code: row.get(1)?,
            part_no: row.get(2)?,
            product_name: row.get(3)?,
            production_type: row
                .get::<_, String>(4)?
                .parse()
                .unwrap_or_default(),
            location: row.get(5)?,
            initial_stock: row.get(6)?,
            created_at: row
                .get::<_, String>(7)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap_or_else(|_| chrono::Utc::now()),
            updated_at: row
                .get::<_, String>(8)?
                .parse::<chrono::DateTime<chrono::Utc>>()
                .unwrap_or_else(|_| chrono::Utc::now()),
        })
    }

    const SELECT_COLUMNS: &'static str = r#"
        id, computer_code, part_no, product_name, production_type,
        location, initial_stock, created_at, updated_at
    "#;

    /// 插入产品主数据
    ///
    /// # 说明
    /// - computer_code 唯一冲突由 UNIQUE 约束兜底, 调用方应先走 find_by_code 检查
    pub fn insert(&self, product: &Product) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO product (
                id, computer_code, part_no, product_name, production_type,
                location, initial_stock, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                product.id,
                product.computer_code,
                product.part_no,
                product.product_name,
                product.production_type.to_string(),
                product.location,
                product.initial_stock,
                product.created_at.to_rfc3339(),
                product.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 按 id 整行更新产品主数据
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    pub fn update(&self, product: &Product) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE product SET
                computer_code = ?2,
                part_no = ?3,
                product_name = ?4,
                production_type = ?5,
                location = ?6,
                initial_stock = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
            params![
                product.id,
                product.computer_code,
                product.part_no,
                product.product_name,
                product.production_type.to_string(),
                product.location,
                product.initial_stock,
                product.updated_at.to_rfc3339(),
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: product.id.clone(),
            });
        }
        Ok(())
    }

    /// 按 id 删除产品主数据
    ///
    /// # 说明
    /// - 不级联清理台账: 台账行持有快照字段, 历史仍可读
    pub fn delete(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM product WHERE id = ?1", params![id])?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// 按 id 查询产品主数据
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM product WHERE id = ?1",
            Self::SELECT_COLUMNS
        ))?;

        let result = stmt.query_row(params![id], Self::map_row);
        match result {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按电脑码查询产品主数据 (入参须已归一化)
    pub fn find_by_code(&self, computer_code: &str) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM product WHERE computer_code = ?1",
            Self::SELECT_COLUMNS
        ))?;

        let result = stmt.query_row(params![computer_code], Self::map_row);
        match result {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按电脑码或零件号模糊定位一条产品 (入参须已归一化)
    ///
    /// # 说明
    /// - 零件号比较同样大小写不敏感
    pub fn lookup(&self, keyword: &str) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM product
            WHERE computer_code = ?1 OR UPPER(part_no) = ?1
            LIMIT 1
            "#,
            Self::SELECT_COLUMNS
        ))?;

        let result = stmt.query_row(params![keyword], Self::map_row);
        match result {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询所有产品主数据, 最近创建在前
    pub fn list_all(&self) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM product ORDER BY created_at DESC",
            Self::SELECT_COLUMNS
        ))?;

        let products = stmt
            .query_map([], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }
}
