// ==========================================
// 仓库库存跟踪系统 - 产品目录 API
// ==========================================
// 职责: 产品主数据的增删改查与模糊定位
// 口径: 电脑码入库前统一 trim + 大写; 重复判定以归一化后的值为准
// ==========================================

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::auth::SessionAuthorizer;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::product::{normalize_code, Product};
use crate::domain::types::ProductionType;
use crate::repository::product_repo::ProductRepository;

// ==========================================
// 请求 DTO
// ==========================================

/// 创建产品请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub computer_code: String,
    pub part_no: String,
    pub product_name: String,
    pub production_type: Option<String>, // 缺省 HT
    pub location: Option<String>,
    pub initial_stock: Option<i64>, // 缺省 0
}

/// 编辑产品请求 (整行覆盖)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    pub computer_code: String,
    pub part_no: String,
    pub product_name: String,
    pub production_type: String,
    pub location: Option<String>,
    pub initial_stock: Option<i64>,
}

// ==========================================
// CatalogApi - 产品目录 API
// ==========================================
pub struct CatalogApi {
    product_repo: Arc<ProductRepository>,
    authorizer: Arc<dyn SessionAuthorizer>,
}

impl CatalogApi {
    /// 创建新的CatalogApi实例
    pub fn new(
        product_repo: Arc<ProductRepository>,
        authorizer: Arc<dyn SessionAuthorizer>,
    ) -> Self {
        Self {
            product_repo,
            authorizer,
        }
    }

    /// 创建产品
    ///
    /// # 参数
    /// - request: 创建请求
    /// - session_token: 会话令牌 (写操作必须)
    ///
    /// # 返回
    /// - Ok(Product): 创建后的产品
    /// - Err(InvalidInput): 必填字段缺失
    /// - Err(Conflict): 电脑码重复 (归一化后比较), 不产生任何写入
    pub fn create_product(
        &self,
        request: CreateProductRequest,
        session_token: Option<&str>,
    ) -> ApiResult<Product> {
        self.authorizer.authorize_write(session_token)?;

        // 参数验证 (全部先于写入)
        if request.computer_code.trim().is_empty()
            || request.part_no.trim().is_empty()
            || request.product_name.trim().is_empty()
        {
            return Err(ApiError::InvalidInput(
                "电脑码/零件号/品名均为必填".to_string(),
            ));
        }

        let production_type = match request.production_type {
            Some(ref raw) if !raw.trim().is_empty() => raw
                .parse::<ProductionType>()
                .map_err(ApiError::InvalidInput)?,
            _ => ProductionType::default(),
        };

        let computer_code = normalize_code(&request.computer_code);

        // 重复检查先行, 命中则不产生任何写入
        if self.product_repo.find_by_code(&computer_code)?.is_some() {
            return Err(ApiError::Conflict(format!(
                "电脑码已存在: {}",
                computer_code
            )));
        }

        let now = chrono::Utc::now();
        let product = Product {
            id: uuid::Uuid::new_v4().to_string(),
            computer_code,
            part_no: request.part_no.trim().to_string(),
            product_name: request.product_name.trim().to_string(),
            production_type,
            location: request
                .location
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            initial_stock: request.initial_stock.unwrap_or(0),
            created_at: now,
            updated_at: now,
        };

        self.product_repo.insert(&product)?;
        info!(computer_code = %product.computer_code, "创建产品");
        Ok(product)
    }

    /// 编辑产品 (整行覆盖)
    ///
    /// # 返回
    /// - Err(InvalidInput): 必填字段缺失
    /// - Err(NotFound): id 不存在
    pub fn update_product(
        &self,
        id: &str,
        request: UpdateProductRequest,
        session_token: Option<&str>,
    ) -> ApiResult<Product> {
        self.authorizer.authorize_write(session_token)?;

        if id.trim().is_empty() {
            return Err(ApiError::InvalidInput("产品id不能为空".to_string()));
        }
        if request.computer_code.trim().is_empty()
            || request.part_no.trim().is_empty()
            || request.product_name.trim().is_empty()
            || request.production_type.trim().is_empty()
        {
            return Err(ApiError::InvalidInput(
                "电脑码/零件号/品名/生产类别均为必填".to_string(),
            ));
        }

        let production_type = request
            .production_type
            .parse::<ProductionType>()
            .map_err(ApiError::InvalidInput)?;

        let existing = self
            .product_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Product(id={})不存在", id)))?;

        let updated = Product {
            id: existing.id,
            computer_code: normalize_code(&request.computer_code),
            part_no: request.part_no.trim().to_string(),
            product_name: request.product_name.trim().to_string(),
            production_type,
            location: request
                .location
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            initial_stock: request.initial_stock.unwrap_or(0),
            created_at: existing.created_at,
            updated_at: chrono::Utc::now(),
        };

        self.product_repo.update(&updated)?;
        info!(computer_code = %updated.computer_code, "编辑产品");
        Ok(updated)
    }

    /// 删除产品
    ///
    /// # 说明
    /// - 不级联清理台账: 各台账持有快照字段, 历史仍可读;
    ///   删除后看板不再汇总该 SKU
    pub fn delete_product(&self, id: &str, session_token: Option<&str>) -> ApiResult<()> {
        self.authorizer.authorize_write(session_token)?;

        if id.trim().is_empty() {
            return Err(ApiError::InvalidInput("产品id不能为空".to_string()));
        }

        self.product_repo.delete(id)?;
        info!(product_id = %id, "删除产品");
        Ok(())
    }

    /// 按电脑码或零件号定位产品 (大小写不敏感, 自动 trim)
    ///
    /// # 返回
    /// - Err(InvalidInput): 关键字为空
    /// - Err(NotFound): 未命中
    pub fn lookup_product(&self, keyword: &str) -> ApiResult<Product> {
        if keyword.trim().is_empty() {
            return Err(ApiError::InvalidInput("查询关键字不能为空".to_string()));
        }

        let normalized = normalize_code(keyword);
        debug!(keyword = %normalized, "查找产品");

        self.product_repo
            .lookup(&normalized)?
            .ok_or_else(|| ApiError::NotFound(format!("未找到产品: {}", normalized)))
    }

    /// 查询全部产品, 最近创建在前
    pub fn list_products(&self) -> ApiResult<Vec<Product>> {
        Ok(self.product_repo.list_all()?)
    }
}
