// ==========================================
// 仓库库存跟踪系统 - 去毛边 API
// ==========================================
// 职责: 去毛边台账录入与历史查询
// 口径: 数量平衡 (qty_out + ng == qty_in) 在写入前硬校验,
//       与质检的滚动累计不同, 这里一次录入必须自平
// ==========================================

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::auth::SessionAuthorizer;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::deflashing::DeflashingEntry;
use crate::domain::product::normalize_code;
use crate::domain::types::ProductionType;
use crate::repository::deflashing_repo::DeflashingRepository;

// ==========================================
// 请求 DTO
// ==========================================

/// 去毛边台账录入请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeflashingRequest {
    pub computer_code: String,
    pub part_no: String,
    pub product_name: String,
    pub production_type: String,
    pub qty_in: i64,
    pub qty_out: i64,
    pub ng_qty: i64,
    pub spare_qty: i64,
    pub responsible_person: String,
    pub remark: Option<String>,
}

// ==========================================
// DeflashingApi - 去毛边 API
// ==========================================
pub struct DeflashingApi {
    deflashing_repo: Arc<DeflashingRepository>,
    authorizer: Arc<dyn SessionAuthorizer>,
}

impl DeflashingApi {
    /// 创建新的DeflashingApi实例
    pub fn new(
        deflashing_repo: Arc<DeflashingRepository>,
        authorizer: Arc<dyn SessionAuthorizer>,
    ) -> Self {
        Self {
            deflashing_repo,
            authorizer,
        }
    }

    /// 录入去毛边台账
    ///
    /// # 返回
    /// - Ok(DeflashingEntry): 创建后的台账条目
    /// - Err(InvalidInput): 必填字段缺失 / 数量为负 / 数量不平衡
    /// - Err(NotFound): 电脑码未匹配到产品 (整体回滚, 台账不落)
    ///
    /// # 说明
    /// - 台账插入与产品基准库存回补 (qty_out + spare) 在仓储层单事务内完成
    pub fn create_deflashing(
        &self,
        request: CreateDeflashingRequest,
        session_token: Option<&str>,
    ) -> ApiResult<DeflashingEntry> {
        self.authorizer.authorize_write(session_token)?;

        // 参数验证 (全部先于写入)
        if request.computer_code.trim().is_empty()
            || request.part_no.trim().is_empty()
            || request.product_name.trim().is_empty()
            || request.production_type.trim().is_empty()
            || request.responsible_person.trim().is_empty()
        {
            return Err(ApiError::InvalidInput(
                "电脑码/零件号/品名/生产类别/责任人均为必填".to_string(),
            ));
        }

        let production_type = request
            .production_type
            .parse::<ProductionType>()
            .map_err(ApiError::InvalidInput)?;

        if request.qty_in <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "投入数量必须大于零: {}",
                request.qty_in
            )));
        }
        if request.qty_out < 0 || request.ng_qty < 0 || request.spare_qty < 0 {
            return Err(ApiError::InvalidInput(
                "合格/不良/备品数量不能为负".to_string(),
            ));
        }

        // 数量平衡硬校验: 合格 + 不良 必须等于投入
        if !DeflashingEntry::is_balanced(request.qty_in, request.qty_out, request.ng_qty) {
            return Err(ApiError::InvalidInput(format!(
                "数量不平衡: qty_out({}) + ng({}) != qty_in({})",
                request.qty_out, request.ng_qty, request.qty_in
            )));
        }

        let entry = DeflashingEntry {
            id: uuid::Uuid::new_v4().to_string(),
            computer_code: normalize_code(&request.computer_code),
            part_no: request.part_no.trim().to_string(),
            product_name: request.product_name.trim().to_string(),
            production_type,
            qty_in: request.qty_in,
            qty_out: request.qty_out,
            ng_qty: request.ng_qty,
            spare_qty: request.spare_qty,
            responsible_person: request.responsible_person.trim().to_string(),
            remark: request
                .remark
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            created_at: chrono::Utc::now(),
        };

        self.deflashing_repo.insert_with_stock_increment(&entry)?;
        info!(
            computer_code = %entry.computer_code,
            qty_in = entry.qty_in,
            stock_delta = entry.stock_delta(),
            "录入去毛边台账并回补基准库存"
        );
        Ok(entry)
    }

    /// 查询台账历史, 最近在前, 可按生产类别过滤
    ///
    /// 读接口口径: 存储故障降级为空列表 (记录告警)
    pub fn history(&self, filter: Option<ProductionType>) -> Vec<DeflashingEntry> {
        match self.deflashing_repo.list(filter) {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "查询去毛边历史失败, 降级为空列表");
                vec![]
            }
        }
    }
}
