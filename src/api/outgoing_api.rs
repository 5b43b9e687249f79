// ==========================================
// 仓库库存跟踪系统 - 出货 API
// ==========================================
// 职责: 出货台账录入与历史查询
// 口径: 纯插入, 不动任何库存计数器
// ==========================================

use std::sync::Arc;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::auth::SessionAuthorizer;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::outgoing::OutgoingEntry;
use crate::domain::product::normalize_code;
use crate::repository::outgoing_repo::OutgoingRepository;

// ==========================================
// 请求 DTO
// ==========================================

/// 出货台账录入请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOutgoingRequest {
    pub computer_code: String,
    pub part_no: Option<String>,      // 缺省为空串
    pub product_name: Option<String>, // 缺省为空串
    pub qty_out: i64,
    pub responsible_person: String,
    pub ship_date: Option<NaiveDate>, // 缺省为当天
}

// ==========================================
// OutgoingApi - 出货 API
// ==========================================
pub struct OutgoingApi {
    outgoing_repo: Arc<OutgoingRepository>,
    authorizer: Arc<dyn SessionAuthorizer>,
}

impl OutgoingApi {
    /// 创建新的OutgoingApi实例
    pub fn new(
        outgoing_repo: Arc<OutgoingRepository>,
        authorizer: Arc<dyn SessionAuthorizer>,
    ) -> Self {
        Self {
            outgoing_repo,
            authorizer,
        }
    }

    /// 录入一次出货
    ///
    /// # 返回
    /// - Ok(OutgoingEntry): 创建后的台账条目
    /// - Err(InvalidInput): 电脑码/责任人缺失或数量非正
    pub fn create_outgoing(
        &self,
        request: CreateOutgoingRequest,
        session_token: Option<&str>,
    ) -> ApiResult<OutgoingEntry> {
        self.authorizer.authorize_write(session_token)?;

        if request.computer_code.trim().is_empty() {
            return Err(ApiError::InvalidInput("电脑码不能为空".to_string()));
        }
        if request.responsible_person.trim().is_empty() {
            return Err(ApiError::InvalidInput("责任人不能为空".to_string()));
        }
        if request.qty_out <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "出货数量必须大于零: {}",
                request.qty_out
            )));
        }

        let entry = OutgoingEntry {
            id: uuid::Uuid::new_v4().to_string(),
            computer_code: normalize_code(&request.computer_code),
            part_no: request
                .part_no
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            product_name: request
                .product_name
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            qty_out: request.qty_out,
            responsible_person: request.responsible_person.trim().to_string(),
            ship_date: request
                .ship_date
                .unwrap_or_else(|| chrono::Utc::now().date_naive()),
            created_at: chrono::Utc::now(),
        };

        self.outgoing_repo.insert(&entry)?;
        info!(
            computer_code = %entry.computer_code,
            qty_out = entry.qty_out,
            "录入出货台账"
        );
        Ok(entry)
    }

    /// 查询出货历史, 最近在前
    ///
    /// 读接口口径: 存储故障降级为空列表 (记录告警)
    pub fn history(&self) -> Vec<OutgoingEntry> {
        match self.outgoing_repo.list() {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "查询出货历史失败, 降级为空列表");
                vec![]
            }
        }
    }
}
