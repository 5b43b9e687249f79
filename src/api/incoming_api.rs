// ==========================================
// 仓库库存跟踪系统 - 来料 API
// ==========================================
// 职责: 来料收货录入与批次列表查询
// 口径: 同一 SKU 允许多个 OPEN 批次并存; 列表附带质检汇总联查
// ==========================================

use std::sync::Arc;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::auth::SessionAuthorizer;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::incoming::IncomingBatch;
use crate::domain::inspection::InspectionRecord;
use crate::domain::product::normalize_code;
use crate::domain::types::BatchStatus;
use crate::repository::incoming_repo::IncomingRepository;
use crate::repository::inspection_repo::InspectionRepository;

// ==========================================
// 请求/响应 DTO
// ==========================================

/// 来料收货请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIncomingRequest {
    pub receipt_date: NaiveDate,
    pub computer_code: String,
    pub part_no: Option<String>,      // 缺省为空串
    pub product_name: Option<String>, // 缺省为空串
    pub incoming_qty: i64,
    pub batch_no: i64,
    pub responsible_person: String,
}

/// 来料批次 + 其质检汇总历史 (列表展示用)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingWithInspection {
    pub batch: IncomingBatch,
    pub inspections: Vec<InspectionRecord>,
}

// ==========================================
// IncomingApi - 来料 API
// ==========================================
pub struct IncomingApi {
    incoming_repo: Arc<IncomingRepository>,
    inspection_repo: Arc<InspectionRepository>,
    authorizer: Arc<dyn SessionAuthorizer>,
}

impl IncomingApi {
    /// 创建新的IncomingApi实例
    pub fn new(
        incoming_repo: Arc<IncomingRepository>,
        inspection_repo: Arc<InspectionRepository>,
        authorizer: Arc<dyn SessionAuthorizer>,
    ) -> Self {
        Self {
            incoming_repo,
            inspection_repo,
            authorizer,
        }
    }

    /// 录入一次来料收货
    ///
    /// # 返回
    /// - Ok(IncomingBatch): OPEN 状态的新批次, remaining = incoming_qty
    /// - Err(InvalidInput): 电脑码/责任人缺失或数量非正
    pub fn create_incoming(
        &self,
        request: CreateIncomingRequest,
        session_token: Option<&str>,
    ) -> ApiResult<IncomingBatch> {
        self.authorizer.authorize_write(session_token)?;

        // 参数验证 (全部先于写入)
        if request.computer_code.trim().is_empty() {
            return Err(ApiError::InvalidInput("电脑码不能为空".to_string()));
        }
        if request.responsible_person.trim().is_empty() {
            return Err(ApiError::InvalidInput("责任人不能为空".to_string()));
        }
        if request.incoming_qty <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "收货数量必须大于零: {}",
                request.incoming_qty
            )));
        }

        let now = chrono::Utc::now();
        let batch = IncomingBatch {
            id: uuid::Uuid::new_v4().to_string(),
            receipt_date: request.receipt_date,
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
            incoming_qty: request.incoming_qty,
            remaining_qty: request.incoming_qty,
            status: BatchStatus::Open,
            batch_no: request.batch_no,
            responsible_person: request.responsible_person.trim().to_string(),
            created_at: now,
            updated_at: now,
        };

        self.incoming_repo.insert(&batch)?;
        info!(
            computer_code = %batch.computer_code,
            incoming_qty = batch.incoming_qty,
            "录入来料批次"
        );
        Ok(batch)
    }

    /// 查询 OPEN 批次, 收货日期新的在前, 附带质检汇总历史
    ///
    /// 读接口口径: 存储故障降级为空列表 (记录告警), 不向调用方抛错
    pub fn list_open(&self) -> Vec<IncomingWithInspection> {
        match self.list_with_inspections(true) {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "查询OPEN来料批次失败, 降级为空列表");
                vec![]
            }
        }
    }

    /// 查询已关闭批次 (历史), 最近创建在前, 附带质检汇总历史
    pub fn list_closed(&self) -> Vec<IncomingWithInspection> {
        match self.list_with_inspections(false) {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "查询来料历史失败, 降级为空列表");
                vec![]
            }
        }
    }

    /// 批次列表与质检汇总的联查装配
    fn list_with_inspections(&self, open: bool) -> ApiResult<Vec<IncomingWithInspection>> {
        let batches = if open {
            self.incoming_repo.list_open()?
        } else {
            self.incoming_repo.list_closed()?
        };

        let ids: Vec<String> = batches.iter().map(|b| b.id.clone()).collect();
        let mut records = self.inspection_repo.list_by_incoming_ids(&ids)?;

        Ok(batches
            .into_iter()
            .map(|batch| {
                let inspections = records
                    .iter()
                    .filter(|r| r.incoming_id == batch.id)
                    .cloned()
                    .collect();
                records.retain(|r| r.incoming_id != batch.id);
                IncomingWithInspection { batch, inspections }
            })
            .collect())
    }
}
