// ==========================================
// 仓库库存跟踪系统 - 质检(OQC) API
// ==========================================
// 职责: 两阶段质检流程的操作接口
//       阶段一 释放: 从来料批次抽取数量进入质检
//       阶段二 录入: 对已释放数量记录 合格/不良/备品 拆分
// 口径: 释放与录入拆成两步对应现场两班交接的实际节奏,
//       同一汇总允许分多次录入结果直至 DONE
// ==========================================

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::auth::SessionAuthorizer;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::incoming::IncomingBatch;
use crate::domain::inspection::{InspectionRecord, OutcomeResult};
use crate::repository::incoming_repo::IncomingRepository;
use crate::repository::inspection_repo::{InspectionLogView, InspectionRepository};

// ==========================================
// 请求 DTO
// ==========================================

/// 释放质检请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseRequest {
    pub batch_id: String,
    pub qty: i64,
    pub responsible_person: String,
}

/// 录入结果请求 (负数入参按零处理)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordOutcomeRequest {
    pub record_id: String,
    pub ok_qty: Option<i64>,
    pub ng_qty: Option<i64>,
    pub spare_qty: Option<i64>,
    pub responsible_person: String,
}

// ==========================================
// InspectionApi - 质检 API
// ==========================================
pub struct InspectionApi {
    incoming_repo: Arc<IncomingRepository>,
    inspection_repo: Arc<InspectionRepository>,
    authorizer: Arc<dyn SessionAuthorizer>,
}

impl InspectionApi {
    /// 创建新的InspectionApi实例
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

    /// 阶段一: 从来料批次释放数量进入质检
    ///
    /// # 返回
    /// - Ok(String): 质检汇总 id (首次释放时新建, 后续释放累加)
    /// - Err(InvalidInput): qty 非正或超出批次剩余
    /// - Err(NotFound): 批次不存在
    ///
    /// # 说明
    /// - 批次扣减/汇总累加/占位日志三笔写入在仓储层单事务内完成
    pub fn release(
        &self,
        request: ReleaseRequest,
        session_token: Option<&str>,
    ) -> ApiResult<String> {
        self.authorizer.authorize_write(session_token)?;

        if request.batch_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("批次id不能为空".to_string()));
        }
        if request.responsible_person.trim().is_empty() {
            return Err(ApiError::InvalidInput("责任人不能为空".to_string()));
        }
        if request.qty <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "释放数量必须大于零: {}",
                request.qty
            )));
        }

        let record_id = self.inspection_repo.release_into_inspection(
            &request.batch_id,
            request.qty,
            request.responsible_person.trim(),
        )?;

        info!(
            batch_id = %request.batch_id,
            qty = request.qty,
            record_id = %record_id,
            "释放质检"
        );
        Ok(record_id)
    }

    /// 阶段二: 对质检汇总录入一批结果
    ///
    /// # 返回
    /// - Ok(OutcomeResult): 本次录入后的剩余数量与状态
    /// - Err(InvalidInput): 汇总id缺失
    /// - Err(NotFound): 汇总不存在
    ///
    /// # 说明
    /// - 负数入参按零处理落账 (现行口径, 有测试固定)
    /// - 日志追加与汇总累加在仓储层单事务内完成
    pub fn record_outcome(
        &self,
        request: RecordOutcomeRequest,
        session_token: Option<&str>,
    ) -> ApiResult<OutcomeResult> {
        self.authorizer.authorize_write(session_token)?;

        if request.record_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("质检汇总id不能为空".to_string()));
        }
        if request.responsible_person.trim().is_empty() {
            return Err(ApiError::InvalidInput("责任人不能为空".to_string()));
        }

        // 负数入参钳制为零
        let ok_qty = request.ok_qty.unwrap_or(0).max(0);
        let ng_qty = request.ng_qty.unwrap_or(0).max(0);
        let spare_qty = request.spare_qty.unwrap_or(0).max(0);

        let (remaining, status) = self.inspection_repo.apply_outcome(
            &request.record_id,
            ok_qty,
            ng_qty,
            spare_qty,
            request.responsible_person.trim(),
        )?;

        info!(
            record_id = %request.record_id,
            ok_qty, ng_qty, spare_qty, remaining,
            status = %status,
            "录入质检结果"
        );
        Ok(OutcomeResult { remaining, status })
    }

    // ==========================================
    // 查询接口 (存储故障降级为空列表)
    // ==========================================

    /// 待释放队列: 仍有剩余数量的来料批次, 先来先检
    pub fn queue(&self) -> Vec<IncomingBatch> {
        match self.incoming_repo.list_queue() {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "查询质检队列失败, 降级为空列表");
                vec![]
            }
        }
    }

    /// 待录入结果的汇总: PENDING 状态, 先创建的在前
    pub fn pending_outcomes(&self) -> Vec<InspectionRecord> {
        match self.inspection_repo.list_pending() {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "查询待检汇总失败, 降级为空列表");
                vec![]
            }
        }
    }

    /// 质检日志历史: 全部日志联查 SKU 快照, 最近在前
    pub fn log_history(&self) -> Vec<InspectionLogView> {
        match self.inspection_repo.list_logs() {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "查询质检日志失败, 降级为空列表");
                vec![]
            }
        }
    }

    /// 已完结汇总历史: DONE 状态, 最近更新在前
    pub fn done_history(&self) -> Vec<InspectionRecord> {
        match self.inspection_repo.list_done() {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "查询完结汇总失败, 降级为空列表");
                vec![]
            }
        }
    }
}
