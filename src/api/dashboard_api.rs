// ==========================================
// 仓库库存跟踪系统 - 库存看板 API
// ==========================================
// 职责: 逐 SKU 实时汇总四本台账, 产出看板行
// 口径: 纯读侧投影, 每次请求重算; 目录规模为数十到数千 SKU,
//       无需缓存
// ==========================================

use std::sync::Arc;
use tracing::warn;

use crate::domain::stock::StockSummary;
use crate::repository::stock_repo::StockSummaryRepository;

// ==========================================
// DashboardApi - 库存看板 API
// ==========================================
pub struct DashboardApi {
    stock_repo: Arc<StockSummaryRepository>,
}

impl DashboardApi {
    /// 创建新的DashboardApi实例
    pub fn new(stock_repo: Arc<StockSummaryRepository>) -> Self {
        Self { stock_repo }
    }

    /// 计算全部 SKU 的库存汇总, 电脑码升序
    ///
    /// # 返回
    /// - 空目录返回空列表, 不报错
    /// - 存储故障降级为空列表 (记录告警)
    ///
    /// # 口径
    /// final_stock = initial_stock + Σ来料 + Σ质检合格
    ///             + Σ(去毛边合格+备品) - Σ出货
    /// 去毛边产出的双重计入 (写入时回补 + 汇总时再求和) 为沿用口径,
    /// 见 stock_repo 说明与 dashboard 固定测试
    pub fn compute_stock_summary(&self) -> Vec<StockSummary> {
        match self.stock_repo.compute_all() {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "库存看板汇总失败, 降级为空列表");
                vec![]
            }
        }
    }
}
