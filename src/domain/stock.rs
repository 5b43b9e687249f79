// ==========================================
// 仓库库存跟踪系统 - 库存看板领域模型
// ==========================================
// 职责: 每 SKU 的读侧汇总行, 由看板每次请求实时计算, 不落库
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::ProductionType;

// ==========================================
// StockSummary - 单 SKU 库存汇总
// ==========================================
// final_stock = initial_stock + total_incoming + total_after_oqc
//             + total_deflashing_qty - total_outgoing
//
// 注意: 去毛边产出在创建台账时已累加进 initial_stock, 看板汇总时
// 再次按台账求和计入 final_stock, 即同一数量被计入两次。此为沿用
// 的现行业务口径, 在调整口径前保持原样 (有测试固定该行为)。
// TODO: 与业务方确认去毛边产出的双重计入口径是否需要收敛为单次计入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSummary {
    // ===== 主数据字段 =====
    pub computer_code: String,
    pub part_no: String,
    pub product_name: String,
    pub production_type: ProductionType,
    pub location: Option<String>,

    pub initial_stock: i64, // 初始库存基准 (含历次去毛边回补)

    // ===== 各台账合计 =====
    pub total_incoming: i64,       // Σ 来料收货数量
    pub total_after_oqc: i64,      // Σ 质检合格数量
    pub total_outgoing: i64,       // Σ 出货数量
    pub total_deflashing: i64,     // 去毛边台账条数
    pub total_deflashing_qty: i64, // Σ (去毛边合格 + 备品)
    pub total_deflashing_ng: i64,  // Σ 去毛边不良数量

    // ===== 派生合计 =====
    pub final_stock: i64,
}
