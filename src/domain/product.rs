// ==========================================
// 仓库库存跟踪系统 - 产品主数据领域模型
// ==========================================
// 职责: 产品目录条目与初始库存基准
// 口径: initial_stock 仅由人工录入/编辑与去毛边完成量修改,
//       来料/质检/出货一律不直接改动
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::ProductionType;

// ==========================================
// Product - 产品主数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,                      // 主键 (uuid)
    pub computer_code: String,           // 电脑码, 全局唯一, 入库前 trim + 大写
    pub part_no: String,                 // 零件号
    pub product_name: String,            // 品名
    pub production_type: ProductionType, // 生产类别 (HT / HK)
    pub location: Option<String>,        // 库位
    pub initial_stock: i64,              // 初始库存基准 (出货较多时可为负)
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 电脑码/零件号统一归一化: 去首尾空白 + 大写
///
/// 主数据唯一性与各台账的 SKU 关联都以归一化后的值为准
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}
