// ==========================================
// 仓库库存跟踪系统 - 去毛边台账领域模型
// ==========================================
// 职责: 返工工序台账, 消耗 qty_in 拆分为 合格/备品/不良
// 不变量(写入时硬校验): qty_out + ng_qty == qty_in
// 副作用: 创建成功时产品 initial_stock += qty_out + spare_qty,
//         与台账插入同一事务
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::ProductionType;

// ==========================================
// DeflashingEntry - 去毛边台账条目
// ==========================================
// 创建后不可修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeflashingEntry {
    pub id: String,                      // 主键 (uuid)
    pub computer_code: String,           // SKU 快照: 电脑码
    pub part_no: String,                 // SKU 快照: 零件号
    pub product_name: String,            // SKU 快照: 品名
    pub production_type: ProductionType, // 生产类别 (HT / HK)
    pub qty_in: i64,                     // 投入数量
    pub qty_out: i64,                    // 合格产出数量
    pub ng_qty: i64,                     // 不良数量
    pub spare_qty: i64,                  // 备品数量
    pub responsible_person: String,      // 责任人
    pub remark: Option<String>,          // 备注
    pub created_at: DateTime<Utc>,
}

impl DeflashingEntry {
    /// 回补可用库存的数量: 合格 + 备品
    pub fn stock_delta(&self) -> i64 {
        self.qty_out + self.spare_qty
    }

    /// 数量平衡校验: 合格 + 不良 必须等于投入
    pub fn is_balanced(qty_in: i64, qty_out: i64, ng_qty: i64) -> bool {
        qty_out + ng_qty == qty_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_数量平衡校验() {
        assert!(DeflashingEntry::is_balanced(100, 70, 30));
        assert!(!DeflashingEntry::is_balanced(100, 60, 30));
        assert!(DeflashingEntry::is_balanced(0, 0, 0));
    }

    #[test]
    fn test_库存回补数量() {
        let entry = DeflashingEntry {
            id: "D001".to_string(),
            computer_code: "ABC123".to_string(),
            part_no: "P-01".to_string(),
            product_name: "测试产品".to_string(),
            production_type: ProductionType::Ht,
            qty_in: 100,
            qty_out: 50,
            ng_qty: 50,
            spare_qty: 5,
            responsible_person: "王五".to_string(),
            remark: None,
            created_at: Utc::now(),
        };
        assert_eq!(entry.stock_delta(), 55);
    }
}
