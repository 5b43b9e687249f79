// ==========================================
// 仓库库存跟踪系统 - 质检(OQC)领域模型
// ==========================================
// 职责: 质检汇总(可变滚动合计) + 质检批次日志(append-only 审计轨迹)
// 不变量: after_qty + ng_qty <= before_qty;
//         status == DONE 当且仅当 before_qty - (after_qty + ng_qty) <= 0
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::InspectionStatus;

// ==========================================
// InspectionRecord - 质检汇总
// ==========================================
// 每个来料批次至多一条: 首次释放时创建, 后续释放累加 before_qty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub id: String,                 // 主键 (uuid)
    pub incoming_id: String,        // 关联来料批次
    pub computer_code: String,      // SKU 快照: 电脑码
    pub part_no: String,            // SKU 快照: 零件号
    pub product_name: String,       // SKU 快照: 品名
    pub before_qty: i64,            // 累计已释放质检数量
    pub after_qty: i64,             // 累计合格数量
    pub ng_qty: i64,                // 累计不良数量
    pub spare_qty: i64,             // 累计备品数量
    pub status: InspectionStatus,   // PENDING / DONE
    pub responsible_person: String, // 最近一次操作责任人
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InspectionRecord {
    /// 未出结果的剩余数量 (状态口径按 <= 0 判定 DONE)
    pub fn remaining_qty(&self) -> i64 {
        self.before_qty - (self.after_qty + self.ng_qty)
    }

    /// 校验汇总不变量
    pub fn invariant_holds(&self) -> bool {
        self.after_qty + self.ng_qty <= self.before_qty
            && (self.status == InspectionStatus::Done) == (self.remaining_qty() <= 0)
    }
}

// ==========================================
// InspectionLogEntry - 质检批次日志
// ==========================================
// 每次释放追加一条全零占位, 每次录入结果追加一条实际拆分;
// 创建后不可修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionLogEntry {
    pub id: String,                 // 主键 (uuid)
    pub inspection_id: String,      // 关联质检汇总
    pub ok_qty: i64,                // 本批合格数量
    pub ng_qty: i64,                // 本批不良数量
    pub spare_qty: i64,             // 本批备品数量
    pub responsible_person: String, // 责任人
    pub created_at: DateTime<Utc>,
}

// ==========================================
// OutcomeResult - 录入结果的返回值
// ==========================================
// 调用方据此提示操作员该批次是否还有待检数量
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeResult {
    pub remaining: i64,           // before - (after + ng), 可为负
    pub status: InspectionStatus, // 本次录入后的汇总状态
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(before: i64, after: i64, ng: i64, status: InspectionStatus) -> InspectionRecord {
        InspectionRecord {
            id: "Q001".to_string(),
            incoming_id: "B001".to_string(),
            computer_code: "ABC123".to_string(),
            part_no: "P-01".to_string(),
            product_name: "测试产品".to_string(),
            before_qty: before,
            after_qty: after,
            ng_qty: ng,
            spare_qty: 0,
            status,
            responsible_person: "李四".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_质检汇总不变量() {
        assert!(record(100, 0, 0, InspectionStatus::Pending).invariant_holds());
        assert!(record(100, 90, 10, InspectionStatus::Done).invariant_holds());
        assert!(record(100, 60, 30, InspectionStatus::Pending).invariant_holds());
        // 合格+不良超出已释放数
        assert!(!record(100, 90, 20, InspectionStatus::Done).invariant_holds());
        // 状态与剩余数量不一致
        assert!(!record(100, 90, 10, InspectionStatus::Pending).invariant_holds());
        assert!(!record(100, 60, 30, InspectionStatus::Done).invariant_holds());
    }

    #[test]
    fn test_剩余数量计算() {
        assert_eq!(record(100, 60, 30, InspectionStatus::Pending).remaining_qty(), 10);
        assert_eq!(record(100, 90, 10, InspectionStatus::Done).remaining_qty(), 0);
    }
}
