// ==========================================
// 仓库库存跟踪系统 - 来料批次领域模型
// ==========================================
// 职责: 记录一次来料收货, 跟踪其向质检释放的剩余数量
// 不变量: 0 <= remaining_qty <= incoming_qty;
//         status == CLOSED 当且仅当 remaining_qty == 0
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::BatchStatus;

// ==========================================
// IncomingBatch - 来料批次
// ==========================================
// 同一 SKU 允许多个 OPEN 批次并存; 批次创建后不删除
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingBatch {
    pub id: String,                 // 主键 (uuid)
    pub receipt_date: NaiveDate,    // 收货日期
    pub computer_code: String,      // SKU 快照: 电脑码
    pub part_no: String,            // SKU 快照: 零件号 (缺省为空串)
    pub product_name: String,       // SKU 快照: 品名 (缺省为空串)
    pub incoming_qty: i64,          // 收货数量 (> 0)
    pub remaining_qty: i64,         // 剩余可释放数量, 单调递减
    pub status: BatchStatus,        // OPEN / CLOSED
    pub batch_no: i64,              // 批次号
    pub responsible_person: String, // 责任人
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IncomingBatch {
    /// 校验批次数量不变量
    ///
    /// 仅用于读取后的自检/测试断言, 写入路径由仓储层在事务内保证
    pub fn invariant_holds(&self) -> bool {
        0 <= self.remaining_qty
            && self.remaining_qty <= self.incoming_qty
            && (self.status == BatchStatus::Closed) == (self.remaining_qty == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn batch(incoming: i64, remaining: i64, status: BatchStatus) -> IncomingBatch {
        IncomingBatch {
            id: "B001".to_string(),
            receipt_date: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            computer_code: "ABC123".to_string(),
            part_no: "P-01".to_string(),
            product_name: "测试产品".to_string(),
            incoming_qty: incoming,
            remaining_qty: remaining,
            status,
            batch_no: 1,
            responsible_person: "张三".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_批次不变量() {
        assert!(batch(100, 100, BatchStatus::Open).invariant_holds());
        assert!(batch(100, 0, BatchStatus::Closed).invariant_holds());
        // remaining 超界
        assert!(!batch(100, 120, BatchStatus::Open).invariant_holds());
        assert!(!batch(100, -1, BatchStatus::Open).invariant_holds());
        // 状态与 remaining 不一致
        assert!(!batch(100, 0, BatchStatus::Open).invariant_holds());
        assert!(!batch(100, 30, BatchStatus::Closed).invariant_holds());
    }
}
