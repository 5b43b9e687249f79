// ==========================================
// 仓库库存跟踪系统 - 出货台账领域模型
// ==========================================
// 职责: 记录出货, 不修改任何库存计数器 (扣减只发生在看板汇总时)
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// OutgoingEntry - 出货台账条目
// ==========================================
// 创建后不可修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutgoingEntry {
    pub id: String,                 // 主键 (uuid)
    pub computer_code: String,      // SKU 快照: 电脑码
    pub part_no: String,            // SKU 快照: 零件号 (缺省为空串)
    pub product_name: String,       // SKU 快照: 品名 (缺省为空串)
    pub qty_out: i64,               // 出货数量 (> 0)
    pub responsible_person: String, // 责任人
    pub ship_date: NaiveDate,       // 出货日期 (缺省为当天)
    pub created_at: DateTime<Utc>,
}
