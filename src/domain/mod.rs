// ==========================================
// 仓库库存跟踪系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、数量不变量
// 红线: 不含数据访问逻辑, 不含业务流程编排
// ==========================================
// 口径: 各台账行持有产品描述字段的写入时快照(电脑码/零件号/品名),
//       主数据后续编辑不回写历史; 仅电脑码作为 SKU 关联键
// ==========================================

pub mod deflashing;
pub mod incoming;
pub mod inspection;
pub mod outgoing;
pub mod product;
pub mod stock;
pub mod types;

// 重导出核心类型
pub use deflashing::DeflashingEntry;
pub use incoming::IncomingBatch;
pub use inspection::{InspectionLogEntry, InspectionRecord, OutcomeResult};
pub use outgoing::OutgoingEntry;
pub use product::{normalize_code, Product};
pub use stock::StockSummary;
pub use types::{BatchStatus, InspectionStatus, ProductionType};
