// ==========================================
// 仓库库存跟踪系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务校验逻辑, 只负责数据访问与行状态事实;
//       跨表写入必须落在单个事务内 (质检释放/录入结果/去毛边回补)
// ==========================================
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

pub mod deflashing_repo;
pub mod error;
pub mod incoming_repo;
pub mod inspection_repo;
pub mod outgoing_repo;
pub mod product_repo;
pub mod stock_repo;

// 重导出核心仓储
pub use deflashing_repo::DeflashingRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use incoming_repo::IncomingRepository;
pub use inspection_repo::{InspectionLogView, InspectionRepository};
pub use outgoing_repo::OutgoingRepository;
pub use product_repo::ProductRepository;
pub use stock_repo::StockSummaryRepository;
