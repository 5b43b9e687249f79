// ==========================================
// 仓库库存跟踪系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 制造现场仓库的台账记录与库存看板
// 流程: 来料收货 → 质检(OQC) → 去毛边返工 → 出货
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组合根
pub mod app;

// 数据库基础设施（连接初始化/PRAGMA 统一/schema）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BatchStatus, InspectionStatus, ProductionType};

// 领域实体
pub use domain::{
    DeflashingEntry, IncomingBatch, InspectionLogEntry, InspectionRecord, OutcomeResult,
    OutgoingEntry, Product, StockSummary,
};

// API
pub use api::{
    ApiError, ApiResult, CatalogApi, DashboardApi, DeflashingApi, IncomingApi, InspectionApi,
    OutgoingApi, SessionAuthorizer, SharedCredentialAuthorizer,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "仓库库存跟踪系统";
