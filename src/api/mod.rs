// ==========================================
// 仓库库存跟踪系统 - API 层
// ==========================================
// 职责: 提供业务操作接口, 供展示层调用
// 口径: 写操作先过授权器, 再做全量校验, 最后才触达仓储;
//       读操作(队列/历史/看板)存储故障时降级为空列表
// ==========================================

pub mod auth;
pub mod catalog_api;
pub mod dashboard_api;
pub mod deflashing_api;
pub mod error;
pub mod incoming_api;
pub mod inspection_api;
pub mod outgoing_api;

// 重导出核心类型
pub use auth::{SessionAuthorizer, SharedCredentialAuthorizer};
pub use catalog_api::{CatalogApi, CreateProductRequest, UpdateProductRequest};
pub use dashboard_api::DashboardApi;
pub use deflashing_api::{CreateDeflashingRequest, DeflashingApi};
pub use error::{ApiError, ApiResult};
pub use incoming_api::{CreateIncomingRequest, IncomingApi, IncomingWithInspection};
pub use inspection_api::{InspectionApi, RecordOutcomeRequest, ReleaseRequest};
pub use outgoing_api::{CreateOutgoingRequest, OutgoingApi};
