// ==========================================
// 仓库库存跟踪系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 说明: 展示层(桌面/网页壳)在进程外, 通过本状态暴露的API调用台账逻辑
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{
    CatalogApi, DashboardApi, DeflashingApi, IncomingApi, InspectionApi, OutgoingApi,
    SessionAuthorizer, SharedCredentialAuthorizer,
};
use crate::db;
use crate::repository::{
    DeflashingRepository, IncomingRepository, InspectionRepository, OutgoingRepository,
    ProductRepository, StockSummaryRepository,
};

/// 缺省共享操作员账号 (可用环境变量覆盖)
const DEFAULT_OPERATOR_USER: &str = "operator";
const DEFAULT_OPERATOR_PASS: &str = "warehouse";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 产品目录API
    pub catalog_api: Arc<CatalogApi>,

    /// 来料API
    pub incoming_api: Arc<IncomingApi>,

    /// 质检API
    pub inspection_api: Arc<InspectionApi>,

    /// 去毛边API
    pub deflashing_api: Arc<DeflashingApi>,

    /// 出货API
    pub outgoing_api: Arc<OutgoingApi>,

    /// 库存看板API
    pub dashboard_api: Arc<DashboardApi>,

    /// 共享口令授权器 (登录/注销入口)
    pub authorizer: Arc<SharedCredentialAuthorizer>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 该方法会:
    /// 1. 打开共享数据库连接并初始化 schema
    /// 2. 初始化所有Repository (共享同一连接, 串行化写入)
    /// 3. 创建授权器与所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState, 数据库路径: {}", db_path);

        // 创建数据库连接 (共享连接)
        let conn = db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;

        db::init_schema(&conn).map_err(|e| format!("初始化schema失败: {}", e))?;

        // schema 版本仅提示, 不做自动迁移
        match db::read_schema_version(&conn) {
            Ok(Some(v)) if v != db::CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    "schema_version={} 与代码期望的 {} 不一致",
                    v,
                    db::CURRENT_SCHEMA_VERSION
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("读取schema_version失败(将继续启动): {}", e),
        }

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================

        let product_repo = Arc::new(ProductRepository::from_connection(conn.clone()));
        let incoming_repo = Arc::new(IncomingRepository::from_connection(conn.clone()));
        let inspection_repo = Arc::new(InspectionRepository::from_connection(conn.clone()));
        let deflashing_repo = Arc::new(DeflashingRepository::from_connection(conn.clone()));
        let outgoing_repo = Arc::new(OutgoingRepository::from_connection(conn.clone()));
        let stock_repo = Arc::new(StockSummaryRepository::from_connection(conn.clone()));

        // ==========================================
        // 授权器 (共享口令, 环境变量可覆盖)
        // ==========================================

        let username = std::env::var("WAREHOUSE_OPERATOR_USER")
            .unwrap_or_else(|_| DEFAULT_OPERATOR_USER.to_string());
        let password = std::env::var("WAREHOUSE_OPERATOR_PASS")
            .unwrap_or_else(|_| DEFAULT_OPERATOR_PASS.to_string());
        let authorizer = Arc::new(SharedCredentialAuthorizer::new(username, password));
        let write_auth: Arc<dyn SessionAuthorizer> = authorizer.clone();

        // ==========================================
        // 初始化API层
        // ==========================================

        let catalog_api = Arc::new(CatalogApi::new(product_repo.clone(), write_auth.clone()));
        let incoming_api = Arc::new(IncomingApi::new(
            incoming_repo.clone(),
            inspection_repo.clone(),
            write_auth.clone(),
        ));
        let inspection_api = Arc::new(InspectionApi::new(
            incoming_repo,
            inspection_repo,
            write_auth.clone(),
        ));
        let deflashing_api = Arc::new(DeflashingApi::new(deflashing_repo, write_auth.clone()));
        let outgoing_api = Arc::new(OutgoingApi::new(outgoing_repo, write_auth));
        let dashboard_api = Arc::new(DashboardApi::new(stock_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            catalog_api,
            incoming_api,
            inspection_api,
            deflashing_api,
            outgoing_api,
            dashboard_api,
            authorizer,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 > 用户数据目录 > 当前目录回退
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("WAREHOUSE_STOCK_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 先给一个默认回退值，后续如果能拿到 data_dir 再覆盖
    let mut path = PathBuf::from("./warehouse_stock.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("warehouse-stock-tracker-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("warehouse-stock-tracker");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("warehouse_stock.db");
    }

    path.to_string_lossy().to_string()
}
