// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用测试环境与数据准备函数
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::{Arc, Mutex};
use chrono::NaiveDate;
use rusqlite::Connection;
use tempfile::NamedTempFile;

use warehouse_stock_tracker::api::{
    CatalogApi, CreateIncomingRequest, CreateProductRequest, DashboardApi, DeflashingApi,
    IncomingApi, InspectionApi, OutgoingApi, SessionAuthorizer, SharedCredentialAuthorizer,
};
use warehouse_stock_tracker::domain::incoming::IncomingBatch;
use warehouse_stock_tracker::domain::product::Product;
use warehouse_stock_tracker::repository::{
    DeflashingRepository, IncomingRepository, InspectionRepository, OutgoingRepository,
    ProductRepository, StockSummaryRepository,
};

/// 测试用共享操作员凭据
pub const TEST_USER: &str = "operator";
pub const TEST_PASS: &str = "warehouse";

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 包含所有API实例、必要的Repository句柄与一个已登录的会话令牌
pub struct ApiTestEnv {
    pub db_path: String,
    pub catalog_api: Arc<CatalogApi>,
    pub incoming_api: Arc<IncomingApi>,
    pub inspection_api: Arc<InspectionApi>,
    pub deflashing_api: Arc<DeflashingApi>,
    pub outgoing_api: Arc<OutgoingApi>,
    pub dashboard_api: Arc<DashboardApi>,

    // Repository层（用于测试数据准备与断言）
    pub product_repo: Arc<ProductRepository>,
    pub incoming_repo: Arc<IncomingRepository>,
    pub inspection_repo: Arc<InspectionRepository>,
    pub deflashing_repo: Arc<DeflashingRepository>,

    /// 授权器 (登录/注销)
    pub authorizer: Arc<SharedCredentialAuthorizer>,
    /// 已登录的会话令牌
    pub session: String,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 创建新的API测试环境
    ///
    /// # 说明
    /// - 使用临时数据库文件
    /// - 所有Repository共享同一连接
    /// - 自动完成一次登录, 令牌存于 self.session
    pub fn new() -> Result<Self, String> {
        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;

        let conn = Connection::open(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
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
        // 授权器与API层
        // ==========================================

        let authorizer = Arc::new(SharedCredentialAuthorizer::new(TEST_USER, TEST_PASS));
        let write_auth: Arc<dyn SessionAuthorizer> = authorizer.clone();

        let catalog_api = Arc::new(CatalogApi::new(product_repo.clone(), write_auth.clone()));
        let incoming_api = Arc::new(IncomingApi::new(
            incoming_repo.clone(),
            inspection_repo.clone(),
            write_auth.clone(),
        ));
        let inspection_api = Arc::new(InspectionApi::new(
            incoming_repo.clone(),
            inspection_repo.clone(),
            write_auth.clone(),
        ));
        let deflashing_api = Arc::new(DeflashingApi::new(
            deflashing_repo.clone(),
            write_auth.clone(),
        ));
        let outgoing_api = Arc::new(OutgoingApi::new(outgoing_repo, write_auth));
        let dashboard_api = Arc::new(DashboardApi::new(stock_repo));

        let session = authorizer
            .login(TEST_USER, TEST_PASS)
            .map_err(|e| format!("测试登录失败: {}", e))?;

        Ok(Self {
            db_path,
            catalog_api,
            incoming_api,
            inspection_api,
            deflashing_api,
            outgoing_api,
            dashboard_api,
            product_repo,
            incoming_repo,
            inspection_repo,
            deflashing_repo,
            authorizer,
            session,
            _temp_file: temp_file,
        })
    }

    /// 会话令牌 (Option 形式, 方便直接传入API)
    pub fn token(&self) -> Option<&str> {
        Some(&self.session)
    }

    /// 准备一个产品 (电脑码入库前会被归一化)
    pub fn create_product(&self, computer_code: &str, initial_stock: i64) -> Product {
        self.catalog_api
            .create_product(
                CreateProductRequest {
                    computer_code: computer_code.to_string(),
                    part_no: format!("PN-{}", computer_code.trim().to_uppercase()),
                    product_name: format!("产品{}", computer_code.trim().to_uppercase()),
                    production_type: None,
                    location: Some("A-01".to_string()),
                    initial_stock: Some(initial_stock),
                },
                self.token(),
            )
            .expect("创建测试产品失败")
    }

    /// 准备一个来料批次
    pub fn create_incoming(&self, computer_code: &str, qty: i64, date: NaiveDate) -> IncomingBatch {
        self.incoming_api
            .create_incoming(
                CreateIncomingRequest {
                    receipt_date: date,
                    computer_code: computer_code.to_string(),
                    part_no: Some(format!("PN-{}", computer_code)),
                    product_name: Some(format!("产品{}", computer_code)),
                    incoming_qty: qty,
                    batch_no: 1,
                    responsible_person: "张三".to_string(),
                },
                self.token(),
            )
            .expect("创建测试来料批次失败")
    }
}
