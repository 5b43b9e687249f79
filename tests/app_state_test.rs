// ==========================================
// AppState 集成测试 (组合根)
// ==========================================
// 测试范围:
// 1. AppState::new 在空库文件上完成建表与装配
// 2. 登录 → 写入 → 看板 的整链路
// ==========================================

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use warehouse_stock_tracker::api::{CreateIncomingRequest, CreateProductRequest};
use warehouse_stock_tracker::app::AppState;

#[test]
fn test_app_state_空库启动并走通整链路() {
    let temp_file = NamedTempFile::new().expect("创建临时文件失败");
    let db_path = temp_file.path().to_str().unwrap().to_string();

    // 空库文件上启动: 自动建表
    let state = AppState::new(db_path).expect("AppState初始化失败");

    // 共享口令登录 (缺省凭据)
    let token = state
        .authorizer
        .login("operator", "warehouse")
        .expect("登录失败");

    state
        .catalog_api
        .create_product(
            CreateProductRequest {
                computer_code: "ABC123".to_string(),
                part_no: "PN-001".to_string(),
                product_name: "测试产品".to_string(),
                production_type: None,
                location: None,
                initial_stock: Some(10),
            },
            Some(&token),
        )
        .expect("创建产品失败");

    state
        .incoming_api
        .create_incoming(
            CreateIncomingRequest {
                receipt_date: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
                computer_code: "ABC123".to_string(),
                part_no: None,
                product_name: None,
                incoming_qty: 40,
                batch_no: 1,
                responsible_person: "张三".to_string(),
            },
            Some(&token),
        )
        .expect("来料录入失败");

    let summary = state.dashboard_api.compute_stock_summary();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].final_stock, 50);

    // 重复启动 (已有schema) 不应失败
    drop(state);
    let db_path = temp_file.path().to_str().unwrap().to_string();
    let state = AppState::new(db_path).expect("二次启动失败");
    assert_eq!(state.dashboard_api.compute_stock_summary().len(), 1);
}
