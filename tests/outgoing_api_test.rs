// ==========================================
// OutgoingApi 集成测试
// ==========================================
// 测试范围:
// 1. 出货录入校验
// 2. 出货为纯插入, 不改任何库存计数器
// 3. 历史排序
// ==========================================

mod helpers;

use chrono::NaiveDate;
use helpers::api_test_helper::*;
use warehouse_stock_tracker::api::{ApiError, CreateOutgoingRequest};

fn request(code: &str, qty: i64) -> CreateOutgoingRequest {
    CreateOutgoingRequest {
        computer_code: code.to_string(),
        part_no: Some(format!("PN-{}", code)),
        product_name: Some(format!("产品{}", code)),
        qty_out: qty,
        responsible_person: "赵六".to_string(),
        ship_date: NaiveDate::from_ymd_opt(2025, 11, 10),
    }
}

#[test]
fn test_create_outgoing_正常录入() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let entry = env
        .outgoing_api
        .create_outgoing(request("abc123", 50), env.token())
        .expect("录入失败");

    assert_eq!(entry.computer_code, "ABC123");
    assert_eq!(entry.qty_out, 50);
    assert_eq!(entry.ship_date, NaiveDate::from_ymd_opt(2025, 11, 10).unwrap());
}

#[test]
fn test_create_outgoing_出货日期缺省为当天() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let mut req = request("ABC123", 10);
    req.ship_date = None;
    let entry = env
        .outgoing_api
        .create_outgoing(req, env.token())
        .expect("录入失败");
    assert_eq!(entry.ship_date, chrono::Utc::now().date_naive());
}

#[test]
fn test_create_outgoing_参数校验() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    assert!(matches!(
        env.outgoing_api.create_outgoing(request("ABC123", 0), env.token()),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        env.outgoing_api.create_outgoing(request("ABC123", -5), env.token()),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        env.outgoing_api.create_outgoing(request("  ", 10), env.token()),
        Err(ApiError::InvalidInput(_))
    ));

    let mut req = request("ABC123", 10);
    req.responsible_person = "".to_string();
    assert!(matches!(
        env.outgoing_api.create_outgoing(req, env.token()),
        Err(ApiError::InvalidInput(_))
    ));
}

#[test]
fn test_出货不修改产品基准库存() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    env.create_product("ABC123", 100);

    env.outgoing_api
        .create_outgoing(request("ABC123", 60), env.token())
        .expect("录入失败");

    // 基准库存不动, 扣减只在看板汇总时体现
    let product = env.catalog_api.lookup_product("ABC123").unwrap();
    assert_eq!(product.initial_stock, 100);

    let summary = env.dashboard_api.compute_stock_summary();
    assert_eq!(summary[0].total_outgoing, 60);
    assert_eq!(summary[0].final_stock, 40);
}

#[test]
fn test_history_最近在前() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    env.outgoing_api
        .create_outgoing(request("A1", 10), env.token())
        .expect("录入失败");
    std::thread::sleep(std::time::Duration::from_millis(5));
    env.outgoing_api
        .create_outgoing(request("A2", 20), env.token())
        .expect("录入失败");

    let history = env.outgoing_api.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].computer_code, "A2");
    assert_eq!(history[1].computer_code, "A1");
}
