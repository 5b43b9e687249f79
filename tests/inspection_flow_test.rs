// ==========================================
// InspectionApi 集成测试 (两阶段质检核对流程)
// ==========================================
// 测试范围:
// 1. 释放: 批次扣减/汇总累加/占位日志/状态翻转的单事务语义
// 2. 录入: 多次部分录入直至 DONE, 负数入参按零处理
// 3. 队列与待检列表排序
// ==========================================

mod helpers;

use chrono::NaiveDate;
use helpers::api_test_helper::*;
use warehouse_stock_tracker::api::{ApiError, RecordOutcomeRequest, ReleaseRequest};
use warehouse_stock_tracker::domain::types::{BatchStatus, InspectionStatus};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn release(env: &ApiTestEnv, batch_id: &str, qty: i64) -> Result<String, ApiError> {
    env.inspection_api.release(
        ReleaseRequest {
            batch_id: batch_id.to_string(),
            qty,
            responsible_person: "李四".to_string(),
        },
        env.token(),
    )
}

fn record(
    env: &ApiTestEnv,
    record_id: &str,
    ok: i64,
    ng: i64,
    spare: i64,
) -> Result<warehouse_stock_tracker::OutcomeResult, ApiError> {
    env.inspection_api.record_outcome(
        RecordOutcomeRequest {
            record_id: record_id.to_string(),
            ok_qty: Some(ok),
            ng_qty: Some(ng),
            spare_qty: Some(spare),
            responsible_person: "王五".to_string(),
        },
        env.token(),
    )
}

// ==========================================
// 阶段一: 释放
// ==========================================

#[test]
fn test_release_批次不存在() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let result = release(&env, "no-such-batch", 10);
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_release_数量校验() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let batch = env.create_incoming("ABC123", 20, date(2025, 11, 3));

    // 非正数量
    assert!(matches!(
        release(&env, &batch.id, 0),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        release(&env, &batch.id, -5),
        Err(ApiError::InvalidInput(_))
    ));

    // 超出剩余数量
    assert!(matches!(
        release(&env, &batch.id, 21),
        Err(ApiError::InvalidInput(_))
    ));

    // 失败的释放不应留下任何痕迹
    let refreshed = env.incoming_repo.find_by_id(&batch.id).unwrap().unwrap();
    assert_eq!(refreshed.remaining_qty, 20);
    assert!(env
        .inspection_repo
        .find_by_incoming_id(&batch.id)
        .unwrap()
        .is_none());
}

#[test]
fn test_release_两次释放累加同一汇总() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let batch = env.create_incoming("ABC123", 20, date(2025, 11, 3));

    let record_id_1 = release(&env, &batch.id, 10).expect("第一次释放失败");
    let record_id_2 = release(&env, &batch.id, 5).expect("第二次释放失败");

    // 同一批次的两次释放落到同一条汇总
    assert_eq!(record_id_1, record_id_2);

    let record = env
        .inspection_repo
        .find_by_incoming_id(&batch.id)
        .unwrap()
        .expect("汇总应存在");
    assert_eq!(record.before_qty, 15);
    assert_eq!(record.after_qty, 0);
    assert_eq!(record.status, InspectionStatus::Pending);

    let refreshed = env.incoming_repo.find_by_id(&batch.id).unwrap().unwrap();
    assert_eq!(refreshed.remaining_qty, 5);
    assert_eq!(refreshed.status, BatchStatus::Open);
    assert!(refreshed.invariant_holds());

    // 每次释放都追加一条全零占位日志
    let logs = env.inspection_repo.list_logs_by_record(&record_id_1).unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l.ok_qty == 0 && l.ng_qty == 0 && l.spare_qty == 0));
}

#[test]
fn test_release_全量释放后批次关闭() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let batch = env.create_incoming("ABC123", 20, date(2025, 11, 3));

    release(&env, &batch.id, 20).expect("释放失败");

    let refreshed = env.incoming_repo.find_by_id(&batch.id).unwrap().unwrap();
    assert_eq!(refreshed.remaining_qty, 0);
    assert_eq!(refreshed.status, BatchStatus::Closed);
    assert!(refreshed.invariant_holds());

    // 已关闭批次不能再释放
    assert!(matches!(
        release(&env, &batch.id, 1),
        Err(ApiError::InvalidInput(_))
    ));
}

// ==========================================
// 阶段二: 录入结果
// ==========================================

#[test]
fn test_record_outcome_汇总不存在() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let result = record(&env, "no-such-record", 1, 0, 0);
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[test]
fn test_record_outcome_分次录入直至完结() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let batch = env.create_incoming("ABC123", 100, date(2025, 11, 3));
    let record_id = release(&env, &batch.id, 100).expect("释放失败");

    // 第一班: 合格60
    let result = record(&env, &record_id, 60, 0, 0).expect("录入失败");
    assert_eq!(result.remaining, 40);
    assert_eq!(result.status, InspectionStatus::Pending);

    // 第二班: 合格30 不良10 备品2
    let result = record(&env, &record_id, 30, 10, 2).expect("录入失败");
    assert_eq!(result.remaining, 0);
    assert_eq!(result.status, InspectionStatus::Done);

    let rollup = env.inspection_repo.find_by_id(&record_id).unwrap().unwrap();
    assert_eq!(rollup.after_qty, 90);
    assert_eq!(rollup.ng_qty, 10);
    assert_eq!(rollup.spare_qty, 2);
    assert_eq!(rollup.status, InspectionStatus::Done);
    assert!(rollup.invariant_holds());

    // 日志: 1条释放占位 + 2条结果
    let logs = env.inspection_repo.list_logs_by_record(&record_id).unwrap();
    assert_eq!(logs.len(), 3);
    let total_ok: i64 = logs.iter().map(|l| l.ok_qty).sum();
    let total_ng: i64 = logs.iter().map(|l| l.ng_qty).sum();
    assert_eq!(total_ok, 90);
    assert_eq!(total_ng, 10);
}

#[test]
fn test_record_outcome_负数入参按零处理() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let batch = env.create_incoming("ABC123", 50, date(2025, 11, 3));
    let record_id = release(&env, &batch.id, 50).expect("释放失败");

    // 负数入参与全零入参行为一致
    let result = record(&env, &record_id, -5, -3, -1).expect("录入失败");
    assert_eq!(result.remaining, 50);
    assert_eq!(result.status, InspectionStatus::Pending);

    let rollup = env.inspection_repo.find_by_id(&record_id).unwrap().unwrap();
    assert_eq!(rollup.after_qty, 0);
    assert_eq!(rollup.ng_qty, 0);
    assert_eq!(rollup.spare_qty, 0);

    // 落账的日志同样是零
    let logs = env.inspection_repo.list_logs_by_record(&record_id).unwrap();
    assert!(logs.iter().all(|l| l.ok_qty >= 0 && l.ng_qty >= 0 && l.spare_qty >= 0));
}

#[test]
fn test_record_outcome_入参缺省为零() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let batch = env.create_incoming("ABC123", 30, date(2025, 11, 3));
    let record_id = release(&env, &batch.id, 30).expect("释放失败");

    let result = env
        .inspection_api
        .record_outcome(
            RecordOutcomeRequest {
                record_id: record_id.clone(),
                ok_qty: None,
                ng_qty: None,
                spare_qty: None,
                responsible_person: "王五".to_string(),
            },
            env.token(),
        )
        .expect("录入失败");
    assert_eq!(result.remaining, 30);
    assert_eq!(result.status, InspectionStatus::Pending);
}

// ==========================================
// 队列与列表
// ==========================================

#[test]
fn test_queue_先来先检排序() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let b1 = env.create_incoming("A1", 10, date(2025, 11, 5));
    std::thread::sleep(std::time::Duration::from_millis(5));
    let b2 = env.create_incoming("A2", 20, date(2025, 11, 1));
    std::thread::sleep(std::time::Duration::from_millis(5));
    let b3 = env.create_incoming("A3", 30, date(2025, 11, 3));

    // 队列按创建先后排序, 与收货日期无关
    let queue = env.inspection_api.queue();
    let ids: Vec<_> = queue.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec![b1.id.as_str(), b2.id.as_str(), b3.id.as_str()]);

    // 全量释放后退出队列
    release(&env, &b1.id, 10).expect("释放失败");
    let queue = env.inspection_api.queue();
    assert_eq!(queue.len(), 2);
    assert!(queue.iter().all(|b| b.id != b1.id));
}

#[test]
fn test_pending_与_done_列表() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let b1 = env.create_incoming("A1", 10, date(2025, 11, 1));
    std::thread::sleep(std::time::Duration::from_millis(5));
    let b2 = env.create_incoming("A2", 20, date(2025, 11, 2));

    let r1 = release(&env, &b1.id, 10).expect("释放失败");
    std::thread::sleep(std::time::Duration::from_millis(5));
    let r2 = release(&env, &b2.id, 20).expect("释放失败");

    // 两条都在待检列表, 先创建的在前
    let pending = env.inspection_api.pending_outcomes();
    let ids: Vec<_> = pending.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![r1.as_str(), r2.as_str()]);

    // r1 完结后只剩 r2 待检
    record(&env, &r1, 10, 0, 0).expect("录入失败");
    let pending = env.inspection_api.pending_outcomes();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, r2);

    let done = env.inspection_api.done_history();
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, r1);
}

#[test]
fn test_log_history_联查SKU快照() {
    let env = ApiTestEnv::new().expect("无法创建测试环境");

    let batch = env.create_incoming("ABC123", 10, date(2025, 11, 3));
    let record_id = release(&env, &batch.id, 10).expect("释放失败");
    record(&env, &record_id, 10, 0, 0).expect("录入失败");

    let history = env.inspection_api.log_history();
    assert_eq!(history.len(), 2); // 占位 + 结果
    assert!(history.iter().all(|v| v.computer_code == "ABC123"));
}
