// ==========================================
// 仓库库存跟踪系统 - 主入口
// ==========================================
// 说明: 核心逻辑以库形式提供, 展示层(桌面/网页壳)在进程外;
//       该入口负责初始化日志与应用状态, 供本地自检
// ==========================================

use warehouse_stock_tracker::app::{get_default_db_path, AppState};
use warehouse_stock_tracker::logging;

fn main() {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", warehouse_stock_tracker::APP_NAME);
    tracing::info!("系统版本: {}", warehouse_stock_tracker::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState (打开数据库 + 初始化schema + 装配API)
    tracing::info!("正在初始化AppState...");
    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            std::process::exit(1);
        }
    };

    // 启动自检: 汇总一次库存看板
    let summary = app_state.dashboard_api.compute_stock_summary();
    tracing::info!("库存看板自检完成, 共 {} 个SKU", summary.len());

    tracing::info!("初始化完成, 等待展示层接入");
}
