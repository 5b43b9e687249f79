// ==========================================
// 仓库库存跟踪系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 生产类别 (Production Type)
// ==========================================
// 产品主数据二分类, 默认 HT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionType {
    Ht, // HT
    Hk, // HK
}

impl Default for ProductionType {
    fn default() -> Self {
        ProductionType::Ht
    }
}

impl fmt::Display for ProductionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductionType::Ht => write!(f, "HT"),
            ProductionType::Hk => write!(f, "HK"),
        }
    }
}

impl FromStr for ProductionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HT" => Ok(ProductionType::Ht),
            "HK" => Ok(ProductionType::Hk),
            other => Err(format!("未知的生产类别: {}", other)),
        }
    }
}

// ==========================================
// 来料批次状态 (Batch Status)
// ==========================================
// 口径: remaining_qty == 0 时为 CLOSED, 否则为 OPEN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Open,   // 仍有剩余数量可释放质检
    Closed, // 已全部释放
}

impl BatchStatus {
    /// 由剩余数量推导批次状态
    pub fn from_remaining(remaining_qty: i64) -> Self {
        if remaining_qty == 0 {
            BatchStatus::Closed
        } else {
            BatchStatus::Open
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Open => write!(f, "OPEN"),
            BatchStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

impl FromStr for BatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(BatchStatus::Open),
            "CLOSED" => Ok(BatchStatus::Closed),
            other => Err(format!("未知的批次状态: {}", other)),
        }
    }
}

// ==========================================
// 质检汇总状态 (Inspection Status)
// ==========================================
// 口径: before_qty - (after_qty + ng_qty) <= 0 时为 DONE, 否则为 PENDING
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InspectionStatus {
    Pending, // 仍有已释放数量未出结果
    Done,    // 全部数量已出结果
}

impl InspectionStatus {
    /// 由未出结果的剩余数量推导汇总状态
    pub fn from_remaining(remaining_qty: i64) -> Self {
        if remaining_qty <= 0 {
            InspectionStatus::Done
        } else {
            InspectionStatus::Pending
        }
    }
}

impl fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InspectionStatus::Pending => write!(f, "PENDING"),
            InspectionStatus::Done => write!(f, "DONE"),
        }
    }
}

impl FromStr for InspectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(InspectionStatus::Pending),
            "DONE" => Ok(InspectionStatus::Done),
            other => Err(format!("未知的质检状态: {}", other)),
        }
    }
}
