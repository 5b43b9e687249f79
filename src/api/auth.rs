// ==========================================
// 仓库库存跟踪系统 - 写操作授权
// ==========================================
// 职责: 写操作进入台账逻辑之前的能力检查
// 口径: 授权机制与台账不变量解耦 —— API 持有 SessionAuthorizer
//       接口, 更换认证方式不触碰任何台账代码
// ==========================================

use std::collections::HashSet;
use std::sync::Mutex;

use crate::api::error::{ApiError, ApiResult};

/// 写操作授权接口
///
/// 纯策略检查: 无 IO, 无业务逻辑
pub trait SessionAuthorizer: Send + Sync {
    /// 校验会话令牌是否允许执行写操作
    ///
    /// # 返回
    /// - Ok(()): 允许
    /// - Err(ApiError::Unauthorized): 拒绝, 调用方不得继续执行任何写入
    fn authorize_write(&self, session_token: Option<&str>) -> ApiResult<()>;
}

// ==========================================
// SharedCredentialAuthorizer - 共享口令授权器
// ==========================================
/// 基于单一共享操作员口令的授权器
///
/// 登录换取会话令牌 (uuid), 令牌保存在进程内;
/// 这是现场单机部署的最小方案, 不是完整的账号体系
pub struct SharedCredentialAuthorizer {
    username: String,
    password: String,
    sessions: Mutex<HashSet<String>>,
}

impl SharedCredentialAuthorizer {
    /// 创建授权器
    ///
    /// # 参数
    /// - username / password: 共享操作员凭据
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            sessions: Mutex::new(HashSet::new()),
        }
    }

    /// 校验凭据并签发会话令牌
    ///
    /// # 返回
    /// - Ok(String): 新签发的会话令牌
    /// - Err(ApiError::Unauthorized): 凭据不匹配
    pub fn login(&self, username: &str, password: &str) -> ApiResult<String> {
        if username != self.username || password != self.password {
            tracing::warn!(username = %username, "登录失败: 凭据不匹配");
            return Err(ApiError::Unauthorized("凭据不匹配".to_string()));
        }

        let token = uuid::Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .map_err(|e| ApiError::InternalError(format!("会话表锁获取失败: {}", e)))?
            .insert(token.clone());

        tracing::info!("登录成功, 签发会话令牌");
        Ok(token)
    }

    /// 注销会话令牌
    pub fn logout(&self, session_token: &str) -> ApiResult<()> {
        self.sessions
            .lock()
            .map_err(|e| ApiError::InternalError(format!("会话表锁获取失败: {}", e)))?
            .remove(session_token);
        Ok(())
    }
}

impl SessionAuthorizer for SharedCredentialAuthorizer {
    fn authorize_write(&self, session_token: Option<&str>) -> ApiResult<()> {
        let token = session_token
            .ok_or_else(|| ApiError::Unauthorized("缺少会话令牌".to_string()))?;

        let sessions = self
            .sessions
            .lock()
            .map_err(|e| ApiError::InternalError(format!("会话表锁获取失败: {}", e)))?;

        if sessions.contains(token) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized("会话令牌无效或已过期".to_string()))
        }
    }
}
