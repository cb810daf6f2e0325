use std::sync::Arc;

use domain::UserId;

use crate::error::ApplicationError;

/// 身份令牌校验器：校验签名与过期时间，返回令牌中的用户标识。
#[cfg_attr(test, mockall::automock)]
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<UserId, ApplicationError>;
}

/// 连接准入
///
/// 每个实时连接在加入房间、发送消息之前都必须经过这里。
/// 准入成功后返回的用户标识在整个连接生命周期内作为发送者身份。
#[derive(Clone)]
pub struct ConnectionGatekeeper {
    verifier: Arc<dyn CredentialVerifier>,
}

impl ConnectionGatekeeper {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    pub fn admit(&self, token: Option<&str>) -> Result<UserId, ApplicationError> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                tracing::debug!("缺少令牌，拒绝连接");
                ApplicationError::authentication("missing token")
            })?;

        match self.verifier.verify(token) {
            Ok(user_id) => {
                tracing::debug!(user_id = %user_id, "连接已通过认证");
                Ok(user_id)
            }
            Err(err) => {
                tracing::info!(error = %err, "令牌无效，拒绝连接");
                Err(err)
            }
        }
    }
}
