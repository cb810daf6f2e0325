//! JWT 认证模块
//!
//! 提供 JWT token 生成、验证，以及从握手请求中提取 token

use application::{ApplicationError, CredentialVerifier};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use config::JwtConfig;
use domain::UserId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::error::ApiError;

/// 自定义令牌请求头
pub const TOKEN_HEADER: &str = "auth-token";

/// JWT Claims 结构
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub exp: i64, // 过期时间 (Unix timestamp)
}

/// JWT Token 服务
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_ref());
        let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 生成 JWT token（签发由外部账号服务负责，这里用于测试和运维工具）
    pub fn generate_token(&self, user_id: UserId) -> Result<String, ApiError> {
        let exp = OffsetDateTime::now_utc() + Duration::hours(self.config.expiration_hours);

        let claims = Claims {
            user_id: user_id.into(),
            exp: exp.unix_timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|err| {
            ApiError::internal_server_error(format!("Token generation failed: {}", err))
        })
    }

    /// 验证签名与过期时间并解析 claims
    pub fn verify_token(&self, token: &str) -> Result<Claims, ApplicationError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|token_data| token_data.claims)
            .map_err(|err| ApplicationError::authentication(format!("invalid token: {}", err)))
    }
}

impl CredentialVerifier for JwtService {
    fn verify(&self, token: &str) -> Result<UserId, ApplicationError> {
        self.verify_token(token)
            .map(|claims| UserId::from(claims.user_id))
    }
}

/// 按顺序查找 token：`auth-token` 头、`Authorization: Bearer`、`token` 查询参数
pub fn extract_token(headers: &HeaderMap, query_token: Option<&str>) -> Option<String> {
    header_value(headers, TOKEN_HEADER)
        .or_else(|| {
            header_value(headers, AUTHORIZATION.as_str())
                .and_then(|value| value.strip_prefix("Bearer "))
        })
        .or(query_token)
        .map(str::to_owned)
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
