use crate::utils::error::DocTrackError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// 代理伺服器完成身分驗證後帶入的使用者 id
pub const ACTOR_HEADER: &str = "x-user-id";

/// 由 `X-User-Id` 取得的操作者 id；是否存在與啟用由 registry 檢查
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorId(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ActorId
where
    S: Send + Sync,
{
    type Rejection = DocTrackError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACTOR_HEADER)
            .ok_or_else(|| DocTrackError::Unauthenticated {
                message: "missing X-User-Id header".to_string(),
            })?;

        raw.to_str()
            .ok()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(ActorId)
            .ok_or_else(|| DocTrackError::Unauthenticated {
                message: "X-User-Id must be a numeric user id".to_string(),
            })
    }
}
