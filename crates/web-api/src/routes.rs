use axum::{
    extract::{ws::WebSocketUpgrade, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use application::{ApplicationError, DeleteMessageRequest};
use domain::{MessageId, RoomId, SentimentCounts, UserId};

use crate::{auth::extract_token, error::ApiError, state::AppState, ws_connection::WebSocketConnection};

#[derive(Debug, Deserialize)]
struct WsQuery {
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct DeleteMessageResponse {
    message: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(websocket_upgrade))
        .route("/messages/{message_id}", delete(delete_message))
        .route(
            "/conversations/{conversation_id}/sentiment",
            get(sentiment_summary),
        )
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// HTTP 请求的身份：与实时连接使用同一个准入逻辑
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<UserId, ApiError> {
    let token = extract_token(headers, None);
    Ok(state.gatekeeper.admit(token.as_deref())?)
}

/// 认证失败时直接返回 401，不会升级为 WebSocket
async fn websocket_upgrade(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers, query.token.as_deref());
    let user_id = state.gatekeeper.admit(token.as_deref())?;

    Ok(ws.on_upgrade(move |socket| async move {
        WebSocketConnection::open(state, user_id).await.run(socket).await;
    }))
}

async fn delete_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(message_id): Path<String>,
) -> Result<Json<DeleteMessageResponse>, ApiError> {
    let requester_id = authenticate(&state, &headers)?;
    let message_id = message_id
        .parse::<MessageId>()
        .map_err(ApplicationError::from)?;

    state
        .message_service
        .delete_message(DeleteMessageRequest {
            message_id,
            requester_id,
        })
        .await?;

    Ok(Json(DeleteMessageResponse {
        message: "Deleted successfully",
    }))
}

async fn sentiment_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(conversation_id): Path<String>,
) -> Result<Json<SentimentCounts>, ApiError> {
    authenticate(&state, &headers)?;
    let conversation_id = conversation_id
        .parse::<RoomId>()
        .map_err(ApplicationError::from)?;

    let counts = state
        .message_service
        .sentiment_summary(conversation_id)
        .await?;
    Ok(Json(counts))
}
