use application::{
    ApplicationError, ClientEvent, ConnectionHandle, CreateMessageRequest, DeleteMessageRequest,
    EventReceiver, ServerEvent,
};
use axum::extract::ws::{Message as WsMessage, WebSocket};
use domain::{ConnectionId, MessageId, RoomId, UserId};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};

use crate::error::ApiError;
use crate::state::AppState;

/// 单个已认证的 WebSocket 连接
///
/// 发送任务把出站队列里的事件写入 socket；接收循环为每个客户端事件启动一个独立任务，
/// 事件之间不保证顺序。断开时清理在线状态和房间成员关系，已启动的任务继续执行完。
pub struct WebSocketConnection {
    state: AppState,
    connection_id: ConnectionId,
    user_id: UserId,
    events: EventReceiver,
}

impl WebSocketConnection {
    /// 注册连接并广播上线
    pub async fn open(state: AppState, user_id: UserId) -> Self {
        let ConnectionHandle {
            id,
            user_id,
            events,
        } = state.connections.connect(user_id).await;

        tracing::info!(user_id = %user_id, connection_id = %id, "WebSocket 连接已建立");

        Self {
            state,
            connection_id: id,
            user_id,
            events,
        }
    }

    pub async fn run(self, socket: WebSocket) {
        let Self {
            state,
            connection_id,
            user_id,
            events,
        } = self;
        let (sink, mut incoming) = socket.split();

        let send_task = tokio::spawn(forward_events(events, sink, connection_id));

        while let Some(frame) = incoming.next().await {
            match frame {
                Ok(WsMessage::Text(text)) => {
                    dispatch(&state, connection_id, user_id, text.as_str()).await;
                }
                Ok(WsMessage::Close(_)) => {
                    tracing::debug!(connection_id = %connection_id, "WebSocket收到关闭消息");
                    break;
                }
                Ok(WsMessage::Binary(_)) => {
                    reply(
                        &state,
                        connection_id,
                        ServerEvent::error("UNSUPPORTED_FRAME", "binary frames are not supported"),
                    )
                    .await;
                }
                Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) => {}
                Err(err) => {
                    tracing::debug!(error = %err, connection_id = %connection_id, "WebSocket读取失败");
                    break;
                }
            }
        }

        // 注销后出站队列关闭，发送任务随之结束
        state.connections.disconnect(connection_id, user_id).await;
        if let Err(err) = send_task.await {
            tracing::warn!(error = %err, connection_id = %connection_id, "发送任务异常退出");
        }
    }
}

async fn forward_events(
    mut events: EventReceiver,
    mut sink: SplitSink<WebSocket, WsMessage>,
    connection_id: ConnectionId,
) {
    while let Some(event) = events.recv().await {
        let payload = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(error = %err, event = event.name(), "WebSocket消息序列化失败");
                continue;
            }
        };
        if sink.send(WsMessage::Text(payload.into())).await.is_err() {
            tracing::debug!(connection_id = %connection_id, "WebSocket发送失败，停止转发");
            break;
        }
    }
}

/// 解析客户端事件并交给独立任务处理
async fn dispatch(state: &AppState, connection_id: ConnectionId, user_id: UserId, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(err) => {
            tracing::debug!(error = %err, connection_id = %connection_id, "无法识别的客户端消息");
            reply(
                state,
                connection_id,
                ServerEvent::error("INVALID_EVENT", format!("unrecognised event: {err}")),
            )
            .await;
            return;
        }
    };

    let state = state.clone();
    tokio::spawn(async move {
        if let Err(err) = handle_event(&state, connection_id, user_id, event).await {
            tracing::info!(error = %err, connection_id = %connection_id, user_id = %user_id, "客户端请求未执行");
            reply(&state, connection_id, ApiError::from(err).into_event()).await;
        }
    });
}

async fn handle_event(
    state: &AppState,
    connection_id: ConnectionId,
    user_id: UserId,
    event: ClientEvent,
) -> Result<(), ApplicationError> {
    match event {
        ClientEvent::Join(room) => {
            let room_id = RoomId::new(room)?;
            state.connections.join(connection_id, room_id).await?;
        }
        ClientEvent::Message {
            conversation_id,
            text,
        } => {
            let room_id = RoomId::new(conversation_id)?;
            state
                .message_service
                .create_message(CreateMessageRequest {
                    room_id,
                    sender_id: user_id,
                    text,
                })
                .await?;
        }
        ClientEvent::DeleteMessage { message_id } => {
            let message_id = message_id.parse::<MessageId>()?;
            state
                .message_service
                .delete_message(DeleteMessageRequest {
                    message_id,
                    requester_id: user_id,
                })
                .await?;
        }
    }
    Ok(())
}

async fn reply(state: &AppState, connection_id: ConnectionId, event: ServerEvent) {
    if !state.connections.router().send_to(connection_id, event).await {
        tracing::debug!(connection_id = %connection_id, "回复投递失败");
    }
}
