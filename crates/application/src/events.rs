//! 实时通道上的事件定义
//!
//! 所有帧都使用 `{"event": <name>, "data": <payload>}` 信封。

use domain::{Message, MessageId, RoomId, UserId};
use serde::{Deserialize, Serialize};

/// 服务端推送给客户端的事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// 新消息（完整的持久化记录），发送给房间内所有连接，包括发送者
    #[serde(rename = "message")]
    Message(Message),
    #[serde(rename = "messageDeleted", rename_all = "camelCase")]
    MessageDeleted {
        conversation_id: RoomId,
        message_id: MessageId,
    },
    #[serde(rename = "userOnline")]
    UserOnline(UserId),
    #[serde(rename = "userOffline")]
    UserOffline(UserId),
    /// 只发给请求方，说明某个动作被跳过
    #[serde(rename = "error")]
    Error { code: String, message: String },
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Message(_) => "message",
            ServerEvent::MessageDeleted { .. } => "messageDeleted",
            ServerEvent::UserOnline(_) => "userOnline",
            ServerEvent::UserOffline(_) => "userOffline",
            ServerEvent::Error { .. } => "error",
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        ServerEvent::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// 客户端发送的事件。标识以原始字符串接收，由处理方解析。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "join")]
    Join(String),
    #[serde(rename = "message", rename_all = "camelCase")]
    Message {
        conversation_id: String,
        text: String,
    },
    #[serde(rename = "deleteMessage", rename_all = "camelCase")]
    DeleteMessage { message_id: String },
}
