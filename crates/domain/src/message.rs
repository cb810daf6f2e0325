use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::sentiment::Sentiment;
use crate::value_objects::{MessageId, RoomId, Timestamp, UserId};

/// 单条消息正文允许的最大字符数。
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// 经过校验的消息正文。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::invalid_argument("text", "cannot be empty"));
        }
        if value.chars().count() > MAX_MESSAGE_CHARS {
            return Err(DomainError::invalid_argument(
                "text",
                format!("longer than {MAX_MESSAGE_CHARS} characters"),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 持久化后的消息记录。创建后不可修改，只能被发送者删除。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: RoomId,
    pub sender_id: UserId,
    pub text: MessageText,
    pub sentiment: Sentiment,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: Timestamp,
}

impl Message {
    pub fn new(
        id: MessageId,
        conversation_id: RoomId,
        sender_id: UserId,
        text: MessageText,
        sentiment: Sentiment,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            conversation_id,
            sender_id,
            text,
            sentiment,
            timestamp,
        }
    }

    /// 只有原始发送者可以删除消息。
    pub fn is_sent_by(&self, user_id: UserId) -> bool {
        self.sender_id == user_id
    }
}
