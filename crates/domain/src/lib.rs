//! 聊天中继核心领域模型
//!
//! 包含消息、会话、情绪标签等实体，以及相关的校验规则和错误类型。

pub mod conversation;
pub mod errors;
pub mod message;
pub mod sentiment;
pub mod value_objects;

// 重新导出常用类型
pub use conversation::Conversation;
pub use errors::{DomainError, RepositoryError};
pub use message::{Message, MessageText, MAX_MESSAGE_CHARS};
pub use sentiment::{Sentiment, SentimentCounts};
pub use value_objects::{ConnectionId, MessageId, RoomId, Timestamp, UserId};
