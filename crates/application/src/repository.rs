use async_trait::async_trait;
use domain::{Message, MessageId, RepositoryError, RoomId, SentimentCounts};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 持久化消息，返回存储后的记录
    async fn create(&self, message: Message) -> Result<Message, RepositoryError>;

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError>;

    /// 删除消息；记录不存在时返回 `RepositoryError::NotFound`
    async fn delete(&self, id: MessageId) -> Result<(), RepositoryError>;

    /// 会话内各情绪标签的消息数量
    async fn sentiment_counts(
        &self,
        conversation_id: RoomId,
    ) -> Result<SentimentCounts, RepositoryError>;
}

/// 内存实现的消息仓储（用于测试和本地开发）
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    #[derive(Default)]
    pub struct MemoryMessageRepository {
        messages: RwLock<HashMap<MessageId, Message>>,
    }

    impl MemoryMessageRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn len(&self) -> usize {
            self.messages.read().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.messages.read().await.is_empty()
        }
    }

    #[async_trait]
    impl MessageRepository for MemoryMessageRepository {
        async fn create(&self, message: Message) -> Result<Message, RepositoryError> {
            let mut messages = self.messages.write().await;
            if messages.contains_key(&message.id) {
                return Err(RepositoryError::storage(format!(
                    "duplicate message id {}",
                    message.id
                )));
            }
            messages.insert(message.id, message.clone());
            Ok(message)
        }

        async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
            Ok(self.messages.read().await.get(&id).cloned())
        }

        async fn delete(&self, id: MessageId) -> Result<(), RepositoryError> {
            self.messages
                .write()
                .await
                .remove(&id)
                .map(|_| ())
                .ok_or(RepositoryError::NotFound)
        }

        async fn sentiment_counts(
            &self,
            conversation_id: RoomId,
        ) -> Result<SentimentCounts, RepositoryError> {
            let messages = self.messages.read().await;
            let mut counts = SentimentCounts::default();
            messages
                .values()
                .filter(|message| message.conversation_id == conversation_id)
                .for_each(|message| counts.add(message.sentiment, 1));
            Ok(counts)
        }
    }
}
