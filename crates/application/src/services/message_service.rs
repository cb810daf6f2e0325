use std::sync::Arc;

use domain::{
    Message, MessageId, MessageText, RepositoryError, RoomId, SentimentCounts, UserId,
};

use crate::{
    clock::Clock, error::ApplicationError, events::ServerEvent, repository::MessageRepository,
    router::RoomRouter, sentiment::SentimentPipeline,
};

#[derive(Debug, Clone)]
pub struct CreateMessageRequest {
    pub room_id: RoomId,
    /// 连接准入时绑定的用户，不取自消息内容
    pub sender_id: UserId,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct DeleteMessageRequest {
    pub message_id: MessageId,
    /// 连接准入时绑定的用户，不取自消息内容
    pub requester_id: UserId,
}

pub struct MessageServiceDependencies {
    pub message_repository: Arc<dyn MessageRepository>,
    pub sentiment: Arc<SentimentPipeline>,
    pub router: Arc<RoomRouter>,
    pub clock: Arc<dyn Clock>,
}

/// 消息生命周期：分类 -> 持久化 -> 广播，以及鉴权 -> 删除 -> 广播
pub struct MessageService {
    deps: MessageServiceDependencies,
}

impl MessageService {
    pub fn new(deps: MessageServiceDependencies) -> Self {
        Self { deps }
    }

    /// 创建消息。持久化成功之后才会广播；持久化失败时不广播并把错误交给调用方。
    pub async fn create_message(
        &self,
        request: CreateMessageRequest,
    ) -> Result<Message, ApplicationError> {
        let text = MessageText::new(request.text)?;
        let sentiment = self.deps.sentiment.resolve(text.as_str()).await;

        let message = Message::new(
            MessageId::generate(),
            request.room_id.clone(),
            request.sender_id,
            text,
            sentiment,
            self.deps.clock.now(),
        );

        let stored = self
            .deps
            .message_repository
            .create(message)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, room_id = %request.room_id, sender_id = %request.sender_id, "消息持久化失败");
                ApplicationError::Store(err)
            })?;

        let delivered = self
            .deps
            .router
            .broadcast(&stored.conversation_id, ServerEvent::Message(stored.clone()))
            .await;

        tracing::info!(
            message_id = %stored.id,
            room_id = %stored.conversation_id,
            sender_id = %stored.sender_id,
            sentiment = %stored.sentiment,
            delivered,
            "消息已发送"
        );

        Ok(stored)
    }

    /// 删除消息。只有原始发送者可以删除，与是否为会话参与者无关。
    pub async fn delete_message(
        &self,
        request: DeleteMessageRequest,
    ) -> Result<Message, ApplicationError> {
        let message = self
            .deps
            .message_repository
            .find_by_id(request.message_id)
            .await?
            .ok_or(ApplicationError::NotFound("message"))?;

        if !message.is_sent_by(request.requester_id) {
            tracing::warn!(
                message_id = %message.id,
                requester_id = %request.requester_id,
                "拒绝删除他人发送的消息"
            );
            return Err(ApplicationError::Authorization);
        }

        self.deps
            .message_repository
            .delete(message.id)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => ApplicationError::NotFound("message"),
                other => ApplicationError::Store(other),
            })?;

        let delivered = self
            .deps
            .router
            .broadcast(
                &message.conversation_id,
                ServerEvent::MessageDeleted {
                    conversation_id: message.conversation_id.clone(),
                    message_id: message.id,
                },
            )
            .await;

        tracing::info!(message_id = %message.id, room_id = %message.conversation_id, delivered, "消息已删除");
        Ok(message)
    }

    pub async fn sentiment_summary(
        &self,
        conversation_id: RoomId,
    ) -> Result<SentimentCounts, ApplicationError> {
        Ok(self
            .deps
            .message_repository
            .sentiment_counts(conversation_id)
            .await?)
    }
}
