use application::MessageRepository;
use async_trait::async_trait;
use domain::{
    Message, MessageId, MessageText, RepositoryError, RoomId, Sentiment, SentimentCounts, UserId,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::storage(err.to_string())
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

#[derive(Debug, FromRow)]
struct MessageRecord {
    id: Uuid,
    conversation_id: String,
    sender_id: Uuid,
    text: String,
    sentiment: String,
    created_at: OffsetDateTime,
}

impl TryFrom<MessageRecord> for Message {
    type Error = RepositoryError;

    fn try_from(value: MessageRecord) -> Result<Self, Self::Error> {
        let conversation_id = RoomId::new(value.conversation_id)
            .map_err(|err| invalid_data(err.to_string()))?;
        let text = MessageText::new(value.text).map_err(|err| invalid_data(err.to_string()))?;
        let sentiment = value
            .sentiment
            .parse::<Sentiment>()
            .map_err(|err| invalid_data(err.to_string()))?;

        Ok(Message::new(
            MessageId::from(value.id),
            conversation_id,
            UserId::from(value.sender_id),
            text,
            sentiment,
            value.created_at,
        ))
    }
}

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, message: Message) -> Result<Message, RepositoryError> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, text, sentiment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, conversation_id, sender_id, text, sentiment, created_at
            "#,
        )
        .bind(Uuid::from(message.id))
        .bind(message.conversation_id.as_str())
        .bind(Uuid::from(message.sender_id))
        .bind(message.text.as_str())
        .bind(message.sentiment.as_str())
        .bind(message.timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Message::try_from(record)
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"SELECT id, conversation_id, sender_id, text, sentiment, created_at FROM messages WHERE id = $1"#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Message::try_from).transpose()
    }

    async fn delete(&self, id: MessageId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM messages WHERE id = $1"#)
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn sentiment_counts(
        &self,
        conversation_id: RoomId,
    ) -> Result<SentimentCounts, RepositoryError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT sentiment, COUNT(*) AS count
            FROM messages
            WHERE conversation_id = $1
            GROUP BY sentiment
            "#,
        )
        .bind(conversation_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        let mut counts = SentimentCounts::default();
        for (label, count) in rows {
            let sentiment = label
                .parse::<Sentiment>()
                .map_err(|err| invalid_data(err.to_string()))?;
            counts.add(sentiment, u64::try_from(count).unwrap_or_default());
        }
        Ok(counts)
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
