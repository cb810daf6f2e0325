#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use application::{
    repository::memory::MemoryMessageRepository, ClassificationError, MessageRepository,
    RemoteClassifier, SystemClock,
};
use async_trait::async_trait;
use domain::{Message, MessageId, RepositoryError, RoomId, SentimentCounts, UserId};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::{net::TcpListener, net::TcpStream, sync::oneshot, time::timeout};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, Message as TungsteniteMessage},
    MaybeTlsStream, WebSocketStream,
};
use web_api::{router, AppDependencies, AppState, JwtConfig, JwtService};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";

/// 远程分类器不可用
pub struct OfflineClassifier;

#[async_trait]
impl RemoteClassifier for OfflineClassifier {
    async fn classify(&self, _text: &str) -> Result<String, ClassificationError> {
        Err(ClassificationError::Transport("connection refused".into()))
    }
}

/// 远程分类器总是给出同一个回复
pub struct FixedClassifier(pub &'static str);

#[async_trait]
impl RemoteClassifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> Result<String, ClassificationError> {
        Ok(self.0.to_owned())
    }
}

/// 写入总是失败的存储
pub struct BrokenRepository;

#[async_trait]
impl MessageRepository for BrokenRepository {
    async fn create(&self, _message: Message) -> Result<Message, RepositoryError> {
        Err(RepositoryError::storage("database is down"))
    }

    async fn find_by_id(&self, _id: MessageId) -> Result<Option<Message>, RepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _id: MessageId) -> Result<(), RepositoryError> {
        Err(RepositoryError::NotFound)
    }

    async fn sentiment_counts(&self, _id: RoomId) -> Result<SentimentCounts, RepositoryError> {
        Ok(SentimentCounts::default())
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub jwt: JwtService,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn spawn_server(
    classifier: Arc<dyn RemoteClassifier>,
    repository: Arc<dyn MessageRepository>,
) -> TestServer {
    let jwt = JwtService::new(JwtConfig {
        secret: JWT_SECRET.into(),
        expiration_hours: 1,
    });

    let state = AppState::build(AppDependencies {
        verifier: Arc::new(jwt.clone()),
        message_repository: repository,
        classifier,
        classifier_timeout: Duration::from_millis(200),
        clock: Arc::new(SystemClock),
        outbound_buffer: 64,
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = router(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    TestServer {
        addr,
        state,
        jwt,
        shutdown: Some(shutdown_tx),
    }
}

pub async fn spawn_default_server() -> (TestServer, Arc<MemoryMessageRepository>) {
    let repository = Arc::new(MemoryMessageRepository::new());
    let server = spawn_server(Arc::new(OfflineClassifier), repository.clone()).await;
    (server, repository)
}

impl TestServer {
    pub fn ws_url(&self) -> String {
        format!("ws://{}/api/v1/ws", self.addr)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn token_for(&self, user: UserId) -> String {
        self.jwt.generate_token(user).expect("token")
    }

    /// 通过 `auth-token` 请求头认证
    pub async fn connect(&self, user: UserId) -> WsStream {
        let mut request = self.ws_url().into_client_request().expect("request");
        request.headers_mut().insert(
            "auth-token",
            self.token_for(user).parse().expect("header value"),
        );
        let (ws, _) = connect_async(request).await.expect("ws connect");
        self.wait_until_online(user).await;
        ws
    }

    pub async fn wait_until_online(&self, user: UserId) {
        let presence = self.state.connections.presence().clone();
        wait_for(|| {
            let presence = presence.clone();
            async move { presence.is_online(user).await }
        })
        .await;
    }

    pub async fn wait_for_members(&self, room: &RoomId, count: usize) {
        let router = self.state.connections.router().clone();
        wait_for(|| {
            let router = router.clone();
            let room = room.clone();
            async move { router.members(&room).await.len() >= count }
        })
        .await;
    }
}

pub async fn wait_for<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached in time");
}

pub async fn send_event(ws: &mut WsStream, event: Value) {
    ws.send(TungsteniteMessage::text(event.to_string()))
        .await
        .expect("send event");
}

/// 读取下一个事件帧
pub async fn next_event(ws: &mut WsStream) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("ws error");
        if let TungsteniteMessage::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("event json");
        }
    }
}

/// 跳过其他事件，直到收到指定名称的事件
pub async fn next_named(ws: &mut WsStream, name: &str) -> Value {
    loop {
        let event = next_event(ws).await;
        if event["event"] == name {
            return event;
        }
    }
}

/// 在给定时间内没有收到指定名称的事件
pub async fn assert_no_event(ws: &mut WsStream, name: &str, within: Duration) {
    let deadline = tokio::time::Instant::now() + within;
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            return;
        }
        match timeout(remaining, ws.next()).await {
            Err(_) => return,
            Ok(Some(Ok(TungsteniteMessage::Text(text)))) => {
                let event: Value = serde_json::from_str(text.as_str()).expect("event json");
                assert_ne!(event["event"], name, "unexpected event {event}");
            }
            Ok(Some(Ok(_))) => {}
            Ok(_) => return,
        }
    }
}
