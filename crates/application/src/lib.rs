//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务：连接准入、在线状态、房间路由、
//! 情绪判定以及消息的创建与删除，并对外部适配器（身份校验、远程分类、存储）做抽象。

pub mod clock;
pub mod error;
pub mod events;
pub mod gatekeeper;
pub mod presence;
pub mod repository;
pub mod router;
pub mod sentiment;
pub mod services;

pub use clock::{Clock, SystemClock};
pub use error::ApplicationError;
pub use events::{ClientEvent, ServerEvent};
pub use gatekeeper::{ConnectionGatekeeper, CredentialVerifier};
pub use presence::PresenceRegistry;
pub use repository::MessageRepository;
pub use router::{EventReceiver, EventSender, RoomRouter};
pub use sentiment::{ClassificationError, RemoteClassifier, SentimentPipeline};
pub use services::{
    ConnectionHandle, ConnectionService, CreateMessageRequest, DeleteMessageRequest,
    MessageService, MessageServiceDependencies,
};
