use std::sync::Arc;
use std::time::Duration;

use application::{
    Clock, ConnectionGatekeeper, ConnectionService, CredentialVerifier, MessageRepository,
    MessageService, MessageServiceDependencies, PresenceRegistry, RemoteClassifier, RoomRouter,
    SentimentPipeline,
};

/// 组装应用状态所需的外部协作者
pub struct AppDependencies {
    pub verifier: Arc<dyn CredentialVerifier>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub classifier: Arc<dyn RemoteClassifier>,
    pub classifier_timeout: Duration,
    pub clock: Arc<dyn Clock>,
    /// 每个连接出站队列的容量
    pub outbound_buffer: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub gatekeeper: ConnectionGatekeeper,
    pub connections: ConnectionService,
    pub message_service: Arc<MessageService>,
}

impl AppState {
    pub fn new(
        gatekeeper: ConnectionGatekeeper,
        connections: ConnectionService,
        message_service: Arc<MessageService>,
    ) -> Self {
        Self {
            gatekeeper,
            connections,
            message_service,
        }
    }

    /// 路由、在线状态与消息服务共享同一个房间路由
    pub fn build(deps: AppDependencies) -> Self {
        let router = Arc::new(RoomRouter::new(deps.outbound_buffer));
        let presence = Arc::new(PresenceRegistry::new(router.clone()));
        let sentiment = Arc::new(SentimentPipeline::new(
            deps.classifier,
            deps.classifier_timeout,
        ));

        let message_service = MessageService::new(MessageServiceDependencies {
            message_repository: deps.message_repository,
            sentiment,
            router: router.clone(),
            clock: deps.clock,
        });

        Self::new(
            ConnectionGatekeeper::new(deps.verifier),
            ConnectionService::new(router, presence),
            Arc::new(message_service),
        )
    }
}
