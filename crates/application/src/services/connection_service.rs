use std::sync::Arc;

use domain::{ConnectionId, RoomId, UserId};

use crate::{
    error::ApplicationError, presence::PresenceRegistry, router::EventReceiver, router::RoomRouter,
};

/// 已注册的实时连接
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub user_id: UserId,
    pub events: EventReceiver,
}

/// 连接生命周期：注册、上线通知、加入房间、断开清理
#[derive(Clone)]
pub struct ConnectionService {
    router: Arc<RoomRouter>,
    presence: Arc<PresenceRegistry>,
}

impl ConnectionService {
    pub fn new(router: Arc<RoomRouter>, presence: Arc<PresenceRegistry>) -> Self {
        Self { router, presence }
    }

    /// 为已准入的用户注册连接并广播上线
    pub async fn connect(&self, user_id: UserId) -> ConnectionHandle {
        let id = ConnectionId::generate();
        let events = self.router.register(id, user_id).await;
        self.presence.record(user_id, id).await;
        ConnectionHandle {
            id,
            user_id,
            events,
        }
    }

    pub async fn join(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
    ) -> Result<bool, ApplicationError> {
        let joined = self.router.join(connection_id, room_id.clone()).await?;
        if joined {
            tracing::info!(connection_id = %connection_id, room_id = %room_id, "连接已加入房间");
        }
        Ok(joined)
    }

    /// 断开连接：先移除在线记录（通知其他连接），再销毁连接
    pub async fn disconnect(&self, connection_id: ConnectionId, user_id: UserId) {
        self.presence.remove(user_id, connection_id).await;
        if self.router.unregister(connection_id).await.is_none() {
            tracing::debug!(connection_id = %connection_id, "连接此前已注销");
        }
        tracing::info!(user_id = %user_id, connection_id = %connection_id, "连接已关闭");
    }

    pub fn router(&self) -> &Arc<RoomRouter> {
        &self.router
    }

    pub fn presence(&self) -> &Arc<PresenceRegistry> {
        &self.presence
    }
}
