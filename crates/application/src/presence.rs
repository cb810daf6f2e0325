use std::collections::HashMap;
use std::sync::Arc;

use domain::{ConnectionId, UserId};
use tokio::sync::RwLock;

use crate::events::ServerEvent;
use crate::router::RoomRouter;

/// 全局在线状态登记表
///
/// 每个用户最多一条记录（用户 -> 当前连接），重连会覆盖旧记录。
/// 上线、下线事件通过房间路由发送给除当事连接外的所有连接。
pub struct PresenceRegistry {
    entries: RwLock<HashMap<UserId, ConnectionId>>,
    router: Arc<RoomRouter>,
}

impl PresenceRegistry {
    pub fn new(router: Arc<RoomRouter>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            router,
        }
    }

    /// 记录用户的活跃连接，并通知其他连接该用户上线。返回被覆盖的旧连接。
    pub async fn record(&self, user_id: UserId, connection_id: ConnectionId) -> Option<ConnectionId> {
        let previous = self.entries.write().await.insert(user_id, connection_id);

        let notified = self
            .router
            .broadcast_except(connection_id, ServerEvent::UserOnline(user_id))
            .await;

        tracing::info!(
            user_id = %user_id,
            connection_id = %connection_id,
            replaced = previous.is_some(),
            notified,
            "用户上线"
        );
        previous
    }

    /// 移除用户的在线记录并通知其他连接。
    ///
    /// 只有记录仍指向 `connection_id` 时才会移除；用户已经用新连接覆盖时为空操作。
    pub async fn remove(&self, user_id: UserId, connection_id: ConnectionId) -> bool {
        let removed = {
            let mut entries = self.entries.write().await;
            match entries.get(&user_id) {
                Some(current) if *current == connection_id => {
                    entries.remove(&user_id);
                    true
                }
                _ => false,
            }
        };

        if !removed {
            tracing::debug!(user_id = %user_id, connection_id = %connection_id, "在线记录已被替换或不存在");
            return false;
        }

        let notified = self
            .router
            .broadcast_except(connection_id, ServerEvent::UserOffline(user_id))
            .await;
        tracing::info!(user_id = %user_id, notified, "用户下线");
        true
    }

    pub async fn is_online(&self, user_id: UserId) -> bool {
        self.entries.read().await.contains_key(&user_id)
    }

    pub async fn connection_of(&self, user_id: UserId) -> Option<ConnectionId> {
        self.entries.read().await.get(&user_id).copied()
    }

    pub async fn online_users(&self) -> Vec<UserId> {
        self.entries.read().await.keys().copied().collect()
    }
}
