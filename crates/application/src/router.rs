//! 会话房间路由
//!
//! 维护进程内所有实时连接及其加入的房间，并按房间或全局分发事件。
//! 每个连接拥有一个有界的出站队列，由 WebSocket 发送任务消费。

use std::collections::{HashMap, HashSet};

use domain::{ConnectionId, RoomId, UserId};
use tokio::sync::{mpsc, RwLock};

use crate::error::ApplicationError;
use crate::events::ServerEvent;

pub type EventSender = mpsc::Sender<ServerEvent>;
pub type EventReceiver = mpsc::Receiver<ServerEvent>;

/// 已通过认证的连接。用户标识在注册时绑定，之后不再改变。
#[derive(Debug)]
pub struct Connection {
    pub id: ConnectionId,
    pub user_id: UserId,
    pub rooms: HashSet<RoomId>,
    sender: EventSender,
}

impl Connection {
    fn deliver(&self, event: ServerEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(
                    connection_id = %self.id,
                    user_id = %self.user_id,
                    event = event.name(),
                    "出站队列已满，丢弃事件"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(connection_id = %self.id, "出站队列已关闭");
                false
            }
        }
    }
}

#[derive(Default)]
struct RouterState {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
}

pub struct RoomRouter {
    state: RwLock<RouterState>,
    buffer: usize,
}

impl RoomRouter {
    /// `buffer` 为每个连接出站队列的容量
    pub fn new(buffer: usize) -> Self {
        Self {
            state: RwLock::new(RouterState::default()),
            buffer: buffer.max(1),
        }
    }

    /// 注册新连接，返回该连接的出站事件接收端
    pub async fn register(&self, connection_id: ConnectionId, user_id: UserId) -> EventReceiver {
        let (sender, receiver) = mpsc::channel(self.buffer);
        let connection = Connection {
            id: connection_id,
            user_id,
            rooms: HashSet::new(),
            sender,
        };

        let mut state = self.state.write().await;
        if let Some(previous) = state.connections.insert(connection_id, connection) {
            // 连接标识由服务端生成，重复意味着旧连接残留
            tracing::warn!(connection_id = %connection_id, user_id = %previous.user_id, "替换残留的旧连接");
            for room_id in &previous.rooms {
                Self::detach(&mut state.rooms, room_id, connection_id);
            }
        }
        receiver
    }

    /// 销毁连接并清空它的所有房间成员关系
    pub async fn unregister(&self, connection_id: ConnectionId) -> Option<Connection> {
        let mut state = self.state.write().await;
        let connection = state.connections.remove(&connection_id)?;
        for room_id in &connection.rooms {
            Self::detach(&mut state.rooms, room_id, connection_id);
        }
        Some(connection)
    }

    /// 加入房间；重复加入不产生任何效果。返回是否为新加入。
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
    ) -> Result<bool, ApplicationError> {
        let mut state = self.state.write().await;
        let connection = state
            .connections
            .get_mut(&connection_id)
            .ok_or(ApplicationError::NotFound("connection"))?;

        if !connection.rooms.insert(room_id.clone()) {
            return Ok(false);
        }
        state.rooms.entry(room_id).or_default().insert(connection_id);
        Ok(true)
    }

    /// 向房间内每个连接投递事件（包括发起者），返回成功入队的数量
    pub async fn broadcast(&self, room_id: &RoomId, event: ServerEvent) -> usize {
        let state = self.state.read().await;
        let Some(members) = state.rooms.get(room_id) else {
            return 0;
        };

        members
            .iter()
            .filter_map(|id| state.connections.get(id))
            .filter(|connection| connection.deliver(event.clone()))
            .count()
    }

    /// 向除 `exclude` 以外的所有连接投递事件（全局，不分房间）
    pub async fn broadcast_except(&self, exclude: ConnectionId, event: ServerEvent) -> usize {
        let state = self.state.read().await;
        state
            .connections
            .values()
            .filter(|connection| connection.id != exclude)
            .filter(|connection| connection.deliver(event.clone()))
            .count()
    }

    /// 只发给单个连接
    pub async fn send_to(&self, connection_id: ConnectionId, event: ServerEvent) -> bool {
        let state = self.state.read().await;
        state
            .connections
            .get(&connection_id)
            .is_some_and(|connection| connection.deliver(event))
    }

    pub async fn members(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let state = self.state.read().await;
        state
            .rooms
            .get(room_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub async fn rooms_of(&self, connection_id: ConnectionId) -> Vec<RoomId> {
        let state = self.state.read().await;
        state
            .connections
            .get(&connection_id)
            .map(|connection| connection.rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn connection_count(&self) -> usize {
        self.state.read().await.connections.len()
    }

    fn detach(
        rooms: &mut HashMap<RoomId, HashSet<ConnectionId>>,
        room_id: &RoomId,
        connection_id: ConnectionId,
    ) {
        if let Some(members) = rooms.get_mut(room_id) {
            members.remove(&connection_id);
            if members.is_empty() {
                rooms.remove(room_id);
            }
        }
    }
}
