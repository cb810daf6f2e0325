use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{RoomId, UserId};

/// 会话。房间标识与会话标识相同。
///
/// 会话由外部的 REST 服务创建，实时核心只通过房间标识引用它。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: RoomId,
    pub participants: Vec<UserId>,
}

impl Conversation {
    /// 参与者至少两人且不能重复。
    pub fn new(id: RoomId, participants: Vec<UserId>) -> Result<Self, DomainError> {
        let mut seen = std::collections::HashSet::with_capacity(participants.len());
        if participants.iter().any(|user_id| !seen.insert(*user_id)) {
            return Err(DomainError::invalid_argument(
                "participants",
                "contains duplicates",
            ));
        }
        if participants.len() < 2 {
            return Err(DomainError::invalid_argument(
                "participants",
                "requires at least two users",
            ));
        }
        Ok(Self { id, participants })
    }

    pub fn includes(&self, user_id: UserId) -> bool {
        self.participants.contains(&user_id)
    }
}
