mod connection_service;
mod message_service;

pub use connection_service::{ConnectionHandle, ConnectionService};
pub use message_service::{
    CreateMessageRequest, DeleteMessageRequest, MessageService, MessageServiceDependencies,
};
