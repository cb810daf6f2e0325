//! 基础设施层实现。
//!
//! 提供 Postgres 消息仓储与远程情绪分类 HTTP 适配器，实现应用层定义的接口。

pub mod classifier;
pub mod migrations;
pub mod repository;

pub use classifier::GeminiClassifier;
pub use migrations::MIGRATOR;
pub use repository::{create_pg_pool, PgMessageRepository};
