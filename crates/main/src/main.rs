//! 主应用程序入口
//!
//! 加载配置、连接数据库并启动 Axum 实时聊天服务。

use std::{sync::Arc, time::Duration};

use application::SystemClock;
use config::AppConfig;
use infrastructure::{create_pg_pool, GeminiClassifier, PgMessageRepository, MIGRATOR};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppDependencies, AppState, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    tracing::info!(config = %config.sanitize(), "配置已加载");

    let pg_pool = create_pg_pool(&config.database.url, config.database.max_connections).await?;
    MIGRATOR.run(&pg_pool).await?;

    if config.classifier.api_key.is_none() {
        tracing::warn!("未配置远程分类器密钥，只使用本地词典");
    }
    let classifier_timeout = Duration::from_millis(config.classifier.timeout_ms);
    let classifier = GeminiClassifier::new(
        config.classifier.endpoint.clone(),
        config.classifier.api_key.clone(),
        classifier_timeout,
    );

    let state = AppState::build(AppDependencies {
        verifier: Arc::new(JwtService::new(config.jwt.clone())),
        message_repository: Arc::new(PgMessageRepository::new(pg_pool)),
        classifier: Arc::new(classifier),
        classifier_timeout,
        clock: Arc::new(SystemClock),
        outbound_buffer: config.server.outbound_buffer,
    });

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;

    tracing::info!(address = %listener.local_addr()?, "聊天服务启动");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "监听关闭信号失败");
        std::future::pending::<()>().await;
    }
    tracing::info!("收到关闭信号");
}
