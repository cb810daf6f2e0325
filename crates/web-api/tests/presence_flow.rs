mod support;

use std::time::Duration;

use domain::UserId;
use futures_util::SinkExt;
use tokio_tungstenite::tungstenite::Message as TungsteniteMessage;

use support::{assert_no_event, next_named, spawn_default_server, wait_for};

#[tokio::test]
async fn online_and_offline_are_announced_to_others() {
    let (server, _) = spawn_default_server().await;
    let (alice, bob) = (UserId::generate(), UserId::generate());

    let mut ws_alice = server.connect(alice).await;
    let mut ws_bob = server.connect(bob).await;

    let online = next_named(&mut ws_alice, "userOnline").await;
    assert_eq!(online["data"], bob.to_string());
    // 上线通知不发给自己
    assert_no_event(&mut ws_bob, "userOnline", Duration::from_millis(200)).await;

    ws_bob
        .send(TungsteniteMessage::Close(None))
        .await
        .expect("close");

    let offline = next_named(&mut ws_alice, "userOffline").await;
    assert_eq!(offline["data"], bob.to_string());

    let presence = server.state.connections.presence().clone();
    wait_for(|| {
        let presence = presence.clone();
        async move { !presence.is_online(bob).await }
    })
    .await;
    assert!(presence.is_online(alice).await);
}

#[tokio::test]
async fn dropping_the_socket_cleans_up() {
    let (server, _) = spawn_default_server().await;
    let alice = UserId::generate();

    let ws = server.connect(alice).await;
    assert_eq!(server.state.connections.router().connection_count().await, 1);
    drop(ws);

    let router = server.state.connections.router().clone();
    wait_for(|| {
        let router = router.clone();
        async move { router.connection_count().await == 0 }
    })
    .await;
    assert!(!server.state.connections.presence().is_online(alice).await);
}
