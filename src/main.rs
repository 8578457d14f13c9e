use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use board_relay::config::Config;
use board_relay::coordinator::SyncCoordinator;
use board_relay::poll::spawn_poll_task;
use board_relay::server::{AppState, build_router};
use board_relay::source::{HttpBoardPusher, HttpItemSource};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "board_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "configuration error");
            std::process::exit(1);
        }
    };

    let source = HttpItemSource::new(&config.upstream_url, config.http_timeout)
        .expect("failed to build upstream client");
    let pusher = HttpBoardPusher::new(&config.board_url, config.http_timeout)
        .expect("failed to build board client");

    let coordinator = SyncCoordinator::new(config.coordinator.clone(), source, pusher);
    let cancel = coordinator.cancellation_token();

    let poller = spawn_poll_task(
        coordinator.clone(),
        config.poll.clone(),
        config.coordinator.board_title.clone(),
        cancel.clone(),
    );

    let state = AppState::new(coordinator, config.webhook_secret.clone());
    let app = build_router(state);

    tracing::info!("listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .expect("failed to bind listen address");

    let shutdown = {
        let cancel = cancel.clone();
        async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
            cancel.cancel();
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .expect("server error");

    let _ = poller.await;
}
