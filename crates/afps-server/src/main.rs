use std::{net::SocketAddr, sync::Arc};

use afps_config::ServerConfig;
use afps_server::{http, spawn_tick_thread, AsyncRuntime};
use afps_signaling::SignalingStore;
use clap::Parser;
use tracing::info;

#[derive(Parser)]
struct Params {
    #[clap(short, long, default_value = "0.0.0.0:7777")]
    bind_addr: SocketAddr,

    #[clap(short, long)]
    config_path: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let params = Params::parse();
    let config_path = params
        .config_path
        .map(std::path::PathBuf::from)
        .unwrap_or_else(ServerConfig::path_from_env);
    let config = ServerConfig::load(&config_path)?;

    let runtime = AsyncRuntime::default();
    let store = Arc::new(SignalingStore::new(
        config.signaling,
        config.character_allowlist.clone(),
    ));

    let _tick_thread = spawn_tick_thread(&config, store.clone());

    let state = Arc::new(http::AppState::new(store, config.signaling));
    let app = http::router(state);
    let bind_addr = params.bind_addr;

    info!(%bind_addr, "starting http front door");
    runtime.handle().block_on(async move {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        anyhow::Ok(())
    })?;

    Ok(())
}
