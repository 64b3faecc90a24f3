use session_control_api::session::{MemorySessionStorage, SessionRegistry, SessionStorage};
use session_control_api::{config, create_app, netinfo};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_control_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = config::load_config_with_fallback();
    let session_config = config.session.to_session_config();

    let storage: Arc<dyn SessionStorage> = Arc::new(MemorySessionStorage::new());
    let registry = Arc::new(SessionRegistry::new(storage, session_config));

    // Background sweep for expired sessions
    if config.session.sweep_interval_secs > 0 && config.session.idle_timeout_secs > 0 {
        let sweeper = registry.clone();
        let period = Duration::from_secs(config.session.sweep_interval_secs);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await; // first tick fires immediately

            loop {
                ticker.tick().await;
                match sweeper.sweep().await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Swept {} expired session(s)", n),
                    Err(e) => tracing::warn!("Session sweep failed: {}", e),
                }
            }
        });
    } else {
        tracing::info!("Session expiry sweep disabled");
    }

    let app = create_app(registry);

    let addr = config.bind_addr();
    let server_info = netinfo::server_info();
    tracing::info!("Starting session control API on {}", addr);
    tracing::info!(
        "Server network info: ip={} mac={}",
        server_info.ip.as_deref().unwrap_or("unknown"),
        server_info.mac.as_deref().unwrap_or("unknown")
    );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
