//! parley broker daemon.
//!
//! Plain topic fan-out over TCP for parley participants. It knows nothing
//! about rooms or rosters: every publish on a topic is delivered to every
//! client subscribed to it, the publisher included.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use parley_peer::broker::{server, TopicRouter};
use parley_peer::config;

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "parley.yaml".to_string());
    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(%path, error = %e, "config load failed");
            std::process::exit(1);
        }
    };

    let listen = cfg.broker.listen.clone();
    let listener = match tokio::net::TcpListener::bind(&listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%listen, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%listen, "parley-broker starting");
    let router = Arc::new(TopicRouter::new());

    tokio::select! {
        res = server::serve(listener, router, cfg.broker) => {
            if let Err(e) = res {
                tracing::error!(error = %e, "broker stopped");
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }
}
