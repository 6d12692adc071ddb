#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    config::RuntimeConfiguration,
    error::{BindListenerSnafu, ServeSnafu, StudentsResult},
    state::StudentsState,
};
use snafu::ResultExt;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod config;
mod data;
mod error;
mod routes;
mod state;

async fn shutdown_signal(state: StudentsState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
    state.sensible_shutdown().await;
}

async fn serve(config: RuntimeConfiguration) -> StudentsResult<()> {
    let state = StudentsState::new();
    let app = routes::router(state.clone(), config.body_limit());

    let server_ip = config.server_ip();
    let listener = TcpListener::bind(server_ip)
        .await
        .context(BindListenerSnafu { address: server_ip })?;

    info!(?server_ip, body_limit = config.body_limit(), "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .context(ServeSnafu)
}

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");
    if let Err(e) = dotenv {
        debug!(?e, "no `.env` loaded, using process environment only");
    }

    let config = RuntimeConfiguration::new().expect("unable to create config");
    serve(config).await.expect("unable to serve app");
}
