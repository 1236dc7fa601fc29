use std::{net::SocketAddr, path::Path};

use anyhow::Context;
use axum::{middleware, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    decompression::RequestDecompressionLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};

use crate::{
    error::ErrorVerbosity,
    middleware::{
        method_not_allowed::method_not_allowed,
        not_found::not_found,
        trace::{trace_headers, trace_response_body},
    },
    route::books::app::BooksApiDoc,
    state::{book_store::BookStore, ApiState},
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file `{path}`")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file `{path}`")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    socket_address: SocketAddr,
    #[serde(default)]
    error_verbosity: ErrorVerbosity,
    /// Logs every response body. Expensive.
    #[serde(default)]
    trace_response_body: bool,
}

impl ServerConfig {
    pub async fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn with_socket_address(mut self, socket_address: SocketAddr) -> Self {
        self.socket_address = socket_address;
        self
    }

    pub fn socket_address(&self) -> SocketAddr {
        self.socket_address
    }

    pub fn error_verbosity(&self) -> ErrorVerbosity {
        self.error_verbosity
    }

    pub fn trace_response_body(&self) -> bool {
        self.trace_response_body
    }
}

/// Builds the application router on top of the given state.
///
/// Book routes are mounted at the root, API docs under `/redoc` and `/rapidoc`.
pub fn app(state: ApiState, trace_bodies: bool) -> Router {
    let openapi = BooksApiDoc::openapi();

    let router = Router::new()
        .merge(crate::route::books::app::app())
        .merge(Redoc::with_url("/redoc", openapi.clone()))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", openapi).path("/rapidoc"))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            method_not_allowed::<ApiState>,
        ))
        .layer(middleware::from_fn(trace_headers));

    let router = match trace_bodies {
        true => router.layer(middleware::from_fn_with_state(
            state.clone(),
            trace_response_body::<ApiState>,
        )),
        false => router,
    };

    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                    .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                    .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
            )
            .layer(RequestDecompressionLayer::new())
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive()),
    )
}

pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let state = ApiState::new(self.config.error_verbosity, BookStore::new());

        let app = app(state, self.config.trace_response_body);

        tracing::info!(addr = %self.config.socket_address, "Starting server");

        let listener = TcpListener::bind(&self.config.socket_address)
            .await
            .context("Bind failed")?;

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("CTRL+C received"),
            Err(err) => {
                tracing::error!(%err, "Failed to install CTRL+C signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;

                tracing::info!("SIGTERM received");
            }
            Err(err) => {
                tracing::error!(%err, "Failed to install SIGTERM signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down");
}
