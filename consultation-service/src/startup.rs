//! Application startup and lifecycle management.
//!
//! Builds the router, binds the listener, and wires the provider into the
//! shared state. The provider is injected at this single initialization
//! point; nothing else constructs a client.

use crate::config::ConsultationConfig;
use crate::handlers::{consultation_summary, health_check, root};
use crate::services::providers::openai::{OpenAiProvider, OpenAiProviderConfig};
use crate::services::providers::ChatProvider;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use service_core::error::AppError;
use service_core::middleware::request_id::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared application state. One logical request per invocation; no mutable
/// state is shared between requests.
#[derive(Clone)]
pub struct AppState {
    pub config: ConsultationConfig,
    pub provider: Arc<dyn ChatProvider>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration, constructing the
    /// OpenAI provider from it.
    pub async fn build(config: ConsultationConfig) -> Result<Self, AppError> {
        let provider_config = OpenAiProviderConfig {
            api_key: config.openai.api_key.clone(),
            model: config.openai.model.clone(),
            temperature: config.openai.temperature,
        };
        let provider: Arc<dyn ChatProvider> = Arc::new(OpenAiProvider::new(provider_config));

        if config.has_api_key() {
            tracing::info!(model = %config.openai.model, "Initialized OpenAI provider");
        } else {
            tracing::warn!(
                "OPENAI_API_KEY is not set; consultation requests will be rejected"
            );
        }

        Self::build_with_provider(config, provider).await
    }

    /// Build the application with an explicitly injected provider.
    /// Tests use this to substitute a mock.
    pub async fn build_with_provider(
        config: ConsultationConfig,
        provider: Arc<dyn ChatProvider>,
    ) -> Result<Self, AppError> {
        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let state = AppState { config, provider };

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let router = build_router(self.state);

        tracing::info!("Consultation service listening on port {}", self.port);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

/// Build the HTTP router: consultation + health routes, request-id and
/// trace layers, CORS from the configured origin list, and an optional
/// static-asset fallback serving an exported front-end.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.allowed_origins);
    let static_dir = state.config.server.static_dir.clone();

    let mut router = Router::new()
        .route("/api/consultation", post(consultation_summary))
        .route("/health", get(health_check));

    // With a static directory the front-end's index.html owns "/";
    // otherwise the root serves a status payload.
    router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.route("/", get(root)),
    };

    router
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(cors)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(
            allowed_origins
                .iter()
                .filter_map(|o| {
                    o.parse::<HeaderValue>()
                        .map_err(|e| {
                            tracing::error!("Invalid CORS origin '{}': {}. Skipping.", o, e);
                            e
                        })
                        .ok()
                })
                .collect::<Vec<HeaderValue>>(),
        )
    }
}
