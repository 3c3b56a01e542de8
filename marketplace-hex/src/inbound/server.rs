//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use marketplace_types::PaymentsProvider;

use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware};
use crate::ConnectService;
use crate::openapi::ApiDoc;

/// HTTP Server for the marketplace payments API.
pub struct HttpServer<P: PaymentsProvider> {
    state: Arc<AppState<P>>,
    rate_limiter: Arc<RateLimiterState>,
}

impl<P: PaymentsProvider> HttpServer<P> {
    /// Creates a new HTTP server with the given service.
    pub fn new(service: ConnectService<P>, app_url: String) -> Self {
        Self {
            state: Arc::new(AppState { service, app_url }),
            rate_limiter: Arc::new(RateLimiterState::default()), // 100 req/min default
        }
    }

    /// Creates a new HTTP server with custom rate limiting.
    pub fn with_rate_limit(
        service: ConnectService<P>,
        app_url: String,
        requests_per_minute: u32,
    ) -> Self {
        use std::time::Duration;
        Self {
            state: Arc::new(AppState { service, app_url }),
            rate_limiter: Arc::new(RateLimiterState::new(
                requests_per_minute,
                Duration::from_secs(60),
            )),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/health", get(handlers::health))
            .route(
                "/stripe/connect/accounts",
                post(handlers::create_account::<P>).get(handlers::list_accounts::<P>),
            )
            .route(
                "/stripe/connect/accounts/{id}",
                get(handlers::get_account::<P>),
            )
            .route(
                "/stripe/connect/accounts/{id}/balance",
                get(handlers::get_account_balance::<P>),
            )
            .route(
                "/stripe/connect/account-links",
                post(handlers::create_account_link::<P>),
            )
            .route(
                "/stripe/connect/simulate-flow",
                post(handlers::simulate_flow::<P>),
            )
            .route(
                "/stripe/payments/payment-intents",
                post(handlers::create_payment_intent::<P>),
            )
            .route(
                "/stripe/payments/payment-intents/mbway",
                post(handlers::create_mbway_payment_intent::<P>),
            )
            .route(
                "/stripe/payments/payment-intents/{id}",
                get(handlers::get_payment_intent::<P>),
            )
            .route(
                "/stripe/payments/payment-intents/{id}/confirm",
                post(handlers::confirm_payment_intent::<P>),
            )
            .route(
                "/stripe/payments/payment-intents/{id}/cancel",
                post(handlers::cancel_payment_intent::<P>),
            )
            .route(
                "/stripe/payments/payment-methods/available",
                get(handlers::available_payment_methods::<P>),
            )
            .route(
                "/stripe/payments/transfers",
                post(handlers::create_transfer::<P>),
            )
            .route(
                "/stripe/checkout/sessions",
                post(handlers::create_checkout_session::<P>),
            )
            .route(
                "/stripe/checkout/payment-links",
                post(handlers::create_payment_link::<P>),
            )
            .route(
                "/stripe/checkout/payment-links/with-fee",
                post(handlers::create_payment_link_with_fee::<P>),
            )
            .route(
                "/stripe/checkout/payment-intents-elements",
                post(handlers::create_elements_intent::<P>),
            )
            .route("/stripe/webhooks", post(handlers::stripe_webhook::<P>))
            .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
