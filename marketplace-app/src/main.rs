//! # Marketplace Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the Stripe client adapter
//! - Create the connect service
//! - Start the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marketplace_hex::{ConnectService, inbound::HttpServer};
use marketplace_stripe::StripeClient;

fn init_tracer() -> (sdktrace::Tracer, sdktrace::SdkTracerProvider) {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .expect("failed to create OTLP span exporter");

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    (provider.tracer("marketplace-gateway"), provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize OpenTelemetry tracing
    let (otel_tracer, otel_provider) = init_tracer();
    let telemetry = tracing_opentelemetry::layer().with_tracer(otel_tracer);

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,marketplace_app=debug,marketplace_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting marketplace gateway on port {}", config.port);
    tracing::info!("Frontend base URL: {}", config.app_url);

    // Build the Stripe adapter
    let mut stripe = StripeClient::new(config.stripe_secret_key);
    if let Some(secret) = config.stripe_webhook_secret {
        stripe = stripe.with_webhook_secret(secret);
    } else {
        tracing::warn!("STRIPE_WEBHOOK_SECRET not set; webhook deliveries will be rejected");
    }
    if let Some(base) = config.stripe_api_base {
        tracing::info!("Using Stripe API base override: {base}");
        stripe = stripe.with_api_base(base);
    }

    // Create the connect service
    let service = ConnectService::new(stripe);

    // Create and run the HTTP server
    let server = HttpServer::new(service, config.app_url);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    let _ = otel_provider.shutdown();
    Ok(())
}
