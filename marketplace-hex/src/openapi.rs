//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use marketplace_types::domain::MethodSet;
use marketplace_types::dto::{
    AccountType, AvailableMethodsResponse, CheckoutSessionResponse, ConfirmPaymentIntentRequest,
    CreateAccountLinkRequest, CreateAccountRequest, CreateCheckoutSessionRequest,
    CreateElementsIntentRequest, CreateMbwayPaymentIntentRequest, CreatePaymentIntentRequest,
    CreatePaymentLinkRequest, CreateTransferRequest, ElementsIntentResponse, PaymentIntentResponse,
    PaymentLinkResponse, SimulateFlowRequest, SimulateFlowResponse, WebhookAck,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Create a new connected account
#[utoipa::path(
    post,
    path = "/stripe/connect/accounts",
    tag = "connect",
    request_body = CreateAccountRequest,
    responses(
        (status = 200, description = "Envelope with the created account, or an error message")
    )
)]
async fn create_account() {}

/// List connected accounts
#[utoipa::path(
    get,
    path = "/stripe/connect/accounts",
    tag = "connect",
    params(
        ("limit" = Option<u32>, Query, description = "Maximum number of accounts to return (default 10)")
    ),
    responses(
        (status = 200, description = "Envelope with the list of accounts, or an error message")
    )
)]
async fn list_accounts() {}

/// Retrieve a connected account
#[utoipa::path(
    get,
    path = "/stripe/connect/accounts/{id}",
    tag = "connect",
    params(
        ("id" = String, Path, description = "Connected account ID")
    ),
    responses(
        (status = 200, description = "Envelope with the account, or an error message")
    )
)]
async fn get_account() {}

/// Retrieve a connected account's balance
#[utoipa::path(
    get,
    path = "/stripe/connect/accounts/{id}/balance",
    tag = "connect",
    params(
        ("id" = String, Path, description = "Connected account ID")
    ),
    responses(
        (status = 200, description = "Envelope with the balance, or an error message")
    )
)]
async fn get_account_balance() {}

/// Create an onboarding link for a connected account
#[utoipa::path(
    post,
    path = "/stripe/connect/account-links",
    tag = "connect",
    request_body = CreateAccountLinkRequest,
    responses(
        (status = 200, description = "Envelope with the onboarding link, or an error message")
    )
)]
async fn create_account_link() {}

/// Create an account and onboarding link in one step
#[utoipa::path(
    post,
    path = "/stripe/connect/simulate-flow",
    tag = "connect",
    request_body = SimulateFlowRequest,
    responses(
        (status = 200, description = "Envelope with the account, onboarding URL, and next steps", body = SimulateFlowResponse)
    )
)]
async fn simulate_flow() {}

/// Create a payment intent routed to a connected account
#[utoipa::path(
    post,
    path = "/stripe/payments/payment-intents",
    tag = "payments",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 200, description = "Envelope with the payment intent", body = PaymentIntentResponse)
    )
)]
async fn create_payment_intent() {}

/// Create a payment intent with MB Way support and fallback
#[utoipa::path(
    post,
    path = "/stripe/payments/payment-intents/mbway",
    tag = "payments",
    request_body = CreateMbwayPaymentIntentRequest,
    responses(
        (status = 200, description = "Envelope with the payment intent and its supported methods", body = PaymentIntentResponse)
    )
)]
async fn create_mbway_payment_intent() {}

/// Retrieve a payment intent
#[utoipa::path(
    get,
    path = "/stripe/payments/payment-intents/{id}",
    tag = "payments",
    params(
        ("id" = String, Path, description = "Payment intent ID")
    ),
    responses(
        (status = 200, description = "Envelope with the payment intent", body = PaymentIntentResponse)
    )
)]
async fn get_payment_intent() {}

/// Confirm a payment intent
#[utoipa::path(
    post,
    path = "/stripe/payments/payment-intents/{id}/confirm",
    tag = "payments",
    params(
        ("id" = String, Path, description = "Payment intent ID")
    ),
    request_body = ConfirmPaymentIntentRequest,
    responses(
        (status = 200, description = "Envelope with the confirmed intent's id, status, amount, and currency")
    )
)]
async fn confirm_payment_intent() {}

/// Cancel a payment intent
#[utoipa::path(
    post,
    path = "/stripe/payments/payment-intents/{id}/cancel",
    tag = "payments",
    params(
        ("id" = String, Path, description = "Payment intent ID")
    ),
    responses(
        (status = 200, description = "Envelope with the cancelled intent's id and status")
    )
)]
async fn cancel_payment_intent() {}

/// Probe which payment methods the account can currently use
#[utoipa::path(
    get,
    path = "/stripe/payments/payment-methods/available",
    tag = "payments",
    params(
        ("currency" = Option<String>, Query, description = "Currency to probe with (default eur)")
    ),
    responses(
        (status = 200, description = "Envelope with the available methods", body = AvailableMethodsResponse)
    )
)]
async fn available_payment_methods() {}

/// Transfer funds to a connected account
#[utoipa::path(
    post,
    path = "/stripe/payments/transfers",
    tag = "payments",
    request_body = CreateTransferRequest,
    responses(
        (status = 200, description = "Envelope with the transfer, or an error message")
    )
)]
async fn create_transfer() {}

/// Create a hosted checkout session
#[utoipa::path(
    post,
    path = "/stripe/checkout/sessions",
    tag = "checkout",
    request_body = CreateCheckoutSessionRequest,
    responses(
        (status = 200, description = "Envelope with the session id and URL", body = CheckoutSessionResponse)
    )
)]
async fn create_checkout_session() {}

/// Create a payment link where the seller receives the full amount
#[utoipa::path(
    post,
    path = "/stripe/checkout/payment-links",
    tag = "checkout",
    request_body = CreatePaymentLinkRequest,
    responses(
        (status = 200, description = "Envelope with the payment link", body = PaymentLinkResponse)
    )
)]
async fn create_payment_link() {}

/// Create a payment link that collects a platform fee
#[utoipa::path(
    post,
    path = "/stripe/checkout/payment-links/with-fee",
    tag = "checkout",
    request_body = CreatePaymentLinkRequest,
    responses(
        (status = 200, description = "Envelope with the payment link", body = PaymentLinkResponse)
    )
)]
async fn create_payment_link_with_fee() {}

/// Create a payment intent for embedded Elements checkout
#[utoipa::path(
    post,
    path = "/stripe/checkout/payment-intents-elements",
    tag = "checkout",
    request_body = CreateElementsIntentRequest,
    responses(
        (status = 200, description = "Envelope with the client secret", body = ElementsIntentResponse)
    )
)]
async fn create_elements_intent() {}

/// Receive provider webhook events
#[utoipa::path(
    post,
    path = "/stripe/webhooks",
    tag = "webhooks",
    responses(
        (status = 200, description = "Envelope acknowledging the event", body = WebhookAck)
    )
)]
async fn stripe_webhook() {}

/// OpenAPI documentation for the marketplace payments API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Marketplace Payments API",
        version = "1.0.0",
        description = "A REST facade over Stripe Connect for marketplace payments: connected account onboarding, destination-charge payment intents, hosted checkout, payment links, and transfers.\n\nAll endpoints respond with HTTP 200 and a `{success, data, message?}` or `{success: false, error}` envelope.",
        license(name = "MIT"),
    ),
    paths(
        health,
        create_account,
        list_accounts,
        get_account,
        get_account_balance,
        create_account_link,
        simulate_flow,
        create_payment_intent,
        create_mbway_payment_intent,
        get_payment_intent,
        confirm_payment_intent,
        cancel_payment_intent,
        available_payment_methods,
        create_transfer,
        create_checkout_session,
        create_payment_link,
        create_payment_link_with_fee,
        create_elements_intent,
        stripe_webhook,
    ),
    components(
        schemas(
            AccountType,
            MethodSet,
            CreateAccountRequest,
            CreateAccountLinkRequest,
            SimulateFlowRequest,
            SimulateFlowResponse,
            CreatePaymentIntentRequest,
            CreateMbwayPaymentIntentRequest,
            ConfirmPaymentIntentRequest,
            PaymentIntentResponse,
            AvailableMethodsResponse,
            CreateTransferRequest,
            CreateCheckoutSessionRequest,
            CheckoutSessionResponse,
            CreatePaymentLinkRequest,
            PaymentLinkResponse,
            CreateElementsIntentRequest,
            ElementsIntentResponse,
            WebhookAck,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "connect", description = "Connected account onboarding and balances"),
        (name = "payments", description = "Payment intents, method probing, and transfers"),
        (name = "checkout", description = "Hosted checkout sessions, payment links, and Elements"),
        (name = "webhooks", description = "Provider event ingestion"),
    )
)]
pub struct ApiDoc;
