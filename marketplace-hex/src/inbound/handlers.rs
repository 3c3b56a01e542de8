//! HTTP request handlers.
//!
//! Every handler converts its service result into the uniform
//! `{success, data, message?}` / `{success: false, error}` envelope with
//! HTTP 200. Provider failures never escape as unhandled errors; the
//! envelope carries the message text instead.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Deserialize;

use marketplace_types::{
    ApiEnvelope, AvailableMethodsResponse, CheckoutSessionResponse, ConfirmPaymentIntentRequest,
    CreateAccountLinkRequest, CreateAccountRequest, CreateCheckoutSessionRequest,
    CreateElementsIntentRequest, CreateMbwayPaymentIntentRequest, CreatePaymentIntentRequest,
    CreatePaymentLinkRequest, CreateTransferRequest, ElementsIntentResponse,
    PaymentIntentResponse, PaymentLinkResponse, PaymentsProvider, ProviderPaymentIntent,
    SimulateFlowRequest, SimulateFlowResponse, WebhookAck,
};

use crate::ConnectService;

/// Application state shared across handlers.
pub struct AppState<P: PaymentsProvider> {
    pub service: ConnectService<P>,
    /// Base URL of the demo frontend, used for redirect URLs.
    pub app_url: String,
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Connected accounts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    pub limit: Option<u32>,
}

#[tracing::instrument(skip(state, req), fields(country = ?req.country))]
pub async fn create_account<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Json(req): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    match state.service.create_connect_account(req).await {
        Ok(account) => Json(ApiEnvelope::ok_with_message(
            account,
            "Connect account created successfully",
        )),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

#[tracing::instrument(skip(state))]
pub async fn list_accounts<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Query(query): Query<ListAccountsQuery>,
) -> impl IntoResponse {
    match state.service.list_accounts(query.limit.unwrap_or(10)).await {
        Ok(accounts) => Json(ApiEnvelope::ok(accounts)),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

#[tracing::instrument(skip(state), fields(account_id = %id))]
pub async fn get_account<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.service.get_account(&id).await {
        Ok(account) => Json(ApiEnvelope::ok(account)),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

#[tracing::instrument(skip(state), fields(account_id = %id))]
pub async fn get_account_balance<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.service.get_account_balance(&id).await {
        Ok(balance) => Json(ApiEnvelope::ok(balance)),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

#[tracing::instrument(skip(state, req), fields(account_id = %req.account_id))]
pub async fn create_account_link<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Json(req): Json<CreateAccountLinkRequest>,
) -> impl IntoResponse {
    match state.service.create_account_link(req).await {
        Ok(link) => Json(ApiEnvelope::ok_with_message(
            link,
            "Account link created successfully",
        )),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

#[tracing::instrument(skip(state, req))]
pub async fn simulate_flow<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Json(req): Json<SimulateFlowRequest>,
) -> impl IntoResponse {
    match state.service.simulate_flow(&req.email, &state.app_url).await {
        Ok((account, link)) => Json(ApiEnvelope::ok_with_message(
            SimulateFlowResponse {
                account,
                onboarding_url: link.url,
                amount: req.amount,
                instructions: vec![
                    "1. Account created successfully".to_string(),
                    "2. Use the onboarding URL to complete account setup".to_string(),
                    "3. After onboarding, you can create payments and transfers".to_string(),
                ],
            },
            "Complete flow simulation started",
        )),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment intents
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, req), fields(amount = req.amount, account = %req.connected_account_id))]
pub async fn create_payment_intent<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Json(req): Json<CreatePaymentIntentRequest>,
) -> impl IntoResponse {
    match state.service.create_payment_intent(req).await {
        Ok(intent) => Json(ApiEnvelope::ok_with_message(
            PaymentIntentResponse::from_intent(intent, false),
            "Payment Intent created successfully! Use the client_secret to confirm the payment.",
        )),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

/// Human-readable description of the rails a Portugal intent ended up with.
fn supported_methods_description(intent: &ProviderPaymentIntent) -> &'static str {
    let has_multibanco = intent.payment_method_types.iter().any(|m| m == "multibanco");
    let has_mb_way = intent.payment_method_types.iter().any(|m| m == "mb_way");

    match (has_multibanco, has_mb_way) {
        (true, true) => "MB Way, Multibanco and Card",
        (true, false) => "Multibanco and Card",
        _ => "Card",
    }
}

#[tracing::instrument(skip(state, req), fields(amount = req.amount, account = %req.connected_account_id))]
pub async fn create_mbway_payment_intent<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Json(req): Json<CreateMbwayPaymentIntentRequest>,
) -> impl IntoResponse {
    match state.service.create_mbway_payment_intent(req).await {
        Ok(intent) => {
            let message = format!(
                "Portugal Payment Intent created! Supports: {}",
                supported_methods_description(&intent)
            );
            Json(ApiEnvelope::ok_with_message(
                PaymentIntentResponse::from_intent(intent, true),
                message,
            ))
        }
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

#[tracing::instrument(skip(state), fields(intent_id = %id))]
pub async fn get_payment_intent<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.service.get_payment_intent(&id).await {
        Ok(intent) => Json(ApiEnvelope::ok(PaymentIntentResponse::from_intent(
            intent, false,
        ))),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

#[tracing::instrument(skip(state, req), fields(intent_id = %id))]
pub async fn confirm_payment_intent<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
    Json(req): Json<ConfirmPaymentIntentRequest>,
) -> impl IntoResponse {
    match state
        .service
        .confirm_payment_intent(&id, req.payment_method_id.as_deref())
        .await
    {
        Ok(intent) => Json(ApiEnvelope::ok_with_message(
            serde_json::json!({
                "id": intent.id,
                "status": intent.status,
                "amount": intent.amount,
                "currency": intent.currency,
            }),
            "Payment Intent confirmed successfully!",
        )),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

#[tracing::instrument(skip(state), fields(intent_id = %id))]
pub async fn cancel_payment_intent<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.service.cancel_payment_intent(&id).await {
        Ok(intent) => Json(ApiEnvelope::ok_with_message(
            serde_json::json!({
                "id": intent.id,
                "status": intent.status,
            }),
            "Payment Intent cancelled successfully!",
        )),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct AvailableMethodsQuery {
    pub currency: Option<String>,
}

#[tracing::instrument(skip(state))]
pub async fn available_payment_methods<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Query(query): Query<AvailableMethodsQuery>,
) -> impl IntoResponse {
    let currency = query.currency.unwrap_or_else(|| "eur".to_string());
    let methods = state.service.available_payment_methods(&currency).await;
    let message = format!("Found {} available payment methods.", methods.len());

    Json(ApiEnvelope::ok_with_message(
        AvailableMethodsResponse {
            currency,
            total_methods: methods.len(),
            available_methods: methods,
        },
        message,
    ))
}

#[tracing::instrument(skip(state, req), fields(amount = req.amount, destination = %req.destination))]
pub async fn create_transfer<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Json(req): Json<CreateTransferRequest>,
) -> impl IntoResponse {
    match state.service.create_transfer(req).await {
        Ok(transfer) => Json(ApiEnvelope::ok_with_message(
            transfer,
            "Transfer created successfully",
        )),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Checkout sessions and payment links
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, req), fields(amount = req.amount, account = %req.connected_account_id))]
pub async fn create_checkout_session<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Json(req): Json<CreateCheckoutSessionRequest>,
) -> impl IntoResponse {
    let success_url = format!(
        "{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
        state.app_url
    );
    let cancel_url = format!("{}/payment-cancelled", state.app_url);

    match state
        .service
        .create_checkout_session(req, success_url, cancel_url)
        .await
    {
        Ok(session) => Json(ApiEnvelope::ok(CheckoutSessionResponse {
            session_id: session.id,
            url: session.url,
            client_secret: session.client_secret,
            message: "Checkout session created! Customer can use this URL to pay.".to_string(),
        })),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

#[tracing::instrument(skip(state, req), fields(amount = req.amount, account = %req.connected_account_id))]
pub async fn create_payment_link<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Json(req): Json<CreatePaymentLinkRequest>,
) -> impl IntoResponse {
    let note = format!(
        "Seller receives full amount: ${:.2}",
        req.amount as f64 / 100.0
    );

    match state.service.create_payment_link_direct(req).await {
        Ok(link) => Json(ApiEnvelope::ok(PaymentLinkResponse {
            payment_link_id: link.id,
            url: link.url,
            message: "Payment link created! Customer pays directly to connected account."
                .to_string(),
            note: Some(note),
        })),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

#[tracing::instrument(skip(state, req), fields(amount = req.amount, account = %req.connected_account_id))]
pub async fn create_payment_link_with_fee<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Json(req): Json<CreatePaymentLinkRequest>,
) -> impl IntoResponse {
    match state.service.create_payment_link_with_fee(req).await {
        Ok(link) => Json(ApiEnvelope::ok(PaymentLinkResponse {
            payment_link_id: link.id,
            url: link.url,
            message: "Payment link created! Payment goes to your main account first.".to_string(),
            note: Some(
                "You need to transfer funds to connected account manually or via webhook."
                    .to_string(),
            ),
        })),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

#[tracing::instrument(skip(state, req), fields(amount = req.amount, account = %req.connected_account_id))]
pub async fn create_elements_intent<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    Json(req): Json<CreateElementsIntentRequest>,
) -> impl IntoResponse {
    match state.service.create_elements_intent(req).await {
        Ok(intent) => Json(ApiEnvelope::ok(ElementsIntentResponse {
            client_secret: intent.client_secret,
            payment_intent_id: intent.id,
            message: "Payment Intent created! Use client_secret with Stripe Elements.".to_string(),
        })),
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Webhooks
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, headers, body))]
pub async fn stripe_webhook<P: PaymentsProvider>(
    State(state): State<Arc<AppState<P>>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let Some(signature) = headers
        .get("stripe-signature")
        .and_then(|h| h.to_str().ok())
    else {
        return Json(ApiEnvelope::err("Missing Stripe-Signature header"));
    };

    match state.service.construct_webhook_event(&body, signature) {
        Ok(event) => {
            tracing::info!(event_id = %event.id, event_type = %event.event_type, "webhook verified");
            Json(ApiEnvelope::ok(WebhookAck {
                received: true,
                event_id: event.id,
                event_type: event.event_type,
            }))
        }
        Err(e) => Json(ApiEnvelope::err(e.to_string())),
    }
}
