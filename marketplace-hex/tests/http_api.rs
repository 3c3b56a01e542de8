//! Integration tests for the HTTP layer.
//!
//! These drive the full router through `tower::ServiceExt::oneshot` with a
//! stub provider, verifying the response envelope and the middleware stack.

use std::collections::BTreeMap;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use marketplace_hex::{ConnectService, inbound::HttpServer};
use marketplace_types::{
    CheckoutSessionParams, PaymentIntentParams, PaymentLinkParams, PaymentsProvider, PriceParams,
    ProductParams, ProviderAccount, ProviderAccountLink, ProviderBalance, ProviderCheckoutSession,
    ProviderError, ProviderEvent, ProviderList, ProviderPaymentIntent, ProviderPaymentLink,
    ProviderPrice, ProviderProduct, ProviderTransfer,
    domain::ProviderEventData,
};

/// Stub provider that always succeeds with canned objects. Webhook
/// verification accepts only the literal signature `"valid"`.
struct StubProvider;

fn intent(id: &str, params: &PaymentIntentParams) -> ProviderPaymentIntent {
    ProviderPaymentIntent {
        id: id.to_string(),
        client_secret: Some(format!("{id}_secret")),
        status: "requires_payment_method".to_string(),
        amount: params.amount,
        currency: params.currency.clone(),
        application_fee_amount: params.application_fee_amount,
        payment_method_types: vec!["card".to_string()],
        description: params.description.clone(),
        metadata: params.metadata.clone(),
        created: 1_700_000_000,
    }
}

#[async_trait::async_trait]
impl PaymentsProvider for StubProvider {
    async fn create_account(
        &self,
        email: &str,
        country: &str,
        account_type: &str,
        _capabilities: &[&str],
    ) -> Result<ProviderAccount, ProviderError> {
        Ok(ProviderAccount {
            id: "acct_test".to_string(),
            email: Some(email.to_string()),
            country: Some(country.to_string()),
            account_type: Some(account_type.to_string()),
            charges_enabled: false,
            payouts_enabled: false,
            details_submitted: false,
            created: Some(1_700_000_000),
        })
    }

    async fn retrieve_account(&self, account_id: &str) -> Result<ProviderAccount, ProviderError> {
        Ok(ProviderAccount {
            id: account_id.to_string(),
            email: None,
            country: Some("US".to_string()),
            account_type: Some("express".to_string()),
            charges_enabled: true,
            payouts_enabled: true,
            details_submitted: true,
            created: Some(1_700_000_000),
        })
    }

    async fn list_accounts(
        &self,
        _limit: u32,
    ) -> Result<ProviderList<ProviderAccount>, ProviderError> {
        Ok(ProviderList {
            data: vec![],
            has_more: false,
        })
    }

    async fn create_account_link(
        &self,
        account_id: &str,
        _refresh_url: &str,
        _return_url: &str,
    ) -> Result<ProviderAccountLink, ProviderError> {
        Ok(ProviderAccountLink {
            url: format!("https://onboarding.example/{account_id}"),
            expires_at: 1_700_000_600,
            created: Some(1_700_000_000),
        })
    }

    async fn retrieve_balance(&self, _account_id: &str) -> Result<ProviderBalance, ProviderError> {
        Ok(ProviderBalance {
            available: vec![],
            pending: vec![],
        })
    }

    async fn create_payment_intent(
        &self,
        params: PaymentIntentParams,
    ) -> Result<ProviderPaymentIntent, ProviderError> {
        Ok(intent("pi_test", &params))
    }

    async fn confirm_payment_intent(
        &self,
        intent_id: &str,
        _payment_method: Option<&str>,
    ) -> Result<ProviderPaymentIntent, ProviderError> {
        Ok(ProviderPaymentIntent {
            id: intent_id.to_string(),
            client_secret: None,
            status: "succeeded".to_string(),
            amount: 1000,
            currency: "usd".to_string(),
            application_fee_amount: None,
            payment_method_types: vec!["card".to_string()],
            description: None,
            metadata: BTreeMap::new(),
            created: 1_700_000_000,
        })
    }

    async fn cancel_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<ProviderPaymentIntent, ProviderError> {
        Ok(ProviderPaymentIntent {
            id: intent_id.to_string(),
            client_secret: None,
            status: "canceled".to_string(),
            amount: 100,
            currency: "eur".to_string(),
            application_fee_amount: None,
            payment_method_types: vec![],
            description: None,
            metadata: BTreeMap::new(),
            created: 1_700_000_000,
        })
    }

    async fn retrieve_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<ProviderPaymentIntent, ProviderError> {
        Ok(ProviderPaymentIntent {
            id: intent_id.to_string(),
            client_secret: None,
            status: "requires_payment_method".to_string(),
            amount: 1000,
            currency: "usd".to_string(),
            application_fee_amount: None,
            payment_method_types: vec!["card".to_string()],
            description: None,
            metadata: BTreeMap::new(),
            created: 1_700_000_000,
        })
    }

    async fn create_transfer(
        &self,
        amount: i64,
        currency: &str,
        destination: &str,
    ) -> Result<ProviderTransfer, ProviderError> {
        Ok(ProviderTransfer {
            id: "tr_test".to_string(),
            amount,
            currency: currency.to_string(),
            destination: destination.to_string(),
            created: 1_700_000_000,
        })
    }

    async fn create_checkout_session(
        &self,
        _params: CheckoutSessionParams,
    ) -> Result<ProviderCheckoutSession, ProviderError> {
        Ok(ProviderCheckoutSession {
            id: "cs_test".to_string(),
            url: Some("https://checkout.example/cs_test".to_string()),
            client_secret: None,
            status: Some("open".to_string()),
        })
    }

    async fn create_product(
        &self,
        params: ProductParams,
        _on_behalf_of: Option<&str>,
    ) -> Result<ProviderProduct, ProviderError> {
        Ok(ProviderProduct {
            id: "prod_test".to_string(),
            name: Some(params.name),
        })
    }

    async fn create_price(
        &self,
        params: PriceParams,
        _on_behalf_of: Option<&str>,
    ) -> Result<ProviderPrice, ProviderError> {
        Ok(ProviderPrice {
            id: "price_test".to_string(),
            unit_amount: Some(params.unit_amount),
            currency: Some(params.currency),
        })
    }

    async fn create_payment_link(
        &self,
        _params: PaymentLinkParams,
        _on_behalf_of: Option<&str>,
    ) -> Result<ProviderPaymentLink, ProviderError> {
        Ok(ProviderPaymentLink {
            id: "plink_test".to_string(),
            url: "https://pay.example/plink_test".to_string(),
        })
    }

    fn construct_webhook_event(
        &self,
        _payload: &[u8],
        signature: &str,
    ) -> Result<ProviderEvent, ProviderError> {
        if signature == "valid" {
            Ok(ProviderEvent {
                id: "evt_test".to_string(),
                event_type: "payment_intent.succeeded".to_string(),
                created: 1_700_000_000,
                data: ProviderEventData {
                    object: serde_json::json!({"id": "pi_test"}),
                },
            })
        } else {
            Err(ProviderError::Signature("bad signature".to_string()))
        }
    }
}

fn test_router() -> axum::Router {
    let service = ConnectService::new(StubProvider);
    HttpServer::new(service, "http://localhost:3000".to_string()).router()
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_create_payment_intent_returns_success_envelope() {
    let request = json_post(
        "/stripe/payments/payment-intents",
        r#"{"amount": 2000, "currency": "eur", "connectedAccountId": "acct_seller", "applicationFeeAmount": 200}"#,
    );
    let response = test_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["id"], "pi_test");
    assert_eq!(json["data"]["client_secret"], "pi_test_secret");
    assert_eq!(json["data"]["metadata"]["seller_amount"], "1800");
    assert!(json["message"].as_str().unwrap().contains("client_secret"));
}

#[tokio::test]
async fn test_validation_failure_is_an_envelope_not_a_4xx() {
    let request = json_post(
        "/stripe/payments/payment-intents",
        r#"{"amount": 10, "connectedAccountId": "acct_seller"}"#,
    );
    let response = test_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("Amount must be at least 50")
    );
}

#[tokio::test]
async fn test_checkout_session_payload_is_camel_case() {
    let request = json_post(
        "/stripe/checkout/sessions",
        r#"{"amount": 2000, "connectedAccountId": "acct_seller", "applicationFeeAmount": 100}"#,
    );
    let response = test_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["sessionId"], "cs_test");
    assert_eq!(json["data"]["url"], "https://checkout.example/cs_test");
}

#[tokio::test]
async fn test_webhook_rejects_missing_signature() {
    let request = json_post("/stripe/webhooks", r#"{"id": "evt_1"}"#);
    let response = test_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .contains("Missing Stripe-Signature header")
    );
}

#[tokio::test]
async fn test_webhook_acknowledges_verified_event() {
    let mut request = json_post("/stripe/webhooks", r#"{"id": "evt_1"}"#);
    request
        .headers_mut()
        .insert("stripe-signature", "valid".parse().unwrap());
    let response = test_router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["event_id"], "evt_test");
    assert_eq!(json["data"]["event_type"], "payment_intent.succeeded");
}

#[tokio::test]
async fn test_rate_limiting_returns_429_when_exceeded() {
    let service = ConnectService::new(StubProvider);
    let app =
        HttpServer::with_rate_limit(service, "http://localhost:3000".to_string(), 3).router();

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/stripe/connect/accounts")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/stripe/connect/accounts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Rate limit exceeded"));
    assert_eq!(json["retry_after_seconds"], 60);
}

#[tokio::test]
async fn test_rate_limiting_health_endpoint_bypassed() {
    let service = ConnectService::new(StubProvider);
    let app =
        HttpServer::with_rate_limit(service, "http://localhost:3000".to_string(), 1).router();

    for _ in 0..10 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
