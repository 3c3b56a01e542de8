//! # Marketplace Client SDK
//!
//! A typed Rust client for the marketplace payments API.
//!
//! Every endpoint responds with the `{success, data, message?}` envelope at
//! HTTP 200; this client unwraps the envelope and surfaces `success: false`
//! as [`ClientError::Api`].

use marketplace_types::{
    AccountType, ApiEnvelope, AvailableMethodsResponse, CheckoutSessionResponse,
    ConfirmPaymentIntentRequest, CreateAccountLinkRequest, CreateAccountRequest,
    CreateCheckoutSessionRequest, CreateElementsIntentRequest, CreateMbwayPaymentIntentRequest,
    CreatePaymentIntentRequest, CreatePaymentLinkRequest, CreateTransferRequest,
    ElementsIntentResponse, PaymentIntentResponse, PaymentLinkResponse, ProviderAccount,
    ProviderAccountLink, ProviderBalance, ProviderList, ProviderTransfer, SimulateFlowRequest,
    SimulateFlowResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Marketplace API client.
pub struct MarketplaceClient {
    base_url: String,
    http: Client,
}

impl MarketplaceClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    // ── Connected accounts ───────────────────────────────────────────────

    /// Creates a connected account.
    pub async fn create_account(
        &self,
        email: &str,
        country: Option<&str>,
        account_type: Option<AccountType>,
    ) -> Result<ProviderAccount, ClientError> {
        let req = CreateAccountRequest {
            email: email.to_string(),
            country: country.map(str::to_string),
            account_type,
        };
        self.post("/stripe/connect/accounts", &req).await
    }

    /// Retrieves a connected account.
    pub async fn get_account(&self, account_id: &str) -> Result<ProviderAccount, ClientError> {
        self.get(&format!("/stripe/connect/accounts/{account_id}"))
            .await
    }

    /// Lists connected accounts.
    pub async fn list_accounts(
        &self,
        limit: u32,
    ) -> Result<ProviderList<ProviderAccount>, ClientError> {
        self.get(&format!("/stripe/connect/accounts?limit={limit}"))
            .await
    }

    /// Retrieves a connected account's balance.
    pub async fn get_account_balance(
        &self,
        account_id: &str,
    ) -> Result<ProviderBalance, ClientError> {
        self.get(&format!("/stripe/connect/accounts/{account_id}/balance"))
            .await
    }

    /// Creates an onboarding link.
    pub async fn create_account_link(
        &self,
        account_id: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<ProviderAccountLink, ClientError> {
        let req = CreateAccountLinkRequest {
            account_id: account_id.to_string(),
            refresh_url: refresh_url.to_string(),
            return_url: return_url.to_string(),
        };
        self.post("/stripe/connect/account-links", &req).await
    }

    /// Creates an account and its onboarding link in one call.
    pub async fn simulate_flow(
        &self,
        email: &str,
        amount: i64,
    ) -> Result<SimulateFlowResponse, ClientError> {
        let req = SimulateFlowRequest {
            email: email.to_string(),
            amount,
        };
        self.post("/stripe/connect/simulate-flow", &req).await
    }

    // ── Payment intents ──────────────────────────────────────────────────

    /// Creates a payment intent routed to a connected account.
    pub async fn create_payment_intent(
        &self,
        req: &CreatePaymentIntentRequest,
    ) -> Result<PaymentIntentResponse, ClientError> {
        self.post("/stripe/payments/payment-intents", req).await
    }

    /// Creates a EUR payment intent with MB Way support and fallback.
    pub async fn create_mbway_payment_intent(
        &self,
        req: &CreateMbwayPaymentIntentRequest,
    ) -> Result<PaymentIntentResponse, ClientError> {
        self.post("/stripe/payments/payment-intents/mbway", req)
            .await
    }

    /// Retrieves a payment intent.
    pub async fn get_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<PaymentIntentResponse, ClientError> {
        self.get(&format!("/stripe/payments/payment-intents/{intent_id}"))
            .await
    }

    /// Confirms a payment intent.
    pub async fn confirm_payment_intent(
        &self,
        intent_id: &str,
        payment_method_id: Option<&str>,
    ) -> Result<serde_json::Value, ClientError> {
        let req = ConfirmPaymentIntentRequest {
            payment_method_id: payment_method_id.map(str::to_string),
        };
        self.post(
            &format!("/stripe/payments/payment-intents/{intent_id}/confirm"),
            &req,
        )
        .await
    }

    /// Cancels a payment intent.
    pub async fn cancel_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<serde_json::Value, ClientError> {
        self.post(
            &format!("/stripe/payments/payment-intents/{intent_id}/cancel"),
            &serde_json::json!({}),
        )
        .await
    }

    /// Probes the payment methods available for a currency.
    pub async fn available_payment_methods(
        &self,
        currency: &str,
    ) -> Result<AvailableMethodsResponse, ClientError> {
        self.get(&format!(
            "/stripe/payments/payment-methods/available?currency={currency}"
        ))
        .await
    }

    /// Creates a direct transfer to a connected account.
    pub async fn create_transfer(
        &self,
        amount: i64,
        currency: Option<&str>,
        destination: &str,
    ) -> Result<ProviderTransfer, ClientError> {
        let req = CreateTransferRequest {
            amount,
            currency: currency.map(str::to_string),
            destination: destination.to_string(),
        };
        self.post("/stripe/payments/transfers", &req).await
    }

    // ── Checkout and payment links ───────────────────────────────────────

    /// Creates a hosted checkout session.
    pub async fn create_checkout_session(
        &self,
        req: &CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSessionResponse, ClientError> {
        self.post("/stripe/checkout/sessions", req).await
    }

    /// Creates a payment link where the seller receives the full amount.
    pub async fn create_payment_link(
        &self,
        req: &CreatePaymentLinkRequest,
    ) -> Result<PaymentLinkResponse, ClientError> {
        self.post("/stripe/checkout/payment-links", req).await
    }

    /// Creates a payment link that collects a platform fee.
    pub async fn create_payment_link_with_fee(
        &self,
        req: &CreatePaymentLinkRequest,
    ) -> Result<PaymentLinkResponse, ClientError> {
        self.post("/stripe/checkout/payment-links/with-fee", req)
            .await
    }

    /// Creates a payment intent for embedded Elements checkout.
    pub async fn create_elements_intent(
        &self,
        req: &CreateElementsIntentRequest,
    ) -> Result<ElementsIntentResponse, ClientError> {
        self.post("/stripe/checkout/payment-intents-elements", req)
            .await
    }

    // ── Transport helpers ────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        self.unwrap_envelope(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        self.unwrap_envelope(resp).await
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let body = resp.text().await?;
        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)?;
        if !envelope.success {
            return Err(ClientError::Api(
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| ClientError::Api("envelope missing data".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = MarketplaceClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = MarketplaceClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_envelope_error_surfaces_as_api_error() {
        let body = r#"{"success": false, "error": "Error creating payment intent: boom"}"#;
        let envelope: ApiEnvelope<PaymentIntentResponse> = serde_json::from_str(body).unwrap();
        assert!(!envelope.success);
        assert_eq!(
            envelope.error.as_deref(),
            Some("Error creating payment intent: boom")
        );
    }
}
