//! Data Transfer Objects (DTOs) for requests and responses.
//!
//! Request bodies are camelCase to stay wire-compatible with the browser
//! clients the original demo UI shipped with. Response `data` payloads for
//! payment intents keep the provider's snake_case field names; the
//! checkout/link payloads are camelCase, again mirroring the existing API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::domain::ProviderAccount;

// ─────────────────────────────────────────────────────────────────────────────
// Response envelope
// ─────────────────────────────────────────────────────────────────────────────

/// The uniform response envelope: `{success, data, message?}` on success,
/// `{success: false, error}` on failure. Always HTTP 200; the envelope,
/// not the status code, is the contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Connect account DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Connected account type offered at onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Express,
    Standard,
    Custom,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Express => "express",
            AccountType::Standard => "standard",
            AccountType::Custom => "custom",
        }
    }
}

/// Request to create a connected account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    /// Seller's email address
    #[schema(example = "seller@example.com")]
    pub email: String,
    /// Two-letter country code; defaults to US
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Account type; defaults to express
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
}

/// Request to create an onboarding link.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountLinkRequest {
    pub account_id: String,
    #[schema(example = "https://example.com/reauth")]
    pub refresh_url: String,
    #[schema(example = "https://example.com/return")]
    pub return_url: String,
}

/// Request to run the onboarding simulation flow.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimulateFlowRequest {
    pub email: String,
    /// Illustrative amount echoed back; no charge is created.
    #[serde(default)]
    pub amount: i64,
}

/// Response of the onboarding simulation flow.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimulateFlowResponse {
    pub account: ProviderAccount,
    pub onboarding_url: String,
    pub amount: i64,
    pub instructions: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment intent DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a payment intent routed to a connected account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    /// Amount in minor units; minimum 50
    #[schema(example = 2000)]
    pub amount: i64,
    /// ISO currency code; defaults to usd
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Connected account that receives the funds
    pub connected_account_id: String,
    /// Platform fee in minor units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_fee_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    /// Explicit method list; overrides the per-currency defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_methods: Option<Vec<String>>,
}

/// Request for the Portugal (MB Way) payment flow. Currency is always EUR.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMbwayPaymentIntentRequest {
    /// Amount in minor units; minimum 50
    #[schema(example = 2000)]
    pub amount: i64,
    pub connected_account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_fee_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
}

/// Request to confirm a payment intent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentIntentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<String>,
}

/// Normalized payment-intent payload returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentIntentResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_fee_amount: Option<i64>,
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created: i64,
    /// Included for the MB Way flow, where the surviving method set matters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_types: Option<Vec<String>>,
}

impl PaymentIntentResponse {
    /// Extracts the fields callers need from a provider intent.
    ///
    /// `include_method_types` is set for the MB Way flow, where the caller
    /// needs to know which method set survived the retry plan.
    pub fn from_intent(
        intent: crate::domain::ProviderPaymentIntent,
        include_method_types: bool,
    ) -> Self {
        Self {
            id: intent.id,
            client_secret: intent.client_secret,
            status: intent.status,
            amount: intent.amount,
            currency: intent.currency,
            application_fee_amount: intent.application_fee_amount,
            metadata: intent.metadata,
            description: intent.description,
            created: intent.created,
            payment_method_types: include_method_types.then_some(intent.payment_method_types),
        }
    }
}

/// Available-methods probe result.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailableMethodsResponse {
    pub currency: String,
    pub available_methods: Vec<String>,
    pub total_methods: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Transfer DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a direct transfer to a connected account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    /// Amount in minor units
    #[schema(example = 1000)]
    pub amount: i64,
    /// ISO currency code; defaults to usd
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub destination: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Checkout / payment link DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a hosted checkout session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    /// Amount in minor units; minimum 50
    #[schema(example = 2000)]
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub connected_account_id: String,
    /// Platform fee in minor units
    #[serde(default)]
    pub application_fee_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

/// Checkout session payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub message: String,
}

/// Request to create a shareable payment link.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentLinkRequest {
    /// Amount in minor units; minimum 50
    #[schema(example = 2000)]
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub connected_account_id: String,
    /// Platform fee in minor units; only used by the with-fee variant
    #[serde(default)]
    pub application_fee_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
}

/// Payment link payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLinkResponse {
    pub payment_link_id: String,
    pub url: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Request to create a payment intent for embedded card elements.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateElementsIntentRequest {
    /// Amount in minor units; minimum 50
    #[schema(example = 2000)]
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub connected_account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_fee_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

/// Elements intent payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElementsIntentResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub payment_intent_id: String,
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Webhook DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Acknowledgement returned for a verified webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
    pub event_id: String,
    pub event_type: String,
}
