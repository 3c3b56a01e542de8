//! Payments provider port.
//!
//! This is the primary port in our hexagonal architecture: the boundary to
//! the external payments API. The HTTP adapter implements it; tests inject
//! scripted fakes. Every method is one outbound call; the port performs no
//! retries and no compensation of its own.

use std::collections::BTreeMap;

use crate::domain::{
    MethodSet, ProviderAccount, ProviderAccountLink, ProviderBalance, ProviderCheckoutSession,
    ProviderEvent, ProviderList, ProviderPaymentIntent, ProviderPaymentLink, ProviderPrice,
    ProviderProduct, ProviderTransfer,
};
use crate::error::ProviderError;

/// How the provider should pick acceptable payment methods for an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSelection {
    /// An explicit ordered set, tried atomically as a whole.
    Explicit(MethodSet),
    /// Let the provider decide (`automatic_payment_methods[enabled]`).
    Automatic,
}

/// Parameters for creating a payment intent.
///
/// `confirm` is always false at this boundary: intents are confirmed by the
/// buyer-side client secret flow or an explicit confirm call.
#[derive(Debug, Clone)]
pub struct PaymentIntentParams {
    pub amount: i64,
    pub currency: String,
    /// Connected account receiving the funds; absent for probe intents.
    pub destination: Option<String>,
    pub application_fee_amount: Option<i64>,
    pub description: Option<String>,
    pub receipt_email: Option<String>,
    pub methods: MethodSelection,
    pub metadata: BTreeMap<String, String>,
}

/// Parameters for creating a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionParams {
    pub amount: i64,
    pub currency: String,
    pub destination: String,
    pub application_fee_amount: Option<i64>,
    pub success_url: String,
    pub cancel_url: String,
    pub product_name: String,
    pub customer_email: Option<String>,
    pub methods: MethodSet,
}

/// Parameters for creating a catalog product.
#[derive(Debug, Clone)]
pub struct ProductParams {
    pub name: String,
    pub description: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Parameters for creating a price.
#[derive(Debug, Clone)]
pub struct PriceParams {
    pub unit_amount: i64,
    pub currency: String,
    pub product: String,
}

/// Parameters for creating a payment link.
#[derive(Debug, Clone)]
pub struct PaymentLinkParams {
    pub price: String,
    pub quantity: u32,
    pub metadata: BTreeMap<String, String>,
}

/// The payments provider port.
///
/// `on_behalf_of`, where present, scopes the call to a connected account
/// instead of the platform account.
#[async_trait::async_trait]
pub trait PaymentsProvider: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────
    // Connected accounts
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a connected account with the given capabilities requested.
    async fn create_account(
        &self,
        email: &str,
        country: &str,
        account_type: &str,
        capabilities: &[&str],
    ) -> Result<ProviderAccount, ProviderError>;

    /// Retrieves a connected account.
    async fn retrieve_account(&self, account_id: &str) -> Result<ProviderAccount, ProviderError>;

    /// Lists connected accounts.
    async fn list_accounts(&self, limit: u32)
    -> Result<ProviderList<ProviderAccount>, ProviderError>;

    /// Creates an onboarding link for a connected account.
    async fn create_account_link(
        &self,
        account_id: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<ProviderAccountLink, ProviderError>;

    /// Retrieves the balance of a connected account.
    async fn retrieve_balance(&self, account_id: &str) -> Result<ProviderBalance, ProviderError>;

    // ─────────────────────────────────────────────────────────────────────────
    // Payment intents
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a payment intent. Not idempotent: each call creates a
    /// distinct provider-side object.
    async fn create_payment_intent(
        &self,
        params: PaymentIntentParams,
    ) -> Result<ProviderPaymentIntent, ProviderError>;

    /// Confirms a payment intent, optionally attaching a payment method.
    async fn confirm_payment_intent(
        &self,
        intent_id: &str,
        payment_method: Option<&str>,
    ) -> Result<ProviderPaymentIntent, ProviderError>;

    /// Cancels a payment intent.
    async fn cancel_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<ProviderPaymentIntent, ProviderError>;

    /// Retrieves a payment intent.
    async fn retrieve_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<ProviderPaymentIntent, ProviderError>;

    // ─────────────────────────────────────────────────────────────────────────
    // Transfers, checkout, payment links
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a direct transfer to a connected account.
    async fn create_transfer(
        &self,
        amount: i64,
        currency: &str,
        destination: &str,
    ) -> Result<ProviderTransfer, ProviderError>;

    /// Creates a hosted checkout session.
    async fn create_checkout_session(
        &self,
        params: CheckoutSessionParams,
    ) -> Result<ProviderCheckoutSession, ProviderError>;

    /// Creates a catalog product.
    async fn create_product(
        &self,
        params: ProductParams,
        on_behalf_of: Option<&str>,
    ) -> Result<ProviderProduct, ProviderError>;

    /// Creates a price for a product.
    async fn create_price(
        &self,
        params: PriceParams,
        on_behalf_of: Option<&str>,
    ) -> Result<ProviderPrice, ProviderError>;

    /// Creates a shareable payment link.
    async fn create_payment_link(
        &self,
        params: PaymentLinkParams,
        on_behalf_of: Option<&str>,
    ) -> Result<ProviderPaymentLink, ProviderError>;

    // ─────────────────────────────────────────────────────────────────────────
    // Webhooks
    // ─────────────────────────────────────────────────────────────────────────

    /// Verifies a webhook payload against its signature header and parses
    /// the event. Pure delegation to the provider's signing scheme.
    fn construct_webhook_event(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProviderEvent, ProviderError>;
}
