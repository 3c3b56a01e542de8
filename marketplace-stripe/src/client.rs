//! Stripe REST client implementing the payments provider port.

use reqwest::Method;
use serde::de::DeserializeOwned;

use marketplace_types::{
    CheckoutSessionParams, MethodSelection, PaymentIntentParams, PaymentLinkParams,
    PaymentsProvider, PriceParams, ProductParams, ProviderAccount, ProviderAccountLink,
    ProviderBalance, ProviderCheckoutSession, ProviderError, ProviderEvent, ProviderList,
    ProviderPaymentIntent, ProviderPaymentLink, ProviderPrice, ProviderProduct, ProviderTransfer,
};

use crate::webhook;

const DEFAULT_API_BASE: &str = "https://api.stripe.com/v1";
const API_VERSION: &str = "2025-09-30.clover";

/// Stripe API client.
///
/// One instance is shared across the whole application; `reqwest::Client`
/// pools connections internally.
pub struct StripeClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
    webhook_secret: Option<String>,
}

impl StripeClient {
    /// Creates a client against the live Stripe API.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            secret_key: secret_key.into(),
            webhook_secret: None,
        }
    }

    /// Sets the webhook signing secret used to verify deliveries.
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }

    /// Overrides the API base URL (used by tests and stripe-mock).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        on_behalf_of: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.api_base, path))
            .bearer_auth(&self.secret_key)
            .header("Stripe-Version", API_VERSION);
        if let Some(account) = on_behalf_of {
            req = req.header("Stripe-Account", account);
        }
        req
    }

    async fn send<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, ProviderError> {
        let resp = req
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "stripe request failed");
            return Err(decode_api_error(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Vec<(String, String)>,
        on_behalf_of: Option<&str>,
    ) -> Result<T, ProviderError> {
        self.send(self.request(Method::POST, path, on_behalf_of).form(&params))
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        on_behalf_of: Option<&str>,
    ) -> Result<T, ProviderError> {
        self.send(self.request(Method::GET, path, on_behalf_of))
            .await
    }
}

/// Extracts `error.message` from a Stripe error body.
fn decode_api_error(status: u16, body: &str) -> ProviderError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| format!("HTTP {status}"));
    ProviderError::Api { status, message }
}

// Form builders. Stripe takes nested structures as bracketed keys in a
// urlencoded body, so every request body is a flat Vec of pairs.

fn push_metadata(form: &mut Vec<(String, String)>, metadata: &std::collections::BTreeMap<String, String>) {
    for (key, value) in metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }
}

fn account_form(
    email: &str,
    country: &str,
    account_type: &str,
    capabilities: &[&str],
) -> Vec<(String, String)> {
    let mut form = vec![
        ("type".to_string(), account_type.to_string()),
        ("country".to_string(), country.to_string()),
        ("email".to_string(), email.to_string()),
    ];
    for capability in capabilities {
        form.push((format!("capabilities[{capability}][requested]"), "true".to_string()));
    }
    form
}

fn intent_form(params: &PaymentIntentParams) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_string(), params.amount.to_string()),
        ("currency".to_string(), params.currency.clone()),
    ];

    match &params.methods {
        MethodSelection::Explicit(set) => {
            for (i, method) in set.ids().iter().enumerate() {
                form.push((format!("payment_method_types[{i}]"), method.clone()));
            }
        }
        MethodSelection::Automatic => {
            form.push((
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ));
        }
    }

    if let Some(destination) = &params.destination {
        form.push(("transfer_data[destination]".to_string(), destination.clone()));
    }
    if let Some(fee) = params.application_fee_amount {
        form.push(("application_fee_amount".to_string(), fee.to_string()));
    }
    if let Some(description) = &params.description {
        form.push(("description".to_string(), description.clone()));
    }
    if let Some(email) = &params.receipt_email {
        form.push(("receipt_email".to_string(), email.clone()));
    }
    push_metadata(&mut form, &params.metadata);
    form
}

fn checkout_form(params: &CheckoutSessionParams) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), params.success_url.clone()),
        ("cancel_url".to_string(), params.cancel_url.clone()),
        (
            "line_items[0][price_data][currency]".to_string(),
            params.currency.clone(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            params.product_name.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            params.amount.to_string(),
        ),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        (
            "payment_intent_data[transfer_data][destination]".to_string(),
            params.destination.clone(),
        ),
    ];

    for (i, method) in params.methods.ids().iter().enumerate() {
        form.push((format!("payment_method_types[{i}]"), method.clone()));
    }
    if let Some(fee) = params.application_fee_amount {
        form.push((
            "payment_intent_data[application_fee_amount]".to_string(),
            fee.to_string(),
        ));
    }
    if let Some(email) = &params.customer_email {
        form.push(("customer_email".to_string(), email.clone()));
    }
    form
}

fn product_form(params: &ProductParams) -> Vec<(String, String)> {
    let mut form = vec![("name".to_string(), params.name.clone())];
    if let Some(description) = &params.description {
        form.push(("description".to_string(), description.clone()));
    }
    push_metadata(&mut form, &params.metadata);
    form
}

fn price_form(params: &PriceParams) -> Vec<(String, String)> {
    vec![
        ("unit_amount".to_string(), params.unit_amount.to_string()),
        ("currency".to_string(), params.currency.clone()),
        ("product".to_string(), params.product.clone()),
    ]
}

fn payment_link_form(params: &PaymentLinkParams) -> Vec<(String, String)> {
    let mut form = vec![
        ("line_items[0][price]".to_string(), params.price.clone()),
        (
            "line_items[0][quantity]".to_string(),
            params.quantity.to_string(),
        ),
    ];
    push_metadata(&mut form, &params.metadata);
    form
}

#[async_trait::async_trait]
impl PaymentsProvider for StripeClient {
    async fn create_account(
        &self,
        email: &str,
        country: &str,
        account_type: &str,
        capabilities: &[&str],
    ) -> Result<ProviderAccount, ProviderError> {
        let form = account_form(email, country, account_type, capabilities);
        self.post_form("/accounts", form, None).await
    }

    async fn retrieve_account(&self, account_id: &str) -> Result<ProviderAccount, ProviderError> {
        self.get_json(&format!("/accounts/{account_id}"), None).await
    }

    async fn list_accounts(
        &self,
        limit: u32,
    ) -> Result<ProviderList<ProviderAccount>, ProviderError> {
        self.get_json(&format!("/accounts?limit={limit}"), None)
            .await
    }

    async fn create_account_link(
        &self,
        account_id: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<ProviderAccountLink, ProviderError> {
        let form = vec![
            ("account".to_string(), account_id.to_string()),
            ("refresh_url".to_string(), refresh_url.to_string()),
            ("return_url".to_string(), return_url.to_string()),
            ("type".to_string(), "account_onboarding".to_string()),
        ];
        self.post_form("/account_links", form, None).await
    }

    async fn retrieve_balance(&self, account_id: &str) -> Result<ProviderBalance, ProviderError> {
        // Balance is scoped by the Stripe-Account header, not the path.
        self.get_json("/balance", Some(account_id)).await
    }

    async fn create_payment_intent(
        &self,
        params: PaymentIntentParams,
    ) -> Result<ProviderPaymentIntent, ProviderError> {
        let form = intent_form(&params);
        self.post_form("/payment_intents", form, None).await
    }

    async fn confirm_payment_intent(
        &self,
        intent_id: &str,
        payment_method: Option<&str>,
    ) -> Result<ProviderPaymentIntent, ProviderError> {
        let mut form = Vec::new();
        if let Some(method) = payment_method {
            form.push(("payment_method".to_string(), method.to_string()));
        }
        self.post_form(&format!("/payment_intents/{intent_id}/confirm"), form, None)
            .await
    }

    async fn cancel_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<ProviderPaymentIntent, ProviderError> {
        self.post_form(&format!("/payment_intents/{intent_id}/cancel"), vec![], None)
            .await
    }

    async fn retrieve_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<ProviderPaymentIntent, ProviderError> {
        self.get_json(&format!("/payment_intents/{intent_id}"), None)
            .await
    }

    async fn create_transfer(
        &self,
        amount: i64,
        currency: &str,
        destination: &str,
    ) -> Result<ProviderTransfer, ProviderError> {
        let form = vec![
            ("amount".to_string(), amount.to_string()),
            ("currency".to_string(), currency.to_string()),
            ("destination".to_string(), destination.to_string()),
        ];
        self.post_form("/transfers", form, None).await
    }

    async fn create_checkout_session(
        &self,
        params: CheckoutSessionParams,
    ) -> Result<ProviderCheckoutSession, ProviderError> {
        let form = checkout_form(&params);
        self.post_form("/checkout/sessions", form, None).await
    }

    async fn create_product(
        &self,
        params: ProductParams,
        on_behalf_of: Option<&str>,
    ) -> Result<ProviderProduct, ProviderError> {
        let form = product_form(&params);
        self.post_form("/products", form, on_behalf_of).await
    }

    async fn create_price(
        &self,
        params: PriceParams,
        on_behalf_of: Option<&str>,
    ) -> Result<ProviderPrice, ProviderError> {
        let form = price_form(&params);
        self.post_form("/prices", form, on_behalf_of).await
    }

    async fn create_payment_link(
        &self,
        params: PaymentLinkParams,
        on_behalf_of: Option<&str>,
    ) -> Result<ProviderPaymentLink, ProviderError> {
        let form = payment_link_form(&params);
        self.post_form("/payment_links", form, on_behalf_of).await
    }

    fn construct_webhook_event(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProviderEvent, ProviderError> {
        let secret = self
            .webhook_secret
            .as_deref()
            .ok_or_else(|| ProviderError::Signature("webhook secret not configured".to_string()))?;
        webhook::construct_event(payload, signature, secret)
    }
}
