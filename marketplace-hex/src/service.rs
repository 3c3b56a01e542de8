//! Marketplace Application Service
//!
//! Builds money-movement requests (fee split, per-currency method defaults,
//! the bounded MB Way retry plan) and submits them through the provider
//! port. Contains NO transport logic - pure request construction and
//! orchestration.

use std::collections::BTreeMap;

use marketplace_types::{
    AppError, ChargeSplit, CheckoutSessionParams, CreateAccountLinkRequest, CreateAccountRequest,
    CreateCheckoutSessionRequest, CreateElementsIntentRequest, CreateMbwayPaymentIntentRequest,
    CreatePaymentIntentRequest, CreatePaymentLinkRequest, CreateTransferRequest, DomainError,
    ErrorClass, MIN_CHARGE_AMOUNT, MethodSet, PROBE_AMOUNT, PROBE_METHODS, PaymentIntentParams,
    PaymentLinkParams, PaymentsProvider, PriceParams, ProductParams, ProviderAccount,
    ProviderAccountLink, ProviderBalance, ProviderCheckoutSession, ProviderError, ProviderEvent,
    ProviderList, ProviderPaymentIntent, ProviderPaymentLink, ProviderTransfer,
    default_method_set, dto::AccountType, mbway_retry_plan, ports::MethodSelection,
    requested_capabilities,
};

/// Application service for the marketplace gateway.
///
/// Generic over `P: PaymentsProvider` - the adapter is injected at compile
/// time. This enables:
/// - Swapping the provider client without code changes
/// - Testing the retry/policy logic against a scripted provider
/// - Compile-time checks for port implementation
pub struct ConnectService<P: PaymentsProvider> {
    provider: P,
}

impl<P: PaymentsProvider> ConnectService<P> {
    /// Creates a new service with the given provider adapter.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Returns a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Charge validation shared by every money-movement builder.
    /// Note: `fee <= amount` is deliberately NOT checked; a negative seller
    /// amount passes through for the provider to judge.
    fn validate_charge(amount: i64, fee: Option<i64>) -> Result<(), DomainError> {
        if amount < MIN_CHARGE_AMOUNT {
            return Err(DomainError::AmountBelowMinimum {
                amount,
                minimum: MIN_CHARGE_AMOUNT,
            });
        }
        if let Some(fee) = fee
            && fee < 0
        {
            return Err(DomainError::NegativeFee(fee));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Connected accounts
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a connected account, requesting card/transfer capabilities
    /// plus any country-specific local rail.
    pub async fn create_connect_account(
        &self,
        req: CreateAccountRequest,
    ) -> Result<ProviderAccount, AppError> {
        let country = req.country.unwrap_or_else(|| "US".to_string());
        let account_type = req.account_type.unwrap_or(AccountType::Express);
        let capabilities = requested_capabilities(&country);

        self.provider
            .create_account(&req.email, &country, account_type.as_str(), &capabilities)
            .await
            .map_err(|e| AppError::Provider(format!("Error creating Connect account: {e}")))
    }

    /// Retrieves a connected account.
    pub async fn get_account(&self, account_id: &str) -> Result<ProviderAccount, AppError> {
        self.provider
            .retrieve_account(account_id)
            .await
            .map_err(|e| AppError::Provider(format!("Error retrieving account: {e}")))
    }

    /// Lists connected accounts.
    pub async fn list_accounts(
        &self,
        limit: u32,
    ) -> Result<ProviderList<ProviderAccount>, AppError> {
        self.provider
            .list_accounts(limit)
            .await
            .map_err(|e| AppError::Provider(format!("Error listing accounts: {e}")))
    }

    /// Retrieves the balance of a connected account.
    pub async fn get_account_balance(&self, account_id: &str) -> Result<ProviderBalance, AppError> {
        self.provider
            .retrieve_balance(account_id)
            .await
            .map_err(|e| AppError::Provider(format!("Error retrieving account balance: {e}")))
    }

    /// Creates an onboarding link for a connected account.
    pub async fn create_account_link(
        &self,
        req: CreateAccountLinkRequest,
    ) -> Result<ProviderAccountLink, AppError> {
        self.provider
            .create_account_link(&req.account_id, &req.refresh_url, &req.return_url)
            .await
            .map_err(|e| AppError::Provider(format!("Error creating account link: {e}")))
    }

    /// Onboarding simulation: create an account with defaults and hand back
    /// its onboarding link.
    pub async fn simulate_flow(
        &self,
        email: &str,
        app_url: &str,
    ) -> Result<(ProviderAccount, ProviderAccountLink), AppError> {
        let account = self
            .create_connect_account(CreateAccountRequest {
                email: email.to_string(),
                country: None,
                account_type: None,
            })
            .await?;

        let link = self
            .create_account_link(CreateAccountLinkRequest {
                account_id: account.id.clone(),
                refresh_url: format!("{app_url}/refresh"),
                return_url: format!("{app_url}/return"),
            })
            .await?;

        Ok((account, link))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payment intents
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a payment intent routed to a connected account.
    ///
    /// Method selection: the caller's explicit list wins; otherwise the
    /// per-currency policy table supplies the default set.
    pub async fn create_payment_intent(
        &self,
        req: CreatePaymentIntentRequest,
    ) -> Result<ProviderPaymentIntent, AppError> {
        Self::validate_charge(req.amount, req.application_fee_amount)?;

        let currency = req.currency.unwrap_or_else(|| "usd".to_string());
        let methods = match req.payment_methods {
            Some(ids) => MethodSet::new(ids)?,
            None => default_method_set(&currency),
        };
        let split = ChargeSplit::new(req.amount, req.application_fee_amount);

        let mut metadata = BTreeMap::new();
        metadata.insert(
            "connected_account".to_string(),
            req.connected_account_id.clone(),
        );
        for (key, value) in split.metadata_entries() {
            metadata.insert(key.to_string(), value);
        }

        let params = PaymentIntentParams {
            amount: split.amount(),
            currency,
            destination: Some(req.connected_account_id),
            application_fee_amount: split.application_fee(),
            description: req.description,
            receipt_email: req.customer_email,
            methods: MethodSelection::Explicit(methods),
            metadata,
        };

        self.provider
            .create_payment_intent(params)
            .await
            .map_err(|e| AppError::Provider(format!("Error creating payment intent: {e}")))
    }

    /// Creates a EUR payment intent for the Portugal flow, retrying across a
    /// narrowing sequence of method sets.
    ///
    /// At most three attempts, strictly sequential. A failure classified as
    /// [`ErrorClass::MethodUnavailable`] advances to the next set; a fatal
    /// failure stops immediately. Exhaustion surfaces the LAST error. Failed
    /// attempts may leave draft objects behind; no compensation is attempted.
    pub async fn create_mbway_payment_intent(
        &self,
        req: CreateMbwayPaymentIntentRequest,
    ) -> Result<ProviderPaymentIntent, AppError> {
        Self::validate_charge(req.amount, req.application_fee_amount)?;

        let split = ChargeSplit::new(req.amount, req.application_fee_amount);
        let mut last_error: Option<ProviderError> = None;

        for methods in mbway_retry_plan() {
            let mut metadata = BTreeMap::new();
            metadata.insert(
                "connected_account".to_string(),
                req.connected_account_id.clone(),
            );
            for (key, value) in split.metadata_entries() {
                metadata.insert(key.to_string(), value);
            }
            metadata.insert("payment_methods_tried".to_string(), methods.joined());
            if let Some(phone) = &req.customer_phone {
                metadata.insert("customer_phone".to_string(), phone.clone());
            }

            let params = PaymentIntentParams {
                amount: split.amount(),
                currency: "eur".to_string(),
                destination: Some(req.connected_account_id.clone()),
                application_fee_amount: split.application_fee(),
                description: req.description.clone(),
                receipt_email: req.customer_email.clone(),
                methods: MethodSelection::Explicit(methods.clone()),
                metadata,
            };

            match self.provider.create_payment_intent(params).await {
                Ok(intent) => {
                    tracing::info!(methods = %methods, "payment intent created");
                    return Ok(intent);
                }
                Err(err) => {
                    tracing::warn!(methods = %methods, error = %err, "attempt failed");
                    let class = ErrorClass::of(&err);
                    last_error = Some(err);
                    match class {
                        ErrorClass::MethodUnavailable => continue,
                        ErrorClass::Fatal => break,
                    }
                }
            }
        }

        let last = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        Err(AppError::Provider(format!(
            "Error creating Portugal payment intent. Last error: {last}"
        )))
    }

    /// Confirms a payment intent, optionally attaching a payment method.
    pub async fn confirm_payment_intent(
        &self,
        intent_id: &str,
        payment_method: Option<&str>,
    ) -> Result<ProviderPaymentIntent, AppError> {
        self.provider
            .confirm_payment_intent(intent_id, payment_method)
            .await
            .map_err(|e| AppError::Provider(format!("Error confirming payment intent: {e}")))
    }

    /// Cancels a payment intent.
    pub async fn cancel_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<ProviderPaymentIntent, AppError> {
        self.provider
            .cancel_payment_intent(intent_id)
            .await
            .map_err(|e| AppError::Provider(format!("Error canceling payment intent: {e}")))
    }

    /// Retrieves a payment intent.
    pub async fn get_payment_intent(
        &self,
        intent_id: &str,
    ) -> Result<ProviderPaymentIntent, AppError> {
        self.provider
            .retrieve_payment_intent(intent_id)
            .await
            .map_err(|e| AppError::Provider(format!("Error retrieving payment intent: {e}")))
    }

    /// Probes which payment methods the platform account can actually use
    /// for a currency, by creating and immediately cancelling a minimal
    /// intent per candidate method. Probes are sequential; a method counts
    /// as available only if both calls succeed.
    pub async fn available_payment_methods(&self, currency: &str) -> Vec<String> {
        let mut available = Vec::new();

        for method in PROBE_METHODS {
            let params = PaymentIntentParams {
                amount: PROBE_AMOUNT,
                currency: currency.to_string(),
                destination: None,
                application_fee_amount: None,
                description: None,
                receipt_email: None,
                methods: MethodSelection::Explicit(MethodSet::single(method)),
                metadata: BTreeMap::new(),
            };

            let intent = match self.provider.create_payment_intent(params).await {
                Ok(intent) => intent,
                Err(err) => {
                    tracing::debug!(method, error = %err, "probe rejected");
                    continue;
                }
            };

            // Clean up the probe object before reporting the method usable.
            match self.provider.cancel_payment_intent(&intent.id).await {
                Ok(_) => available.push(method.to_string()),
                Err(err) => {
                    tracing::debug!(method, error = %err, "probe cleanup failed");
                }
            }
        }

        available
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transfers
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a direct transfer to a connected account.
    pub async fn create_transfer(
        &self,
        req: CreateTransferRequest,
    ) -> Result<ProviderTransfer, AppError> {
        let currency = req.currency.unwrap_or_else(|| "usd".to_string());
        self.provider
            .create_transfer(req.amount, &currency, &req.destination)
            .await
            .map_err(|e| AppError::Provider(format!("Error creating transfer: {e}")))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Checkout sessions and payment links
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a hosted checkout session routing funds to a connected
    /// account net of the platform fee.
    pub async fn create_checkout_session(
        &self,
        req: CreateCheckoutSessionRequest,
        success_url: String,
        cancel_url: String,
    ) -> Result<ProviderCheckoutSession, AppError> {
        Self::validate_charge(req.amount, Some(req.application_fee_amount))?;

        let params = CheckoutSessionParams {
            amount: req.amount,
            currency: req.currency.unwrap_or_else(|| "usd".to_string()),
            destination: req.connected_account_id,
            application_fee_amount: Some(req.application_fee_amount),
            success_url,
            cancel_url,
            product_name: req.product_name.unwrap_or_else(|| "Product".to_string()),
            customer_email: req.customer_email,
            methods: MethodSet::from_slice(&["card", "multibanco"]),
        };

        self.provider
            .create_checkout_session(params)
            .await
            .map_err(|e| AppError::Provider(format!("Error creating checkout session: {e}")))
    }

    /// Creates a payment link directly on the connected account: the seller
    /// receives the full amount, no platform fee is taken.
    pub async fn create_payment_link_direct(
        &self,
        req: CreatePaymentLinkRequest,
    ) -> Result<ProviderPaymentLink, AppError> {
        Self::validate_charge(req.amount, None)?;

        let currency = req.currency.unwrap_or_else(|| "usd".to_string());
        let connected = req.connected_account_id;

        let product = self
            .provider
            .create_product(
                ProductParams {
                    name: req.product_name.unwrap_or_else(|| "Product".to_string()),
                    description: req.product_description,
                    metadata: BTreeMap::new(),
                },
                Some(&connected),
            )
            .await
            .map_err(|e| AppError::Provider(format!("Error creating direct payment link: {e}")))?;

        let price = self
            .provider
            .create_price(
                PriceParams {
                    unit_amount: req.amount,
                    currency,
                    product: product.id,
                },
                Some(&connected),
            )
            .await
            .map_err(|e| AppError::Provider(format!("Error creating direct payment link: {e}")))?;

        self.provider
            .create_payment_link(
                PaymentLinkParams {
                    price: price.id,
                    quantity: 1,
                    metadata: BTreeMap::new(),
                },
                Some(&connected),
            )
            .await
            .map_err(|e| AppError::Provider(format!("Error creating direct payment link: {e}")))
    }

    /// Creates a payment link on the platform account, recording the fee
    /// split in metadata. Funds land on the platform first and must be
    /// forwarded to the seller separately.
    pub async fn create_payment_link_with_fee(
        &self,
        req: CreatePaymentLinkRequest,
    ) -> Result<ProviderPaymentLink, AppError> {
        Self::validate_charge(req.amount, Some(req.application_fee_amount))?;

        let currency = req.currency.unwrap_or_else(|| "usd".to_string());
        let connected = req.connected_account_id;
        let split = ChargeSplit::new(req.amount, Some(req.application_fee_amount));

        let mut product_metadata = BTreeMap::new();
        product_metadata.insert("connected_account".to_string(), connected.clone());
        product_metadata.insert(
            "application_fee_amount".to_string(),
            split.platform_fee().to_string(),
        );
        product_metadata.insert("payment_type".to_string(), "connect_payment".to_string());

        let product = self
            .provider
            .create_product(
                ProductParams {
                    name: req.product_name.unwrap_or_else(|| "Product".to_string()),
                    description: req.product_description,
                    metadata: product_metadata,
                },
                None,
            )
            .await
            .map_err(|e| AppError::Provider(format!("Error creating payment link: {e}")))?;

        let price = self
            .provider
            .create_price(
                PriceParams {
                    unit_amount: split.amount(),
                    currency,
                    product: product.id,
                },
                None,
            )
            .await
            .map_err(|e| AppError::Provider(format!("Error creating payment link: {e}")))?;

        let mut link_metadata = BTreeMap::new();
        link_metadata.insert("connected_account".to_string(), connected);
        link_metadata.insert(
            "application_fee_amount".to_string(),
            split.platform_fee().to_string(),
        );
        link_metadata.insert(
            "transfer_amount".to_string(),
            split.seller_amount().to_string(),
        );

        self.provider
            .create_payment_link(
                PaymentLinkParams {
                    price: price.id,
                    quantity: 1,
                    metadata: link_metadata,
                },
                None,
            )
            .await
            .map_err(|e| AppError::Provider(format!("Error creating payment link: {e}")))
    }

    /// Creates a payment intent for embedded elements, letting the provider
    /// pick acceptable methods automatically.
    pub async fn create_elements_intent(
        &self,
        req: CreateElementsIntentRequest,
    ) -> Result<ProviderPaymentIntent, AppError> {
        Self::validate_charge(req.amount, req.application_fee_amount)?;

        let split = ChargeSplit::new(req.amount, req.application_fee_amount);
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "connected_account".to_string(),
            req.connected_account_id.clone(),
        );

        let params = PaymentIntentParams {
            amount: split.amount(),
            currency: req.currency.unwrap_or_else(|| "usd".to_string()),
            destination: Some(req.connected_account_id),
            application_fee_amount: split.application_fee(),
            description: None,
            receipt_email: req.customer_email,
            methods: MethodSelection::Automatic,
            metadata,
        };

        self.provider.create_payment_intent(params).await.map_err(|e| {
            AppError::Provider(format!("Error creating payment intent for elements: {e}"))
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Webhooks
    // ─────────────────────────────────────────────────────────────────────────

    /// Verifies and parses a webhook delivery.
    pub fn construct_webhook_event(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProviderEvent, AppError> {
        self.provider
            .construct_webhook_event(payload, signature)
            .map_err(|e| AppError::Provider(format!("Webhook signature verification failed: {e}")))
    }
}
