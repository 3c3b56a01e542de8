//! Pure domain types: payment-method policy, fee arithmetic, and the
//! serde shapes of provider-side objects.

mod charge;
mod methods;
mod provider;

pub use charge::ChargeSplit;
pub use methods::{
    MIN_CHARGE_AMOUNT, MethodSet, PROBE_AMOUNT, PROBE_METHODS, default_method_set,
    mbway_retry_plan, requested_capabilities,
};
pub use provider::{
    ProviderAccount, ProviderAccountLink, ProviderBalance, ProviderBalanceFunds,
    ProviderCheckoutSession, ProviderEvent, ProviderEventData, ProviderList, ProviderPaymentIntent,
    ProviderPaymentLink, ProviderPrice, ProviderProduct, ProviderTransfer,
};
