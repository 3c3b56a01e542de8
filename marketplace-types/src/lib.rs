//! # Marketplace Types
//!
//! Domain types and port traits for the marketplace payment gateway.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (MethodSet, ChargeSplit, provider objects)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain, provider, and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    ChargeSplit, MethodSet, MIN_CHARGE_AMOUNT, PROBE_AMOUNT, PROBE_METHODS, ProviderAccount,
    ProviderAccountLink, ProviderBalance, ProviderCheckoutSession, ProviderEvent, ProviderList,
    ProviderPaymentIntent, ProviderPaymentLink, ProviderPrice, ProviderProduct, ProviderTransfer,
    default_method_set, mbway_retry_plan, requested_capabilities,
};
pub use dto::*;
pub use error::{AppError, DomainError, ErrorClass, ProviderError};
pub use ports::{
    CheckoutSessionParams, MethodSelection, PaymentIntentParams, PaymentLinkParams,
    PaymentsProvider, PriceParams, ProductParams,
};
