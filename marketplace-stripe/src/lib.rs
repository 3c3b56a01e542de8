//! # Marketplace Stripe Adapter
//!
//! Outbound adapter implementing the [`PaymentsProvider`] port against the
//! Stripe REST API. Requests are form-encoded the way Stripe expects
//! (bracketed nested keys); responses deserialize into the provider shapes
//! from `marketplace-types`.
//!
//! [`PaymentsProvider`]: marketplace_types::PaymentsProvider

mod client;
pub mod webhook;

pub use client::StripeClient;
