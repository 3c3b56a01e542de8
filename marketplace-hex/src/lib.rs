//! # Marketplace Hex
//!
//! Application service layer and HTTP adapter for the marketplace gateway.
//!
//! ## Architecture
//!
//! - `service/` - Application service (builds and submits provider requests)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi/` - OpenAPI document served under /docs
//!
//! The service is generic over `P: PaymentsProvider`, allowing the real
//! provider client or a scripted test double to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::ConnectService;
