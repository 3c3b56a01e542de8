//! Payment-method sets and the currency/country policy tables.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Smallest charge the provider accepts, in minor units.
pub const MIN_CHARGE_AMOUNT: i64 = 50;

/// Amount used for method-availability probe intents, in minor units.
pub const PROBE_AMOUNT: i64 = 100;

/// Methods exercised by the availability probe, in probing order.
pub const PROBE_METHODS: &[&str] = &[
    "card",
    "multibanco",
    "mb_way",
    "sepa_debit",
    "bancontact",
    "ideal",
];

/// An ordered, non-empty set of payment-method identifiers.
///
/// A set is tried atomically: one provider request carries the whole set,
/// and a rejection of any member fails the request as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct MethodSet(Vec<String>);

impl MethodSet {
    /// Creates a method set. Fails if `ids` is empty.
    pub fn new(ids: Vec<String>) -> Result<Self, DomainError> {
        if ids.is_empty() {
            return Err(DomainError::EmptyMethodSet);
        }
        Ok(Self(ids))
    }

    /// Convenience constructor for static method lists.
    pub fn from_slice(ids: &[&str]) -> Self {
        Self(ids.iter().map(|s| s.to_string()).collect())
    }

    /// Single-method set.
    pub fn single(id: &str) -> Self {
        Self(vec![id.to_string()])
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|m| m == id)
    }

    /// Comma-joined representation used in request metadata.
    pub fn joined(&self) -> String {
        self.0.join(",")
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

/// Default method set for a currency when the caller supplies none.
///
/// Case-insensitive exact match; unknown currencies fall back to card only.
/// Total function: the result is always non-empty and always includes card.
pub fn default_method_set(currency: &str) -> MethodSet {
    match currency.to_lowercase().as_str() {
        "eur" => MethodSet::from_slice(&["card", "multibanco", "mb_way", "sepa_debit"]),
        "brl" => MethodSet::from_slice(&["card", "pix"]),
        "mxn" => MethodSet::from_slice(&["card", "oxxo"]),
        _ => MethodSet::single("card"),
    }
}

/// The fixed retry plan for the Portugal (MB Way) flow: widest set first,
/// narrowing down to card only. Consumed left to right, at most once each.
pub fn mbway_retry_plan() -> Vec<MethodSet> {
    vec![
        MethodSet::from_slice(&["card", "multibanco", "mb_way"]),
        MethodSet::from_slice(&["card", "multibanco"]),
        MethodSet::single("card"),
    ]
}

/// Capabilities requested when onboarding a connected account.
///
/// Every account gets card payments and transfers; some countries add a
/// local rail. Country match is case-insensitive.
pub fn requested_capabilities(country: &str) -> Vec<&'static str> {
    let mut capabilities = vec!["card_payments", "transfers"];
    match country.to_lowercase().as_str() {
        "br" => capabilities.push("pix_payments"),
        "mx" => capabilities.push("oxxo_payments"),
        "my" => capabilities.push("fpx_payments"),
        _ => {}
    }
    capabilities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_set_rejects_empty() {
        let result = MethodSet::new(vec![]);
        assert!(matches!(result, Err(DomainError::EmptyMethodSet)));
    }

    #[test]
    fn test_method_set_joined() {
        let set = MethodSet::from_slice(&["card", "multibanco", "mb_way"]);
        assert_eq!(set.joined(), "card,multibanco,mb_way");
    }

    #[test]
    fn test_default_method_set_eur() {
        let set = default_method_set("eur");
        assert_eq!(set.ids(), &["card", "multibanco", "mb_way", "sepa_debit"]);
    }

    #[test]
    fn test_default_method_set_case_insensitive() {
        assert_eq!(default_method_set("EUR"), default_method_set("eur"));
        assert_eq!(default_method_set("Brl"), default_method_set("brl"));
    }

    #[test]
    fn test_default_method_set_regional_rails() {
        assert_eq!(default_method_set("brl").ids(), &["card", "pix"]);
        assert_eq!(default_method_set("mxn").ids(), &["card", "oxxo"]);
        assert_eq!(default_method_set("usd").ids(), &["card"]);
    }

    #[test]
    fn test_default_method_set_unknown_currency_is_card_only() {
        let set = default_method_set("xyz");
        assert_eq!(set.ids(), &["card"]);
    }

    #[test]
    fn test_default_method_set_always_contains_card() {
        for currency in ["usd", "eur", "brl", "mxn", "gbp", "jpy", ""] {
            assert!(default_method_set(currency).contains("card"));
        }
    }

    #[test]
    fn test_mbway_retry_plan_narrows_to_card() {
        let plan = mbway_retry_plan();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].ids(), &["card", "multibanco", "mb_way"]);
        assert_eq!(plan[1].ids(), &["card", "multibanco"]);
        assert_eq!(plan[2].ids(), &["card"]);
    }

    #[test]
    fn test_requested_capabilities() {
        assert_eq!(requested_capabilities("US"), vec!["card_payments", "transfers"]);
        assert_eq!(
            requested_capabilities("BR"),
            vec!["card_payments", "transfers", "pix_payments"]
        );
        assert_eq!(
            requested_capabilities("mx"),
            vec!["card_payments", "transfers", "oxxo_payments"]
        );
        assert_eq!(
            requested_capabilities("MY"),
            vec!["card_payments", "transfers", "fpx_payments"]
        );
    }
}
