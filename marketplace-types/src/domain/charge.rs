//! Fee/amount split for a marketplace charge.

use serde::{Deserialize, Serialize};

/// The split of a charge between the platform and the seller.
///
/// Amounts are in minor units (cents) and are never rounded. The fee is
/// deliberately NOT validated against the amount: a fee larger than the
/// amount yields a negative seller amount which is forwarded to the
/// provider uncorrected, matching the behavior this gateway fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeSplit {
    amount: i64,
    platform_fee: i64,
}

impl ChargeSplit {
    /// Creates a split. A missing fee defaults to 0.
    pub fn new(amount: i64, platform_fee: Option<i64>) -> Self {
        Self {
            amount,
            platform_fee: platform_fee.unwrap_or(0),
        }
    }

    /// Total amount charged to the buyer, in minor units.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Portion retained by the platform, in minor units.
    pub fn platform_fee(&self) -> i64 {
        self.platform_fee
    }

    /// The seller's net receipt: `amount - fee`. May be negative.
    pub fn seller_amount(&self) -> i64 {
        self.amount - self.platform_fee
    }

    /// Fee to send to the provider: only present when non-zero.
    pub fn application_fee(&self) -> Option<i64> {
        (self.platform_fee != 0).then_some(self.platform_fee)
    }

    /// Metadata entries recorded on outbound requests for audit/display.
    /// Opaque strings; they do not affect provider-side settlement.
    pub fn metadata_entries(&self) -> [(&'static str, String); 2] {
        [
            ("platform_fee", self.platform_fee.to_string()),
            ("seller_amount", self.seller_amount().to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seller_amount() {
        let split = ChargeSplit::new(2000, Some(200));
        assert_eq!(split.seller_amount(), 1800);
    }

    #[test]
    fn test_missing_fee_defaults_to_zero() {
        let split = ChargeSplit::new(1000, None);
        assert_eq!(split.platform_fee(), 0);
        assert_eq!(split.seller_amount(), 1000);
        assert_eq!(split.application_fee(), None);
    }

    #[test]
    fn test_zero_fee_is_omitted_from_request() {
        let split = ChargeSplit::new(1000, Some(0));
        assert_eq!(split.application_fee(), None);
    }

    #[test]
    fn test_fee_larger_than_amount_passes_through() {
        // Not validated here: the provider is left to reject it.
        let split = ChargeSplit::new(100, Some(150));
        assert_eq!(split.seller_amount(), -50);
        assert_eq!(split.application_fee(), Some(150));
    }

    #[test]
    fn test_seller_amount_never_negative_when_fee_within_amount() {
        for (amount, fee) in [(50, 0), (50, 50), (2000, 200), (1_000_000, 999_999)] {
            let split = ChargeSplit::new(amount, Some(fee));
            assert_eq!(split.seller_amount(), amount - fee);
            assert!(split.seller_amount() >= 0);
        }
    }

    #[test]
    fn test_metadata_entries() {
        let split = ChargeSplit::new(2000, Some(200));
        let entries = split.metadata_entries();
        assert_eq!(entries[0], ("platform_fee", "200".to_string()));
        assert_eq!(entries[1], ("seller_amount", "1800".to_string()));
    }
}
