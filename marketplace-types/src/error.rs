//! Error types for the marketplace gateway.

/// Domain-level errors (request-building rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Payment method list cannot be empty")]
    EmptyMethodSet,

    #[error("Amount must be at least {minimum} (got {amount})")]
    AmountBelowMinimum { amount: i64, minimum: i64 },

    #[error("Application fee cannot be negative (got {0})")]
    NegativeFee(i64),
}

/// Errors surfaced by the payments provider boundary.
///
/// `Api` carries the provider's human-readable message verbatim; the
/// retry logic classifies failures by that text (see [`ErrorClass`]).
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("signature verification failed: {0}")]
    Signature(String),
}

/// Classification of a provider failure for the bounded retry loop.
///
/// The provider does not expose a structured "unsupported payment method"
/// code through this boundary, so classification falls back to matching
/// the message text. That fragility is confined to this one function; the
/// retry loop only ever inspects the returned tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The method set was rejected; retrying with a narrower set may work.
    MethodUnavailable,
    /// Unrelated to method choice (auth, account, amount); never retried.
    Fatal,
}

impl ErrorClass {
    /// Classifies a provider error by its message text (case-insensitive).
    pub fn of(err: &ProviderError) -> Self {
        let message = err.to_string().to_lowercase();
        if message.contains("payment method") || message.contains("invalid") {
            ErrorClass::MethodUnavailable
        } else {
            ErrorClass::Fatal
        }
    }
}

/// Application-level errors, converted to the failure envelope at the
/// HTTP boundary. Nothing propagates past the handlers unhandled.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Provider(String),

    #[error("{0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(message: &str) -> ProviderError {
        ProviderError::Api {
            status: 400,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_classifies_method_rejections_as_recoverable() {
        let err = api("The payment method type \"mb_way\" is invalid");
        assert_eq!(ErrorClass::of(&err), ErrorClass::MethodUnavailable);

        let err = api("Invalid payment_method_types: multibanco");
        assert_eq!(ErrorClass::of(&err), ErrorClass::MethodUnavailable);
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        let err = api("INVALID REQUEST");
        assert_eq!(ErrorClass::of(&err), ErrorClass::MethodUnavailable);
    }

    #[test]
    fn test_classifies_other_failures_as_fatal() {
        let err = api("No such destination account: acct_123");
        assert_eq!(ErrorClass::of(&err), ErrorClass::Fatal);

        let err = api("Authentication required");
        assert_eq!(ErrorClass::of(&err), ErrorClass::Fatal);
    }

    #[test]
    fn test_transport_errors_are_classified_too() {
        // Classification looks at the rendered message regardless of variant.
        let err = ProviderError::Transport("connection reset".to_string());
        assert_eq!(ErrorClass::of(&err), ErrorClass::Fatal);
    }

    #[test]
    fn test_domain_error_maps_to_bad_request() {
        let err: AppError = DomainError::EmptyMethodSet.into();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
