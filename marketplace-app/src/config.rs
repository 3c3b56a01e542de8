//! Configuration loading from environment.

use std::env;

/// Value of the secret key shipped in the sample `.env`; starting the
/// server with it would make every provider call fail with an opaque
/// authentication error, so it is rejected at boot instead.
const PLACEHOLDER_SECRET_KEY: &str = "sk_test_dummy_key_for_development_only";

/// Application configuration.
pub struct Config {
    pub port: u16,
    /// Base URL of the frontend, used to build redirect URLs.
    pub app_url: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: Option<String>,
    /// Override of the Stripe API base URL (stripe-mock support).
    pub stripe_api_base: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        let app_url = env::var("APP_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let stripe_secret_key = env::var("STRIPE_SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("STRIPE_SECRET_KEY environment variable is required"))?;
        if is_placeholder_key(&stripe_secret_key) {
            anyhow::bail!(
                "STRIPE_SECRET_KEY is set to a placeholder value; configure a real key"
            );
        }

        let stripe_webhook_secret = env::var("STRIPE_WEBHOOK_SECRET").ok();
        let stripe_api_base = env::var("STRIPE_API_BASE").ok();

        Ok(Self {
            port,
            app_url,
            stripe_secret_key,
            stripe_webhook_secret,
            stripe_api_base,
        })
    }
}

fn is_placeholder_key(key: &str) -> bool {
    key == PLACEHOLDER_SECRET_KEY || key.contains("PLACEHOLDER")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_keys_are_rejected() {
        assert!(is_placeholder_key("sk_test_dummy_key_for_development_only"));
        assert!(is_placeholder_key("sk_test_PLACEHOLDER_123"));
        assert!(!is_placeholder_key("sk_test_51AbCdEf"));
    }
}
