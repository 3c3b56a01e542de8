//! Client example demonstrating marketplace flows against a running server.
//!
//! Start the server first (`cargo run -p marketplace-app`), then:
//! `MARKETPLACE_API_URL=http://localhost:3000 cargo run -p marketplace-app --example client_example`
//!
//! Creating accounts and intents hits the Stripe test-mode API through the
//! server, so the server needs a valid test secret key.

use marketplace_client::MarketplaceClient;
use marketplace_types::CreatePaymentIntentRequest;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let base_url = std::env::var("MARKETPLACE_API_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    let client = MarketplaceClient::new(&base_url);

    // Health check
    let healthy = client.health().await?;
    println!("✅ Server health: {healthy}");

    // Onboard a seller
    let flow = client.simulate_flow("seller@example.com", 2000).await?;
    println!(
        "✅ Created account {}, onboarding at {}",
        flow.account.id, flow.onboarding_url
    );
    for step in &flow.instructions {
        println!("   {step}");
    }

    // Probe which payment methods the platform can use for EUR
    let methods = client.available_payment_methods("eur").await?;
    println!(
        "✅ {} methods available for eur: {}",
        methods.total_methods,
        methods.available_methods.join(", ")
    );

    // Create a payment intent with a 10% platform fee
    let intent = client
        .create_payment_intent(&CreatePaymentIntentRequest {
            amount: 2000,
            currency: Some("eur".to_string()),
            connected_account_id: flow.account.id.clone(),
            application_fee_amount: Some(200),
            description: Some("Example order".to_string()),
            customer_email: None,
            payment_methods: None,
        })
        .await?;
    println!(
        "✅ Payment intent {} created for €{:.2} (fee €{:.2})",
        intent.id,
        intent.amount as f64 / 100.0,
        intent.application_fee_amount.unwrap_or(0) as f64 / 100.0
    );

    // Clean up the example intent
    let cancelled = client.cancel_payment_intent(&intent.id).await?;
    println!("✅ Cancelled intent: status = {}", cancelled["status"]);

    println!("\n🎉 Example completed successfully!");
    Ok(())
}
