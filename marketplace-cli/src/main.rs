//! Marketplace CLI
//!
//! Command-line interface for the marketplace payments API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use marketplace_client::MarketplaceClient;
use marketplace_types::{
    AccountType, CreateCheckoutSessionRequest, CreateElementsIntentRequest,
    CreateMbwayPaymentIntentRequest, CreatePaymentIntentRequest, CreatePaymentLinkRequest,
};

#[derive(Parser)]
#[command(name = "marketplace")]
#[command(author, version, about = "Marketplace payments API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the marketplace API
    #[arg(
        long,
        env = "MARKETPLACE_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connected account operations
    Account {
        #[command(subcommand)]
        action: AccountCommands,
    },
    /// Payment intent operations
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Checkout session and payment link operations
    Checkout {
        #[command(subcommand)]
        action: CheckoutCommands,
    },
    /// Transfer funds to a connected account
    Transfer {
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        destination: String,
    },
    /// Start a local listener that prints webhook deliveries
    Listen {
        /// Port to listen on
        #[arg(long, default_value = "4242")]
        port: u16,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Create a connected account
    Create {
        /// Seller email
        email: String,
        /// Two-letter country code (defaults to US)
        #[arg(long)]
        country: Option<String>,
        /// Account type: express, standard, or custom
        #[arg(long = "type")]
        account_type: Option<String>,
    },
    /// Get account details
    Get {
        /// Connected account ID
        id: String,
    },
    /// List connected accounts
    List {
        #[arg(long, default_value = "10")]
        limit: u32,
    },
    /// Get account balance
    Balance {
        /// Connected account ID
        id: String,
    },
    /// Create an onboarding link
    Link {
        /// Connected account ID
        id: String,
        #[arg(long)]
        refresh_url: String,
        #[arg(long)]
        return_url: String,
    },
    /// Create an account and onboarding link in one step
    SimulateFlow {
        email: String,
        #[arg(long, default_value = "2000")]
        amount: i64,
    },
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Create a payment intent routed to a connected account
    Create {
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        account: String,
        #[arg(long)]
        fee: Option<i64>,
        #[arg(long)]
        description: Option<String>,
        /// Explicit method list (comma-separated)
        #[arg(long, value_delimiter = ',')]
        methods: Option<Vec<String>>,
    },
    /// Create a EUR payment intent with MB Way support and fallback
    Mbway {
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        account: String,
        #[arg(long)]
        fee: Option<i64>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Get a payment intent
    Get {
        /// Payment intent ID
        id: String,
    },
    /// Confirm a payment intent
    Confirm {
        id: String,
        #[arg(long)]
        payment_method: Option<String>,
    },
    /// Cancel a payment intent
    Cancel {
        id: String,
    },
    /// Probe which payment methods are currently available
    Methods {
        #[arg(long, default_value = "eur")]
        currency: String,
    },
}

#[derive(Subcommand)]
enum CheckoutCommands {
    /// Create a hosted checkout session
    Session {
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        account: String,
        #[arg(long, default_value = "0")]
        fee: i64,
        #[arg(long)]
        product: Option<String>,
    },
    /// Create a payment link (seller receives the full amount)
    Link {
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        account: String,
        #[arg(long)]
        product: Option<String>,
    },
    /// Create a payment link that collects a platform fee
    LinkWithFee {
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        account: String,
        #[arg(long)]
        fee: i64,
        #[arg(long)]
        product: Option<String>,
    },
    /// Create a payment intent for embedded Elements checkout
    Elements {
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        account: String,
        #[arg(long)]
        fee: Option<i64>,
    },
}

fn parse_account_type(s: &str) -> Result<AccountType> {
    match s.to_lowercase().as_str() {
        "express" => Ok(AccountType::Express),
        "standard" => Ok(AccountType::Standard),
        "custom" => Ok(AccountType::Custom),
        _ => anyhow::bail!(
            "Unknown account type: {}. Supported: express, standard, custom",
            s
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = MarketplaceClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Account { action } => match action {
            AccountCommands::Create {
                email,
                country,
                account_type,
            } => {
                let account_type = account_type.as_deref().map(parse_account_type).transpose()?;
                let account = client
                    .create_account(&email, country.as_deref(), account_type)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&account)?);
            }
            AccountCommands::Get { id } => {
                let account = client.get_account(&id).await?;
                println!("{}", serde_json::to_string_pretty(&account)?);
            }
            AccountCommands::List { limit } => {
                let accounts = client.list_accounts(limit).await?;
                println!("{}", serde_json::to_string_pretty(&accounts.data)?);
            }
            AccountCommands::Balance { id } => {
                let balance = client.get_account_balance(&id).await?;
                println!("{}", serde_json::to_string_pretty(&balance)?);
            }
            AccountCommands::Link {
                id,
                refresh_url,
                return_url,
            } => {
                let link = client
                    .create_account_link(&id, &refresh_url, &return_url)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&link)?);
            }
            AccountCommands::SimulateFlow { email, amount } => {
                let flow = client.simulate_flow(&email, amount).await?;
                println!("{}", serde_json::to_string_pretty(&flow)?);
            }
        },

        Commands::Payment { action } => match action {
            PaymentCommands::Create {
                amount,
                currency,
                account,
                fee,
                description,
                methods,
            } => {
                let intent = client
                    .create_payment_intent(&CreatePaymentIntentRequest {
                        amount,
                        currency,
                        connected_account_id: account,
                        application_fee_amount: fee,
                        description,
                        customer_email: None,
                        payment_methods: methods,
                    })
                    .await?;
                println!("{}", serde_json::to_string_pretty(&intent)?);
            }
            PaymentCommands::Mbway {
                amount,
                account,
                fee,
                phone,
            } => {
                let intent = client
                    .create_mbway_payment_intent(&CreateMbwayPaymentIntentRequest {
                        amount,
                        connected_account_id: account,
                        application_fee_amount: fee,
                        description: None,
                        customer_email: None,
                        customer_phone: phone,
                    })
                    .await?;
                println!("{}", serde_json::to_string_pretty(&intent)?);
            }
            PaymentCommands::Get { id } => {
                let intent = client.get_payment_intent(&id).await?;
                println!("{}", serde_json::to_string_pretty(&intent)?);
            }
            PaymentCommands::Confirm { id, payment_method } => {
                let result = client
                    .confirm_payment_intent(&id, payment_method.as_deref())
                    .await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            PaymentCommands::Cancel { id } => {
                let result = client.cancel_payment_intent(&id).await?;
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            PaymentCommands::Methods { currency } => {
                let methods = client.available_payment_methods(&currency).await?;
                println!("{}", serde_json::to_string_pretty(&methods)?);
            }
        },

        Commands::Checkout { action } => match action {
            CheckoutCommands::Session {
                amount,
                currency,
                account,
                fee,
                product,
            } => {
                let session = client
                    .create_checkout_session(&CreateCheckoutSessionRequest {
                        amount,
                        currency,
                        connected_account_id: account,
                        application_fee_amount: fee,
                        product_name: product,
                        customer_email: None,
                    })
                    .await?;
                println!("{}", serde_json::to_string_pretty(&session)?);
            }
            CheckoutCommands::Link {
                amount,
                currency,
                account,
                product,
            } => {
                let link = client
                    .create_payment_link(&CreatePaymentLinkRequest {
                        amount,
                        currency,
                        connected_account_id: account,
                        application_fee_amount: 0,
                        product_name: product,
                        product_description: None,
                    })
                    .await?;
                println!("{}", serde_json::to_string_pretty(&link)?);
            }
            CheckoutCommands::LinkWithFee {
                amount,
                currency,
                account,
                fee,
                product,
            } => {
                let link = client
                    .create_payment_link_with_fee(&CreatePaymentLinkRequest {
                        amount,
                        currency,
                        connected_account_id: account,
                        application_fee_amount: fee,
                        product_name: product,
                        product_description: None,
                    })
                    .await?;
                println!("{}", serde_json::to_string_pretty(&link)?);
            }
            CheckoutCommands::Elements {
                amount,
                currency,
                account,
                fee,
            } => {
                let intent = client
                    .create_elements_intent(&CreateElementsIntentRequest {
                        amount,
                        currency,
                        connected_account_id: account,
                        application_fee_amount: fee,
                        customer_email: None,
                    })
                    .await?;
                println!("{}", serde_json::to_string_pretty(&intent)?);
            }
        },

        Commands::Transfer {
            amount,
            currency,
            destination,
        } => {
            let transfer = client
                .create_transfer(amount, currency.as_deref(), &destination)
                .await?;
            println!("{}", serde_json::to_string_pretty(&transfer)?);
        }

        Commands::Listen { port } => {
            let app = axum::Router::new().route("/webhook", axum::routing::post(handle_webhook));
            let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
            println!("Listening for webhooks on {}", addr);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

async fn handle_webhook(
    headers: axum::http::HeaderMap,
    body: String,
) -> impl axum::response::IntoResponse {
    println!("POST /webhook HTTP/1.1");
    for (name, value) in &headers {
        println!("{}: {:?}", name, value);
    }
    println!();
    println!("{}", body);
    println!("----------------------------------------");
    axum::http::StatusCode::OK
}
