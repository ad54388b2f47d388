//! mp-cli
//!
//! Creates PIX/boleto payments and fetches payment status from the
//! command line. Credentials come from the environment (or `.env`).

use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mercadopago_client::{
    ClientConfig, MercadoPagoClient, PaymentMethod, PaymentRequest, PaymentResult,
};

#[derive(Parser, Debug)]
#[command(name = "mp-cli", version, about = "Mercado Pago PIX and boleto payments")]
struct Cli {
    /// Override the API host (MERCADOPAGO_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a PIX payment
    Pix(CreateArgs),
    /// Create a boleto payment
    Boleto(CreateArgs),
    /// Fetch a payment by id
    Get {
        payment_id: String,
    },
}

#[derive(Args, Debug)]
struct CreateArgs {
    /// Order reference sent as external_reference
    #[arg(long)]
    reference: String,

    #[arg(long)]
    amount: Decimal,

    #[arg(long)]
    description: String,

    /// Payer email
    #[arg(long)]
    email: String,

    /// Payer CPF
    #[arg(long)]
    tax_id: String,

    #[arg(long)]
    first_name: Option<String>,

    #[arg(long)]
    last_name: Option<String>,
}

impl CreateArgs {
    fn into_request(self, method: PaymentMethod) -> PaymentRequest {
        let mut request = PaymentRequest::new(
            self.reference,
            self.amount,
            self.description,
            self.email,
            self.tax_id,
            method,
        );
        request.payer.first_name = self.first_name;
        request.payer.last_name = self.last_name;
        request
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the JSON result
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("loading Mercado Pago configuration")?;
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let client = MercadoPagoClient::new(config).context("building payment client")?;

    let (output, failed) = match cli.command {
        Command::Pix(args) => create(&client, args.into_request(PaymentMethod::Pix)).await,
        Command::Boleto(args) => create(&client, args.into_request(PaymentMethod::Boleto)).await,
        Command::Get { payment_id } => match client.get_payment(&payment_id).await {
            Ok(payment) => (payment, false),
            Err(e) => (serde_json::to_value(e.to_error_result())?, true),
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

async fn create(client: &MercadoPagoClient, request: PaymentRequest) -> (serde_json::Value, bool) {
    let attempt = client.prepare(request);
    tracing::info!(
        reference = %attempt.request().reference,
        idempotency_key = %attempt.idempotency_key(),
        "Submitting payment"
    );

    let result = PaymentResult::from(client.submit(&attempt).await);
    let failed = result.is_error();
    let output = serde_json::to_value(&result)
        .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }));
    (output, failed)
}
