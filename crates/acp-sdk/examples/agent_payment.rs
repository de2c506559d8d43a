//! An agent executing a payment through the ACP handshake.
//!
//! ```sh
//! ACP_AGENT_SEED=<64 hex chars> ACP_BASE_URL=http://localhost:8080 \
//!     cargo run -p acp-sdk --example agent_payment
//! ```

use acp_sdk::{AcpClient, AcpError, AgentIdentity, ClientConfig, TokenBuilder};
use acp_token::Revocation;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn load_identity() -> Result<AgentIdentity, AcpError> {
    match std::env::var("ACP_AGENT_SEED") {
        Ok(seed) => AgentIdentity::from_hex(&seed),
        Err(_) => {
            warn!("ACP_AGENT_SEED not set, using an ephemeral identity");
            Ok(AgentIdentity::generate())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AcpError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let agent = load_identity()?;
    info!(agent = %agent.agent_id(), "agent identity loaded");

    // Tokens come from the institution's issuer; a local one stands in here.
    let issuer = AgentIdentity::generate();
    let token = TokenBuilder::new(agent.agent_id(), "org.example/accounts/ACC-001")
        .capability("acp:cap:financial.payment")
        .constraint("max_amount_usd", 10_000)
        .revocation(Revocation::endpoint(
            "https://acp.example.org/acp/v1/rev/check",
        ))
        .sign(&issuer)?
        .to_json()?;
    info!(issuer = %issuer.agent_id(), "capability token issued");

    let client = AcpClient::new(agent, ClientConfig::from_env())?;
    let payload = json!({
        "to_account": "ACC-999",
        "amount": 500,
        "currency": "USD",
        "memo": "Invoice payment #2024-001",
    });

    match client
        .execute("POST", "/api/v1/payments/transfer", &token, Some(&payload))
        .await
    {
        Ok(resp) => info!(status = %resp.status(), "server answered"),
        Err(e) => warn!(error = %e, base_url = %client.config().base_url, "payment not executed"),
    }
    Ok(())
}
