//! Lists the cluster nodes of a Proxmox server.
//!
//! Credentials come from `PROXMOX_HOSTNAME`, `PROXMOX_USERNAME`,
//! `PROXMOX_PASSWORD` (or `PROXMOX_TOKEN_ID` / `PROXMOX_TOKEN_SECRET`) and the
//! optional `PROXMOX_REALM`, `PROXMOX_PORT` and `PROXMOX_SYSTEM`.
//! Set `RUST_LOG=proxmox_api=debug` to see the requests being made.

use proxmox_api::{EnvSource, ProxmoxClient, ProxmoxResult};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ProxmoxResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = ProxmoxClient::builder()
        .credentials(&EnvSource::new())?
        .accept_invalid_certs(true) // Testing & Self signed certs
        .build()
        .await?;

    println!("\n🔑 Connected");
    println!("------------------------");
    println!("{}", client.credentials());
    println!("State: {:?}", client.auth_state().await);

    let nodes = client.get("/nodes", None).await?;
    println!("\n🖥️  Nodes");
    println!("------------------------");
    if let Some(nodes) = nodes.data().and_then(|data| data.as_array()) {
        for node in nodes {
            println!(
                "{} ({})",
                node["node"].as_str().unwrap_or("?"),
                node["status"].as_str().unwrap_or("unknown")
            );
        }
    }

    Ok(())
}
