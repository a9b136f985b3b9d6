//! Resolve a connection string and print the endpoints a session would use
//!
//! Run with:
//! ```bash
//! RUST_LOG=couchbase_bootstrap=debug cargo run --example resolve -- "couchbases://db.example.com"
//! ```

use couchbase_bootstrap::Cluster;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let connection_string = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "couchbase://127.0.0.1".to_string());

    let cluster = Cluster::connect(&connection_string).await?;
    let endpoints = cluster.endpoints();

    println!("scheme:    {}", cluster.spec().scheme);
    println!("encrypted: {}", endpoints.encrypted);
    println!("verify:    {}", cluster.cert_verification());
    println!(
        "timeouts:  connect={:?} server={:?}",
        cluster.connect_timeout(),
        cluster.server_connect_timeout()
    );

    println!("\nkey-value endpoints:");
    for endpoint in &endpoints.kv_endpoints {
        println!("  {}", endpoint);
    }

    println!("\nmanagement URLs:");
    for url in endpoints.management_urls() {
        println!("  {}", url);
    }

    Ok(())
}
