//! Basic example demonstrating the ODP API client.
//!
//! Run with:
//! ```
//! ODP_PUBLIC_API=... OAUTH2_SERVER=... OAUTH2_CLIENT_ID=... \
//!     OAUTH2_CLIENT_SECRET=... OAUTH2_SCOPE="ODP.Metadata" \
//!     cargo run --example basic
//! ```
//!
//! Variables may also be placed in a `.env` file.

use odp::{ApiTarget, ListPaged, MetadataListQuery, MetadataRecord, Method, OdpClient};

#[tokio::main]
async fn main() -> odp::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    println!("Creating ODP client...");
    let client = OdpClient::from_env()?;
    println!("Public API: {}", client.base_url(ApiTarget::Public)?);

    // First page of SAEON's metadata records
    println!("\n--- Listing metadata records (first page) ---");
    let query = MetadataListQuery::new("saeon");
    let page = MetadataRecord::list_page(&client, &query, 0, 10).await?;
    println!("Found {} records (more: {})", page.len(), page.has_more);

    for record in &page {
        println!(
            "  - {} [{}] {}",
            record.id,
            record.doi().unwrap_or("no DOI"),
            record.title().unwrap_or("(untitled)")
        );
    }

    // The same call through the raw dispatcher
    println!("\n--- Raw request ---");
    let response = client
        .request::<()>(
            Method::GET,
            "/saeon/metadata/?offset=0&limit=1",
            ApiTarget::Public,
            None,
        )
        .await?;
    println!("Status: {}", response.status());

    println!("\nDone!");
    Ok(())
}
