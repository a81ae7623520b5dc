//! Fetch a mouse by alternate key and by GUID, then set a random genotype.
//!
//! Settings come from `DATAVERSE_*` variables, `.env`, or the config files.
//! Run with `RUST_LOG=info cargo run --example dataverse_client`.

use anyhow::Result;
use dataverse_client::{DataverseClient, DataverseConfig};
use log::info;
use rand::Rng;
use serde_json::json;

const TABLE: &str = "crb81_dim_mice_bases";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = DataverseConfig::load()?;
    let client = DataverseClient::connect(config).await?;

    let by_key = client.get(TABLE, ("crb81_mouse_id", "614174")).await?;
    println!("{}", serde_json::to_string_pretty(&by_key)?);

    let by_id = client
        .get(TABLE, "fe057d74-8683-f011-b4cb-6045bd03524b")
        .await?;
    println!("{}", serde_json::to_string_pretty(&by_id)?);

    let genotype = rand::rng().random_range(1..=100).to_string();
    info!("Setting crb81_full_genotype to {}", genotype);
    let updated = client
        .update(
            TABLE,
            ("crb81_mouse_id", "614174"),
            &json!({ "crb81_full_genotype": genotype }),
        )
        .await?;
    println!("{}", serde_json::to_string_pretty(&updated)?);

    Ok(())
}
