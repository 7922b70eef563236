use mongodb::bson::doc;
use mongodb::{Client, Collection};
use tracing::info;

use crate::config::Config;
use crate::ingest::error::IngestError;
use crate::model::record::PersonRecord;

/// Opens the per-upload connection. The ping forces a real round trip so an
/// unreachable server fails here instead of inside the first write.
pub async fn connect(uri: &str) -> Result<Client, IngestError> {
    let client = Client::with_uri_str(uri)
        .await
        .map_err(IngestError::Connection)?;
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(IngestError::Connection)?;
    info!("connected to MongoDB");
    Ok(client)
}

pub fn collection(client: &Client, config: &Config) -> Collection<PersonRecord> {
    client
        .database(&config.db_name)
        .collection(&config.collection_name)
}

/// Counterpart of [`connect`]; runs however the upload went.
pub async fn release(client: Client) {
    client.shutdown().await;
    info!("MongoDB connection closed");
}

/// Startup diagnostic; failures are logged by the caller, never fatal.
pub async fn ping(uri: &str) -> anyhow::Result<()> {
    let client = Client::with_uri_str(uri).await?;
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await?;
    client.shutdown().await;
    Ok(())
}
