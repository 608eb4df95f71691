//! Get trait for fetching single entities.

use async_trait::async_trait;

use crate::client::OdpClient;
use crate::error::Result;

/// Fetch a single entity by ID.
///
/// # Example
///
/// ```ignore
/// use odp::{Get, MetadataRecord, MetadataRecordKey, OdpClient};
///
/// let client = OdpClient::from_env()?;
/// let record = MetadataRecord::get(&client, MetadataRecordKey::new("saeon", "1a2b")).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this entity.
    type Id: Send;

    /// Fetch the entity by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn get(client: &OdpClient, id: Self::Id) -> Result<Self>;
}
