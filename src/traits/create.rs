//! Create trait for adding entities.

use async_trait::async_trait;

use crate::client::OdpClient;
use crate::error::Result;

/// Create an entity and return it as stored by the API.
///
/// # Example
///
/// ```ignore
/// use odp::{Create, OdpClient, Project, ProjectCreateParams};
///
/// let client = OdpClient::from_env()?;
/// let project = Project::create(
///     &client,
///     ProjectCreateParams::new("ocean-obs", "Ocean Observations"),
/// ).await?;
/// ```
#[async_trait]
pub trait Create: Sized {
    /// Parameters describing the new entity.
    type Params: Send;

    /// Create the entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the entity or the request fails.
    async fn create(client: &OdpClient, params: Self::Params) -> Result<Self>;
}
