//! Project model and trait implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::{ApiTarget, OdpClient};
use crate::error::{OdpError, Result};
use crate::traits::{Create, List};

/// An ODP project.
///
/// Projects group metadata collections under a common research effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project key.
    pub key: String,

    /// The project name.
    pub name: String,

    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,

    /// Fields not modelled explicitly.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Parameters for creating a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectCreateParams {
    pub key: String,
    pub name: String,
    pub description: Option<String>,
}

impl ProjectCreateParams {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[async_trait]
impl List for Project {
    type Query = ();

    #[tracing::instrument(skip(client))]
    async fn list(client: &OdpClient, _query: &()) -> Result<Vec<Self>> {
        let response = client.get(ApiTarget::Public, "project/").await?;
        let projects: Vec<Project> = response.json().await.map_err(OdpError::HttpError)?;
        Ok(projects)
    }
}

#[async_trait]
impl Create for Project {
    type Params = ProjectCreateParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OdpClient, params: Self::Params) -> Result<Self> {
        let response = client.post(ApiTarget::Public, "project/", &params).await?;
        let project: Project = response.json().await.map_err(OdpError::HttpError)?;
        Ok(project)
    }
}
