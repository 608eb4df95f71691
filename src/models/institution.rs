//! Institution model and trait implementations.
//!
//! Institutions are managed through the Admin API only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::{ApiTarget, OdpClient};
use crate::error::{OdpError, Result};
use crate::traits::{Create, List};

/// An institution registered with the ODP.
///
/// Institutions own metadata records; `parent_key` links a department to
/// its parent organisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    /// Unique institution key (e.g. "saeon").
    pub key: String,

    /// Display name.
    pub name: String,

    /// Key of the parent institution, if any.
    #[serde(default)]
    pub parent_key: Option<String>,

    /// Fields not modelled explicitly.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Institution {
    /// Whether this is a top-level institution.
    pub fn is_root(&self) -> bool {
        self.parent_key.is_none()
    }
}

/// Parameters for creating an institution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionCreateParams {
    pub key: String,
    pub name: String,
    pub parent_key: Option<String>,
}

impl InstitutionCreateParams {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            parent_key: None,
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent_key: impl Into<String>) -> Self {
        self.parent_key = Some(parent_key.into());
        self
    }
}

#[async_trait]
impl List for Institution {
    type Query = ();

    #[tracing::instrument(skip(client))]
    async fn list(client: &OdpClient, _query: &()) -> Result<Vec<Self>> {
        let response = client.get(ApiTarget::Admin, "institution/").await?;
        let institutions: Vec<Institution> =
            response.json().await.map_err(OdpError::HttpError)?;
        Ok(institutions)
    }
}

#[async_trait]
impl Create for Institution {
    type Params = InstitutionCreateParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &OdpClient, params: Self::Params) -> Result<Self> {
        let response = client
            .post(ApiTarget::Admin, "institution/", &params)
            .await?;
        let institution: Institution = response.json().await.map_err(OdpError::HttpError)?;
        Ok(institution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_institution_deserialize() {
        let json = r#"{"key": "saeon", "name": "SAEON", "parent_key": null, "domain": "saeon.ac.za"}"#;
        let institution: Institution = serde_json::from_str(json).unwrap();

        assert_eq!(institution.key, "saeon");
        assert!(institution.is_root());
        assert_eq!(
            institution.extra.get("domain"),
            Some(&serde_json::json!("saeon.ac.za"))
        );
    }

    #[test]
    fn test_create_params_send_null_parent() {
        let params = InstitutionCreateParams::new("saeon", "SAEON");
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"key": "saeon", "name": "SAEON", "parent_key": null})
        );

        let params = params.with_parent("nrf");
        assert_eq!(params.parent_key.as_deref(), Some("nrf"));
    }
}
