//! Metadata record model and trait implementations.
//!
//! Metadata records belong to an institution and are addressed on the Public
//! API as `/{institution_key}/metadata/...`. Creating a record whose DOI or
//! identity matches an existing one updates it in place, so [`Create`] here
//! is create-or-update.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::{ApiTarget, OdpClient};
use crate::error::{OdpError, Result};
use crate::pagination::{Page, PaginationParams};
use crate::traits::{Create, Get, ListPaged};

/// A metadata record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Record ID.
    pub id: String,

    /// Digital Object Identifier; the API may return an empty string.
    #[serde(default)]
    pub doi: Option<String>,

    #[serde(default)]
    pub institution_key: Option<String>,

    #[serde(default)]
    pub collection_key: Option<String>,

    /// Key of the metadata schema the document conforms to.
    #[serde(default)]
    pub schema_key: Option<String>,

    /// The metadata document itself.
    #[serde(default)]
    pub metadata: serde_json::Value,

    /// Whether the document passed schema validation.
    #[serde(default)]
    pub validated: Option<bool>,

    /// Fields not modelled explicitly.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MetadataRecord {
    /// The DOI, if one is assigned.
    pub fn doi(&self) -> Option<&str> {
        self.doi.as_deref().filter(|d| !d.is_empty())
    }

    /// The record's title, read from the metadata document.
    ///
    /// Handles both DataCite (`titles[0].title`) and ISO 19115 style
    /// (`title`) documents.
    pub fn title(&self) -> Option<&str> {
        self.metadata
            .get("titles")
            .and_then(|t| t.get(0))
            .and_then(|t| t.get("title"))
            .or_else(|| self.metadata.get("title"))
            .and_then(|t| t.as_str())
    }

    /// Create a record, or update the existing one with the same identity.
    ///
    /// Same as [`Create::create`].
    pub async fn create_or_update(
        client: &OdpClient,
        params: MetadataRecordParams,
    ) -> Result<Self> {
        <Self as Create>::create(client, params).await
    }
}

/// Identifies a metadata record within an institution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecordKey {
    pub institution_key: String,
    pub record_id: String,
}

impl MetadataRecordKey {
    pub fn new(institution_key: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            institution_key: institution_key.into(),
            record_id: record_id.into(),
        }
    }
}

/// Query parameters for listing metadata records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataListQuery {
    /// Institution whose records are listed.
    pub institution_key: String,
}

impl MetadataListQuery {
    pub fn new(institution_key: impl Into<String>) -> Self {
        Self {
            institution_key: institution_key.into(),
        }
    }
}

/// Parameters for creating or updating a metadata record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecordParams {
    /// Institution that owns the record; part of the path, not the body.
    #[serde(skip)]
    pub institution_key: String,
    pub collection_key: String,
    pub schema_key: String,
    pub metadata: serde_json::Value,
    /// How the metadata was captured (e.g. "harvester", "wizard").
    pub capture_method: String,
    pub data_agreement_url: String,
    pub data_agreement_accepted: bool,
    pub terms_conditions_accepted: bool,
    /// Existing DOI, or empty.
    pub doi: String,
    /// Ask the ODP to mint a DOI for the record.
    pub auto_assign_doi: bool,
}

impl MetadataRecordParams {
    /// Parameters with both agreements accepted and no DOI.
    pub fn new(
        institution_key: impl Into<String>,
        collection_key: impl Into<String>,
        schema_key: impl Into<String>,
        metadata: serde_json::Value,
        capture_method: impl Into<String>,
        data_agreement_url: impl Into<String>,
    ) -> Self {
        Self {
            institution_key: institution_key.into(),
            collection_key: collection_key.into(),
            schema_key: schema_key.into(),
            metadata,
            capture_method: capture_method.into(),
            data_agreement_url: data_agreement_url.into(),
            data_agreement_accepted: true,
            terms_conditions_accepted: true,
            doi: String::new(),
            auto_assign_doi: false,
        }
    }

    #[must_use]
    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = doi.into();
        self
    }

    #[must_use]
    pub fn auto_assign_doi(mut self, auto_assign: bool) -> Self {
        self.auto_assign_doi = auto_assign;
        self
    }

    #[must_use]
    pub fn data_agreement_accepted(mut self, accepted: bool) -> Self {
        self.data_agreement_accepted = accepted;
        self
    }

    #[must_use]
    pub fn terms_conditions_accepted(mut self, accepted: bool) -> Self {
        self.terms_conditions_accepted = accepted;
        self
    }
}

fn collection_path(institution_key: &str) -> String {
    format!("{}/metadata/", urlencoding::encode(institution_key))
}

#[async_trait]
impl Get for MetadataRecord {
    type Id = MetadataRecordKey;

    #[tracing::instrument(skip(client))]
    async fn get(client: &OdpClient, id: MetadataRecordKey) -> Result<Self> {
        let path = format!(
            "{}{}",
            collection_path(&id.institution_key),
            urlencoding::encode(&id.record_id)
        );

        let response = client.get(ApiTarget::Public, &path).await?;
        let record: MetadataRecord = response.json().await.map_err(OdpError::HttpError)?;
        Ok(record)
    }
}

#[async_trait]
impl ListPaged for MetadataRecord {
    type Query = MetadataListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &OdpClient,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        let path = collection_path(&query.institution_key);
        let params = PaginationParams::new(offset, limit);

        let response = client
            .get_with_query(ApiTarget::Public, &path, &params)
            .await?;
        let records: Vec<MetadataRecord> = response.json().await.map_err(OdpError::HttpError)?;

        Ok(Page::new(records, offset, limit))
    }
}

#[async_trait]
impl Create for MetadataRecord {
    type Params = MetadataRecordParams;

    #[tracing::instrument(skip(client, params), fields(institution = %params.institution_key))]
    async fn create(client: &OdpClient, params: Self::Params) -> Result<Self> {
        let path = collection_path(&params.institution_key);

        let response = client.post(ApiTarget::Public, &path, &params).await?;
        let record: MetadataRecord = response.json().await.map_err(OdpError::HttpError)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserialize_datacite() {
        let json = r#"{
            "id": "b3c1e0f4-7d1a-4c2e-9d43-3f0c6f1e2a10",
            "doi": "10.15493/SAEON.TEST.01",
            "institution_key": "saeon",
            "collection_key": "saeon-test",
            "schema_key": "saeon-datacite-4-3",
            "metadata": {"titles": [{"title": "Rainfall at Jonkershoek"}]},
            "validated": true,
            "sid": null
        }"#;
        let record: MetadataRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.doi(), Some("10.15493/SAEON.TEST.01"));
        assert_eq!(record.title(), Some("Rainfall at Jonkershoek"));
        assert_eq!(record.validated, Some(true));
        assert!(record.extra.contains_key("sid"));
    }

    #[test]
    fn test_empty_doi_is_none() {
        let record: MetadataRecord = serde_json::from_value(serde_json::json!({
            "id": "r1",
            "doi": "",
            "metadata": {"title": "Soil moisture"}
        }))
        .unwrap();

        assert_eq!(record.doi(), None);
        assert_eq!(record.title(), Some("Soil moisture"));
    }

    #[test]
    fn test_params_defaults_and_body() {
        let params = MetadataRecordParams::new(
            "saeon",
            "saeon-test",
            "saeon-datacite-4-3",
            serde_json::json!({"titles": []}),
            "harvester",
            "https://example.org/agreement",
        );

        let body = serde_json::to_value(&params).unwrap();
        assert!(body.get("institution_key").is_none());
        assert_eq!(body["data_agreement_accepted"], true);
        assert_eq!(body["terms_conditions_accepted"], true);
        assert_eq!(body["doi"], "");
        assert_eq!(body["auto_assign_doi"], false);
    }

    #[test]
    fn test_collection_path_encodes_key() {
        assert_eq!(collection_path("saeon"), "saeon/metadata/");
        assert_eq!(collection_path("a b"), "a%20b/metadata/");
    }
}
