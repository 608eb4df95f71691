//! Mock server state management.
//!
//! Provides the in-memory data store for the mock ODP and OAuth2 server.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{Institution, MetadataRecord, MetadataRecordParams, Project};

/// Client ID accepted by default.
pub const MOCK_CLIENT_ID: &str = "test-client";
/// Client secret accepted by default.
pub const MOCK_CLIENT_SECRET: &str = "test-secret";

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug)]
pub struct MockState {
    /// Institutions indexed by key.
    pub institutions: BTreeMap<String, Institution>,

    /// Projects indexed by key.
    pub projects: BTreeMap<String, Project>,

    /// Metadata records per institution key, in creation order.
    pub records: BTreeMap<String, Vec<MetadataRecord>>,

    /// Credentials the token endpoint accepts.
    pub client_id: String,
    pub client_secret: String,

    /// `expires_in` reported for issued tokens; `None` omits it.
    pub token_lifetime_secs: Option<u64>,

    /// Tokens accepted by the API endpoints.
    pub issued_tokens: HashSet<String>,

    /// Number of token requests received, successful or not.
    pub token_requests: usize,

    /// Number of API requests that presented a valid token.
    pub api_requests: usize,

    next_record_id: u64,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            institutions: BTreeMap::new(),
            projects: BTreeMap::new(),
            records: BTreeMap::new(),
            client_id: MOCK_CLIENT_ID.to_string(),
            client_secret: MOCK_CLIENT_SECRET.to_string(),
            token_lifetime_secs: Some(3600),
            issued_tokens: HashSet::new(),
            token_requests: 0,
            api_requests: 0,
            next_record_id: 1,
        }
    }
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add an institution to the state.
    pub fn with_institution(mut self, institution: Institution) -> Self {
        self.institutions
            .insert(institution.key.clone(), institution);
        self
    }

    /// Add a project to the state.
    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.insert(project.key.clone(), project);
        self
    }

    /// Add a metadata record under an institution.
    pub fn with_record(mut self, institution_key: &str, record: MetadataRecord) -> Self {
        self.records
            .entry(institution_key.to_string())
            .or_default()
            .push(record);
        self
    }

    /// Set the credentials accepted by the token endpoint.
    pub fn with_credentials(mut self, client_id: &str, client_secret: &str) -> Self {
        self.client_id = client_id.to_string();
        self.client_secret = client_secret.to_string();
        self
    }

    /// Set the lifetime reported for issued tokens.
    pub fn with_token_lifetime(mut self, secs: Option<u64>) -> Self {
        self.token_lifetime_secs = secs;
        self
    }

    /// Check client credentials and issue a new token.
    pub fn issue_token(&mut self, client_id: &str, client_secret: &str) -> Option<String> {
        self.token_requests += 1;
        if client_id != self.client_id || client_secret != self.client_secret {
            return None;
        }

        let token = format!("mock-token-{}", self.token_requests);
        self.issued_tokens.insert(token.clone());
        Some(token)
    }

    /// Whether a bearer token was issued by this server.
    pub fn is_valid_token(&self, token: &str) -> bool {
        self.issued_tokens.contains(token)
    }

    /// Get a metadata record.
    pub fn get_record(&self, institution_key: &str, id: &str) -> Option<&MetadataRecord> {
        self.records
            .get(institution_key)?
            .iter()
            .find(|r| r.id == id)
    }

    /// A window of an institution's records.
    pub fn list_records(
        &self,
        institution_key: &str,
        offset: usize,
        limit: usize,
    ) -> Vec<&MetadataRecord> {
        self.records
            .get(institution_key)
            .map(|records| records.iter().skip(offset).take(limit).collect())
            .unwrap_or_default()
    }

    /// Create a record, or update the one with the same DOI.
    pub fn upsert_record(
        &mut self,
        institution_key: &str,
        params: MetadataRecordParams,
    ) -> &MetadataRecord {
        let records = self.records.entry(institution_key.to_string()).or_default();

        let existing = if params.doi.is_empty() {
            None
        } else {
            records
                .iter()
                .position(|r| r.doi.as_deref() == Some(params.doi.as_str()))
        };

        let index = match existing {
            Some(index) => index,
            None => {
                let id = format!("record-{}", self.next_record_id);
                self.next_record_id += 1;
                records.push(MetadataRecord {
                    id,
                    doi: None,
                    institution_key: Some(institution_key.to_string()),
                    collection_key: None,
                    schema_key: None,
                    metadata: serde_json::Value::Null,
                    validated: None,
                    extra: serde_json::Map::new(),
                });
                records.len() - 1
            }
        };

        let record = &mut records[index];
        record.collection_key = Some(params.collection_key);
        record.schema_key = Some(params.schema_key);
        record.metadata = params.metadata;
        record.validated = Some(true);
        record.doi = if params.doi.is_empty() && params.auto_assign_doi {
            Some(format!("10.15493/MOCK.{}", record.id))
        } else {
            Some(params.doi)
        };

        &records[index]
    }
}
