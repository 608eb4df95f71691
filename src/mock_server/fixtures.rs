//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use crate::{Institution, MetadataRecord, MetadataRecordParams, Project};

/// Collection of fixture factories for test data.
pub struct Fixtures;

/// The data a default mock server starts with.
pub struct DefaultScenario {
    pub institutions: Vec<Institution>,
    pub projects: Vec<Project>,
    /// Records keyed by institution.
    pub records: Vec<(String, MetadataRecord)>,
}

impl Fixtures {
    pub fn institution(key: &str, name: &str) -> Institution {
        Institution {
            key: key.to_string(),
            name: name.to_string(),
            parent_key: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn project(key: &str, name: &str) -> Project {
        Project {
            key: key.to_string(),
            name: name.to_string(),
            description: None,
            extra: serde_json::Map::new(),
        }
    }

    /// A validated DataCite record with the given title.
    pub fn record(id: &str, title: &str) -> MetadataRecord {
        MetadataRecord {
            id: id.to_string(),
            doi: None,
            institution_key: None,
            collection_key: Some("saeon-test".to_string()),
            schema_key: Some("saeon-datacite-4-3".to_string()),
            metadata: serde_json::json!({ "titles": [{ "title": title }] }),
            validated: Some(true),
            extra: serde_json::Map::new(),
        }
    }

    /// Parameters for a DataCite record under `institution_key`.
    pub fn record_params(institution_key: &str) -> MetadataRecordParams {
        MetadataRecordParams::new(
            institution_key,
            "saeon-test",
            "saeon-datacite-4-3",
            serde_json::json!({ "titles": [{ "title": "Mock dataset" }] }),
            "api",
            "https://example.org/data-agreement",
        )
    }

    /// A small realistic dataset: two institutions, one project, and
    /// three SAEON records.
    pub fn default_scenario() -> DefaultScenario {
        let mut node = Self::institution("saeon-egagasini", "SAEON Egagasini Node");
        node.parent_key = Some("saeon".to_string());

        let mut project = Self::project("ocean-obs", "Ocean Observations");
        project.description = Some("Long-term coastal and ocean monitoring".to_string());

        let mut doi_record = Self::record("record-a", "Rainfall at Jonkershoek");
        doi_record.doi = Some("10.15493/SAEON.JNK.01".to_string());

        DefaultScenario {
            institutions: vec![
                Self::institution("saeon", "South African Environmental Observation Network"),
                node,
            ],
            projects: vec![project],
            records: vec![
                ("saeon".to_string(), doi_record),
                ("saeon".to_string(), Self::record("record-b", "Streamflow at Cathedral Peak")),
                ("saeon".to_string(), Self::record("record-c", "Sea surface temperature")),
            ],
        }
    }
}
