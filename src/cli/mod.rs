//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the odp binary.

use clap::{Parser, Subcommand, ValueEnum};

/// ODP API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "odp", about = "SAEON Open Data Platform CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Log requests and token handling to stderr (repeat for more detail).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Skip TLS certificate verification (local development servers only).
    #[arg(long, global = true, default_value = "false")]
    pub insecure: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a single metadata record.
    Get {
        /// The type of entity to get.
        entity: GetEntity,

        /// Institution that owns the record.
        institution: String,

        /// The record ID.
        id: String,
    },

    /// List entities.
    List {
        /// The type of entity to list.
        entity: Entity,

        /// Institution key (required for metadata).
        #[arg(long)]
        institution: Option<String>,

        /// Number of records to skip (metadata only).
        #[arg(long)]
        offset: Option<u32>,

        /// Maximum number of records to return (metadata only).
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Create an entity.
    Create {
        #[command(subcommand)]
        entity: CreateEntity,
    },

    /// Send an authenticated request and print the raw response.
    Request {
        /// HTTP method (GET, POST, PUT, DELETE, ...).
        method: String,

        /// Path relative to the API base URL.
        path: String,

        /// Send to the Admin API instead of the Public API.
        #[arg(long)]
        admin: bool,

        /// JSON request body.
        #[arg(long)]
        body: Option<String>,
    },
}

/// Entity types that can be listed.
#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    /// An institution (Admin API).
    #[value(alias = "institutions")]
    Institution,
    /// A project.
    #[value(alias = "projects")]
    Project,
    /// A metadata record.
    #[value(alias = "metadata-records", alias = "records")]
    Metadata,
}

/// Entity types that can be fetched individually.
#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum GetEntity {
    /// A metadata record.
    #[value(alias = "record")]
    Metadata,
}

/// Entities that can be created, with their fields.
#[derive(Subcommand, Debug)]
pub enum CreateEntity {
    /// Create an institution (Admin API).
    Institution {
        key: String,
        name: String,
        /// Key of the parent institution.
        #[arg(long)]
        parent: Option<String>,
    },
    /// Create a project.
    Project {
        key: String,
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Create or update a metadata record from a JSON document.
    Metadata {
        institution: String,
        collection: String,
        schema: String,
        /// Path to the metadata document (JSON).
        file: std::path::PathBuf,
        #[arg(long, default_value = "api")]
        capture_method: String,
        #[arg(long)]
        data_agreement_url: String,
        /// Existing DOI of the record.
        #[arg(long)]
        doi: Option<String>,
        /// Ask the ODP to mint a DOI.
        #[arg(long)]
        auto_assign_doi: bool,
    },
}
