//! ODP API CLI binary.
//!
//! A command-line interface for interacting with the SAEON Open Data Platform.

use std::process::ExitCode;

use clap::Parser;
use odp::cli::{Cli, Command, CreateEntity, Entity, GetEntity};
use odp::output::PrettyPrint;
use odp::{
    ApiTarget, ClientConfig, Create, Get, Institution, InstitutionCreateParams, List, ListPaged,
    Method, MetadataListQuery, MetadataRecord, MetadataRecordKey, MetadataRecordParams, OdpClient,
    OdpError, Page, Project, ProjectCreateParams,
};
use serde::Serialize;
use tabled::{Table, Tabled};
use tracing::Level;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; variables may come from the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let client = match ClientConfig::from_env()
        .map(|config| config.accept_invalid_certs(cli.insecure))
        .and_then(OdpClient::new)
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!(
                "Hint: Set ODP_PUBLIC_API, OAUTH2_SERVER, OAUTH2_CLIENT_ID, \
                 OAUTH2_CLIENT_SECRET and OAUTH2_SCOPE (a .env file works too)"
            );
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &OdpClient, cli: Cli) -> odp::Result<()> {
    match cli.command {
        Command::Get {
            entity: GetEntity::Metadata,
            institution,
            id,
        } => {
            let record =
                MetadataRecord::get(client, MetadataRecordKey::new(institution, id)).await?;
            output_single(&record, cli.json)
        }
        Command::List {
            entity,
            institution,
            offset,
            limit,
        } => handle_list(client, entity, institution, offset, limit, cli.json).await,
        Command::Create { entity } => handle_create(client, entity, cli.json).await,
        Command::Request {
            method,
            path,
            admin,
            body,
        } => handle_request(client, &method, &path, admin, body.as_deref()).await,
    }
}

async fn handle_list(
    client: &OdpClient,
    entity: Entity,
    institution: Option<String>,
    offset: Option<u32>,
    limit: Option<u32>,
    json: bool,
) -> odp::Result<()> {
    match entity {
        Entity::Institution => {
            let institutions = Institution::list(client, &()).await?;
            output_list(&institutions, json, |i| InstitutionRow::from(i))
        }
        Entity::Project => {
            let projects = Project::list(client, &()).await?;
            output_list(&projects, json, |p| ProjectRow::from(p))
        }
        Entity::Metadata => {
            let institution = institution.ok_or_else(|| {
                OdpError::InvalidArgument(
                    "--institution required for listing metadata records".to_string(),
                )
            })?;
            let query = MetadataListQuery::new(institution);
            let page = MetadataRecord::list_page(
                client,
                &query,
                offset.unwrap_or(0),
                limit.unwrap_or(odp::DEFAULT_PAGE_SIZE),
            )
            .await?;
            output_page(&page, json, |r| MetadataRow::from(r))
        }
    }
}

async fn handle_create(client: &OdpClient, entity: CreateEntity, json: bool) -> odp::Result<()> {
    match entity {
        CreateEntity::Institution { key, name, parent } => {
            let mut params = InstitutionCreateParams::new(key, name);
            if let Some(parent) = parent {
                params = params.with_parent(parent);
            }
            let institution = Institution::create(client, params).await?;
            output_single(&institution, json)
        }
        CreateEntity::Project {
            key,
            name,
            description,
        } => {
            let mut params = ProjectCreateParams::new(key, name);
            if let Some(description) = description {
                params = params.with_description(description);
            }
            let project = Project::create(client, params).await?;
            output_single(&project, json)
        }
        CreateEntity::Metadata {
            institution,
            collection,
            schema,
            file,
            capture_method,
            data_agreement_url,
            doi,
            auto_assign_doi,
        } => {
            let document = std::fs::read_to_string(&file).map_err(|source| OdpError::Io {
                path: file.display().to_string(),
                source,
            })?;
            let metadata: serde_json::Value = serde_json::from_str(&document)?;

            let mut params = MetadataRecordParams::new(
                institution,
                collection,
                schema,
                metadata,
                capture_method,
                data_agreement_url,
            )
            .auto_assign_doi(auto_assign_doi);
            if let Some(doi) = doi {
                params = params.with_doi(doi);
            }

            let record = MetadataRecord::create(client, params).await?;
            output_single(&record, json)
        }
    }
}

async fn handle_request(
    client: &OdpClient,
    method: &str,
    path: &str,
    admin: bool,
    body: Option<&str>,
) -> odp::Result<()> {
    let method: Method = method
        .to_ascii_uppercase()
        .parse()
        .map_err(|_| OdpError::InvalidArgument(format!("'{method}' is not an HTTP method")))?;
    let target = if admin {
        ApiTarget::Admin
    } else {
        ApiTarget::Public
    };
    let body: Option<serde_json::Value> = body.map(serde_json::from_str).transpose()?;

    let response = client.request(method, path, target, body.as_ref()).await?;
    let status = response.status();
    let text = response.text().await.map_err(OdpError::HttpError)?;

    eprintln!("HTTP {status}");
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{text}"),
    }
    Ok(())
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> odp::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_list<T, R, F>(items: &[T], json: bool, to_row: F) -> odp::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{} total", items.len());
    }
    Ok(())
}

fn output_page<T, R, F>(page: &Page<T>, json: bool, to_row: F) -> odp::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(&page.items)?);
    } else {
        let rows: Vec<R> = page.items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        println!("\n{}", page_summary(page));
    }
    Ok(())
}

/// Footer describing which records a page covers.
fn page_summary<T>(page: &Page<T>) -> String {
    let first = page.offset.saturating_add(1);
    let last = page.next_offset();
    if page.is_empty() {
        format!("No records at offset {}", page.offset)
    } else if page.has_more {
        format!("Records {first}-{last} (more available, use --offset {last})")
    } else {
        format!("Records {first}-{last} (end)")
    }
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct InstitutionRow {
    key: String,
    name: String,
    parent: String,
}

impl From<&Institution> for InstitutionRow {
    fn from(i: &Institution) -> Self {
        Self {
            key: i.key.clone(),
            name: i.name.clone(),
            parent: i.parent_key.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct ProjectRow {
    key: String,
    name: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            key: p.key.clone(),
            name: p.name.clone(),
        }
    }
}

#[derive(Tabled)]
struct MetadataRow {
    id: String,
    doi: String,
    title: String,
}

impl From<&MetadataRecord> for MetadataRow {
    fn from(r: &MetadataRecord) -> Self {
        Self {
            id: r.id.clone(),
            doi: r.doi().unwrap_or_default().to_string(),
            title: r.title().unwrap_or_default().to_string(),
        }
    }
}
