//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use crate::{Institution, MetadataRecord, Project};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Institution {
    fn pretty_print(&self) -> String {
        let header = format!("Institution: {}", self.key);
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![header, divider, format!("Name:           {}", self.name)];

        if let Some(ref parent) = self.parent_key {
            lines.push(format!("Parent:         {}", parent));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Project {
    fn pretty_print(&self) -> String {
        let header = format!("Project: {}", self.key);
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![header, divider, format!("Name:           {}", self.name)];

        if let Some(ref description) = self.description {
            lines.push(format!("Description:    {}", description));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for MetadataRecord {
    fn pretty_print(&self) -> String {
        let header = format!("Metadata Record: {}", self.id);
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![header, divider];

        if let Some(title) = self.title() {
            lines.push(format!("Title:          {}", title));
        }

        if let Some(doi) = self.doi() {
            lines.push(format!("DOI:            {}", doi));
        }

        if let Some(ref institution) = self.institution_key {
            lines.push(format!("Institution:    {}", institution));
        }

        if let Some(ref collection) = self.collection_key {
            lines.push(format!("Collection:     {}", collection));
        }

        if let Some(ref schema) = self.schema_key {
            lines.push(format!("Schema:         {}", schema));
        }

        if let Some(validated) = self.validated {
            lines.push(format!(
                "Validated:      {}",
                if validated { "yes" } else { "no" }
            ));
        }

        lines.join("\n")
    }
}
