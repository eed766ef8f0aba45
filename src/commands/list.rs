//! Enumerate-only command: print what a clone run would mirror

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use super::enumerate_repositories;
use crate::core::{working_copy_path, MirrorConfig, SyncContext};
use crate::git::is_working_copy;
use crate::provider::RepositoryDescriptor;
use crate::utils::relative_display;

/// How enumerate-only prints its result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct ListedRepository<'a> {
    project: &'a str,
    name: &'a str,
    slug: String,
    clone_url: &'a str,
    local_path: String,
    present: bool,
}

/// Handles the enumerate-only action
pub async fn handle_enumerate(config: &MirrorConfig, context: SyncContext) -> Result<()> {
    let descriptors = enumerate_repositories(config, &context).await?;
    tracing::info!(parent: &context.span, count = descriptors.len(), "enumeration finished");
    println!("{}", render_listing(&descriptors, &config.destination, config.format)?);
    Ok(())
}

/// Renders descriptors as aligned text rows or a JSON array
pub fn render_listing(
    descriptors: &[RepositoryDescriptor],
    destination_root: &Path,
    format: OutputFormat,
) -> Result<String> {
    let rows: Vec<ListedRepository<'_>> = descriptors
        .iter()
        .map(|descriptor| {
            let slug = descriptor.slug();
            let path = working_copy_path(destination_root, &descriptor.project, &slug);
            ListedRepository {
                project: &descriptor.project,
                name: &descriptor.name,
                present: is_working_copy(&path),
                local_path: path.display().to_string(),
                clone_url: &descriptor.clone_url,
                slug,
            }
        })
        .collect();

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => {
            let width = rows
                .iter()
                .map(|row| row.project.len() + row.slug.len() + 1)
                .max()
                .unwrap_or(0);
            let mut lines: Vec<String> = rows
                .iter()
                .map(|row| {
                    let marker = if row.present { "●" } else { "○" };
                    let key = format!("{}/{}", row.project, row.slug);
                    format!(
                        "{marker} {key:width$}  {}  {}",
                        relative_display(Path::new(&row.local_path), destination_root),
                        row.clone_url,
                    )
                })
                .collect();
            lines.push(format!("{} repositories", rows.len()));
            Ok(lines.join("\n"))
        }
    }
}
