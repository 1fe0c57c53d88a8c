//! Fetch, extract, render and save one batch of search results.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;

use crate::apis::{Catalog, SourceError};
use crate::feed;
use crate::query::ApiQuery;
use crate::render::{self, Format};

/// The catalog never returns more than this many entries for one request.
pub const MAX_RESULTS_CAP: u32 = 1000;

const FILE_PREFIX: &str = "arxiv_export";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("the catalog response contained no entries")]
    NoRecords,
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Rendered export file contents.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub format: Format,
    pub records: usize,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub format: Format,
    pub records: usize,
    pub path: PathBuf,
}

/// Total number of matches, or 0 if the catalog could not be asked.
pub async fn probe_total(catalog: &dyn Catalog, query: &ApiQuery) -> u32 {
    match catalog.total_results(query.as_str()).await {
        Ok(total) => total,
        Err(e) => {
            tracing::warn!("Could not count results from {}: {}", catalog.name(), e);
            0
        }
    }
}

/// Upper bound on how many entries can be requested for a search with `total` hits.
pub fn max_exportable(total: u32) -> u32 {
    total.min(MAX_RESULTS_CAP)
}

pub fn clamp_count(requested: u32, total: u32) -> u32 {
    requested.min(max_exportable(total))
}

/// Fetch up to `max_results` entries and render them in `format`.
pub async fn fetch_document(
    catalog: &dyn Catalog,
    query: &ApiQuery,
    max_results: u32,
    format: Format,
) -> Result<RenderedDocument, ExportError> {
    let xml = catalog.fetch_feed(query.as_str(), max_results).await?;
    let records = feed::extract_records(&xml, max_results)?;
    if records.is_empty() {
        return Err(ExportError::NoRecords);
    }
    tracing::info!(
        "Extracted {} records from {}, rendering as {}",
        records.len(),
        catalog.name(),
        format.display_name()
    );

    Ok(RenderedDocument {
        format,
        records: records.len(),
        text: render::render_document(format, &records),
    })
}

/// `arxiv_export_20231019_175959.ris`
pub fn export_file_name(format: Format, now: DateTime<Local>) -> String {
    format!(
        "{FILE_PREFIX}_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Write the whole document in one go. An existing file with the same name is replaced.
pub fn write_document(
    doc: &RenderedDocument,
    dir: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_file_name(doc.format, now));
    let write_err = |source| ExportError::Write {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(write_err)?;
    std::fs::write(&path, &doc.text).map_err(write_err)?;

    let path = std::fs::canonicalize(&path).unwrap_or(path);
    tracing::info!("Wrote {} records to {}", doc.records, path.display());
    Ok(path)
}

/// Run the whole export and save the result under `output_dir`.
pub async fn run_export(
    catalog: &dyn Catalog,
    query: &ApiQuery,
    max_results: u32,
    format: Format,
    output_dir: &Path,
) -> Result<ExportSummary, ExportError> {
    let doc = fetch_document(catalog, query, max_results, format).await?;
    let path = write_document(&doc, output_dir, Local::now())?;
    Ok(ExportSummary {
        format,
        records: doc.records,
        path,
    })
}
