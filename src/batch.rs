//! Batch driver: pick the keys, fetch them one by one, write the output file
//!
//! Key selection, in priority order:
//! 1. citations of the `.aux` file, if one was given
//! 2. explicit keys
//! 3. every canonical key of the alias table

use crate::aliases::AliasTable;
use crate::citations::load_citations;
use crate::error::{Error, Result};
use crate::fetch::{Endpoints, FetchError, Fetcher};
use log::info;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;

/// Everything a run needs
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub keys: Vec<String>,
    pub alias_file: Option<PathBuf>,
    pub bibcloud: Option<PathBuf>,
    pub aux: Option<PathBuf>,
    pub output: PathBuf,
    pub endpoints: Endpoints,
    /// Color the per-key progress lines
    pub color: bool,
}

/// Run summary
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub ok: usize,
    pub failed: Vec<String>,
    pub output: String,
}

/// Records fetched by [`fetch_all`], in fetch order
#[derive(Debug, Default)]
pub struct Fetched {
    pub records: Vec<String>,
    pub failed: Vec<String>,
}

/// Run end to end. `shutdown` resolving before the output file is opened
/// aborts the run with [`Error::Cancelled`] and leaves the file untouched.
/// Once writing has started it runs to completion.
pub async fn run_batch<F>(config: &BatchConfig, shutdown: F) -> Result<BatchReport>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    if config.keys.is_empty() && config.alias_file.is_none() && config.bibcloud.is_none() {
        return Err(Error::NothingToDo);
    }

    let keys = select_keys(config).await?;
    let aliases =
        AliasTable::load(config.bibcloud.as_deref(), config.alias_file.as_deref()).await?;
    let citations = resolve_keys(&keys, &aliases);

    let fetcher = Fetcher::new(config.endpoints.clone())?;
    let fetched = fetch_all(
        &fetcher,
        &citations,
        &aliases,
        config.color,
        shutdown.as_mut(),
    )
    .await?;

    // Last chance to bail out before touching the output file
    tokio::select! {
        biased;
        _ = &mut shutdown => return Err(Error::Cancelled),
        _ = std::future::ready(()) => {}
    }

    info!("Downloaded {} references.", fetched.records.len());
    info!("Write references to {}", config.output.display());
    tokio::fs::write(&config.output, fetched.records.concat())
        .await
        .map_err(|source| Error::Write {
            path: config.output.clone(),
            source,
        })?;

    let report = BatchReport {
        total: citations.len(),
        ok: fetched.records.len(),
        failed: fetched.failed,
        output: config.output.display().to_string(),
    };
    eprintln!("Done: {}/{} OK", report.ok, report.total);

    Ok(report)
}

/// Keys named by the aux file, or else the explicit keys
pub async fn select_keys(config: &BatchConfig) -> Result<Vec<String>> {
    match &config.aux {
        Some(aux) => Ok(load_citations(aux).await?.keys),
        None => Ok(config.keys.clone()),
    }
}

/// Map aliases to canonical keys. An empty list means "everything known".
pub fn resolve_keys(keys: &[String], aliases: &AliasTable) -> Vec<String> {
    if keys.is_empty() {
        info!(
            "No citations given. Download all {} references instead.",
            aliases.len()
        );
        return aliases.targets();
    }

    keys.iter()
        .map(|key| aliases.resolve(key).to_string())
        .collect()
}

/// Fetch every key sequentially
pub async fn fetch_all<F>(
    fetcher: &Fetcher,
    keys: &[String],
    aliases: &AliasTable,
    color: bool,
    shutdown: F,
) -> Result<Fetched>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut fetched = Fetched::default();
    let total = keys.len();

    for (i, key) in keys.iter().enumerate() {
        let result = tokio::select! {
            biased;
            _ = &mut shutdown => return Err(Error::Cancelled),
            result = fetcher.fetch(key, aliases) => result,
        };

        eprintln!(
            "{}",
            progress_line(i + 1, total, key, result.as_ref().err(), color)
        );
        match result {
            Ok(record) => fetched.records.push(record),
            Err(_) => fetched.failed.push(key.clone()),
        }
    }

    Ok(fetched)
}

fn progress_line(
    n: usize,
    total: usize,
    key: &str,
    err: Option<&FetchError>,
    color: bool,
) -> String {
    let status = match (err, color) {
        (None, true) => "Success".green().to_string(),
        (None, false) => "Success".to_string(),
        (Some(e), true) => format!("{} > {}", "Failed".red(), e),
        (Some(e), false) => format!("Failed > {}", e),
    };
    format!("Fetch {}/{}: key: {} -> {}", n, total, key, status)
}
