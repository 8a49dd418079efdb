//! Alias table: short user aliases <-> canonical remote keys
//!
//! Two input formats are supported:
//! - bibcloud files, one `<alias> <canonical>` pair per line with `%` comments
//! - structured YAML files (see [`crate::schema::AliasFile`])
//!
//! Both feed the same forward (alias -> canonical) and reverse
//! (canonical -> alias) tables. Later entries overwrite earlier ones.

use crate::error::{Error, Result};
use crate::schema::{AliasFile, DBLP_PREFIX, DOI_PREFIX};
use log::{info, warn};
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::Path;

/// A bibcloud line that could not be turned into an alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadLine {
    /// 1-based line number
    pub line: usize,
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
    // first-insertion order of aliases
    order: Vec<String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `alias` <-> `canonical`
    pub fn insert(&mut self, alias: impl Into<String>, canonical: impl Into<String>) {
        let alias = alias.into();
        let canonical = canonical.into();

        if !self.forward.contains_key(&alias) {
            self.order.push(alias.clone());
        }
        self.reverse.insert(canonical.clone(), alias.clone());
        self.forward.insert(alias, canonical);
    }

    /// Canonical key registered for `alias`
    pub fn canonical(&self, alias: &str) -> Option<&str> {
        self.forward.get(alias).map(String::as_str)
    }

    /// Alias registered for a canonical key
    pub fn alias_for(&self, canonical: &str) -> Option<&str> {
        self.reverse.get(canonical).map(String::as_str)
    }

    /// Map an alias to its canonical key; unknown keys pass through.
    pub fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        self.canonical(key).unwrap_or(key)
    }

    /// Every canonical key, in the order the aliases were first registered
    pub fn targets(&self) -> Vec<String> {
        self.order
            .iter()
            .filter_map(|alias| self.forward.get(alias).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Add entries from bibcloud text. Returns lines that had content but no
    /// `DBLP:`/`DOI:` target.
    pub fn extend_from_bibcloud(&mut self, content: &str) -> Vec<BadLine> {
        let mut bad = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let tokens: Vec<&str> = strip_comment(line.trim()).split_whitespace().collect();

            match tokens.as_slice() {
                [] => {}
                [alias, canonical, ..]
                    if canonical.contains(DBLP_PREFIX) || canonical.contains(DOI_PREFIX) =>
                {
                    self.insert(*alias, *canonical);
                }
                _ => bad.push(BadLine {
                    line: idx + 1,
                    tokens: tokens.iter().map(|t| t.to_string()).collect(),
                }),
            }
        }

        bad
    }

    /// Add entries from a parsed structured alias file. Returns aliases whose
    /// value was not a scalar and were skipped.
    pub fn extend_from_alias_file(&mut self, file: &AliasFile) -> Vec<String> {
        let mut skipped = Vec::new();

        for (key, value) in &file.aliases {
            match (scalar_to_string(key), scalar_to_string(value)) {
                (Some(alias), Some(canonical)) => {
                    self.insert(alias.clone(), canonical.clone());
                    // Legacy form: the bare DBLP id also resolves back to the alias
                    if canonical.contains("DBLP") {
                        if let Some(bare) = canonical.get(DBLP_PREFIX.len()..) {
                            self.reverse.insert(bare.to_string(), alias);
                        }
                    }
                }
                (alias, _) => skipped.push(alias.unwrap_or_else(|| format!("{:?}", key))),
            }
        }

        skipped
    }

    /// Build the table from optional bibcloud and structured alias files.
    /// The bibcloud file is read first, so structured entries win on collision.
    pub async fn load(bibcloud: Option<&Path>, structured: Option<&Path>) -> Result<Self> {
        let mut table = Self::new();

        if let Some(path) = bibcloud {
            let content = read(path).await?;
            for bad in table.extend_from_bibcloud(&content) {
                warn!(
                    "Alias parsing - bad line {} in {}: {:?}",
                    bad.line,
                    path.display(),
                    bad.tokens
                );
            }
        }

        if let Some(path) = structured {
            let content = read(path).await?;
            let file: AliasFile =
                serde_yaml::from_str(&content).map_err(|source| Error::AliasFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            for alias in table.extend_from_alias_file(&file) {
                warn!("Skipping alias {} in {}: not a scalar", alias, path.display());
            }
        }

        info!("Loaded {} aliases", table.len());
        Ok(table)
    }
}

async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Everything before the first `%`
fn strip_comment(line: &str) -> &str {
    match line.find('%') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
