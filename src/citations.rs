//! Citation extraction from LaTeX `.aux` files
//!
//! Both bibtex (`\citation{a,b}`) and biblatex (`\abx@aux@cite{a}`) logging
//! conventions are recognized.

use crate::error::{Error, Result};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

static CITATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(?:citation|abx@aux@cite)\{([^}]*)\}").expect("Invalid citation regex pattern")
});
static BIBSTYLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\bibstyle\{([^}]*)\}").expect("Invalid bibstyle regex pattern"));

/// Citations referenced by a LaTeX document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxCitations {
    /// Active `\bibstyle`, only set when exactly one directive is present
    pub bibstyle: Option<String>,
    /// Distinct citation keys, sorted
    pub keys: Vec<String>,
}

/// Resolve `path`, falling back to `path.aux`
pub fn resolve_aux_path(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    let mut with_ext = OsString::from(path.as_os_str());
    with_ext.push(".aux");
    let with_ext = PathBuf::from(with_ext);
    if with_ext.is_file() {
        return Ok(with_ext);
    }

    Err(Error::AuxNotFound(path.to_path_buf()))
}

/// Raw key list of a citation command on this line, if any. The closing
/// brace must be on the same line: a truncated `\citation{a,b` yields
/// nothing rather than a partial key list.
pub fn find_citation(line: &str) -> Option<&str> {
    CITATION_REGEX
        .captures(line)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

fn find_bibstyle(lines: &[&str]) -> Option<String> {
    let directives: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|l| l.contains("\\bibstyle"))
        .collect();

    match directives.as_slice() {
        [line] => BIBSTYLE_REGEX
            .captures(line)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_string()),
        _ => None,
    }
}

/// Parse the content of an `.aux` file
pub fn parse_aux(content: &str) -> AuxCitations {
    let lines: Vec<&str> = content.lines().map(str::trim).collect();

    let keys: BTreeSet<String> = lines
        .iter()
        .filter_map(|line| find_citation(line))
        .flat_map(|list| list.split(','))
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(String::from)
        .collect();

    AuxCitations {
        bibstyle: find_bibstyle(&lines),
        keys: keys.into_iter().collect(),
    }
}

/// Read an `.aux` file (or `<path>.aux`) and collect its citations
pub async fn load_citations(path: &Path) -> Result<AuxCitations> {
    let path = resolve_aux_path(path)?;
    info!("Parsing {}", path.display());

    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| Error::Read {
            path: path.clone(),
            source,
        })?;

    let citations = parse_aux(&content);
    if let Some(style) = &citations.bibstyle {
        info!("Bibliography style: {}", style);
    }
    info!(
        "Found {} citations in {}",
        citations.keys.len(),
        path.display()
    );

    Ok(citations)
}
