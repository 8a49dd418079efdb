//! Record fetcher: download one BibTeX record per canonical key
//!
//! DBLP keys are looked up at the DBLP record endpoint, everything else at the
//! DOI endpoint. A record whose key has an alias gets its citation key
//! rewritten to that alias.

use crate::aliases::AliasTable;
use crate::schema::{is_well_formed, RemoteKey, Source};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use reqwest::Client;
use thiserror::Error;
use url::Url;

pub const DBLP_REC_URL: &str = "https://dblp.uni-trier.de/rec";
pub const DBLP_DOI_URL: &str = "https://dblp.org/doi";

// `{` up to the first comma on the same line: the record's citation key
static CITE_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^,\n]+,").expect("Invalid citation key regex pattern"));

/// Per-key fetch failure. Never aborts the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("malformed record for key {key}, url: {url}")]
    Malformed { key: String, url: String },

    #[error("cannot fetch {key}, url: {url}: {source}")]
    Network {
        key: String,
        url: String,
        source: reqwest::Error,
    },
}

/// Base URLs of the two lookup endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub dblp: String,
    pub doi: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            dblp: DBLP_REC_URL.to_string(),
            doi: DBLP_DOI_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub fn base(&self, source: Source) -> &str {
        match source {
            Source::Dblp => &self.dblp,
            Source::Doi => &self.doi,
        }
    }

    /// `<base>/<id>.bib`
    pub fn record_url(&self, key: &RemoteKey) -> String {
        format!(
            "{}/{}.bib",
            self.base(key.source).trim_end_matches('/'),
            key.id
        )
    }
}

/// clap value parser for endpoint base URLs
pub fn parse_base_url(s: &str) -> Result<String, String> {
    let url = Url::parse(s).map_err(|e| format!("invalid URL '{}': {}", s, e))?;
    match url.scheme() {
        "http" | "https" => Ok(s.trim_end_matches('/').to_string()),
        other => Err(format!("unsupported scheme '{}' in {}", other, s)),
    }
}

/// Replace the citation key of a record, leaving the rest untouched
pub fn rewrite_key(record: &str, key: &str) -> String {
    let replacement = format!("{{{},", key);
    CITE_KEY_REGEX
        .replacen(record, 1, NoExpand(&replacement))
        .into_owned()
}

pub struct Fetcher {
    client: Client,
    endpoints: Endpoints,
}

impl Fetcher {
    pub fn new(endpoints: Endpoints) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self { client, endpoints })
    }

    /// Fetch the record for `label` (a canonical key) and substitute its
    /// alias, if any, as the citation key.
    pub async fn fetch(&self, label: &str, aliases: &AliasTable) -> Result<String, FetchError> {
        let key = RemoteKey::parse(label);
        let url = self.endpoints.record_url(&key);
        debug!("GET {} ({})", url, key.source);

        let network = |source: reqwest::Error| FetchError::Network {
            key: key.id.to_string(),
            url: url.clone(),
            source,
        };
        let body = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(network)?
            .text()
            .await
            .map_err(network)?;

        if !is_well_formed(&body) {
            return Err(FetchError::Malformed {
                key: key.id.to_string(),
                url,
            });
        }

        match aliases.alias_for(label) {
            Some(alias) => {
                info!("Replace {} with {}", label, alias);
                Ok(rewrite_key(&body, alias))
            }
            None => Ok(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = "@inproceedings{DBLP:conf/x/Smith20,\n  author    = {Alice Smith},\n  title     = {On Things, and Stuff},\n  year      = {2020}\n}\n\n";

    #[test]
    fn test_rewrite_key() {
        let rewritten = rewrite_key(RECORD, "smith20");
        assert!(rewritten.starts_with("@inproceedings{smith20,\n"));
        assert_eq!(
            rewritten.trim_start_matches("@inproceedings{smith20,"),
            RECORD.trim_start_matches("@inproceedings{DBLP:conf/x/Smith20,")
        );
    }

    #[test]
    fn test_rewrite_key_only_first() {
        let two = format!("{}{}", RECORD, RECORD);
        let rewritten = rewrite_key(&two, "smith20");
        assert_eq!(rewritten.matches("{smith20,").count(), 1);
        assert_eq!(rewritten.matches("{DBLP:conf/x/Smith20,").count(), 1);
    }

    #[test]
    fn test_rewrite_key_no_expansion() {
        let rewritten = rewrite_key(RECORD, "a$1b");
        assert!(rewritten.starts_with("@inproceedings{a$1b,"));
    }

    #[test]
    fn test_record_url() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.record_url(&RemoteKey::parse("DBLP:conf/x/Smith20")),
            "https://dblp.uni-trier.de/rec/conf/x/Smith20.bib"
        );
        assert_eq!(
            endpoints.record_url(&RemoteKey::parse("DOI:10.1145/3319535.3354209")),
            "https://dblp.org/doi/10.1145/3319535.3354209.bib"
        );
        assert_eq!(
            endpoints.record_url(&RemoteKey::parse("10.1145/3319535.3354209")),
            "https://dblp.org/doi/10.1145/3319535.3354209.bib"
        );
    }

    #[test]
    fn test_record_url_trailing_slash() {
        let endpoints = Endpoints {
            dblp: "http://localhost:8080/rec/".to_string(),
            doi: "http://localhost:8080/doi".to_string(),
        };
        assert_eq!(
            endpoints.record_url(&RemoteKey::parse("DBLP:a/b")),
            "http://localhost:8080/rec/a/b.bib"
        );
    }

    #[test]
    fn test_parse_base_url() {
        assert_eq!(
            parse_base_url("https://dblp.org/doi/").unwrap(),
            "https://dblp.org/doi"
        );
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("ftp://dblp.org/rec").is_err());
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Malformed {
            key: "conf/x/Smith20".to_string(),
            url: "https://dblp.uni-trier.de/rec/conf/x/Smith20.bib".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "malformed record for key conf/x/Smith20, url: https://dblp.uni-trier.de/rec/conf/x/Smith20.bib"
        );
    }
}
