//! Alias file schema and remote key model
//!
//! Structured alias files are YAML with a single top-level `aliases` mapping:
//!
//! ```yaml
//! aliases:
//!   smith20: DBLP:conf/x/Smith20
//!   doe21: DOI:10.1145/3319535.3354209
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_yaml::Mapping;

/// Root structure of a structured alias file
#[derive(Debug, Clone, Deserialize)]
pub struct AliasFile {
    /// Alias -> canonical key, in file order
    #[serde(deserialize_with = "required_mapping")]
    pub aliases: Mapping,
}

// `aliases:` with nothing under it parses as null
fn required_mapping<'de, D>(deserializer: D) -> Result<Mapping, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Mapping>::deserialize(deserializer)?
        .ok_or_else(|| D::Error::custom("`aliases` must be a mapping"))
}

/// Remote service a canonical key is looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// DBLP record endpoint (`DBLP:<id>`)
    Dblp,
    /// DBLP DOI endpoint (`DOI:<id>` or a bare DOI)
    Doi,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Dblp => write!(f, "DBLP"),
            Source::Doi => write!(f, "DOI"),
        }
    }
}

pub const DBLP_PREFIX: &str = "DBLP:";
pub const DOI_PREFIX: &str = "DOI:";

/// A citation key split into its source and the id the source knows it by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteKey<'a> {
    pub source: Source,
    pub id: &'a str,
}

impl<'a> RemoteKey<'a> {
    /// Classify a canonical key. Anything without a recognized prefix is
    /// treated as a bare DOI.
    pub fn parse(key: &'a str) -> Self {
        if let Some(id) = key.strip_prefix(DBLP_PREFIX) {
            Self {
                source: Source::Dblp,
                id,
            }
        } else if let Some(id) = key.strip_prefix(DOI_PREFIX) {
            Self {
                source: Source::Doi,
                id,
            }
        } else {
            Self {
                source: Source::Doi,
                id: key,
            }
        }
    }
}

/// Crude structural check for a single BibTeX record: it must start with `@`
/// and its third-from-last character must be `}`.
pub fn is_well_formed(record: &str) -> bool {
    record.starts_with('@') && record.chars().rev().nth(2) == Some('}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_display() {
        assert_eq!(Source::Dblp.to_string(), "DBLP");
        assert_eq!(Source::Doi.to_string(), "DOI");
    }

    #[test]
    fn test_parse_remote_key() {
        assert_eq!(
            RemoteKey::parse("DBLP:conf/x/Smith20"),
            RemoteKey {
                source: Source::Dblp,
                id: "conf/x/Smith20"
            }
        );
        assert_eq!(
            RemoteKey::parse("DOI:10.1145/3319535.3354209"),
            RemoteKey {
                source: Source::Doi,
                id: "10.1145/3319535.3354209"
            }
        );
        // Bare keys fall through to the DOI endpoint untouched
        assert_eq!(
            RemoteKey::parse("10.1145/3319535.3354209"),
            RemoteKey {
                source: Source::Doi,
                id: "10.1145/3319535.3354209"
            }
        );
    }

    #[test]
    fn test_prefix_only_at_start() {
        let key = RemoteKey::parse("xDBLP:conf/x/Smith20");
        assert_eq!(key.source, Source::Doi);
        assert_eq!(key.id, "xDBLP:conf/x/Smith20");
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("@inproceedings{DBLP:conf/x/Smith20,\n  title = {T}\n}\n\n"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("<html>not found</html>\n\n"));
        assert!(!is_well_formed("@article{k,\n  title = T\n}"));
        assert!(!is_well_formed(" @article{k,\n}\n\n"));
    }

    #[test]
    fn test_alias_file_keeps_order() {
        let yaml = "aliases:\n  zeta: DBLP:conf/z/Z20\n  alpha: DOI:10.1/a\n  mid: DBLP:conf/m/M21\n";
        let file: AliasFile = serde_yaml::from_str(yaml).unwrap();
        let keys: Vec<&str> = file
            .aliases
            .keys()
            .map(|k| k.as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_alias_file_requires_aliases() {
        assert!(serde_yaml::from_str::<AliasFile>("alias:\n  foo: DBLP:a/b\n").is_err());
        assert!(serde_yaml::from_str::<AliasFile>("aliases:\n").is_err());
        assert!(serde_yaml::from_str::<AliasFile>("aliases: [a, b]\n").is_err());

        let file: AliasFile = serde_yaml::from_str("aliases: {}\n").unwrap();
        assert!(file.aliases.is_empty());
    }
}
