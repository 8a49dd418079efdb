//! dblp2bib: BibTeX references from DBLP
//!
//! Resolves DBLP keys, DOIs, or user aliases to BibTeX records:
//! - aliases: bibcloud and YAML alias files
//! - citations: citation keys of a LaTeX `.aux` file
//! - fetch: one record per key from the DBLP endpoints
//! - batch: the end-to-end run

pub mod aliases;
pub mod batch;
pub mod citations;
pub mod error;
pub mod fetch;
pub mod schema;

pub use aliases::AliasTable;
pub use batch::{run_batch, BatchConfig, BatchReport};
pub use citations::{load_citations, AuxCitations};
pub use error::{Error, Result};
pub use fetch::{Endpoints, FetchError, Fetcher};
