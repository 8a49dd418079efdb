//! dblp2bib CLI
//!
//! Downloads BibTeX references from DBLP by key, DOI, or alias.

use anyhow::Result;
use clap::Parser;
use dblp2bib::fetch::{parse_base_url, DBLP_DOI_URL, DBLP_REC_URL};
use dblp2bib::{run_batch, BatchConfig, Endpoints, Error};
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dblp2bib")]
#[command(version)]
#[command(about = "Download BibTeX references from DBLP")]
#[command(long_about = "Download BibTeX references from DBLP.\n\nAccepts DBLP keys (DBLP:<key>) or DOIs (DOI:<doi>). Alternatively, every entry of an alias file is fetched, or only those cited in a LaTeX .aux file.")]
struct Cli {
    /// DBLP or DOI keys. DBLP keys must start with DBLP:<key>
    keys: Vec<String>,

    /// YAML alias file ('<alias>: DBLP:<key>' under 'aliases')
    #[arg(short = 'a', long = "aliasfile", value_name = "FILE")]
    alias_file: Option<PathBuf>,

    /// bibcloud alias file ('<alias> DBLP:<key>' or '<alias> DOI:<doi>')
    #[arg(short = 'b', long, value_name = "FILE")]
    bibcloud: Option<PathBuf>,

    /// .aux file of the LaTeX project; only its citations are fetched
    #[arg(long, value_name = "FILE")]
    aux: Option<PathBuf>,

    /// Output file
    #[arg(short, long, default_value = "DBLP.bib")]
    output: PathBuf,

    /// DBLP record endpoint
    #[arg(long, env = "DBLP2BIB_DBLP_URL", default_value = DBLP_REC_URL, value_parser = parse_base_url)]
    dblp_url: String,

    /// DOI endpoint
    #[arg(long, env = "DBLP2BIB_DOI_URL", default_value = DBLP_DOI_URL, value_parser = parse_base_url)]
    doi_url: String,

    /// Print a JSON summary to stdout
    #[arg(long)]
    json: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let config = BatchConfig {
        keys: cli.keys,
        alias_file: cli.alias_file,
        bibcloud: cli.bibcloud,
        aux: cli.aux,
        output: cli.output,
        endpoints: Endpoints {
            dblp: cli.dblp_url,
            doi: cli.doi_url,
        },
        color: !cli.no_color && std::io::stderr().is_terminal(),
    };

    let shutdown = async {
        // Without a handler, never cancel
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let report = match run_batch(&config, shutdown).await {
        Err(Error::Cancelled) => {
            eprintln!("Interrupted, no output written.");
            std::process::exit(130);
        }
        result => result?,
    };

    if cli.json {
        println!("{}", serde_json::to_string(&report)?);
    }

    Ok(())
}
