// Copyright (c) 2018 10x Genomics, Inc. All rights reserved.

//! Run one low-complexity filtering request against an on-disk reads store.
//!
//! The request is a JSON file with the fields of `FilterParams`; the
//! outcome is printed to stdout as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use lc_filter::utils::read_json;
use lc_filter::{exec_read_library_lc_filter, DirStore, FilterParams};

#[derive(Parser, Debug)]
#[clap(
    name = "lc_filter",
    about = "Filter a reads library by DUST or entropy low-complexity score"
)]
struct Args {
    /// Request parameters (JSON)
    params: PathBuf,

    /// Root directory of the reads store
    #[clap(long)]
    store: PathBuf,

    /// Number of threads used to score reads (0: one per core)
    #[clap(short = 't', long, default_value_t = 0)]
    threads: usize,

    /// Log debug messages
    #[clap(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()?;

    let params: FilterParams = read_json(&args.params)?;
    let store = DirStore::new(&args.store)
        .with_context(|| format!("couldn't open reads store {:?}", args.store))?;

    let outcome = exec_read_library_lc_filter(&store, &params)?;
    for line in outcome.report.to_string().lines() {
        log::info!("{}", line);
    }

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threads_uses_all_cores() {
        let args = Args::parse_from(["lc_filter", "--store", "store", "params.json"]);
        assert_eq!(args.threads, 0);
        assert!(!args.verbose);

        let args = Args::parse_from(["lc_filter", "--store", "store", "-t", "4", "params.json"]);
        assert_eq!(args.threads, 4);
        assert_eq!(args.params, PathBuf::from("params.json"));
    }
}
