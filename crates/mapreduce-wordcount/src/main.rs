//! `distwc` — a word-count driver built on top of `mapreduce-core`.
//!
//! Tokenizes each input file on whitespace, emits `(token, "1")` pairs, and
//! counts occurrences per partition, writing one `result-<partition>.txt`
//! per partition in the current directory.
//!
//! ```shell
//! distwc --workers 10 --partitions 1 file1.txt file2.txt
//! ```

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use mapreduce_core::{EmitCtx, ReduceCtx};

#[derive(Parser, Debug)]
#[command(about = "distributed word count over mapreduce-core")]
struct Cli {
    /// Input files to count words in
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Number of worker threads
    #[arg(long, default_value_t = 10)]
    workers: usize,

    /// Number of intermediate partitions
    #[arg(long, default_value_t = 1)]
    partitions: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let start = Instant::now();

    mapreduce_core::run(
        &cli.files,
        map_file,
        reduce_key,
        cli.workers,
        cli.partitions,
    )
    .context("mapreduce run failed")?;

    let elapsed = start.elapsed();
    println!("Total Time: {}.{:02}", elapsed.as_secs(), elapsed.subsec_millis() / 10);
    Ok(())
}

fn map_file(path: &std::path::Path, ctx: &EmitCtx) {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "failed to read input file");
            return;
        }
    };
    for token in text.split_whitespace() {
        ctx.emit(token, "1");
    }
}

fn reduce_key(key: &str, ctx: &ReduceCtx) {
    let mut count = 0usize;
    while ctx.get_next(key).is_some() {
        count += 1;
    }

    let name = format!("result-{}.txt", ctx.partition());
    match OpenOptions::new().create(true).append(true).open(&name) {
        Ok(mut file) => {
            if let Err(err) = writeln!(file, "{key}: {count}") {
                tracing::error!(file = %name, error = %err, "failed to write result");
            }
        }
        Err(err) => {
            tracing::error!(file = %name, error = %err, "failed to open result file");
        }
    }
}
