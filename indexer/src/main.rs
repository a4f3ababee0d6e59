use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use termindex_core::{Index, IndexConfig, Store, StoreConfig};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputPage {
    url: String,
    body: String,
}

#[derive(Parser)]
#[command(name = "termindex")]
#[command(about = "Term-frequency index over a key-value store", long_about = None)]
struct Cli {
    /// Store to use: memory, sled:<path> or redis://host[:port][/db]
    #[arg(long, global = true, env = "TERMINDEX_STORE")]
    store: Option<String>,
    /// JSON config file with `store` and `counter` sections
    #[arg(long, global = true, env = "TERMINDEX_CONFIG")]
    config: Option<PathBuf>,
    /// Stem terms (English) before counting
    #[arg(long, global = true, default_value_t = false)]
    stem: bool,
    /// Drop English stopwords before counting
    #[arg(long, global = true, default_value_t = false)]
    stopwords: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PurgeTarget {
    Urlsets,
    Counters,
    All,
}

#[derive(Subcommand)]
enum Commands {
    /// Index pages from JSON/JSONL ({"url", "body"}) or .txt files, or a directory of them
    Index {
        #[arg(long)]
        input: String,
    },
    /// Index two fixed pages and print the counts for "the"
    Demo,
    /// Occurrences of a term on one page
    Count {
        #[arg(long)]
        url: String,
        #[arg(long)]
        term: String,
    },
    /// Occurrences of a term on every page containing it
    Counts {
        #[arg(long)]
        term: String,
    },
    /// Pages containing a term
    Urls {
        #[arg(long)]
        term: String,
    },
    /// Every indexed term
    Terms,
    /// Every term with its pages and counts
    Dump,
    /// Delete one record family, or every key in the store
    Purge {
        #[arg(long, value_enum)]
        target: PurgeTarget,
    },
}

const DEMO_PAGES: [(&str, &str); 2] = [
    (
        "https://en.wikipedia.org/wiki/Java_(programming_language)",
        "Java is a high-level, class-based, object-oriented programming language. \
         The language is intended to let programmers write once, run anywhere.",
    ),
    (
        "https://en.wikipedia.org/wiki/Programming_language",
        "A programming language is a system of notation for writing computer programs. \
         The description of a programming language is usually split into the two components \
         of syntax and semantics.",
    ),
];

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => IndexConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => IndexConfig::default(),
    };
    if let Some(spec) = &cli.store {
        config.store = StoreConfig::parse(spec)?;
    }
    config.counter.stem |= cli.stem;
    config.counter.remove_stopwords |= cli.stopwords;

    let store = config.store.open().context("opening store")?;
    let index = Index::with_options(store, config.counter);
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Index { input } => index_input(&index, Path::new(&input))?,
        Commands::Demo => {
            for (url, body) in DEMO_PAGES {
                index.index_page(url, body)?;
            }
            for (url, count) in index.get_counts("the")? {
                writeln!(out, "{url}={count}")?;
            }
        }
        Commands::Count { url, term } => writeln!(out, "{}", index.get_count(&url, &term)?)?,
        Commands::Counts { term } => {
            for (url, count) in index.get_counts(&term)? {
                writeln!(out, "{url} {count}")?;
            }
        }
        Commands::Urls { term } => {
            for url in index.get_urls(&term)? {
                writeln!(out, "{url}")?;
            }
        }
        Commands::Terms => {
            for term in index.term_set()? {
                writeln!(out, "{term}")?;
            }
        }
        Commands::Dump => index.print_index(&mut out)?,
        Commands::Purge { target } => {
            let removed = match target {
                PurgeTarget::Urlsets => index.delete_url_sets()?,
                PurgeTarget::Counters => index.delete_term_counters()?,
                PurgeTarget::All => index.delete_all_keys()?,
            };
            writeln!(out, "removed {removed} keys")?;
        }
    }

    index.store().flush()?;
    Ok(())
}

fn index_input<S: Store>(index: &Index<S>, input: &Path) -> Result<()> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl" | "txt")) {
                files.push(p.to_path_buf());
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("input {} does not exist", input.display());
    }

    let mut pages = 0usize;
    for file in files {
        pages += match extension(&file) {
            Some("jsonl") => index_jsonl(index, &file)?,
            Some("txt") => index_text(index, &file)?,
            Some("json") => index_json(index, &file)?,
            _ => anyhow::bail!("{}: expected a .json, .jsonl or .txt file", file.display()),
        };
    }
    tracing::info!(pages, input = %input.display(), "indexing complete");
    Ok(())
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

fn index_jsonl<S: Store>(index: &Index<S>, file: &Path) -> Result<usize> {
    let reader = BufReader::new(File::open(file)?);
    let mut pages = 0;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let page: InputPage = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
        index.index_page(&page.url, &page.body)?;
        pages += 1;
    }
    Ok(pages)
}

fn index_json<S: Store>(index: &Index<S>, file: &Path) -> Result<usize> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", file.display()))?;
    let values = match json {
        serde_json::Value::Array(arr) => arr,
        obj @ serde_json::Value::Object(_) => vec![obj],
        _ => {
            tracing::warn!(file = %file.display(), "skipping json that is neither object nor array");
            return Ok(0);
        }
    };
    let mut pages = 0;
    for v in values {
        let page: InputPage = serde_json::from_value(v)?;
        index.index_page(&page.url, &page.body)?;
        pages += 1;
    }
    Ok(pages)
}

fn index_text<S: Store>(index: &Index<S>, file: &Path) -> Result<usize> {
    let body = fs::read_to_string(file)?;
    let path = fs::canonicalize(file)?;
    let url = format!("file://{}", path.display());
    index.index_page(&url, &body)?;
    Ok(1)
}
