//! Normalize BibTeX files and print them back out
//!
//! ```text
//! bibconv [--quotes] [--ascii] [--config FILE] <file.bib>...
//! ```

use bibnorm::{normalize_record, parse_records, Config, KeyGenerator, Result, Writer};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {program} [--quotes] [--ascii] [--config FILE] <bibtex-file>...");
    process::exit(1);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bibnorm=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("bibconv", String::as_str);

    let mut config = Config::default();
    let mut quotes = false;
    let mut ascii = false;
    let mut files = Vec::new();

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--quotes" => quotes = true,
            "--ascii" => ascii = true,
            "--config" => match rest.next() {
                Some(path) => config = Config::from_file(path)?,
                None => usage(program),
            },
            "-h" | "--help" => usage(program),
            _ => files.push(arg.clone()),
        }
    }
    if files.is_empty() {
        usage(program);
    }

    // Flags win over the config file
    if quotes {
        config.writer.use_braces = false;
    }
    if ascii {
        config.writer.transliterate = true;
    }

    let stdout = io::stdout();
    let mut writer = Writer::with_config(stdout.lock(), config.writer.clone());
    let mut keys = KeyGenerator::new(config.key_format.clone());

    for file in &files {
        let content = fs::read_to_string(file)?;
        let records = parse_records(content)?;
        info!(file = %file, records = records.len(), "read");

        let mut entries: Vec<_> = records
            .into_iter()
            .map(|mut record| normalize_record(&mut record))
            .collect();
        // Existing keys are taken before any are generated
        for bib in entries.iter().filter(|bib| !bib.key().is_empty()) {
            keys.reserve(bib.key());
        }
        for bib in &mut entries {
            if bib.key().is_empty() {
                let key = keys.generate(bib);
                bib.set_key(key);
            }
            writer.write_entry(bib)?;
        }
    }

    writer.into_inner().flush()?;
    Ok(())
}
