use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures::executor::block_on;
use libzhuyin::{
    create_session, open_store, BopomofoCodec, Candidate, ImeContext, JsonDictionary,
    SyllableCodec, ZhuyinConfig,
};
use zhuyin_core::{EncodedKey, StorageBackend};

#[derive(Parser)]
#[command(name = "zhuyin")]
#[command(about = "Zhuyin/Bopomofo phrase lookup over a redb dictionary")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bulk-load a JSON dictionary into the database
    Import {
        /// JSON dictionary file
        #[arg(short, long)]
        input: PathBuf,
        /// Database path (overrides the config)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Interactive session
    Repl {
        /// Database path (overrides the config)
        #[arg(long)]
        db: Option<PathBuf>,
        /// JSON dictionary to load first (overrides the config)
        #[arg(long)]
        dictionary: Option<PathBuf>,
    },
    /// Print the encoded units of a Bopomofo string
    Encode {
        input: String,
    },
    /// Print the Bopomofo spelling of hex units
    Decode {
        #[arg(required = true)]
        units: Vec<String>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<ZhuyinConfig> {
    match path {
        Some(p) => ZhuyinConfig::load_toml(p)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("reading config {}", p.display())),
        None => Ok(ZhuyinConfig::default()),
    }
}

fn handle_import(config: &ZhuyinConfig, input: PathBuf) -> Result<()> {
    let storage = open_store(&config.database)?;
    let records = zhuyin_core::DictionarySource::records(JsonDictionary::new(&input))?;
    let written = block_on(storage.bulk_load(records))?;
    println!(
        "imported {} keys from {} into {}",
        written,
        input.display(),
        config.database.display()
    );
    Ok(())
}

fn handle_encode(input: &str) -> Result<()> {
    let key = BopomofoCodec.encode(input)?;
    println!("{}", key);
    Ok(())
}

fn handle_decode(units: &[String]) -> Result<()> {
    let mut key = EncodedKey::new();
    for unit in units {
        let digits = unit.trim_start_matches("0x");
        let value = u16::from_str_radix(digits, 16)
            .with_context(|| format!("not a hex unit: {}", unit))?;
        if value > 0x7fff {
            bail!("unit out of range: {}", unit);
        }
        key.push(value);
    }
    println!("{}", BopomofoCodec.decode(&key));
    Ok(())
}

fn print_candidates(candidates: &[Candidate]) {
    for (i, c) in candidates.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, c.text, c.weight);
    }
}

fn run_repl(config: &ZhuyinConfig) -> Result<()> {
    let storage = open_store(&config.database)?;
    let mut ime = create_session(storage, config, ImeContext::new());
    if let Some(path) = &config.dictionary {
        match block_on(ime.load(JsonDictionary::new(path))) {
            Ok(count) => println!("loaded {} keys from {}", count, path.display()),
            Err(e) => eprintln!("warning: dictionary load failed: {}", e),
        }
    }

    println!("Bopomofo appends and queries, a number confirms.");
    println!("'-' deletes, '!' resets, 'quit' exits.");
    let stdin = io::stdin();
    loop {
        print!("{}> ", ime.syllables());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        match line {
            "quit" | "exit" => break,
            "!" => ime.reset(),
            "-" => {
                ime.pop_symbol();
                block_on(ime.query());
            }
            _ => {
                if let Ok(n) = line.trim().parse::<usize>() {
                    let picked = n.checked_sub(1).and_then(|i| ime.candidates().get(i)).cloned();
                    match picked {
                        Some(entry) => block_on(ime.confirm_selection(entry)),
                        None => eprintln!("no candidate {}", n),
                    }
                } else if let Err(e) = ime.append_symbols(line) {
                    eprintln!("error: {}", e);
                    continue;
                } else {
                    block_on(ime.query());
                }
            }
        }

        let ctx = ime.sink_mut();
        if let Some(err) = ctx.last_error.take() {
            eprintln!("error: {}", err);
        }
        if ctx.has_commit() {
            println!("commit: {}", ctx.take_commit());
        }
        print_candidates(ime.candidates());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Import { input, db } => {
            if let Some(db) = db {
                config.database = db;
            }
            handle_import(&config, input)
        }
        Commands::Repl { db, dictionary } => {
            if let Some(db) = db {
                config.database = db;
            }
            if dictionary.is_some() {
                config.dictionary = dictionary;
            }
            run_repl(&config)
        }
        Commands::Encode { input } => handle_encode(&input),
        Commands::Decode { units } => handle_decode(&units),
    }
}
