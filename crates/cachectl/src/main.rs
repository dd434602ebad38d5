mod config;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use item_store::Store;

#[derive(Debug, Parser)]
#[command(name = "cachectl", about = "Interactive driver over an in-process item store")]
struct Cli {
    /// Optional YAML config file (hash power, CAS, slab geometry, memory budget).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run every line of this file as a command, instead of the one given on argv.
    #[arg(long, global = true)]
    script: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
enum Command {
    Get {
        key: String,
    },
    Set {
        key: String,
        value: String,
        #[arg(default_value_t = 0)]
        exptime: u32,
    },
    Cas {
        key: String,
        value: String,
        token: u64,
        #[arg(default_value_t = 0)]
        exptime: u32,
    },
    Append {
        key: String,
        value: String,
    },
    Prepend {
        key: String,
        value: String,
    },
    Update {
        key: String,
        value: String,
    },
    Delete {
        key: String,
    },
    Stats,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    let mut store = Store::setup(config);

    match cli.script {
        Some(path) => run_script(&mut store, &path)?,
        None => {
            let command = cli
                .command
                .ok_or_else(|| anyhow!("no command given and no --script file provided"))?;
            let output = dispatch(&mut store, command)?;
            println!("{output}");
        }
    }

    store.teardown();
    Ok(())
}

fn run_script(store: &mut Store, path: &std::path::Path) -> Result<()> {
    let text = std::fs::read_to_string(path)?;
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens = std::iter::once("cachectl").chain(line.split_whitespace());
        let parsed = Cli::try_parse_from(tokens)
            .map_err(|e| anyhow!("script line {}: {}", lineno + 1, e))?;
        let command = parsed
            .command
            .ok_or_else(|| anyhow!("script line {}: missing command", lineno + 1))?;
        let output = dispatch(store, command)?;
        println!("{output}");
    }
    Ok(())
}

fn dispatch(store: &mut Store, command: Command) -> Result<String> {
    match command {
        Command::Get { key } => match store.get(key.as_bytes()) {
            Some(it) => {
                let value = String::from_utf8_lossy(&store.value(it)).into_owned();
                store.release(it);
                Ok(value)
            }
            None => Ok("(not found)".to_string()),
        },
        Command::Set { key, value, exptime } => {
            store.set(key.as_bytes(), value.as_bytes(), exptime)?;
            Ok("OK".to_string())
        }
        Command::Cas { key, value, token, exptime } => {
            store.cas(key.as_bytes(), value.as_bytes(), exptime, token)?;
            Ok("OK".to_string())
        }
        Command::Append { key, value } => {
            store.annex(key.as_bytes(), value.as_bytes(), true)?;
            Ok("OK".to_string())
        }
        Command::Prepend { key, value } => {
            store.annex(key.as_bytes(), value.as_bytes(), false)?;
            Ok("OK".to_string())
        }
        Command::Update { key, value } => {
            let it = store
                .get(key.as_bytes())
                .ok_or_else(|| anyhow!("key not found"))?;
            let result = store.update(it, value.as_bytes());
            store.release(it);
            result?;
            Ok("OK".to_string())
        }
        Command::Delete { key } => {
            store.delete(key.as_bytes())?;
            Ok("OK".to_string())
        }
        Command::Stats => {
            let m = store.metrics();
            Ok(format!(
                "item_req={} item_req_ex={} item_link={} item_unlink={} item_remove={} item_curr={} item_keyval_byte={} item_val_byte={}",
                m.item_req,
                m.item_req_ex,
                m.item_link,
                m.item_unlink,
                m.item_remove,
                m.item_curr,
                m.item_keyval_byte,
                m.item_val_byte,
            ))
        }
    }
}
