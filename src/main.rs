//! Sheetable - query and edit a spreadsheet grid as a table of named fields.

mod config;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use sheetable_core::{CsvStore, Filter, ReadOptions, Record, Table};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sheetable", version, about)]
struct Cli {
    /// Table config file (TOML). Defaults to tables.toml in the user config dir.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// CSV file backing the table, overriding the config.
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Match rows where FIELD equals VALUE (repeatable).
    #[arg(long = "where", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    equals: Vec<(String, String)>,

    /// Match rows where FIELD has no value (repeatable).
    #[arg(long = "where-absent", value_name = "FIELD")]
    absent: Vec<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> Option<Filter> {
        if self.equals.is_empty() && self.absent.is_empty() {
            return None;
        }
        let mut filter = Filter::new();
        for (field, value) in &self.equals {
            filter = filter.equals(field, value);
        }
        for field in &self.absent {
            filter = filter.absent(field);
        }
        Some(filter)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the number of rows.
    Count,
    /// Print matching rows as JSON lines.
    Read {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        offset: Option<usize>,
    },
    /// Set fields on every matching row.
    Update {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment, required = true)]
        set: Vec<(String, String)>,
    },
    /// Delete matching rows.
    Delete {
        #[command(flatten)]
        filter: FilterArgs,
        /// Required to delete every row when no filter is given.
        #[arg(long)]
        all: bool,
    },
    /// Append a row.
    Create {
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment, required = true)]
        set: Vec<(String, String)>,
    },
    /// List sheets of the document.
    Sheets,
}

fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", s))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{}'", s));
    }
    Ok((field.to_string(), value.to_string()))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    let loaded = config::load_config(cli.config.as_deref(), cli.file.as_deref())?;
    log::debug!("table {:?} backed by {}", loaded.table, loaded.file.display());

    let store = CsvStore::open(&loaded.file, &loaded.table.table_id, loaded.table.sheet.as_deref())
        .await
        .with_context(|| format!("Failed to open {}", loaded.file.display()))?;
    let table = Table::new(store, loaded.scheme, loaded.table);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Count => {
            writeln!(out, "{}", table.count().await?)?;
        }
        Command::Read {
            filter,
            limit,
            offset,
        } => {
            let options = ReadOptions {
                filter: filter.to_filter(),
                limit,
                offset,
            };
            for row in table.read(options).await? {
                writeln!(out, "{}", serde_json::to_string(&row)?)?;
            }
        }
        Command::Update { filter, set } => {
            let data: Record = set.into_iter().collect();
            let filter = filter.to_filter().unwrap_or_default();
            if table.update(&filter, &data).await? {
                writeln!(out, "updated")?;
            } else {
                writeln!(out, "table is empty")?;
            }
        }
        Command::Delete { filter, all } => {
            let filter = filter.to_filter();
            if filter.is_none() && !all {
                bail!("refusing to delete every row without --all");
            }
            if table.delete(filter.as_ref()).await? {
                writeln!(out, "deleted")?;
            } else {
                writeln!(out, "table is empty")?;
            }
        }
        Command::Create { set } => {
            let data: Record = set.into_iter().collect();
            table.create(&data).await?;
            writeln!(out, "created")?;
        }
        Command::Sheets => {
            for sheet in table.read_sheets().await? {
                writeln!(out, "{}", serde_json::to_string(&sheet)?)?;
            }
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
