use std::path::PathBuf;

use anyhow::Context;
use chirpy_store::config::StoreConfig;
use chirpy_store::ChirpRepository;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chirpy-store", about = "Inspect and edit a chirpy JSON database")]
struct Cli {
    /// TOML 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 数据文件路径（覆盖配置）
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 新建一条 chirp
    Create {
        #[arg(long)]
        author: i64,
        body: String,
    },
    /// 按 id 查询
    Get { id: u64 },
    /// 列出全部（按 id 排序）
    List,
    /// 存储概况
    Stats {
        /// 输出 JSON 而非表格
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = StoreConfig::load_or_default(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        cfg.db_path = db;
    }

    let repo = ChirpRepository::open_with(&cfg.db_path, cfg.database_options())
        .with_context(|| format!("open database {}", cfg.db_path.display()))?;

    match cli.command {
        Command::Create { author, body } => {
            let chirp = repo.create_chirp(&body, author)?;
            println!("{}", serde_json::to_string_pretty(&chirp)?);
        }
        Command::Get { id } => {
            let chirp = repo
                .get_chirp(id)
                .with_context(|| format!("chirp {id}"))?;
            println!("{}", serde_json::to_string_pretty(&chirp)?);
        }
        Command::List => {
            let mut chirps = repo.get_chirps()?;
            chirps.sort_by_key(|c| c.id);
            println!("{}", serde_json::to_string_pretty(&chirps)?);
        }
        Command::Stats { json } => {
            let report = repo.stats()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }
    }

    Ok(())
}
