use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use redishop_range::config::{Credentials, Settings};
use redishop_range::core::ScoreBound;
use redishop_range::query::{RangeJoinQuery, SortOrder};
use redishop_range::render::render_table;
use redishop_range::stats::PerfReport;
use redishop_range::store::RedisStore;
use tracing_subscriber::EnvFilter;

/// 按价格区间列出商品
#[derive(Parser, Debug)]
#[command(name = "between-range", version, about)]
struct Cli {
    /// 连接凭据文件（.json 或 .toml）
    #[arg(long)]
    credentials: PathBuf,

    /// 区间下界（数字或 -inf）
    #[arg(long, allow_hyphen_values = true)]
    start: ScoreBound,

    /// 区间上界（数字或 +inf）
    #[arg(long, allow_hyphen_values = true)]
    end: ScoreBound,

    /// 打印总耗时和 Redis 往返耗时
    #[arg(long)]
    perf: bool,

    /// 可选配置文件（TOML）
    #[arg(long)]
    config: Option<PathBuf>,

    /// key 前缀（默认 redishop）
    #[arg(long)]
    key_root: Option<String>,

    /// 价格索引有序集合的 key（默认 <key_root>:priceIndex）
    #[arg(long)]
    index_key: Option<String>,

    /// 事务往返超时（毫秒）
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// 按价格降序
    #[arg(long)]
    desc: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = match cli.config.clone().or_else(Settings::default_path) {
        Some(path) => Settings::load(&path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if cli.key_root.is_some() {
        settings.key_root = cli.key_root.clone();
    }
    if cli.index_key.is_some() {
        settings.index_key = cli.index_key.clone();
    }
    if cli.timeout_ms.is_some() {
        settings.timeout_ms = cli.timeout_ms;
    }

    let creds = Credentials::load(&cli.credentials)
        .with_context(|| format!("loading credentials from {}", cli.credentials.display()))?;
    let info = creds.connection_info().context("building connection info")?;
    // 先建连再计时，计时只覆盖查询本身
    let store = RedisStore::connect(info)
        .await
        .context("connecting to redis")?;

    let order = if cli.desc { SortOrder::Desc } else { SortOrder::Asc };
    let query = RangeJoinQuery::new(settings.index_key(), settings.namespace(), settings.temp_prefix())
        .with_order(order);

    let started = Instant::now();
    let rs = query
        .execute_with_deadline(&store, cli.start, cli.end, settings.timeout())
        .await
        .context("range query failed")?;
    let total: Duration = started.elapsed();

    if cli.perf {
        println!(
            "{}",
            PerfReport {
                total,
                store_round_trip: rs.round_trip,
            }
        );
    }
    println!("{}", render_table(&rs));

    drop(store);
    Ok(())
}
