use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use logtally_sampler::plan::parse_date;
use logtally_sampler::{LocalStore, LogStore, S3Store, SamplePlan, SampledLog, Sampler};
use logtally_shared::{log_system, logging, Config};

#[derive(Parser)]
#[command(name = "logtally-sample")]
#[command(about = "Download a representative sample of daily log files")]
struct Cli {
    /// Local mirror of the log bucket
    #[arg(long, conflicts_with = "bucket")]
    store: Option<PathBuf>,

    /// S3 bucket to download from directly
    #[arg(long)]
    bucket: Option<String>,

    /// AWS region of the bucket (default: from the AWS environment)
    #[arg(long)]
    region: Option<String>,

    /// Directory to download the sampled files into
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// Approximate number of files to sample
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// First date to sample (YYYY-MM-DD)
    #[arg(short, long)]
    start_date: Option<String>,

    /// Last date to sample (YYYY-MM-DD, default: today)
    #[arg(short, long)]
    end_date: Option<String>,

    /// Object key prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Seed for reproducible selection
    #[arg(long)]
    seed: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Config file path (default: auto-detect)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    // 進捗表示のため常に Info 以上
    let level = if cli.verbose || config.logging.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    logging::init(level, true);

    let settings = config.sampler;

    // フラグが設定ファイルより優先。設定ファイルに両方ある場合はバケットを使う
    let target = match (cli.store, cli.bucket) {
        (Some(root), _) => StoreTarget::Local(root),
        (None, Some(bucket)) => StoreTarget::S3(bucket),
        (None, None) => match (settings.bucket, settings.store_root) {
            (Some(bucket), _) => StoreTarget::S3(bucket),
            (None, Some(root)) => StoreTarget::Local(root),
            (None, None) => anyhow::bail!(
                "No store given (use --store or --bucket, or sampler.store_root / sampler.bucket in config)"
            ),
        },
    };
    let region = cli.region.or(settings.region);

    let destination = cli.destination.unwrap_or(settings.destination);
    let sample_count = cli.count.unwrap_or(settings.sample_count);
    let prefix = cli.prefix.unwrap_or(settings.key_prefix);

    let start = parse_date(cli.start_date.as_deref().unwrap_or(&settings.start_date))?;
    let end = match cli.end_date.as_deref() {
        Some(date) => parse_date(date)?,
        // 日付の境界は実行環境のローカル時刻
        None => chrono::Local::now().date_naive(),
    };
    let plan = SamplePlan::new(start, end, sample_count)?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let sampled = match target {
        StoreTarget::Local(root) => {
            let store = LocalStore::new(root)?;
            log_system!(debug, "using store at {}", store.root().display());
            run_sampler(store, destination, &prefix, &plan, &mut rng)?
        }
        StoreTarget::S3(bucket) => {
            let store = S3Store::new(&bucket, region.as_deref())
                .with_context(|| format!("Failed to set up S3 client for bucket {bucket}"))?;
            log_system!(debug, "using bucket s3://{}", store.bucket());
            run_sampler(store, destination, &prefix, &plan, &mut rng)?
        }
    };

    // ダウンロードしたファイルのパスを出力（logtally にそのまま渡せる）
    for log in &sampled {
        println!("{}", log.path.display());
    }

    Ok(())
}

enum StoreTarget {
    Local(PathBuf),
    S3(String),
}

fn run_sampler<S: LogStore>(
    store: S,
    destination: PathBuf,
    prefix: &str,
    plan: &SamplePlan,
    rng: &mut StdRng,
) -> Result<Vec<SampledLog>> {
    Sampler::new(store, destination, prefix).run(plan, rng)
}
