use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crawlsim_cli::config::{ConfigOverrides, PolicyConfig, RunConfig, SeedConfig};
use crawlsim_engine::frontier::FrontierPolicy;
use crawlsim_engine::orchestrator::OrchestratorConfig;
use crawlsim_engine::parser::ParserConfig;
use crawlsim_engine::seeds::SeedStrategy;
use crawlsim_engine::{AnySeenSet, CorpusIndex, DownloadLog, Orchestrator, Parser as LinkParser, QScoreTable};
use std::io::Write as _;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "crawlsim", version, about = "Replays a pre-enumerated corpus's link graph as a simulated crawl")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a simulated crawl driven by a TOML run config.
    Crawl(CrawlCmd),
    /// Convert a neutral URL/DocId pair file into a CorpusIndex file.
    BuildIndex(BuildIndexCmd),
    /// Emit a TREC run file from a completed crawl's DownloadLog.
    ShowRun(ShowRunCmd),
}

#[derive(clap::Args, Debug)]
struct CrawlCmd {
    /// Path to the TOML run config.
    #[arg(long)]
    config: PathBuf,

    /// Overrides `max_pages` from the config (0 = unlimited).
    #[arg(long)]
    max_pages: Option<u64>,

    /// Overrides `save_every_n_pages` from the config.
    #[arg(long)]
    save_every_n_pages: Option<u64>,

    /// Overrides `download_log_prefix` from the config.
    #[arg(long)]
    download_log_prefix: Option<PathBuf>,

    /// Overrides `seeds_sidecar` from the config.
    #[arg(long)]
    seeds_sidecar: Option<PathBuf>,

    /// Overrides `bitmap_capacity` from the config.
    #[arg(long)]
    bitmap_capacity: Option<u64>,

    /// Overrides `oracle_quality` from the config.
    #[arg(long)]
    oracle_quality: Option<bool>,
}

#[derive(clap::Args, Debug)]
struct BuildIndexCmd {
    /// Neutral pairs file: one `url<TAB>docid` per line.
    #[arg(long)]
    input: PathBuf,
    /// Destination CorpusIndex file.
    #[arg(long)]
    output: PathBuf,
}

#[derive(clap::Args, Debug)]
struct ShowRunCmd {
    /// Prefix passed to the crawl's DownloadLog (same as `download_log_prefix`).
    #[arg(long)]
    download_log_prefix: PathBuf,
    /// TREC query id to stamp every line with.
    #[arg(long)]
    query_id: String,
    /// TREC run name to stamp every line with.
    #[arg(long)]
    run_name: String,
    /// Write to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Only emit the first N downloaded docnos.
    #[arg(long)]
    limit: Option<u64>,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("crawlsim=warn".parse().unwrap()),
        )
        .with_target(false)
        .init();
}

fn policy_from_config(policy: &PolicyConfig) -> FrontierPolicy {
    match policy {
        PolicyConfig::Random { rng_seed } => FrontierPolicy::Random {
            rng_seed: *rng_seed,
        },
        PolicyConfig::Bfs => FrontierPolicy::Bfs,
        PolicyConfig::Dfs => FrontierPolicy::Dfs,
        PolicyConfig::QualityHeap => FrontierPolicy::QualityHeap,
        PolicyConfig::QualityUpdating { max_stale } => FrontierPolicy::QualityUpdating {
            max_stale: *max_stale,
        },
    }
}

fn seed_strategy_from_config(seeds: &SeedConfig) -> SeedStrategy {
    match seeds {
        SeedConfig::List { path } => SeedStrategy::List { path: path.clone() },
        SeedConfig::Random { n, rng_seed } => SeedStrategy::Random {
            n: *n,
            rng_seed: *rng_seed,
        },
    }
}

/// Parses a `docid<TAB>score` file into the parallel arrays `QScoreTable`
/// expects.
fn load_qscores(path: &std::path::Path) -> Result<QScoreTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading qscores file {}", path.display()))?;
    let mut docids = Vec::new();
    let mut scores = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (docid, score) = line
            .split_once('\t')
            .with_context(|| format!("{}:{}: expected `docid<TAB>score`", path.display(), lineno + 1))?;
        docids.push(docid.to_string());
        scores.push(
            score
                .trim()
                .parse::<f32>()
                .with_context(|| format!("{}:{}: invalid score", path.display(), lineno + 1))?,
        );
    }
    Ok(QScoreTable::from_parallel_arrays(docids, scores))
}

fn run_crawl(cmd: CrawlCmd) -> Result<()> {
    let overrides = ConfigOverrides {
        max_pages: cmd.max_pages,
        save_every_n_pages: cmd.save_every_n_pages,
        download_log_prefix: cmd.download_log_prefix,
        seeds_sidecar: cmd.seeds_sidecar,
        bitmap_capacity: cmd.bitmap_capacity,
        oracle_quality: cmd.oracle_quality,
    };
    let config = overrides.apply(RunConfig::load(&cmd.config)?);

    let corpus = CorpusIndex::load(&config.corpus_index)
        .with_context(|| format!("loading corpus index {}", config.corpus_index.display()))?;
    let qtable = match &config.qscores_path {
        Some(path) => load_qscores(path)?,
        None => QScoreTable::default(),
    };

    let policy = policy_from_config(&config.policy);
    let parser = LinkParser::new(
        ParserConfig {
            parse_qscores: policy.is_quality_based(),
            parse_inlinks: config.inlinks_dir.is_some(),
        },
        config.outlinks_dir.clone(),
        config.inlinks_dir.clone(),
        &qtable,
    );

    let seen = match config.bitmap_capacity {
        Some(cap) => AnySeenSet::bitmap(cap),
        None => AnySeenSet::hashed(),
    };

    let download_log = DownloadLog::new(&config.download_log_prefix, config.save_every_n_pages.max(1));

    let mut orchestrator = Orchestrator::new(
        &corpus,
        seen,
        policy,
        parser,
        download_log,
        OrchestratorConfig {
            save_every_n_pages: config.save_every_n_pages,
            max_pages: config.max_pages,
            oracle_quality: config.oracle_quality,
        },
    );

    let strategy = seed_strategy_from_config(&config.seeds);
    let seeds = strategy.build(&corpus).generate()?;
    orchestrator.populate_frontier(&seeds, &config.seeds_sidecar)?;
    orchestrator.crawl()?;

    let counters = orchestrator.counters();
    tracing::info!(?counters, "run complete");
    Ok(())
}

fn run_build_index(cmd: BuildIndexCmd) -> Result<()> {
    let text = std::fs::read_to_string(&cmd.input)
        .with_context(|| format!("reading pairs file {}", cmd.input.display()))?;
    let mut pairs = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (url, docid) = line
            .split_once('\t')
            .with_context(|| format!("{}:{}: expected `url<TAB>docid`", cmd.input.display(), lineno + 1))?;
        pairs.push((url.to_string(), docid.to_string()));
    }
    CorpusIndex::save(&cmd.output, &pairs)
        .with_context(|| format!("writing corpus index {}", cmd.output.display()))?;
    tracing::info!(pairs = pairs.len(), path = %cmd.output.display(), "corpus index built");
    Ok(())
}

fn run_show_run(cmd: ShowRunCmd) -> Result<()> {
    let docnos = DownloadLog::load_all(&cmd.download_log_prefix, cmd.limit)
        .with_context(|| format!("reading download log {}", cmd.download_log_prefix.display()))?;
    match cmd.output {
        Some(path) => {
            let mut file =
                std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
            crawlsim_engine::run_output::write_trec_run(&mut file, &cmd.query_id, &cmd.run_name, &docnos)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            crawlsim_engine::run_output::write_trec_run(&mut lock, &cmd.query_id, &cmd.run_name, &docnos)?;
            lock.flush()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Crawl(cmd) => run_crawl(cmd),
        Commands::BuildIndex(cmd) => run_build_index(cmd),
        Commands::ShowRun(cmd) => run_show_run(cmd),
    }
}
