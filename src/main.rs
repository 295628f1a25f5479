use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use buzzer_insider::config::{AppConfig, LinkDomain, DEFAULT_CONFIG_PATH};
use buzzer_insider::db::store::Store;
use buzzer_insider::detection::{extractor, period};
use buzzer_insider::monitoring::logger;
use buzzer_insider::report::aggregate::{self, Summary};
use buzzer_insider::report::describe::{self, RenderOptions};
use buzzer_insider::report::distance::{self, ShotDistances};
use buzzer_insider::report::inspect;
use buzzer_insider::report::RecordFilter;
use buzzer_insider::timeline::loader::JsonDirSource;
use buzzer_insider::timeline::TimelineSource;

#[derive(Debug, Parser)]
#[command(name = "buzzer-insider", about = "Find and describe buzzerbeaters in BuzzerBeater matches")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the SQLite database path.
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scan match timelines and store every buzzerbeater found.
    Extract(ExtractArgs),
    /// Render stored buzzerbeaters as text, with optional summaries.
    Describe(DescribeArgs),
    /// Rewrite legacy `Reg` period tags to `Q4`.
    NormalizePeriods,
    /// Show what happened inside each buzzer window of a match.
    Inspect(InspectArgs),
    /// Print the shot distance distribution split by shot value.
    ShotDistances(ShotDistancesArgs),
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Directory of `report_<match_id>.json` files (defaults to the configured one).
    #[arg(long)]
    matches_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Print what would be stored instead of writing to the database.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    #[arg(long)]
    team_id: Option<u32>,
    #[arg(long)]
    opponent_id: Option<u32>,
    #[arg(long)]
    match_id: Option<u32>,
    #[arg(long)]
    player_id: Option<u32>,
    /// Only buzzerbeaters that changed the outcome of their period.
    #[arg(long)]
    only_outcome_change: bool,
    /// Drop identity tags and viewer links.
    #[arg(long)]
    no_url: bool,
    #[arg(long, value_enum)]
    link_domain: Option<LinkDomain>,
    /// 0 = tab-separated columns, 1 or more = full sentence.
    #[arg(long)]
    verbosity: Option<u8>,
    /// Comma separated columns for verbosity 0.
    #[arg(long)]
    columns: Option<String>,
    /// Append summary statistics.
    #[arg(long)]
    summary: bool,
    #[arg(long)]
    top_players: Option<usize>,
    /// List players with several buzzerbeaters in one match.
    #[arg(long)]
    multi_buzzer_games: bool,
    /// List teams with buzzerbeaters from several players in one match.
    #[arg(long)]
    multi_player_games: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Inspect a single match.
    #[arg(long)]
    match_id: Option<u32>,
    /// Maximum number of matches to print.
    #[arg(long, default_value_t = 20)]
    limit: usize,
    /// Include matches that ended in regulation.
    #[arg(long)]
    include_non_ot: bool,
    #[arg(long)]
    only_buzzer_comments: bool,
}

#[derive(Debug, Args)]
struct ShotDistancesArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Histogram bin width in feet.
    #[arg(long, default_value_t = 0.5)]
    bin_width: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(&cli.config)?;
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    logger::init_logging(&config.monitoring)?;

    match cli.command {
        Command::Extract(args) => run_extract(&config, args).await,
        Command::Describe(args) => run_describe(&config, args).await,
        Command::NormalizePeriods => run_normalize(&config).await,
        Command::Inspect(args) => run_inspect(&config, args).await,
        Command::ShotDistances(args) => run_shot_distances(&config, args).await,
    }
}

fn open_source(config: &AppConfig, args: &SourceArgs) -> JsonDirSource {
    let dir = args
        .matches_dir
        .clone()
        .unwrap_or_else(|| config.source.matches_dir.clone());
    JsonDirSource::new(dir)
}

fn render_options(config: &AppConfig, args: &DescribeArgs) -> RenderOptions {
    let verbosity = args.verbosity.unwrap_or(config.report.verbosity);
    let domain = args.link_domain.unwrap_or(config.report.link_domain);
    let columns = args.columns.as_deref().unwrap_or(&config.report.columns);
    RenderOptions {
        verbosity,
        decorate: !args.no_url,
        link_base_url: domain.base_url().to_string(),
        columns: describe::parse_columns(columns),
    }
}

async fn run_extract(config: &AppConfig, args: ExtractArgs) -> Result<()> {
    let source = open_source(config, &args.source);
    let store = if args.dry_run {
        None
    } else {
        Some(Store::new(&config.database.path).await?)
    };

    let match_ids = source.match_ids().await?;
    tracing::info!(source = source.name(), matches = match_ids.len(), "Starting extraction");

    let options = RenderOptions::default();
    let (mut scanned, mut found, mut upserted, mut skipped) = (0usize, 0usize, 0u64, 0usize);

    for match_id in match_ids {
        let loaded = match source.load(match_id).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(match_id, error = %e, "Skipping unreadable match");
                skipped += 1;
                continue;
            }
        };
        scanned += 1;
        if loaded.skipped_events > 0 {
            tracing::debug!(match_id, skipped_events = loaded.skipped_events, "Dropped malformed events");
        }

        let records = extractor::extract_match(&loaded.timeline);
        found += records.len();

        match &store {
            Some(store) => upserted += store.upsert_records(&records).await?,
            None => {
                for record in &records {
                    println!("{}", describe::render(record, &options));
                }
            }
        }
    }

    println!("matches scanned: {scanned}");
    println!("buzzerbeaters found: {found}");
    println!("rows upserted: {upserted}");
    println!("matches skipped: {skipped}");
    Ok(())
}

async fn run_describe(config: &AppConfig, args: DescribeArgs) -> Result<()> {
    let store = Store::new(&config.database.path).await?;
    let filter = RecordFilter {
        team_id: args.team_id,
        opponent_id: args.opponent_id,
        match_id: args.match_id,
        player_id: args.player_id,
        only_outcome_change: args.only_outcome_change,
    };
    let records = store.fetch_records(&filter).await?;
    tracing::info!(records = records.len(), "Loaded buzzerbeaters");

    let options = render_options(config, &args);
    if options.verbosity == 0 {
        println!("{}", describe::render_header(&options.columns));
    }
    for record in &records {
        println!("{}", describe::render(record, &options));
    }

    if args.summary {
        let top_n = args.top_players.unwrap_or(config.report.top_players);
        println!();
        print!("{}", Summary::from_records(&records, top_n));
    }

    if args.multi_buzzer_games {
        println!();
        println!("Players with multiple buzzerbeaters in one game:");
        for game in aggregate::multi_buzzer_games(&records) {
            println!(
                "- match_id={} player={} [player={}] count={} clocks={:?}",
                game.match_id, game.player_name, game.player_id, game.count, game.clocks
            );
        }
    }

    if args.multi_player_games {
        println!();
        println!("Games with buzzerbeaters from multiple players on one team:");
        for game in aggregate::multi_player_games(&records) {
            println!(
                "- match_id={} team_id={} players={} clocks={:?}",
                game.match_id,
                game.team_id,
                game.players.join(", "),
                game.clocks
            );
        }
    }

    Ok(())
}

async fn run_normalize(config: &AppConfig) -> Result<()> {
    let store = Store::new(&config.database.path).await?;
    let updated = store.normalize_periods().await?;
    println!("Updated {updated} rows from Reg to Q4.");
    Ok(())
}

async fn run_inspect(config: &AppConfig, args: InspectArgs) -> Result<()> {
    let source = open_source(config, &args.source);
    let match_ids = match args.match_id {
        Some(id) => vec![id],
        None => source.match_ids().await?,
    };

    let mut printed = 0;
    for match_id in match_ids {
        if printed >= args.limit {
            break;
        }
        let loaded = match source.load(match_id).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(match_id, error = %e, "Skipping unreadable match");
                continue;
            }
        };
        let boundaries = period::resolve(&loaded.timeline.events);
        let went_to_overtime = boundaries.len() > 4;
        if !went_to_overtime && !args.include_non_ot {
            continue;
        }
        let report = inspect::inspect_match(&loaded.timeline, &boundaries);
        print!("{}", report.render(args.only_buzzer_comments));
        printed += 1;
    }
    Ok(())
}

async fn run_shot_distances(config: &AppConfig, args: ShotDistancesArgs) -> Result<()> {
    let source = open_source(config, &args.source);
    let mut timelines = Vec::new();
    for match_id in source.match_ids().await? {
        match source.load(match_id).await {
            Ok(loaded) => timelines.push(loaded.timeline),
            Err(e) => tracing::warn!(match_id, error = %e, "Skipping unreadable match"),
        }
    }
    tracing::info!(matches = timelines.len(), "Collected shot charts");

    let distances = ShotDistances::collect(&timelines);
    print!(
        "{}",
        distance::render_text_chart("3PT shot distance (ft)", &distances.three_point, args.bin_width)
    );
    println!();
    print!(
        "{}",
        distance::render_text_chart("2PT shot distance (ft)", &distances.two_point, args.bin_width)
    );
    Ok(())
}
