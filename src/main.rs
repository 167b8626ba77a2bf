use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use moodpick::llm::LlmClient;
use moodpick::{
    Answers, Engine, EngineConfig, Format, Item, JsonStore, LastContext, Mode, Pace, UserState,
};

#[derive(Parser)]
#[command(name = "moodpick", about = "Mood-based content recommendation engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pick one item for a user and explain the choice
    Recommend(RecommendArgs),
    /// Apply feedback for a prior selection
    Feedback(FeedbackArgs),
    /// Show a user's learned context weights
    Weights(WeightsArgs),
    /// Clear a user's learned weights
    Reset(ResetArgs),
    /// Load catalog items from a JSON file into the store
    Seed(SeedArgs),
}

#[derive(Args, Debug, Clone)]
struct RecommendArgs {
    #[arg(long)]
    user: String,
    #[arg(long, default_value = "escape")]
    state: String,
    #[arg(long, default_value = "slow")]
    pace: String,
    #[arg(long, default_value = "movie")]
    format: String,
    #[arg(long)]
    hint: Option<String>,
    #[arg(long, default_value = "normal")]
    mode: String,
    #[arg(long)]
    exclude: Vec<String>,
    /// Pace of the previous pick, for "another" mode
    #[arg(long)]
    last_pace: Option<String>,
    /// Whether the previous pick already flipped the pace
    #[arg(long)]
    last_pace_flipped: bool,
    #[arg(long, default_value = "data/moodpick.json")]
    store: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    details: bool,
}

#[derive(Args, Debug, Clone)]
struct FeedbackArgs {
    #[arg(long)]
    user: String,
    #[arg(long)]
    selection: String,
    #[arg(long)]
    action: String,
    #[arg(long)]
    reason: Option<String>,
    #[arg(long, default_value = "data/moodpick.json")]
    store: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct WeightsArgs {
    #[arg(long)]
    user: String,
    #[arg(long, default_value = "data/moodpick.json")]
    store: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct ResetArgs {
    #[arg(long)]
    user: String,
    #[arg(long, default_value = "data/moodpick.json")]
    store: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct SeedArgs {
    #[arg(long)]
    file: PathBuf,
    #[arg(long, default_value = "data/moodpick.json")]
    store: PathBuf,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Recommend(args) => run_recommend(args).await,
        Command::Feedback(args) => run_feedback(args).await,
        Command::Weights(args) => run_weights(args).await,
        Command::Reset(args) => run_reset(args).await,
        Command::Seed(args) => run_seed(args).await,
    }
}

async fn build_engine(
    store_path: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<Engine, String> {
    let (config, _) = EngineConfig::load(config_path)?;
    let store = Arc::new(
        JsonStore::load(store_path)
            .await
            .map_err(|err| format!("failed to open store: {}", err))?,
    );

    let mut engine = Engine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store,
        config.clone(),
    );
    if let Some(llm) = LlmClient::from_env(&config.llm) {
        engine = engine.with_llm(llm);
    }
    Ok(engine)
}

async fn run_recommend(args: RecommendArgs) -> Result<(), String> {
    let state = UserState::from_str(&args.state)
        .ok_or_else(|| format!("invalid state: {}", args.state))?;
    let pace = Pace::from_str(&args.pace).ok_or_else(|| format!("invalid pace: {}", args.pace))?;
    let format =
        Format::from_str(&args.format).ok_or_else(|| format!("invalid format: {}", args.format))?;
    let mode = Mode::from_str(&args.mode).ok_or_else(|| format!("invalid mode: {}", args.mode))?;

    let mut answers = Answers::new(state, pace, format);
    if let Some(hint) = args.hint.clone() {
        answers = answers.with_hint(hint);
    }

    let last_context = if mode == Mode::Another {
        let last_pace = match args.last_pace.as_deref() {
            Some(value) => {
                Some(Pace::from_str(value).ok_or_else(|| format!("invalid last pace: {}", value))?)
            }
            None => None,
        };
        let mut last = LastContext {
            pace: last_pace,
            ..LastContext::default()
        };
        last.delta.pace_flipped = args.last_pace_flipped;
        Some(last)
    } else {
        None
    };

    let exclude: Option<std::collections::HashSet<String>> =
        (!args.exclude.is_empty()).then(|| args.exclude.iter().cloned().collect());

    let engine = build_engine(args.store, args.config).await?;
    let result = engine
        .get_recommendation(&args.user, &answers, mode, exclude.as_ref(), last_context.as_ref())
        .await
        .map_err(|err| format!("recommendation failed: {}", err))?;

    let result = match result {
        Some(result) => result,
        None => {
            println!("No recommendation available right now.");
            return Ok(());
        }
    };

    println!("Pick: {} ({})", result.title, result.item_id);
    println!("Why: {}", result.rationale);
    println!("When: {}", result.when_to_watch);
    if let Some(delta) = &result.delta_explainer {
        println!("Change: {}", delta);
    }
    if let Some(hint_rationale) = &result.hint_rationale {
        println!("Hint match: {}", hint_rationale);
    }
    if let Some(rating) = result.rating {
        println!("Rating: {:.1}", rating);
    }

    if args.details {
        println!("\nSelection: {}", result.selection_id);
        println!(
            "Candidates: {} (curated {} | external {})",
            result.meta.candidate_count, result.meta.curated_count, result.meta.external_count
        );
        println!(
            "Score: {:.2} | epsilon: {:.2} | mode: {}",
            result.meta.score,
            result.meta.epsilon_used,
            result.meta.mode.label()
        );
    }

    Ok(())
}

async fn run_feedback(args: FeedbackArgs) -> Result<(), String> {
    let engine = build_engine(args.store, args.config).await?;
    let changes = engine
        .update_weights(
            &args.user,
            &args.selection,
            &args.action,
            args.reason.as_deref(),
        )
        .await
        .map_err(|err| format!("feedback failed: {}", err))?;

    if changes.is_empty() {
        println!("No weight changes applied.");
        return Ok(());
    }

    println!("Weight changes:");
    let mut keys: Vec<_> = changes.keys().collect();
    keys.sort();
    for key in keys {
        println!("  {} {:+}", key, changes[key]);
    }
    Ok(())
}

async fn run_weights(args: WeightsArgs) -> Result<(), String> {
    let engine = build_engine(args.store, None).await?;
    let weights = engine
        .all_weights(&args.user)
        .await
        .map_err(|err| format!("weights lookup failed: {}", err))?;

    if weights.is_empty() {
        println!("No weights for user {}.", args.user);
        return Ok(());
    }

    let mut keys: Vec<_> = weights.keys().collect();
    keys.sort();
    for key in keys {
        println!("{} {:+}", key, weights[key]);
    }
    Ok(())
}

async fn run_reset(args: ResetArgs) -> Result<(), String> {
    let engine = build_engine(args.store, None).await?;
    engine
        .reset_weights(&args.user)
        .await
        .map_err(|err| format!("reset failed: {}", err))?;
    println!("Weights cleared for user {}.", args.user);
    Ok(())
}

async fn run_seed(args: SeedArgs) -> Result<(), String> {
    let data = tokio::fs::read_to_string(&args.file)
        .await
        .map_err(|err| format!("failed to read items file: {}", err))?;
    let items: Vec<Item> =
        serde_json::from_str(&data).map_err(|err| format!("failed to parse items file: {}", err))?;

    let store = JsonStore::load(args.store)
        .await
        .map_err(|err| format!("failed to open store: {}", err))?;
    let count = store
        .seed_items(items)
        .await
        .map_err(|err| format!("failed to seed items: {}", err))?;
    println!("Seeded {} items.", count);
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
