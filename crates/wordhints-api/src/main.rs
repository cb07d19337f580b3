use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use wordhints_assets::{DifficultyRanking, PhrasalVerbSet, SimpleDefinitions};
use wordhints_core::{HintsEngine, HintsProvider};
use wordhints_wordnet::{LoadMode, WordNetLexicon};

use wordhints_api::rate_limit::RateLimiterLayer;
use wordhints_api::{AppState, RemoteParser, RemoteSenseClassifier, WordNetDictionary, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_WORDNET_DIR: &str = "wordnet/dict";
const DEFAULT_PARSER_URL: &str = "http://127.0.0.1:8001/parse";
const DEFAULT_WSD_URL: &str = "http://127.0.0.1:8002/disambiguate";
const DEFAULT_MAX_TEXT_LEN: usize = 5000;
const DEFAULT_RATE_LIMIT_RPS: u32 = 5;
const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

const SENSE_RANKING_FILE: &str = "ranking_senses_en.txt";
const WORDLIST_FILE: &str = "ranking_words_en.txt";
const PHRASAL_VERBS_FILE: &str = "phrasal_verbs_en.txt";
const SIMPLE_DEFINITIONS_FILE: &str = "simple_definitions_en.txt";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    info!("binding to {}:{}", config.host, config.port);
    info!("using assets at {}", config.assets_dir.display());
    info!(
        "using wordnet at {} (mode: {:?})",
        config.wordnet_dir.display(),
        config.wordnet_mode
    );
    info!("parser at {}", config.parser_url);
    info!("disambiguation at {}", config.wsd_url);
    info!(
        "rate limit: {} req/s (burst {})",
        config.rate_limit_rps, config.rate_limit_burst
    );

    let start = Instant::now();
    let ranking = Arc::new(DifficultyRanking::load(
        &config.assets_dir.join(SENSE_RANKING_FILE),
        &config.assets_dir.join(WORDLIST_FILE),
    )?);
    let phrasal_verbs = Arc::new(PhrasalVerbSet::load(
        &config.assets_dir.join(PHRASAL_VERBS_FILE),
    )?);
    let simple_definitions = Arc::new(SimpleDefinitions::load(
        &config.assets_dir.join(SIMPLE_DEFINITIONS_FILE),
    )?);
    info!("assets loaded in {} ms", start.elapsed().as_millis());

    let wn_start = Instant::now();
    let lexicon = Arc::new(WordNetLexicon::load(
        &config.wordnet_dir,
        config.wordnet_mode,
    )?);
    info!("wordnet loaded in {} ms", wn_start.elapsed().as_millis());

    let engine: Arc<dyn HintsEngine> = Arc::new(HintsProvider::new(
        RemoteParser::new(config.parser_url)?,
        RemoteSenseClassifier::new(config.wsd_url)?,
        WordNetDictionary::new(lexicon),
        ranking,
        phrasal_verbs,
        simple_definitions,
    ));

    let state = AppState {
        engine,
        max_text_len: config.max_text_len,
    };

    let rate_limiter = RateLimiterLayer::new(config.rate_limit_rps, config.rate_limit_burst);
    let app = router(state)
        .layer(rate_limiter)
        .layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    assets_dir: PathBuf,
    wordnet_dir: PathBuf,
    wordnet_mode: LoadMode,
    parser_url: String,
    wsd_url: String,
    max_text_len: usize,
    rate_limit_rps: u32,
    rate_limit_burst: u32,
}

fn load_config() -> Config {
    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let assets_dir = env::var("ASSETS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_ASSETS_DIR));
    let wordnet_dir = env::var("WORDNET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_WORDNET_DIR));
    let wordnet_mode = env::var("WORDNET_LOAD_MODE")
        .ok()
        .as_deref()
        .and_then(parse_load_mode)
        .unwrap_or(LoadMode::Mmap);
    let parser_url = env::var("PARSER_URL").unwrap_or_else(|_| DEFAULT_PARSER_URL.to_string());
    let wsd_url = env::var("WSD_URL").unwrap_or_else(|_| DEFAULT_WSD_URL.to_string());
    let max_text_len = env::var("MAX_TEXT_LEN")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_MAX_TEXT_LEN);
    let rate_limit_rps = env::var("RATE_LIMIT_RPS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RATE_LIMIT_RPS);
    let rate_limit_burst = env::var("RATE_LIMIT_BURST")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RATE_LIMIT_BURST);

    Config {
        host,
        port,
        assets_dir,
        wordnet_dir,
        wordnet_mode,
        parser_url,
        wsd_url,
        max_text_len,
        rate_limit_rps,
        rate_limit_burst,
    }
}

fn parse_load_mode(raw: &str) -> Option<LoadMode> {
    match raw.to_ascii_lowercase().as_str() {
        "mmap" => Some(LoadMode::Mmap),
        "owned" => Some(LoadMode::Owned),
        _ => None,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
