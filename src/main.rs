//! VALCoach: Valorant player prop projection and edge scoring engine.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds one slate from vlrggapi, prints the top picks with their
//! explanations, and optionally serves the dashboard until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};

use valcoach::config;
use valcoach::dashboard::{self, routes::DashboardState};
use valcoach::data::vlr::{IngestConfig, VlrClient};
use valcoach::data::StatsSource;
use valcoach::engine::{explain_top, PickFilter, Slate, SlateService};
use valcoach::llm::openai::{OpenAiClient, OpenAiOptions};
use valcoach::llm::{PickExplainer, TemplateExplainer};

const BANNER: &str = r#"
__     ___    _      ____                 _
\ \   / / \  | |    / ___|___   __ _  ___| |__
 \ \ / / _ \ | |   | |   / _ \ / _` |/ __| '_ \
  \ V / ___ \| |___| |__| (_) | (_| | (__| | | |
   \_/_/   \_\_____|\____\___/ \__,_|\___|_| |_|

  Valorant player prop projections
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let cfg = config::AppConfig::load(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        region = %cfg.slate.region,
        timespan = %cfg.slate.timespan,
        posture = %cfg.slate.risk_posture,
        max_players = cfg.stats.max_players,
        "VALCoach starting up"
    );

    // -- Initialise components -------------------------------------------

    let source: Arc<dyn StatsSource> = Arc::new(VlrClient::new(
        Some(cfg.stats.base_url.clone()),
        Some(cfg.stats.timeout_secs),
        IngestConfig {
            max_players: cfg.stats.max_players,
            rounds_per_map: cfg.stats.rounds_per_map,
        },
    )?);
    let service = SlateService::new(source);
    let explainer = build_explainer(&cfg)?;

    // -- Build the slate -------------------------------------------------

    let query = cfg.query()?;
    let posture = cfg.slate.risk_posture;

    let slate = match service.build_slate(&query, posture).await {
        Ok(slate) => slate,
        Err(e) if cfg.dashboard.enabled => {
            // The dashboard can retry via /api/refresh.
            error!(error = %e, "Initial slate build failed, serving an empty slate");
            Slate::empty(query.clone(), posture)
        }
        Err(e) => return Err(e),
    };

    print_slate(&slate, cfg.slate.top_n);

    if cfg.slate.explain_top > 0 && !slate.picks.is_empty() {
        let texts = explain_top(
            explainer.as_ref(),
            &slate.picks,
            Some(&slate.query.region),
            cfg.slate.explain_top,
            cfg.llm.concurrency,
        )
        .await;
        for (pick, text) in slate.picks.iter().zip(&texts) {
            println!("\n== {} {} ({}) ==\n{}", pick.player_handle, pick.stat_type, pick.recommendation, text);
        }
    }

    // -- Dashboard -------------------------------------------------------

    if !cfg.dashboard.enabled {
        return Ok(());
    }

    let state = Arc::new(DashboardState::new(slate, service, explainer));
    dashboard::spawn_dashboard(state, cfg.dashboard.port).await?;

    info!("Dashboard running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. VALCoach shut down cleanly.");

    Ok(())
}

/// Pick the OpenAI explainer when a key is available, else the offline template.
fn build_explainer(cfg: &config::AppConfig) -> Result<Arc<dyn PickExplainer>> {
    match cfg.llm_api_key() {
        Some(key) => {
            info!(model = %cfg.llm.model, "Using OpenAI explainer");
            Ok(Arc::new(OpenAiClient::new(
                key,
                OpenAiOptions {
                    model: Some(cfg.llm.model.clone()),
                    max_tokens: Some(cfg.llm.max_tokens),
                    temperature: Some(cfg.llm.temperature),
                    api_url: None,
                },
            )?))
        }
        None => {
            if cfg.llm.enabled {
                warn!(
                    env = %cfg.llm.api_key_env,
                    "No LLM API key configured, using template explanations"
                );
            }
            Ok(Arc::new(TemplateExplainer))
        }
    }
}

/// Print the headline numbers and the top `n` picks.
fn print_slate(slate: &Slate, n: usize) {
    let summary = slate.summary(&PickFilter::default());
    info!(
        players = summary.players,
        picks = summary.total_picks,
        over = summary.over_leans,
        under = summary.under_leans,
        stay_away = summary.stay_away,
        avg_abs_edge = format!("{:.2}", summary.avg_abs_edge),
        "Slate ready"
    );

    println!(
        "{:<16} {:<8} {:<8} {:>6} {:>6} {:>7} {:>8}  {:<11} {:>7} {}",
        "PLAYER", "TEAM", "STAT", "LINE", "PROJ", "EDGE", "P(OVER)", "LEAN", "P(LEAN)", "CONF"
    );
    for pick in slate.picks.iter().take(n) {
        println!(
            "{:<16} {:<8} {:<8} {:>6.1} {:>6.2} {:>+7.2} {:>7.1}%  {:<11} {:>6.1}% {}",
            pick.player_handle,
            pick.team_name,
            pick.stat_type.as_str(),
            pick.line_value,
            pick.projected_value,
            pick.edge,
            pick.probability_over * 100.0,
            pick.recommendation.to_string(),
            pick.lean_probability() * 100.0,
            pick.confidence,
        );
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("valcoach=info"));

    let json_logging = std::env::var("VALCOACH_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
