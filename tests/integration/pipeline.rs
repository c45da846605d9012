//! End-to-end pipeline tests: source → slate → filter/summary → dashboard.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use valcoach::config::AppConfig;
use valcoach::dashboard::build_router;
use valcoach::dashboard::routes::DashboardState;
use valcoach::data::vlr::IngestConfig;
use valcoach::data::StatsQuery;
use valcoach::engine::{explain_top, PickFilter, SlateService};
use valcoach::llm::TemplateExplainer;
use valcoach::types::{Confidence, Recommendation, RiskPosture, Role, StatType};

use crate::mock_source::{default_pool, MockSource, RAW_ROWS};

fn service(source: Arc<MockSource>) -> SlateService {
    SlateService::new(source)
}

#[tokio::test]
async fn test_full_pipeline_ranks_every_player_twice() {
    let source = Arc::new(MockSource::new(default_pool()));
    let slate = service(source.clone())
        .build_slate(&StatsQuery::default(), RiskPosture::Standard)
        .await
        .unwrap();

    assert_eq!(source.fetches(), 1);
    assert_eq!(slate.picks.len(), 10);

    for pair in slate.picks.windows(2) {
        assert!(pair[0].edge.abs() >= pair[1].edge.abs());
    }
    for pick in &slate.picks {
        assert!((0.01..=0.99).contains(&pick.probability_over));
        assert!(pick.line_value.fract() == 0.5);
        assert!(!pick.explanation.is_empty());
    }

    // Both picks for a player share one record.
    let tenz: Vec<_> = slate.picks.iter().filter(|p| p.player_handle == "TenZ").collect();
    assert_eq!(tenz.len(), 2);
    assert!(Arc::ptr_eq(&tenz[0].raw_player, &tenz[1].raw_player));
}

#[tokio::test]
async fn test_known_player_numbers() {
    let source = Arc::new(MockSource::new(default_pool()));
    let slate = service(source)
        .build_slate(&StatsQuery::default(), RiskPosture::Standard)
        .await
        .unwrap();

    let tenz = slate.find("sen_tenz", StatType::Kills).unwrap();
    assert_eq!(tenz.projected_value, 20.0);
    assert_eq!(tenz.line_value, 20.5);
    assert!((tenz.edge - (-0.5 / 2.55)).abs() < 1e-9);
    assert_eq!(tenz.recommendation, Recommendation::StayAway);
    assert_eq!(tenz.confidence, Confidence::Low);
}

#[tokio::test]
async fn test_rebuild_is_deterministic() {
    let source = Arc::new(MockSource::new(default_pool()));
    let svc = service(source.clone());
    let a = svc.build_slate(&StatsQuery::default(), RiskPosture::Yolo).await.unwrap();
    let b = svc.build_slate(&StatsQuery::default(), RiskPosture::Yolo).await.unwrap();

    assert_eq!(a.picks, b.picks);
    assert_eq!(source.fetches(), 2);
}

#[tokio::test]
async fn test_looser_posture_never_leans_less() {
    let source = Arc::new(MockSource::new(default_pool()));
    let svc = service(source);
    let query = StatsQuery::default();

    let leans = |picks: &[valcoach::types::PickResult]| {
        picks
            .iter()
            .filter(|p| p.recommendation != Recommendation::StayAway)
            .count()
    };

    let safe = svc.build_slate(&query, RiskPosture::Safe).await.unwrap();
    let standard = svc.build_slate(&query, RiskPosture::Standard).await.unwrap();
    let yolo = svc.build_slate(&query, RiskPosture::Yolo).await.unwrap();

    assert!(leans(&safe.picks) <= leans(&standard.picks));
    assert!(leans(&standard.picks) <= leans(&yolo.picks));
}

#[tokio::test]
async fn test_raw_rows_through_ingestion() {
    let source = Arc::new(MockSource::from_rows(RAW_ROWS, &IngestConfig::default()));
    let slate = service(source)
        .build_slate(&StatsQuery::new("eu", "90").unwrap(), RiskPosture::Standard)
        .await
        .unwrap();

    // The handle-less row is dropped.
    assert_eq!(slate.summary(&PickFilter::default()).players, 3);

    let derke = slate.find("fncderke", StatType::Kills).unwrap();
    assert_eq!(derke.player_handle, "Derke");
    assert_eq!(derke.role, Role::Duelist);
    assert_eq!(derke.raw_player.maps_played, 20);
    assert!((derke.raw_player.kills_per_map - 20.9).abs() < 1e-9);
    assert_eq!(derke.line_value, 21.5);

    let chronicle = slate.find("fncchronicle", StatType::Assists).unwrap();
    assert_eq!(chronicle.role, Role::Flex);

    let mystery = slate.find("unknownmystery", StatType::Kills).unwrap();
    assert_eq!(mystery.team_name, "Unknown");
    assert_eq!(mystery.role, Role::Unknown);
    assert_eq!(mystery.raw_player.rating, 1.0);
    assert_eq!(mystery.raw_player.maps_played, 10);
}

#[tokio::test]
async fn test_source_error_propagates() {
    let source = Arc::new(MockSource::new(default_pool()));
    source.set_error("vlrggapi unavailable");

    let err = service(source.clone())
        .build_slate(&StatsQuery::default(), RiskPosture::Standard)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("vlrggapi unavailable"));

    source.clear_error();
    assert!(service(source)
        .build_slate(&StatsQuery::default(), RiskPosture::Standard)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_config_drives_query() {
    let cfg = AppConfig::parse("[slate]\nregion = \"br\"\ntimespan = \"all\"\nrisk_posture = \"safe\"\n").unwrap();
    let source = Arc::new(MockSource::new(default_pool()));

    let slate = service(source.clone())
        .build_slate(&cfg.query().unwrap(), cfg.slate.risk_posture)
        .await
        .unwrap();

    assert_eq!(slate.posture, RiskPosture::Safe);
    let seen = source.last_query().unwrap();
    assert_eq!(seen.region, "br");
    assert_eq!(seen.timespan, "all");
}

#[tokio::test]
async fn test_explain_top_uses_template_text() {
    let source = Arc::new(MockSource::new(default_pool()));
    let slate = service(source)
        .build_slate(&StatsQuery::default(), RiskPosture::Standard)
        .await
        .unwrap();

    let texts = explain_top(&TemplateExplainer, &slate.picks, Some(&slate.query.region), 3, 2).await;
    assert_eq!(texts.len(), 3);
    for (pick, text) in slate.picks.iter().zip(&texts) {
        assert_eq!(&pick.explanation, text);
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

async fn dashboard(source: Arc<MockSource>) -> Arc<DashboardState> {
    let svc = service(source);
    let slate = svc
        .build_slate(&StatsQuery::default(), RiskPosture::Standard)
        .await
        .unwrap();
    Arc::new(DashboardState::new(slate, svc, Arc::new(TemplateExplainer)))
}

async fn send(state: Arc<DashboardState>, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = build_router(state)
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1_000_000).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
}

#[tokio::test]
async fn test_dashboard_serves_ranked_picks() {
    let source = Arc::new(MockSource::new(default_pool()));
    let state = dashboard(source).await;

    let (status, json) = send(state.clone(), "GET", "/api/picks?stats=kills").await;
    assert_eq!(status, StatusCode::OK);
    let picks = json.as_array().unwrap();
    assert_eq!(picks.len(), 5);
    assert!(picks.iter().all(|p| p["stat_type"] == "kills"));

    let (status, json) = send(state, "POST", "/api/picks/sen_tenz/kills/explain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["model"], "template");
    assert!(json["text"].as_str().unwrap().contains("TenZ"));
}

#[tokio::test]
async fn test_dashboard_refresh_refetches() {
    let source = Arc::new(MockSource::new(default_pool()));
    let state = dashboard(source.clone()).await;
    assert_eq!(source.fetches(), 1);

    let (status, json) = send(state.clone(), "POST", "/api/refresh?posture=safe&timespan=90").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["posture"], "safe");
    assert_eq!(json["timespan"], "90");
    assert_eq!(source.fetches(), 2);
    assert_eq!(state.slate.read().await.posture, RiskPosture::Safe);
}

#[tokio::test]
async fn test_dashboard_refresh_failure_keeps_old_slate() {
    let source = Arc::new(MockSource::new(default_pool()));
    let state = dashboard(source.clone()).await;
    let before = state.slate.read().await.picks.clone();

    source.set_error("vlrggapi unavailable");
    let (status, json) = send(state.clone(), "POST", "/api/refresh?posture=yolo").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("vlrggapi unavailable"));

    let slate = state.slate.read().await;
    assert_eq!(slate.posture, RiskPosture::Standard);
    assert_eq!(slate.picks, before);
}
