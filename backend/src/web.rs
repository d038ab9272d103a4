use crate::analytics::{self, DateRange, IssueHistory};
use crate::error::ApiError;
use crate::state::AppState;
use crate::tracker::TrackerClient;
use axum::http::StatusCode;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json,
    Router,
};
use chrono::Utc;
use cycletime_shared::workflow::validate_workflow;
use cycletime_shared::{
    CfdSeries, Configuration, Credentials, DurationSeries, MetricKind, NewConfiguration, Project,
    ThroughputSeries, ValidationResult, WipSeries,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

const DEFAULT_RANGE_DAYS: u32 = 90;
const MAX_RANGE_DAYS: u32 = 3 * 365;

/// Public router constructor
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = ServeDir::new(&state.settings.static_dir)
        .precompressed_br()
        .precompressed_gzip();

    Router::new()
        .route(
            "/api/configurations",
            get(list_configurations).post(create_configuration),
        )
        .route(
            "/api/configurations/{id}",
            get(get_configuration)
                .put(update_configuration)
                .delete(delete_configuration),
        )
        .route("/api/configurations/{id}/analytics/{metric}", get(get_metric))
        .route("/api/tracker/validate", post(validate_credentials))
        .route("/api/tracker/projects", post(list_projects))
        // anything that doesn’t match the above routes goes to the static files
        .fallback_service(static_dir)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn check_new_configuration(cfg: &NewConfiguration) -> Result<(), ApiError> {
    if cfg.name.trim().is_empty() {
        return Err(ApiError::Validation("Configuration name is required".to_string()));
    }
    if cfg.project_key.trim().is_empty() {
        return Err(ApiError::Validation("Project is required".to_string()));
    }
    cfg.credentials.validate().map_err(ApiError::Validation)?;
    validate_workflow(&cfg.workflow).map_err(|e| ApiError::Validation(e.to_string()))?;
    Ok(())
}

// Path segments are taken as strings so bad ids and metric names get the
// same JSON error body as every other handler failure.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::Validation(format!("invalid configuration id {raw:?}")))
}

fn parse_metric(raw: &str) -> Result<MetricKind, ApiError> {
    MetricKind::ALL
        .into_iter()
        .find(|m| m.as_str() == raw)
        .ok_or_else(|| ApiError::Validation(format!("unknown metric {raw:?}")))
}

async fn load_configuration(state: &AppState, id: i64) -> Result<Configuration, ApiError> {
    state
        .store
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("configuration {id}")))
}

async fn list_configurations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Configuration>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

async fn create_configuration(
    State(state): State<Arc<AppState>>,
    Json(cfg): Json<NewConfiguration>,
) -> Result<(StatusCode, Json<Configuration>), ApiError> {
    check_new_configuration(&cfg)?;
    let created = state.store.create(&cfg).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_configuration(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Configuration>, ApiError> {
    Ok(Json(load_configuration(&state, parse_id(&id)?).await?))
}

async fn update_configuration(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(cfg): Json<NewConfiguration>,
) -> Result<Json<Configuration>, ApiError> {
    let id = parse_id(&id)?;
    check_new_configuration(&cfg)?;
    state
        .store
        .update(id, &cfg)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("configuration {id}")))
}

async fn delete_configuration(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    if state.store.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("configuration {id}")))
    }
}

/// Always 200: rejected credentials are a normal answer, not a failure.
async fn validate_credentials(
    State(state): State<Arc<AppState>>,
    Json(creds): Json<Credentials>,
) -> Json<ValidationResult> {
    if let Err(message) = creds.validate() {
        return Json(ValidationResult {
            valid: false,
            message,
        });
    }

    let result = match TrackerClient::new(&state.http, &creds).validate_credentials().await {
        Ok(who) => ValidationResult {
            valid: true,
            message: format!("Connected as {who}"),
        },
        Err(err) => {
            tracing::info!(base_url = creds.base(), "credential check failed: {err}");
            ValidationResult {
                valid: false,
                message: err.to_string(),
            }
        }
    };
    Json(result)
}

async fn list_projects(
    State(state): State<Arc<AppState>>,
    Json(creds): Json<Credentials>,
) -> Result<Json<Vec<Project>>, ApiError> {
    creds.validate().map_err(ApiError::Validation)?;
    let projects = TrackerClient::new(&state.http, &creds).projects().await?;
    Ok(Json(projects))
}

#[derive(Deserialize)]
struct RangeParams {
    // /api/configurations/1/analytics/wip?days=30  (defaults to 90 if not provided)
    days: Option<u32>,
}

impl RangeParams {
    fn range(&self) -> DateRange {
        let days = self.days.unwrap_or(DEFAULT_RANGE_DAYS).clamp(1, MAX_RANGE_DAYS);
        DateRange::ending_at(Utc::now().date_naive(), days)
    }
}

/// Analytics series for one configuration.
///
/// Tracker failures do not fail the request: they come back as the series'
/// `error` field so the chart can show its placeholder.
async fn get_metric(
    State(state): State<Arc<AppState>>,
    Path((id, metric)): Path<(String, String)>,
    Query(params): Query<RangeParams>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let metric = parse_metric(&metric)?;
    let cfg = load_configuration(&state, id).await?;
    let range = params.range();

    let issues: Result<Vec<IssueHistory>, String> = TrackerClient::new(&state.http, &cfg.credentials)
        .issue_histories(&cfg.project_key)
        .await
        .map_err(|e| {
            tracing::warn!(id, metric = metric.as_str(), "issue history fetch failed: {e}");
            e.to_string()
        });

    let wf = &cfg.workflow;
    let response = match (metric, issues) {
        (MetricKind::LeadTime, Ok(i)) => Json(analytics::lead_time(&i, wf, range)).into_response(),
        (MetricKind::LeadTime, Err(e)) => Json(DurationSeries::failed(e)).into_response(),
        (MetricKind::CycleTime, Ok(i)) => Json(analytics::cycle_time(&i, wf, range)).into_response(),
        (MetricKind::CycleTime, Err(e)) => Json(DurationSeries::failed(e)).into_response(),
        (MetricKind::Throughput, Ok(i)) => Json(analytics::throughput(&i, wf, range)).into_response(),
        (MetricKind::Throughput, Err(e)) => Json(ThroughputSeries::failed(e)).into_response(),
        (MetricKind::Wip, Ok(i)) => Json(analytics::wip(&i, wf, range)).into_response(),
        (MetricKind::Wip, Err(e)) => Json(WipSeries::failed(e)).into_response(),
        (MetricKind::Cfd, Ok(i)) => Json(analytics::cfd(&i, wf, range)).into_response(),
        (MetricKind::Cfd, Err(e)) => Json(CfdSeries::failed(e)).into_response(),
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::store::ConfigStore;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use cycletime_shared::workflow::{add_state, toggle_end, toggle_start};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::time::Duration;
    use tower::ServiceExt;

    fn new_config() -> NewConfiguration {
        let wf = add_state(&add_state(&[], "Doing"), "Done");
        let wf = toggle_start(&wf, &wf[0].id);
        let wf = toggle_end(&wf, &wf[1].id);
        NewConfiguration {
            name: "Team".to_string(),
            credentials: Credentials {
                base_url: "https://example.atlassian.net".to_string(),
                email: "dev@example.com".to_string(),
                api_token: "t".to_string(),
            },
            project_key: "ABC".to_string(),
            workflow: wf,
        }
    }

    #[test]
    fn accepts_complete_configuration() {
        assert!(check_new_configuration(&new_config()).is_ok());
    }

    #[test]
    fn rejects_incomplete_configuration() {
        let mut cfg = new_config();
        cfg.project_key = " ".to_string();
        assert!(matches!(check_new_configuration(&cfg), Err(ApiError::Validation(_))));

        let mut cfg = new_config();
        cfg.workflow.clear();
        let err = check_new_configuration(&cfg).unwrap_err();
        assert_eq!(err.to_string(), "workflow has no states");
    }

    #[test]
    fn path_segments_are_parsed() {
        assert_eq!(parse_id(" 42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(ApiError::Validation(_))));
        assert_eq!(parse_metric("lead-time").unwrap(), MetricKind::LeadTime);
        assert_eq!(parse_metric("cfd").unwrap(), MetricKind::Cfd);
        assert!(matches!(parse_metric("velocity"), Err(ApiError::Validation(_))));
    }

    #[test]
    fn range_days_are_clamped() {
        let r = RangeParams { days: Some(0) }.range();
        assert_eq!(r.start, r.end);
        let r = RangeParams { days: None }.range();
        assert_eq!(r.days().count(), DEFAULT_RANGE_DAYS as usize);
    }

    async fn test_app() -> (Router, ConfigStore) {
        // one connection: every new in-memory connection is a fresh database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = ConfigStore::new(pool);
        store.migrate().await.unwrap();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let state = Arc::new(AppState {
            store: store.clone(),
            http,
            settings: Arc::new(Settings::default()),
        });
        (router(state), store)
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unreachable_tracker_comes_back_as_series_error() {
        let (app, store) = test_app().await;
        let mut cfg = new_config();
        // nothing listens on port 1
        cfg.credentials.base_url = "http://127.0.0.1:1".to_string();
        let saved = store.create(&cfg).await.unwrap();

        for metric in MetricKind::ALL {
            let uri = format!("/api/configurations/{}/analytics/{}", saved.id, metric.as_str());
            let (status, body) = get(&app, &uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert!(body["error"].is_string(), "{uri}: {body}");
        }
    }

    #[tokio::test]
    async fn handler_errors_have_json_bodies() {
        let (app, _) = test_app().await;

        let (status, body) = get(&app, "/api/configurations/9999/analytics/lead-time").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "configuration 9999 not found");

        let (status, body) = get(&app, "/api/configurations/9999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());

        let (status, body) = get(&app, "/api/configurations/1/analytics/velocity").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "unknown metric \"velocity\"");

        let (status, body) = get(&app, "/api/configurations/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("invalid configuration id"));
    }
}
