use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use report_flow::{FlowError, InMemorySessionStorage, ReportSubmission, SessionStorage};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    analysis::{AnalysisEngine, CannedAnalysis},
    auth::{AuthError, AuthProvider, SupabaseAuth},
    bmi::calculate_bmi,
    completion::CompletionClient,
    models::{AnalyzeReportRequest, BmiAnalysisRequest, CredentialsRequest, SessionResponse},
    stages::StageTiming,
    workflow::{build_submission_workflow, create_report_session},
};

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn unauthorized_error(message: &str) -> ApiError {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

/// Details are logged at the call site, never returned to the client.
fn internal_error() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
}

/// Everything handlers need, constructed once in the composition root and
/// injected; no module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStorage>,
    pub completion: Arc<CompletionClient>,
    pub auth: Arc<dyn AuthProvider>,
    pub engine: Arc<dyn AnalysisEngine>,
    pub timing: StageTiming,
}

/// Environment-derived configuration for the composition root.
pub struct AppConfig {
    pub openai_api_key: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub timing: StageTiming,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            supabase_url: std::env::var("SUPABASE_URL").unwrap_or_default(),
            supabase_anon_key: std::env::var("SUPABASE_ANON_KEY").unwrap_or_default(),
            timing: StageTiming::default(),
        }
    }
}

pub fn create_app(config: AppConfig) -> Router {
    let state = AppState {
        sessions: Arc::new(InMemorySessionStorage::new()),
        completion: Arc::new(CompletionClient::new(config.openai_api_key)),
        auth: Arc::new(SupabaseAuth::new(
            config.supabase_url,
            config.supabase_anon_key,
        )),
        engine: Arc::new(CannedAnalysis),
        timing: config.timing,
    };
    build_router(state)
}

pub fn build_router(state: AppState) -> Router {
    // CorsLayer answers every OPTIONS itself, which would shadow the fixed
    // 204 preflight contract of the analysis endpoint; that route handles
    // its own CORS headers instead.
    let cors_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/reports/analyze", post(start_report_analysis))
        .route("/reports/{session_id}", get(get_report_status))
        .route("/auth/signin", post(sign_in))
        .route("/auth/signup", post(sign_up))
        .layer(CorsLayer::permissive());

    Router::new()
        .route(
            "/api/bmi-analysis",
            post(bmi_analysis).options(bmi_analysis_preflight),
        )
        .merge(cors_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Health Report Analysis Service",
        "version": "1.0.0",
        "description": "Health report submission workflow with AI-style analysis and BMI calculation",
        "endpoints": {
            "POST /api/bmi-analysis": "Calculate BMI or forward a chat payload",
            "POST /reports/analyze": "Submit a health report for analysis",
            "GET /reports/{session_id}": "Get submission status and analysis",
            "POST /auth/signin": "Sign in with email and password",
            "POST /auth/signup": "Create an account",
            "GET /health": "Health check"
        },
        "upload": {
            "accepted_types": ["pdf", "jpg", "jpeg", "png"],
            "soft_limit_bytes": 10 * 1024 * 1024,
            "note": "advisory only; uploads are simulated"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// `POST /api/bmi-analysis`: BMI when height and weight are usable, chat
/// passthrough when messages are present, 400 otherwise.
async fn bmi_analysis(
    State(state): State<AppState>,
    Json(request): Json<BmiAnalysisRequest>,
) -> ApiResult<Value> {
    // Mirrors the presence-and-nonzero selection the endpoint has always
    // had: a zero height or weight falls through to the other branches.
    let height = request.height.filter(|h| *h != 0.0);
    let weight = request.weight.filter(|w| *w != 0.0);

    if let (Some(height), Some(weight)) = (height, weight) {
        let result = calculate_bmi(height, weight);
        info!("Calculated BMI {} ({})", result.bmi, result.category);
        return Ok(Json(json!({
            "bmi": result.bmi,
            "category": result.category,
            "message": result.message,
        })));
    }

    if let Some(messages) = request.messages {
        return match state.completion.chat(&messages).await {
            Ok(message) => Ok(Json(message)),
            Err(e) => {
                error!("Completion API call failed: {}", e);
                Err(internal_error())
            }
        };
    }

    Err(bad_request_error(
        "Please provide either messages or height and weight.",
    ))
}

/// Preflight contract: fixed 204 with permissive CORS headers, independent
/// of the POST branches.
async fn bmi_analysis_preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                "Content-Type, Authorization",
            ),
        ],
    )
}

async fn start_report_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeReportRequest>,
) -> ApiResult<Value> {
    let submission = request.into_submission();

    // Reject unusable submissions before any session or stage work starts.
    if let Err(e) = submission.validate() {
        let FlowError::Validation(message) = e else {
            error!("Unexpected validation outcome: {}", e);
            return Err(internal_error());
        };
        return Err(bad_request_error(&message));
    }

    info!(
        "Starting report analysis for '{}'",
        submission.report_name
    );

    let session = create_report_session(&submission);
    let session_id = session.id.clone();

    state.sessions.save(session).await.map_err(|e| {
        error!("Failed to create session: {}", e);
        internal_error()
    })?;

    spawn_workflow_driver(&state, session_id.clone(), submission);

    Ok(Json(json!({
        "session_id": session_id,
        "status": "started",
        "message": "Report analysis started successfully"
    })))
}

/// Run the submission in the background, mirroring every observed workflow
/// state into session storage so `GET /reports/{id}` sees progress.
fn spawn_workflow_driver(state: &AppState, session_id: String, submission: ReportSubmission) {
    let (workflow, mut notifications) =
        build_submission_workflow(state.engine.clone(), state.timing);
    let mut state_rx = workflow.subscribe();
    let sessions = state.sessions.clone();
    let sid = session_id.clone();

    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let snapshot = state_rx.borrow_and_update().clone();
            match sessions.get(&sid).await {
                Ok(Some(mut session)) => {
                    session.state = snapshot.clone();
                    if let Err(e) = sessions.save(session).await {
                        error!("Failed to save state for session {}: {}", sid, e);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to load session {}: {}", sid, e);
                    break;
                }
            }
            if snapshot.is_terminal() {
                break;
            }
        }
    });

    tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            info!(
                "Notification for session {}: {} - {}",
                session_id, notification.title, notification.description
            );
        }
    });

    tokio::spawn(async move {
        // Terminal state and notification are already recorded; the error
        // here is informational.
        if let Err(e) = workflow.submit(submission).await {
            error!("Report submission failed: {}", e);
        }
    });
}

async fn get_report_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionResponse> {
    match state.sessions.get(&session_id).await {
        Ok(Some(session)) => Ok(Json(SessionResponse::from_session(session))),
        Ok(None) => Err(not_found_error("Session not found", &session_id)),
        Err(e) => {
            error!("Failed to load session {}: {}", session_id, e);
            Err(internal_error())
        }
    }
}

async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<Value> {
    match state.auth.sign_in(&request.email, &request.password).await {
        Ok(session) => Ok(Json(json!(session))),
        Err(AuthError::Rejected(message)) => Err(unauthorized_error(&message)),
        Err(e) => {
            error!("Sign-in failed: {}", e);
            Err(internal_error())
        }
    }
}

async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> ApiResult<Value> {
    match state.auth.sign_up(&request.email, &request.password).await {
        Ok(session) => Ok(Json(json!(session))),
        Err(AuthError::Rejected(message)) => Err(bad_request_error(&message)),
        Err(e) => {
            error!("Sign-up failed: {}", e);
            Err(internal_error())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let state = AppState {
            sessions: Arc::new(InMemorySessionStorage::new()),
            completion: Arc::new(CompletionClient::new("test-key")),
            auth: Arc::new(SupabaseAuth::new("http://localhost", "anon-key")),
            engine: Arc::new(CannedAnalysis),
            timing: StageTiming::instant(),
        };
        build_router(state)
    }

    async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn bmi_branch_returns_rounded_result() {
        let router = test_router();
        let (status, body) = post_json(
            &router,
            "/api/bmi-analysis",
            json!({ "height": 170, "weight": 70 }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bmi"], 24.22);
        assert_eq!(body["category"], "Normal weight");
        assert_eq!(body["message"], "Your BMI is 24.22 (Normal weight).");
    }

    #[tokio::test]
    async fn empty_request_is_a_400() {
        let router = test_router();
        let (status, body) = post_json(
            &router,
            "/api/bmi-analysis",
            json!({ "height": null, "weight": null, "messages": null }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Please provide either messages or height and weight."
        );
    }

    #[tokio::test]
    async fn zero_height_does_not_select_the_bmi_branch() {
        let router = test_router();
        let (status, _body) = post_json(
            &router,
            "/api/bmi-analysis",
            json!({ "height": 0, "weight": 70 }),
        )
        .await;

        // Falls through past the BMI branch; with no messages either, the
        // request is malformed.
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn preflight_returns_204_with_cors_headers() {
        let router = test_router();
        let response = router
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/bmi-analysis")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let headers = response.headers();
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
        assert_eq!(
            headers.get("access-control-allow-methods").unwrap(),
            "POST, OPTIONS"
        );
        assert_eq!(
            headers.get("access-control-allow-headers").unwrap(),
            "Content-Type, Authorization"
        );
    }

    #[tokio::test]
    async fn report_submission_reaches_completion() {
        let router = test_router();
        let (status, body) = post_json(
            &router,
            "/reports/analyze",
            json!({
                "report_name": "Blood Test Results",
                "report_type": "blood_test",
                "mode": "upload",
                "file": { "name": "results.pdf", "size_bytes": 48213 }
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "started");
        let session_id = body["session_id"].as_str().unwrap().to_string();

        // Instant stage timing: the workflow lands in a terminal state
        // almost immediately; poll a few times to let the driver persist it.
        let mut last = Value::Null;
        for _ in 0..50 {
            let response = router
                .clone()
                .oneshot(
                    Request::builder()
                        .uri(format!("/reports/{}", session_id))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            last = serde_json::from_slice(&bytes).unwrap();
            if last["status"] == "complete" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(last["status"], "complete");
        assert!(
            last["analysis"]
                .as_str()
                .unwrap()
                .starts_with("Blood Test Analysis Results")
        );
    }

    #[tokio::test]
    async fn invalid_submission_is_rejected_before_any_session_exists() {
        let router = test_router();
        let (status, body) = post_json(
            &router,
            "/reports/analyze",
            json!({
                "report_name": "",
                "report_type": "glucose",
                "mode": "manual",
                "manual_text": "HbA1c: 5.9%"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing report name");
    }

    #[tokio::test]
    async fn unknown_session_is_a_404() {
        let router = test_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/reports/does-not-exist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_check_reports_healthy() {
        let router = test_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
