//! REST API server for the finance crew
//!
//! Exposes the three crew operations over HTTP.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::crew::FinanceCrew;
use crate::error::CrewError;
use crate::models::ClientProfile;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CompanyAnalysisRequest {
    pub company: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InvestmentAnalysisRequest {
    pub investment: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub crew: Arc<FinanceCrew>,
}

fn status_for(error: &CrewError) -> StatusCode {
    match error {
        CrewError::InputInvalid(_) => StatusCode::BAD_REQUEST,
        CrewError::Oracle(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond(
    service: &'static str,
    result: crate::Result<String>,
) -> (StatusCode, Json<ApiResponse>) {
    match result {
        Ok(answer) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "service": service,
                "answer": answer,
            }))),
        ),
        Err(e) => reject(e),
    }
}

fn reject(error: CrewError) -> (StatusCode, Json<ApiResponse>) {
    (status_for(&error), Json(ApiResponse::error(error.to_string())))
}

/// Unwrap a JSON body, turning extractor rejections into the error envelope
fn parse_body<T>(
    body: std::result::Result<Json<T>, JsonRejection>,
) -> std::result::Result<T, (StatusCode, Json<ApiResponse>)> {
    match body {
        Ok(Json(req)) => Ok(req),
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            Err(reject(CrewError::InputInvalid(rejection.body_text())))
        }
    }
}

/// =============================
/// Health & Discovery
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn list_personas(State(state): State<ApiState>) -> Json<ApiResponse> {
    let personas: Vec<serde_json::Value> = state
        .crew
        .personas()
        .list()
        .into_iter()
        .map(|(kind, persona)| {
            serde_json::json!({
                "kind": kind,
                "role": persona.role,
                "goal": persona.goal,
            })
        })
        .collect();

    Json(ApiResponse::success(personas))
}

/// =============================
/// Crew Endpoints
/// =============================

async fn company_analysis(
    State(state): State<ApiState>,
    body: std::result::Result<Json<CompanyAnalysisRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    let req = match parse_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    info!("Received company analysis request: {}", req.company);
    respond("company_analysis", state.crew.analyze_company(&req.company).await)
}

async fn personal_plan(
    State(state): State<ApiState>,
    body: std::result::Result<Json<ClientProfile>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    let req = match parse_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    info!("Received personal planning request");

    let missing: Vec<&str> = [
        ("age", &req.age),
        ("income", &req.income),
        ("savings", &req.savings),
        ("goals", &req.goals),
    ]
    .iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| *name)
    .collect();

    if !missing.is_empty() {
        return reject(CrewError::InputInvalid(format!(
            "missing fields: {}",
            missing.join(", ")
        )));
    }

    respond(
        "personal_plan",
        state.crew.plan_personal_finances(&req.to_string()).await,
    )
}

async fn investment_analysis(
    State(state): State<ApiState>,
    body: std::result::Result<Json<InvestmentAnalysisRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    let req = match parse_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    info!("Received investment analysis request: {}", req.investment);
    respond(
        "investment_analysis",
        state.crew.analyze_investment(&req.investment).await,
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(crew: Arc<FinanceCrew>) -> Router {
    let state = ApiState { crew };

    Router::new()
        .route("/health", get(health))
        .route("/api/personas", get(list_personas))
        .route("/api/company-analysis", post(company_analysis))
        .route("/api/personal-plan", post(personal_plan))
        .route("/api/investment-analysis", post(investment_analysis))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    crew: Arc<FinanceCrew>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(crew);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;
    use crate::oracle::MockOracle;
    use crate::prompts::PromptLibrary;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn router(oracle: MockOracle) -> Router {
        let crew = FinanceCrew::new(
            Arc::new(PromptLibrary::bundled().unwrap()),
            Arc::new(oracle),
        );
        create_router(Arc::new(crew))
    }

    async fn call(router: Router, method: &str, uri: &str, body: &str) -> (StatusCode, ApiResponse) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_company_analysis_ok() {
        let (status, body) = call(
            router(MockOracle::new()),
            "POST",
            "/api/company-analysis",
            r#"{"company":"Apple Inc."}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        let data = body.data.unwrap();
        assert_eq!(data["service"], "company_analysis");
        assert!(data["answer"].as_str().unwrap().contains("Risk Assessment Specialist"));
    }

    #[tokio::test]
    async fn test_blank_input_is_bad_request() {
        let (status, body) = call(
            router(MockOracle::new()),
            "POST",
            "/api/investment-analysis",
            r#"{"investment":"  "}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_personal_plan_missing_fields() {
        let (status, body) = call(
            router(MockOracle::new()),
            "POST",
            "/api/personal-plan",
            r#"{"age":"30","income":"","savings":"1000","goals":" "}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.unwrap(), "Invalid input: missing fields: income, goals");
    }

    #[tokio::test]
    async fn test_malformed_body_gets_error_envelope() {
        let (status, body) = call(
            router(MockOracle::new()),
            "POST",
            "/api/personal-plan",
            r#"{"age":"30","income":"$50k"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert!(body.error.unwrap().starts_with("Invalid input: "));

        let (status, body) = call(
            router(MockOracle::new()),
            "POST",
            "/api/company-analysis",
            "{not json",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_oracle_failure_is_bad_gateway() {
        let oracle = MockOracle::failing(OracleError::RateLimited("quota".into()));
        let (status, body) = call(
            router(oracle),
            "POST",
            "/api/personal-plan",
            r#"{"age":"30","income":"$50k","savings":"$5k","goals":"Retire early"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.error.unwrap(), "LLM rate limit exceeded: quota");
    }

    #[tokio::test]
    async fn test_list_personas() {
        let (status, body) = call(router(MockOracle::new()), "GET", "/api/personas", "").await;

        assert_eq!(status, StatusCode::OK);
        let data = body.data.unwrap();
        assert_eq!(data.as_array().unwrap().len(), 4);
        assert_eq!(data[0]["kind"], "financial_analyst");
    }
}
