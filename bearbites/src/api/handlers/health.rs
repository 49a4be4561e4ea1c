use axum::extract::State;
use serde::Serialize;

use crate::api::response::ApiResponse;
use crate::api::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub cache: String,
    pub llm: LlmStatus,
    pub enrichment: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LlmStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// `GET /api/v1/health`
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let llm = match state.llm.backend() {
        Some(backend) => LlmStatus {
            status: "available".to_string(),
            provider: Some(backend.name().to_string()),
        },
        None => LlmStatus {
            status: "unavailable".to_string(),
            provider: None,
        },
    };

    ApiResponse::success(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: state.menus.cache().store().backend_name().to_string(),
        llm,
        enrichment: state.enrichment.is_enabled(),
    })
}
