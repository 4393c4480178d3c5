use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::HashMap;

use crate::AppState;
use crate::error::AggregatorError;
use crate::models::views::{LogOptions, PodFilter};

/// JSON envelope shared by every API response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.to_string(),
            count: None,
            code: None,
        }
    }
}

impl IntoResponse for AggregatorError {
    fn into_response(self) -> Response {
        let status = match &self {
            AggregatorError::NotFound(_) => StatusCode::NOT_FOUND,
            AggregatorError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AggregatorError::Upstream(_) | AggregatorError::MissingPhase { .. } => {
                StatusCode::BAD_GATEWAY
            }
        };
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            message: self.to_string(),
            count: None,
            code: Some(self.code()),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn handle_list_pods(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let filter = PodFilter::from_query(&params);
    match state.aggregator.list_pod_views(&filter).await {
        Ok(pods) => {
            let count = pods.len();
            Json(ApiResponse {
                count: Some(count),
                ..ApiResponse::ok(pods, "Pods retrieved successfully")
            })
            .into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn handle_get_pod(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
) -> Response {
    match state.aggregator.get_pod_detail(&namespace, &name).await {
        Ok(detail) => {
            Json(ApiResponse::ok(detail, "Pod details retrieved successfully")).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn handle_get_pod_logs(
    State(state): State<AppState>,
    Path((namespace, name)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let options = LogOptions::from_query(&params);
    match state
        .aggregator
        .get_pod_logs(&namespace, &name, &options)
        .await
    {
        Ok(logs) => (
            StatusCode::OK,
            [("content-type", "text/plain; charset=utf-8")],
            logs,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn handle_healthz() -> &'static str {
    "ok\n"
}
