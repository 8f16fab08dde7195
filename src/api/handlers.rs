use crate::models::ReconciliationReport;
use crate::service::{ReconciliationEngine, ScanOutcome};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 请求体: 外部解析器产出的行序列 (字段可为任意 JSON 原始值)
#[derive(Debug, Deserialize)]
pub struct LoadCatalogRequest {
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// 响应体
#[derive(Debug, Serialize)]
pub struct LoadCatalogResponse {
    pub success: bool,
    pub message: String,
    pub total_expected: usize,
}

/// 请求体: 单次扫描或手工录入
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub identifier: String,
}

/// 扫描响应体: success=true 时调用方清空输入框, 否则提示重扫
#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub success: bool,
    pub outcome: &'static str,
    pub primary_id: Option<String>,
    pub message: String,
}

/// 报告响应体 (报告本身是每次重新推导的值对象)
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: ReconciliationReport,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub message: String,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 字段统一转字符串: null 当空串, 字符串取原文, 数字/布尔走 JSON 文本
fn stringify_field(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 装载期望清单 (每个会话仅一次)
pub async fn load_catalog(
    State(engine): State<Arc<ReconciliationEngine>>,
    Json(req): Json<LoadCatalogRequest>,
) -> Response {
    let rows: Vec<Vec<String>> = req
        .rows
        .iter()
        .map(|row| row.iter().map(stringify_field).collect())
        .collect();

    match engine.load_catalog(&rows) {
        Ok(count) => {
            let response = LoadCatalogResponse {
                success: true,
                message: format!("Successfully loaded {} expected items", count),
                total_expected: count,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let response = LoadCatalogResponse {
                success: false,
                message: format!("Error: {}", e),
                total_expected: 0,
            };
            (StatusCode::CONFLICT, Json(response)).into_response()
        }
    }
}

/// 记录一次扫描
pub async fn record_scan(
    State(engine): State<Arc<ReconciliationEngine>>,
    Json(req): Json<ScanRequest>,
) -> Response {
    match engine.record(&req.identifier) {
        ScanOutcome::Matched { primary_id } => {
            let response = ScanResponse {
                success: true,
                outcome: "matched",
                message: format!("{} matched", primary_id),
                primary_id: Some(primary_id),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        ScanOutcome::Unmatched => {
            let response = ScanResponse {
                success: false,
                outcome: "unmatched",
                primary_id: None,
                message: format!(
                    "'{}' not found in master list, please rescan",
                    req.identifier.trim()
                ),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
    }
}

/// 当前会话的对账报告
pub async fn get_report(State(engine): State<Arc<ReconciliationEngine>>) -> Response {
    let response = ReportResponse {
        generated_at: Utc::now(),
        report: engine.report(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// 开新会话: 目录与计数一并清空
pub async fn new_session(State(engine): State<Arc<ReconciliationEngine>>) -> Response {
    engine.new_session();
    let response = SessionResponse {
        success: true,
        message: "New session started".to_string(),
    };
    (StatusCode::OK, Json(response)).into_response()
}
